//! # Keyed Sync
//!
//! Reconciliation of keyed ordered collections and key to id reference
//! resolution for catalog synchronization.
//!
//! Given the persisted state of a resource and a locally held draft, this
//! library computes the minimal, correctly ordered list of update actions that
//! turns one into the other. References between resources are expressed by
//! human readable keys and resolved to platform ids through a bounded cache.
//!
//! ## Modules
//!
//! - [`element`] - Keyed elements, type tags and collections
//! - [`reconcile`] - Duplicate key validation and collection reconciliation
//! - [`action`] - Update actions and their deterministic sequencing
//! - [`compare`] - Field-level comparison of matched element payloads
//! - [`cache`] - Bounded key to id resolution cache
//! - [`batch`] - Request-size batching of lookups and update actions
//! - [`options`] - Synchronization options, callbacks and configuration

pub mod action;
pub mod batch;
pub mod cache;
pub mod compare;
pub mod element;
pub mod options;
pub mod reconcile;

pub use action::{sequence, Action, ActionKind, FieldAction};
pub use batch::{apply_in_batches, batch_elements, ActionApplier, VersionedResource};
pub use cache::{CacheOptions, KeyFetcher, ReferenceResolutionCache, ResourceIdentity};
pub use compare::FieldComparator;
pub use element::{Collection, Element, TypeTag};
pub use options::{ConfigError, SyncConfig, SyncError, SyncOptions, SyncOptionsBuilder};
pub use reconcile::{
    build_reorder_action, natural_order, reconcile, validate_no_duplicates, ReconcileError,
};
