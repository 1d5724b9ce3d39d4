//! Reconcile module - Diffing of keyed ordered collections.
//!
//! This module validates drafts and computes the remove, field update, add and
//! reorder actions that transform a persisted collection into a draft.

mod error;
mod reconcile;
mod validation;

#[cfg(test)]
mod reconcile_test;

pub use error::*;
pub use reconcile::*;
pub use validation::*;
