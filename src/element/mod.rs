//! Element module - Keyed members of ordered collections.
//!
//! Elements are immutable value objects identified by a string key. Drafts own
//! the new elements, persisted resources own the old ones.

mod element;
mod type_tag;

pub use element::*;
pub use type_tag::*;
