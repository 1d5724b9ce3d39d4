//! Action module - Update actions and their deterministic sequencing.
//!
//! Actions are produced by the reconciler, ordered by [`sequence`], and then
//! handed to the caller for submission.

mod action;
mod sequence;


pub use action::*;
pub use sequence::*;
