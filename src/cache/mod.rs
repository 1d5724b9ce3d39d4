//! Cache module - Resolution of entity keys to platform ids.
//!
//! Drafts reference other entities by human readable key while the platform
//! expects ids. This module resolves keys through a bounded cache backed by
//! batched remote lookups.

mod cache;
mod fetcher;
mod options;


pub use cache::*;
pub use fetcher::*;
pub use options::*;
