//! Cache configuration.

use crate::batch::MAX_KEYS_PER_REQUEST;
use crate::options::ConfigError;
use serde::{Deserialize, Serialize};

/// Default number of key to id entries kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// CacheOptions controls the size and request shape of a reference cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheOptions {
    /// Maximum number of cached entries before the least recently used is evicted.
    pub capacity: usize,
    /// Maximum number of keys sent in one batched lookup.
    pub chunk_size: usize,
}

impl Default for CacheOptions {
    fn default() -> Self {
        CacheOptions {
            capacity: DEFAULT_CACHE_CAPACITY,
            chunk_size: MAX_KEYS_PER_REQUEST,
        }
    }
}

impl CacheOptions {
    /// Creates a new CacheOptionsBuilder.
    pub fn builder() -> CacheOptionsBuilder {
        CacheOptionsBuilder::default()
    }

    /// Checks that every limit is positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::zero("capacity"));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::zero("chunkSize"));
        }
        Ok(())
    }
}

/// CacheOptionsBuilder is a builder for [`CacheOptions`].
#[derive(Debug, Default)]
pub struct CacheOptionsBuilder {
    options: CacheOptions,
}

impl CacheOptionsBuilder {
    /// Sets the maximum number of cached entries.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.options.capacity = capacity;
        self
    }

    /// Sets the maximum number of keys per batched lookup.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.options.chunk_size = chunk_size;
        self
    }

    /// Builds and validates the options.
    pub fn build(self) -> Result<CacheOptions, ConfigError> {
        self.options.validate()?;
        Ok(self.options)
    }
}
