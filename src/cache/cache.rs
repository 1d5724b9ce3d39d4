//! Bounded key to id resolution cache.

use super::{CacheOptions, KeyFetcher, ResourceIdentity};
use crate::batch::batch_elements;
use crate::options::ConfigError;
use futures::future::try_join_all;
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::num::NonZeroUsize;
use tracing::{debug, trace};

/// ReferenceResolutionCache maps entity keys to platform ids.
///
/// Lookups that miss the cache go through the injected [`KeyFetcher`]. Found
/// ids are remembered, bounded by a fixed capacity with least recently used
/// eviction. Once a key is cached no further request is issued for it.
///
/// The cache is safe to share between concurrent synchronization runs. Two
/// callers missing the same key at the same time may both fetch it.
pub struct ReferenceResolutionCache<F> {
    fetcher: F,
    entries: Mutex<LruCache<String, String>>,
    chunk_size: usize,
}

impl<F: KeyFetcher> ReferenceResolutionCache<F> {
    /// Creates a cache with default options.
    pub fn new(fetcher: F) -> Self {
        let options = CacheOptions::default();
        ReferenceResolutionCache {
            fetcher,
            entries: Mutex::new(LruCache::new(
                NonZeroUsize::new(options.capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            chunk_size: options.chunk_size,
        }
    }

    /// Creates a cache with the given options.
    pub fn with_options(fetcher: F, options: CacheOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        let capacity = NonZeroUsize::new(options.capacity).ok_or_else(|| ConfigError::zero("capacity"))?;
        Ok(ReferenceResolutionCache {
            fetcher,
            entries: Mutex::new(LruCache::new(capacity)),
            chunk_size: options.chunk_size,
        })
    }

    /// Returns the injected fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Returns the cached id for `key` without any remote request.
    pub fn get(&self, key: &str) -> Option<String> {
        if is_blank(key) {
            return None;
        }
        self.entries.lock().get(key).cloned()
    }

    /// Caches `id` for `key`, replacing any previous id.
    ///
    /// Used after an entity is created or renamed so that later lookups of the
    /// key are served without a round trip. Blank keys are ignored.
    pub fn put(&self, key: impl Into<String>, id: impl Into<String>) {
        let key = key.into();
        if is_blank(&key) {
            return;
        }
        self.entries.lock().put(key, id.into());
    }

    /// Returns true if `key` is cached. Does not refresh recency.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains(key)
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns the maximum number of cached entries.
    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    /// Resolves `key` to an id, fetching it on a cache miss.
    ///
    /// A key unknown to the remote platform resolves to `None`. A failed fetch
    /// is returned as is and leaves the cache untouched. Blank keys resolve to
    /// `None` without a request.
    pub async fn resolve(&self, key: &str) -> Result<Option<String>, F::Error> {
        if is_blank(key) {
            return Ok(None);
        }
        if let Some(id) = self.get(key) {
            trace!(key, "reference cache hit");
            return Ok(Some(id));
        }

        debug!(key, "reference cache miss, fetching");
        let fetched = self.fetcher.fetch_by_key(key).await?;
        Ok(fetched.map(|identity| learn(&mut self.entries.lock(), key.to_string(), identity.id)))
    }

    /// Resolves a set of keys to ids.
    ///
    /// Cached keys are served from memory. The remaining ones are fetched in
    /// chunks of at most the configured chunk size, one request per chunk.
    /// Keys unknown to the remote platform are missing from the result. If
    /// any chunk fails the whole call fails and nothing fetched is cached.
    pub async fn resolve_batch<I, S>(&self, keys: I) -> Result<HashMap<String, String>, F::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let requested: BTreeSet<String> = keys
            .into_iter()
            .map(Into::into)
            .filter(|key: &String| !is_blank(key))
            .collect();

        let mut resolved = HashMap::with_capacity(requested.len());
        let mut uncached = Vec::new();
        {
            let mut entries = self.entries.lock();
            for key in requested {
                match entries.get(&key) {
                    Some(id) => {
                        let id = id.clone();
                        resolved.insert(key, id);
                    }
                    None => uncached.push(key),
                }
            }
        }

        if uncached.is_empty() {
            trace!(hits = resolved.len(), "reference batch served from cache");
            return Ok(resolved);
        }

        let wanted: BTreeSet<String> = uncached.iter().cloned().collect();
        let chunks = batch_elements(uncached, self.chunk_size);
        debug!(
            hits = resolved.len(),
            misses = wanted.len(),
            chunks = chunks.len(),
            "fetching uncached references"
        );

        let fetched = try_join_all(chunks.iter().map(|chunk| self.fetcher.fetch_by_keys(chunk))).await?;

        let mut entries = self.entries.lock();
        for identity in fetched.into_iter().flatten() {
            if !wanted.contains(&identity.key) {
                continue;
            }
            let ResourceIdentity { id, key } = identity;
            let id = learn(&mut entries, key.clone(), id);
            resolved.insert(key, id);
        }
        Ok(resolved)
    }
}

/// Caches a fetched id unless the key was populated while the fetch was in flight.
///
/// Returns the id that is cached for the key afterwards.
fn learn(entries: &mut LruCache<String, String>, key: String, id: String) -> String {
    if let Some(existing) = entries.get(&key) {
        return existing.clone();
    }
    entries.put(key, id.clone());
    id
}

fn is_blank(key: &str) -> bool {
    key.trim().is_empty()
}
