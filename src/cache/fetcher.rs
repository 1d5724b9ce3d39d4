//! Remote key lookup seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// ResourceIdentity is the part of a remote entity the cache cares about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdentity {
    pub id: String,
    pub key: String,
}

impl ResourceIdentity {
    /// Creates a new identity.
    pub fn new(id: impl Into<String>, key: impl Into<String>) -> Self {
        ResourceIdentity {
            id: id.into(),
            key: key.into(),
        }
    }
}

/// KeyFetcher looks up remote entities by key.
///
/// Absence is not an error: an unknown key yields `Ok(None)` from
/// [`fetch_by_key`](KeyFetcher::fetch_by_key) and is simply missing from the
/// result of [`fetch_by_keys`](KeyFetcher::fetch_by_keys).
#[async_trait]
pub trait KeyFetcher: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches the entity with the given key.
    async fn fetch_by_key(&self, key: &str) -> Result<Option<ResourceIdentity>, Self::Error>;

    /// Fetches the entities matching a chunk of keys.
    async fn fetch_by_keys(&self, keys: &[String]) -> Result<Vec<ResourceIdentity>, Self::Error>;
}
