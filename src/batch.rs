//! Request-size batching.
//!
//! The remote platform caps both the number of keys per lookup and the number
//! of update actions per request. Large inputs are split into bounded batches
//! before they are sent.

use crate::action::Action;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum number of update actions accepted in one request.
pub const MAX_ACTIONS_PER_REQUEST: usize = 500;

/// Maximum number of keys looked up in one request.
pub const MAX_KEYS_PER_REQUEST: usize = 500;

/// Splits `items` into consecutive batches of at most `size` elements.
///
/// A `size` of zero is treated as one.
pub fn batch_elements<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut batches = Vec::with_capacity(items.len().div_ceil(size));
    let mut iter = items.into_iter().peekable();
    while iter.peek().is_some() {
        batches.push(iter.by_ref().take(size).collect());
    }
    batches
}

/// VersionedResource identifies a persisted resource at a specific version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedResource {
    pub id: String,
    pub version: u64,
}

impl VersionedResource {
    /// Creates a new versioned resource reference.
    pub fn new(id: impl Into<String>, version: u64) -> Self {
        VersionedResource { id: id.into(), version }
    }
}

/// ActionApplier submits update actions to the remote platform.
#[async_trait]
pub trait ActionApplier: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Applies `actions` to `resource` and returns the updated resource.
    async fn apply_actions(
        &self,
        resource: &VersionedResource,
        actions: &[Action],
    ) -> Result<VersionedResource, Self::Error>;
}

/// Applies `actions` in sequential batches of at most `batch_size`.
///
/// Each batch is submitted against the version returned by the previous one.
/// The first failing batch aborts the remaining ones. With no actions the
/// resource is returned unchanged without a request.
pub async fn apply_in_batches<A>(
    applier: &A,
    resource: VersionedResource,
    actions: Vec<Action>,
    batch_size: usize,
) -> Result<VersionedResource, A::Error>
where
    A: ActionApplier + ?Sized,
{
    let batches = batch_elements(actions, batch_size);
    debug!(resource = %resource.id, batches = batches.len(), "applying update actions");

    let mut current = resource;
    for batch in batches {
        current = applier.apply_actions(&current, &batch).await?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("rejected at version {0}")]
    struct Rejected(u64);

    /// Records every submitted batch and bumps the version per request.
    #[derive(Default)]
    struct RecordingApplier {
        submitted: Mutex<Vec<(u64, usize)>>,
        fail_at_version: Option<u64>,
    }

    #[async_trait]
    impl ActionApplier for RecordingApplier {
        type Error = Rejected;

        async fn apply_actions(
            &self,
            resource: &VersionedResource,
            actions: &[Action],
        ) -> Result<VersionedResource, Rejected> {
            if self.fail_at_version == Some(resource.version) {
                return Err(Rejected(resource.version));
            }
            self.submitted.lock().push((resource.version, actions.len()));
            Ok(VersionedResource::new(resource.id.clone(), resource.version + 1))
        }
    }

    fn removes(count: usize) -> Vec<Action> {
        (0..count).map(|i| Action::remove(format!("k{}", i))).collect()
    }

    #[test]
    fn test_batch_elements() {
        assert_eq!(batch_elements(vec![1, 2, 3, 4, 5], 2), vec![vec![1, 2], vec![3, 4], vec![5]]);
        assert_eq!(batch_elements(vec![1, 2], 5), vec![vec![1, 2]]);
        assert_eq!(batch_elements(Vec::<i32>::new(), 3), Vec::<Vec<i32>>::new());
        assert_eq!(batch_elements(vec![1, 2], 0), vec![vec![1], vec![2]]);
    }

    #[test]
    fn test_batch_elements_at_request_limit() {
        let batches = batch_elements(removes(1001), MAX_ACTIONS_PER_REQUEST);
        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![500, 500, 1]);
    }

    #[tokio::test]
    async fn test_apply_in_batches_threads_versions() {
        let applier = RecordingApplier::default();
        let updated = apply_in_batches(
            &applier,
            VersionedResource::new("id-1", 7),
            removes(1200),
            MAX_ACTIONS_PER_REQUEST,
        )
        .await
        .unwrap();

        assert_eq!(updated, VersionedResource::new("id-1", 10));
        assert_eq!(*applier.submitted.lock(), vec![(7, 500), (8, 500), (9, 200)]);
    }

    #[tokio::test]
    async fn test_apply_without_actions_skips_request() {
        let applier = RecordingApplier::default();
        let resource = VersionedResource::new("id-1", 3);
        let updated = apply_in_batches(&applier, resource.clone(), vec![], 500).await.unwrap();

        assert_eq!(updated, resource);
        assert!(applier.submitted.lock().is_empty());
    }

    #[tokio::test]
    async fn test_apply_stops_at_first_failure() {
        let applier = RecordingApplier {
            fail_at_version: Some(2),
            ..Default::default()
        };
        let actions = vec![Action::add(Element::new("a")), Action::add(Element::new("b"))];
        let err = apply_in_batches(&applier, VersionedResource::new("id", 1), actions, 1)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "rejected at version 2");
        assert_eq!(*applier.submitted.lock(), vec![(1, 1)]);
    }
}
