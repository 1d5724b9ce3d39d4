//! Synchronization options and error reporting.
//!
//! The reconciler never logs or swallows errors. Callers route them through
//! the callbacks configured here and skip the affected resource.

use crate::action::{sequence, Action};
use crate::batch::{apply_in_batches, ActionApplier, VersionedResource, MAX_ACTIONS_PER_REQUEST};
use crate::cache::CacheOptions;
use crate::reconcile::ReconcileError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// ConfigError is returned for invalid option values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("option '{name}' must be greater than zero")]
    Zero { name: &'static str },

    #[error("option '{name}' must be at most {max}, got {value}")]
    TooLarge {
        name: &'static str,
        max: usize,
        value: usize,
    },

    #[error("invalid configuration: {0}")]
    Parse(String),
}

impl ConfigError {
    /// Creates a zero value error.
    pub fn zero(name: &'static str) -> Self {
        ConfigError::Zero { name }
    }
}

/// SyncConfig is the serializable part of the synchronization options.
///
/// Callbacks cannot be loaded from a file; they are attached with
/// [`SyncOptionsBuilder`] after loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
    /// Maximum number of update actions per request.
    pub batch_size: usize,
    /// Reference cache settings.
    pub cache: CacheOptions,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            batch_size: MAX_ACTIONS_PER_REQUEST,
            cache: CacheOptions::default(),
        }
    }
}

impl SyncConfig {
    /// Parses and validates a YAML or JSON document. Missing fields take their defaults.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: SyncConfig = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_batch_size(self.batch_size)?;
        self.cache.validate()
    }
}

fn validate_batch_size(batch_size: usize) -> Result<(), ConfigError> {
    if batch_size == 0 {
        return Err(ConfigError::zero("batchSize"));
    }
    if batch_size > MAX_ACTIONS_PER_REQUEST {
        return Err(ConfigError::TooLarge {
            name: "batchSize",
            max: MAX_ACTIONS_PER_REQUEST,
            value: batch_size,
        });
    }
    Ok(())
}

/// SyncError is reported to the error and warning callbacks.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to build update actions for '{resource}': {source}")]
    Reconcile {
        resource: String,
        #[source]
        source: ReconcileError,
    },

    #[error("{message}")]
    Remote {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{0}")]
    Message(String),
}

impl SyncError {
    /// Wraps a reconcile error for the resource with the given key.
    pub fn reconcile(resource: impl Into<String>, source: ReconcileError) -> Self {
        SyncError::Reconcile {
            resource: resource.into(),
            source,
        }
    }

    /// Wraps a remote failure.
    pub fn remote<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SyncError::Remote {
            message: message.into(),
            source: Box::new(source),
        }
    }
}

/// Callback invoked with an error, the persisted resource, the draft and the
/// actions computed so far.
pub type ErrorCallback<R, D> = Arc<dyn Fn(&SyncError, Option<&R>, Option<&D>, &[Action]) + Send + Sync>;

/// Callback invoked with a warning, the persisted resource and the draft.
pub type WarningCallback<R, D> = Arc<dyn Fn(&SyncError, Option<&R>, Option<&D>) + Send + Sync>;

/// Callback that may filter or extend actions before they are submitted.
pub type BeforeUpdateCallback<R, D> = Arc<dyn Fn(Vec<Action>, &D, &R) -> Vec<Action> + Send + Sync>;

/// SyncOptions holds caller configuration for one kind of synchronized resource.
///
/// `R` is the persisted resource type and `D` the draft type.
pub struct SyncOptions<R, D> {
    error_callback: Option<ErrorCallback<R, D>>,
    warning_callback: Option<WarningCallback<R, D>>,
    before_update_callback: Option<BeforeUpdateCallback<R, D>>,
    batch_size: usize,
}

impl<R, D> Clone for SyncOptions<R, D> {
    fn clone(&self) -> Self {
        SyncOptions {
            error_callback: self.error_callback.clone(),
            warning_callback: self.warning_callback.clone(),
            before_update_callback: self.before_update_callback.clone(),
            batch_size: self.batch_size,
        }
    }
}

impl<R, D> fmt::Debug for SyncOptions<R, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncOptions")
            .field("error_callback", &self.error_callback.is_some())
            .field("warning_callback", &self.warning_callback.is_some())
            .field("before_update_callback", &self.before_update_callback.is_some())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl<R, D> SyncOptions<R, D> {
    /// Creates a new SyncOptionsBuilder.
    pub fn builder() -> SyncOptionsBuilder<R, D> {
        SyncOptionsBuilder::new()
    }

    /// Returns the maximum number of actions per update request.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Reports an error. Does nothing when no error callback is set.
    pub fn apply_error_callback(&self, error: &SyncError, old: Option<&R>, new: Option<&D>, actions: &[Action]) {
        if let Some(callback) = &self.error_callback {
            callback(error, old, new, actions);
        }
    }

    /// Reports a warning. Does nothing when no warning callback is set.
    pub fn apply_warning_callback(&self, warning: &SyncError, old: Option<&R>, new: Option<&D>) {
        if let Some(callback) = &self.warning_callback {
            callback(warning, old, new);
        }
    }

    /// Runs the before update callback, if any, on sequenced actions.
    ///
    /// The callback is skipped when there is nothing to update.
    pub fn apply_before_update_callback(&self, actions: Vec<Action>, new: &D, old: &R) -> Vec<Action> {
        match &self.before_update_callback {
            Some(callback) if !actions.is_empty() => callback(actions, new, old),
            _ => actions,
        }
    }

    /// Builds the final action list for one resource.
    ///
    /// `build` runs the reconciliation of every collection of the resource.
    /// On success the actions are sequenced and passed through the before
    /// update callback. On failure the error callback is invoked and `None`
    /// is returned so the caller can skip the resource.
    pub fn build_update_actions<F>(&self, resource_key: &str, old: &R, new: &D, build: F) -> Option<Vec<Action>>
    where
        F: FnOnce() -> Result<Vec<Action>, ReconcileError>,
    {
        match build() {
            Ok(actions) => Some(self.apply_before_update_callback(sequence(actions), new, old)),
            Err(err) => {
                let error = SyncError::reconcile(resource_key, err);
                self.apply_error_callback(&error, Some(old), Some(new), &[]);
                None
            }
        }
    }

    /// Submits `actions` to the remote platform in batches of [`batch_size`](Self::batch_size).
    ///
    /// Returns the updated resource. A failed request is reported through the
    /// error callback as [`SyncError::Remote`] together with the actions that
    /// were to be applied, and `None` is returned.
    pub async fn update_resource<A>(
        &self,
        applier: &A,
        resource: VersionedResource,
        actions: Vec<Action>,
        old: &R,
        new: &D,
    ) -> Option<VersionedResource>
    where
        A: ActionApplier + ?Sized,
    {
        let id = resource.id.clone();
        let submitted = actions.clone();
        match apply_in_batches(applier, resource, actions, self.batch_size).await {
            Ok(updated) => Some(updated),
            Err(err) => {
                let error = SyncError::remote(format!("failed to update resource '{}'", id), err);
                self.apply_error_callback(&error, Some(old), Some(new), &submitted);
                None
            }
        }
    }
}

impl<R, D> Default for SyncOptions<R, D> {
    fn default() -> Self {
        SyncOptions {
            error_callback: None,
            warning_callback: None,
            before_update_callback: None,
            batch_size: MAX_ACTIONS_PER_REQUEST,
        }
    }
}

/// SyncOptionsBuilder is a builder for [`SyncOptions`].
pub struct SyncOptionsBuilder<R, D> {
    options: SyncOptions<R, D>,
}

impl<R, D> Default for SyncOptionsBuilder<R, D> {
    fn default() -> Self {
        SyncOptionsBuilder::new()
    }
}

impl<R, D> SyncOptionsBuilder<R, D> {
    /// Creates a new SyncOptionsBuilder.
    pub fn new() -> Self {
        SyncOptionsBuilder {
            options: SyncOptions::default(),
        }
    }

    /// Applies the limits of a loaded [`SyncConfig`].
    pub fn config(self, config: &SyncConfig) -> Self {
        self.batch_size(config.batch_size)
    }

    /// Sets the error callback.
    pub fn error_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SyncError, Option<&R>, Option<&D>, &[Action]) + Send + Sync + 'static,
    {
        self.options.error_callback = Some(Arc::new(callback));
        self
    }

    /// Sets the warning callback.
    pub fn warning_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SyncError, Option<&R>, Option<&D>) + Send + Sync + 'static,
    {
        self.options.warning_callback = Some(Arc::new(callback));
        self
    }

    /// Sets the before update callback.
    pub fn before_update_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(Vec<Action>, &D, &R) -> Vec<Action> + Send + Sync + 'static,
    {
        self.options.before_update_callback = Some(Arc::new(callback));
        self
    }

    /// Sets the maximum number of actions per update request.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.options.batch_size = batch_size;
        self
    }

    /// Builds and validates the options.
    pub fn build(self) -> Result<SyncOptions<R, D>, ConfigError> {
        validate_batch_size(self.options.batch_size)?;
        Ok(self.options)
    }
}
