//! Reconciliation errors.

use thiserror::Error;

/// ReconcileError aborts reconciliation of the offending collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("duplicate key '{key}' in draft collection; keys must be unique within their collection")]
    DuplicateKey { key: String },

    #[error("element '{key}' changes its type; in-place type changes are not supported")]
    TypeChangeUnsupported { key: String },

    #[error("element '{key}' has an invalid '{field}' collection: {reason}")]
    InvalidElement {
        key: String,
        field: String,
        reason: String,
    },
}

impl ReconcileError {
    /// Creates a duplicate key error.
    pub fn duplicate_key(key: impl Into<String>) -> Self {
        ReconcileError::DuplicateKey { key: key.into() }
    }

    /// Creates a type change error.
    pub fn type_change_unsupported(key: impl Into<String>) -> Self {
        ReconcileError::TypeChangeUnsupported { key: key.into() }
    }

    /// Creates an invalid nested collection error.
    pub fn invalid_element(key: impl Into<String>, field: impl Into<String>, reason: impl Into<String>) -> Self {
        ReconcileError::InvalidElement {
            key: key.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the key of the element that caused the error.
    pub fn key(&self) -> &str {
        match self {
            ReconcileError::DuplicateKey { key }
            | ReconcileError::TypeChangeUnsupported { key }
            | ReconcileError::InvalidElement { key, .. } => key,
        }
    }
}
