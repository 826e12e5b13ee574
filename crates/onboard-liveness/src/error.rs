//! # Error Types
//!
//! `LivenessError` is what callers of
//! [`LivenessOrchestrator::check_liveness`](crate::LivenessOrchestrator::check_liveness)
//! see. Provider failures that the orchestrator can recover from never
//! reach it: they are logged and turned into an empty outcome.

use onboard_core::UserId;
use onboard_provider::ProviderError;
use thiserror::Error;

/// Errors from a [`UserRecordStore`](crate::store::UserRecordStore).
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record with this id.
    #[error("user {user_id} not found")]
    NotFound {
        /// The id that was looked up.
        user_id: UserId,
    },

    /// Storage backend failure.
    #[error("user store backend error: {0}")]
    Backend(String),
}

/// Errors surfaced by the liveness orchestrator.
#[derive(Error, Debug)]
pub enum LivenessError {
    /// The user does not exist.
    #[error("user {user_id} not found")]
    NotFound {
        /// The id that was looked up.
        user_id: UserId,
    },

    /// The request is missing something it requires.
    #[error("validation error: {0}")]
    Validation(String),

    /// A provider call failed and there was no local capture to fall back on.
    #[error("verification provider unavailable: {source}")]
    ProviderUnavailable {
        /// The underlying provider failure.
        #[source]
        source: ProviderError,
    },

    /// The user record could not be read or written.
    #[error("user store error: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for LivenessError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { user_id } => Self::NotFound { user_id },
            other => Self::Store(other),
        }
    }
}

impl From<ProviderError> for LivenessError {
    fn from(source: ProviderError) -> Self {
        Self::ProviderUnavailable { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_becomes_not_found() {
        let id = UserId::new();
        let err: LivenessError = StoreError::NotFound { user_id: id.clone() }.into();
        assert!(matches!(err, LivenessError::NotFound { user_id } if user_id == id));
    }

    #[test]
    fn backend_failure_stays_a_store_error() {
        let err: LivenessError = StoreError::Backend("connection reset".into()).into();
        assert!(matches!(err, LivenessError::Store(_)));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn provider_error_becomes_unavailable() {
        let err: LivenessError = ProviderError::Unavailable {
            reason: "timeout".into(),
        }
        .into();
        assert!(matches!(err, LivenessError::ProviderUnavailable { .. }));
    }
}
