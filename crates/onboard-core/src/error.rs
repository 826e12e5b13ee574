//! # Error Types
//!
//! Validation failures for the foundational types. Anything that talks to
//! the provider or a store defines its own error enum in its own crate.

use thiserror::Error;

/// Errors raised while constructing core types from external input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Timestamp string was not valid RFC 3339, or not UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Identifier was empty or contained characters that cannot appear in a
    /// URL path segment.
    #[error("invalid {kind}: {reason}")]
    InvalidIdentifier {
        /// Which identifier namespace rejected the value.
        kind: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
