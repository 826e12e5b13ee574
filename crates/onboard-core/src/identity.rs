//! # Identifier Newtypes
//!
//! Type-level distinction between the local user identifier and the
//! provider-owned enrollment reference.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Unique identifier for a user account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| CoreError::InvalidIdentifier {
                kind: "user id",
                reason: e.to_string(),
            })
    }
}

/// Opaque reference to a remote enrollment owned by the verification
/// provider.
///
/// The value is used verbatim as the last path segment of resume URLs, so
/// it must be non-empty and contain no `/`, `?` or `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EnrollmentRef(String);

impl EnrollmentRef {
    /// Validate and wrap a provider-issued reference.
    pub fn new(value: impl Into<String>) -> Result<Self, CoreError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(CoreError::InvalidIdentifier {
                kind: "enrollment ref",
                reason: "must not be empty".to_string(),
            });
        }
        if value.contains(['/', '?', '#']) || value.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidIdentifier {
                kind: "enrollment ref",
                reason: format!("{value:?} is not a single URL path segment"),
            });
        }
        Ok(Self(value))
    }

    /// Generate a fresh random reference (simple-form UUID).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Extract the reference from the trailing path segment of a resume URL.
    ///
    /// Query strings, fragments and trailing slashes are ignored.
    /// Returns `None` when the URL has no usable segment.
    pub fn from_resume_url(url: &str) -> Option<Self> {
        let without_fragment = url.split('#').next().unwrap_or_default();
        let path = without_fragment.split('?').next().unwrap_or_default();
        // Skip the scheme/authority so a bare host never counts as a ref.
        let path = match path.find("://") {
            Some(idx) => {
                let rest = &path[idx + 3..];
                rest.find('/').map(|p| &rest[p..]).unwrap_or_default()
            }
            None => path,
        };
        path.rsplit('/')
            .find(|segment| !segment.is_empty())
            .and_then(|segment| Self::new(segment).ok())
    }

    /// Borrow the raw reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EnrollmentRef {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EnrollmentRef> for String {
    fn from(value: EnrollmentRef) -> Self {
        value.0
    }
}

impl std::fmt::Display for EnrollmentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
