//! # Temporal Types -- UTC-Only Timestamps
//!
//! Audit lines and `liveness_verified_at` are stamped with [`Timestamp`],
//! a whole-second UTC instant rendered as `YYYY-MM-DDTHH:MM:SSZ`.
//!
//! Stored records round-trip through the same string form. A record whose
//! timestamps carry an offset or fractional seconds is rejected on load.

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A whole-second UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current instant, sub-seconds dropped.
    pub fn now() -> Self {
        let now = Utc::now();
        Self(now.with_nanosecond(0).unwrap_or(now))
    }

    /// Parse the canonical `YYYY-MM-DDTHH:MM:SSZ` form.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidTimestamp`] for anything that is not RFC 3339,
    /// not `Z`-suffixed, or carries fractional seconds.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if !s.ends_with('Z') {
            return Err(CoreError::InvalidTimestamp(format!("{s:?} is not UTC")));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| CoreError::InvalidTimestamp(format!("{s:?}: {e}")))?
            .with_timezone(&Utc);
        if dt.nanosecond() != 0 {
            return Err(CoreError::InvalidTimestamp(format!(
                "{s:?} has fractional seconds"
            )));
        }
        Ok(Self(dt))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

impl TryFrom<String> for Timestamp {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.to_string()
    }
}
