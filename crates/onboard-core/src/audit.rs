//! # Append-Only Audit Trail
//!
//! Every persisted liveness transition records exactly one [`AuditEntry`].
//! The trail is a list of structured entries; the human-readable log is
//! derived from it by [`AuditTrail::render`], one line per entry:
//!
//! ```text
//! 2026-01-15T12:00:00Z ENROLLMENT_CREATED ref=abc123
//! 2026-01-15T12:04:10Z ENROLLMENT_PENDING ref=abc123 provider_status=incomplete
//! ```
//!
//! ## Invariant
//!
//! The trail only grows. There is no API to edit or remove an entry, so the
//! rendering before any append is always an exact prefix of the rendering
//! after it.

use serde::{Deserialize, Serialize};

use crate::identity::EnrollmentRef;
use crate::temporal::Timestamp;

/// The liveness transitions that are written to the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Transition {
    /// A new remote enrollment was created.
    EnrollmentCreated,
    /// Creation failed but an existing enrollment was found by reference.
    EnrollmentRecovered,
    /// Provider reports the enrollment is still in progress.
    EnrollmentPending,
    /// Provider confirmed liveness.
    EnrollmentSucceeded,
    /// Provider reported a failed or errored enrollment.
    EnrollmentFailed,
    /// Provider voided the enrollment and a fresh one was created.
    EnrollmentReplaced,
    /// Simple mode accepted a locally captured image.
    LocalCaptureAccepted,
    /// Provider path failed and a locally captured image was accepted instead.
    DegradedToLocalCapture,
}

impl Transition {
    /// Stable upper-case name used in rendered audit lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnrollmentCreated => "ENROLLMENT_CREATED",
            Self::EnrollmentRecovered => "ENROLLMENT_RECOVERED",
            Self::EnrollmentPending => "ENROLLMENT_PENDING",
            Self::EnrollmentSucceeded => "ENROLLMENT_SUCCEEDED",
            Self::EnrollmentFailed => "ENROLLMENT_FAILED",
            Self::EnrollmentReplaced => "ENROLLMENT_REPLACED",
            Self::LocalCaptureAccepted => "LOCAL_CAPTURE_ACCEPTED",
            Self::DegradedToLocalCapture => "DEGRADED_TO_LOCAL_CAPTURE",
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the transition was recorded.
    pub at: Timestamp,
    /// Which transition occurred.
    pub transition: Transition,
    /// The enrollment reference in effect after the transition, if any.
    pub enrollment_ref: Option<EnrollmentRef>,
    /// Optional free-form detail (provider status, replaced ref, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AuditEntry {
    /// Create an entry stamped with the current time.
    pub fn now(transition: Transition, enrollment_ref: Option<EnrollmentRef>) -> Self {
        Self {
            at: Timestamp::now(),
            transition,
            enrollment_ref,
            detail: None,
        }
    }

    /// Attach a detail string.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Render as a single line without trailing newline.
    pub fn render(&self) -> String {
        let reference = self
            .enrollment_ref
            .as_ref()
            .map(EnrollmentRef::as_str)
            .unwrap_or("-");
        let mut line = format!("{} {} ref={}", self.at, self.transition, reference);
        if let Some(detail) = &self.detail {
            // Keep one entry on one line.
            let detail = detail.replace(['\r', '\n'], " ");
            line.push(' ');
            line.push_str(&detail);
        }
        line
    }
}

/// Append-only list of audit entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditTrail(Vec<AuditEntry>);

impl AuditTrail {
    /// An empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry.
    pub fn append(&mut self, entry: AuditEntry) {
        self.0.push(entry);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the trail has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The most recent entry.
    pub fn last(&self) -> Option<&AuditEntry> {
        self.0.last()
    }

    /// Derived display string, one newline-terminated line per entry.
    pub fn render(&self) -> String {
        self.0.iter().fold(String::new(), |mut out, entry| {
            out.push_str(&entry.render());
            out.push('\n');
            out
        })
    }
}
