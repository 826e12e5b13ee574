//! # User Verification Record
//!
//! The subset of the user entity that liveness verification reads and
//! writes, plus [`UserPatch`], the single-call field update a store applies
//! for one transition.

use serde::{Deserialize, Serialize};

use crate::audit::{AuditEntry, AuditTrail};
use crate::identity::{EnrollmentRef, UserId};
use crate::onboarding::OnboardingState;
use crate::temporal::Timestamp;

/// The user's account status as it pertains to liveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerificationStatus {
    /// Nothing has been verified yet.
    #[default]
    Pending,
    /// Verification has started.
    InProgress,
    /// Liveness was confirmed.
    Verified,
    /// The provider rejected or failed the enrollment; needs manual retry.
    Error,
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "inProgress",
            Self::Verified => "verified",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// A locally captured liveness artifact, referenced by its media location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "location", rename_all = "camelCase")]
pub enum Capture {
    /// A still selfie image.
    Image(String),
    /// A short liveness video.
    Video(String),
}

impl Capture {
    /// The image location, if this capture is a still image.
    pub fn as_image(&self) -> Option<&str> {
        match self {
            Self::Image(location) => Some(location),
            Self::Video(_) => None,
        }
    }
}

/// Verification fields of a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Immutable identifier.
    pub id: UserId,
    /// Customer-facing account number, preferred over `id` as the provider
    /// reference when present.
    #[serde(default)]
    pub number: Option<String>,
    /// Account status as it pertains to liveness.
    #[serde(default)]
    pub status: VerificationStatus,
    /// Reference of the current remote enrollment.
    #[serde(default)]
    pub enrollment_ref: Option<EnrollmentRef>,
    /// Set once, when liveness is first confirmed.
    #[serde(default)]
    pub liveness_verified_at: Option<Timestamp>,
    /// Location of the most recent accepted selfie.
    #[serde(default)]
    pub liveness_image: Option<String>,
    /// Append-only transition log.
    #[serde(default)]
    pub audit_trail: AuditTrail,
    /// Onboarding progress.
    #[serde(default)]
    pub onboarding_state: OnboardingState,
}

impl UserRecord {
    /// A fresh record with no verification progress.
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            number: None,
            status: VerificationStatus::Pending,
            enrollment_ref: None,
            liveness_verified_at: None,
            liveness_image: None,
            audit_trail: AuditTrail::new(),
            onboarding_state: OnboardingState::default(),
        }
    }

    /// Set the account number.
    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    /// The reference this user is known by at the verification provider:
    /// the account number if set and non-empty, otherwise the user id.
    pub fn provider_reference(&self) -> String {
        match self.number.as_deref().map(str::trim) {
            Some(number) if !number.is_empty() => number.to_string(),
            _ => self.id.to_string(),
        }
    }

    /// Whether liveness has already been confirmed.
    pub fn is_liveness_verified(&self) -> bool {
        self.liveness_verified_at.is_some()
    }
}

/// All field changes of one transition, applied by a store in a single call.
///
/// Every patch carries exactly one audit entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPatch {
    /// New account status.
    pub status: Option<VerificationStatus>,
    /// New enrollment reference. References are replaced, never cleared.
    pub enrollment_ref: Option<EnrollmentRef>,
    /// Verification time. Ignored if the record already has one.
    pub liveness_verified_at: Option<Timestamp>,
    /// New selfie location.
    pub liveness_image: Option<String>,
    /// Replacement onboarding state.
    pub onboarding_state: Option<OnboardingState>,
    /// The audit line for this transition.
    pub audit: AuditEntry,
}

impl UserPatch {
    /// A patch that only appends `audit`.
    pub fn audit_only(audit: AuditEntry) -> Self {
        Self {
            status: None,
            enrollment_ref: None,
            liveness_verified_at: None,
            liveness_image: None,
            onboarding_state: None,
            audit,
        }
    }

    pub fn status(mut self, status: VerificationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn enrollment_ref(mut self, reference: EnrollmentRef) -> Self {
        self.enrollment_ref = Some(reference);
        self
    }

    pub fn liveness_verified_at(mut self, at: Timestamp) -> Self {
        self.liveness_verified_at = Some(at);
        self
    }

    pub fn liveness_image(mut self, location: impl Into<String>) -> Self {
        self.liveness_image = Some(location.into());
        self
    }

    pub fn onboarding_state(mut self, state: OnboardingState) -> Self {
        self.onboarding_state = Some(state);
        self
    }

    /// Apply the patch to `record` in place.
    pub fn apply(self, record: &mut UserRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(reference) = self.enrollment_ref {
            record.enrollment_ref = Some(reference);
        }
        if let Some(at) = self.liveness_verified_at {
            record.liveness_verified_at.get_or_insert(at);
        }
        if let Some(location) = self.liveness_image {
            record.liveness_image = Some(location);
        }
        if let Some(state) = self.onboarding_state {
            record.onboarding_state = state;
        }
        record.audit_trail.append(self.audit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Transition;

    #[test]
    fn provider_reference_prefers_number() {
        let id = UserId::new();
        let rec = UserRecord::new(id.clone()).with_number("ACC-0042");
        assert_eq!(rec.provider_reference(), "ACC-0042");

        let rec = UserRecord::new(id.clone()).with_number("  ");
        assert_eq!(rec.provider_reference(), id.to_string());

        let rec = UserRecord::new(id.clone());
        assert_eq!(rec.provider_reference(), id.to_string());
    }

    #[test]
    fn apply_sets_fields_and_appends_one_entry() {
        let mut rec = UserRecord::new(UserId::new());
        let reference = EnrollmentRef::new("ref-1").unwrap();
        UserPatch::audit_only(AuditEntry::now(
            Transition::EnrollmentCreated,
            Some(reference.clone()),
        ))
        .enrollment_ref(reference.clone())
        .apply(&mut rec);

        assert_eq!(rec.enrollment_ref, Some(reference));
        assert_eq!(rec.audit_trail.len(), 1);
        assert_eq!(rec.status, VerificationStatus::Pending);
    }

    #[test]
    fn apply_never_overwrites_verified_at() {
        let mut rec = UserRecord::new(UserId::new());
        let first = Timestamp::parse("2026-01-15T12:00:00Z").unwrap();
        let second = Timestamp::parse("2026-02-01T08:00:00Z").unwrap();

        UserPatch::audit_only(AuditEntry::now(Transition::LocalCaptureAccepted, None))
            .liveness_verified_at(first)
            .apply(&mut rec);
        UserPatch::audit_only(AuditEntry::now(Transition::LocalCaptureAccepted, None))
            .liveness_verified_at(second)
            .liveness_image("s3://selfies/2.jpg")
            .apply(&mut rec);

        assert_eq!(rec.liveness_verified_at, Some(first));
        assert_eq!(rec.liveness_image.as_deref(), Some("s3://selfies/2.jpg"));
        assert_eq!(rec.audit_trail.len(), 2);
    }

    #[test]
    fn capture_serde_is_tagged() {
        let json = serde_json::to_value(Capture::Image("file:///tmp/a.jpg".into())).unwrap();
        assert_eq!(json["kind"], "image");
        assert_eq!(json["location"], "file:///tmp/a.jpg");
        assert!(Capture::Video("v.mp4".into()).as_image().is_none());
    }

    #[test]
    fn record_deserializes_with_defaults() {
        let id = UserId::new();
        let rec: UserRecord =
            serde_json::from_value(serde_json::json!({ "id": id })).unwrap();
        assert_eq!(rec.status, VerificationStatus::Pending);
        assert!(rec.enrollment_ref.is_none());
        assert!(rec.audit_trail.is_empty());
    }
}
