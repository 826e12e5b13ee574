//! # Enrollment API (liveness flow)
//!
//! Typed request/response shapes for the provider's enrollment lifecycle and
//! the [`EnrollmentProvider`] seam the orchestrator depends on.
//!
//! ## Endpoints
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/api/v1/enrollments` | Create enrollment |
//! | GET    | `/api/v1/enrollments/by-reference/{refId}` | Look up enrollment by caller reference |
//! | GET    | `/api/v1/enrollments/{ref}` | Enrollment status and captured images |
//!
//! None of the calls retry. Retrying is the orchestrator's decision.

use async_trait::async_trait;
use onboard_core::EnrollmentRef;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

// -- Typed enums matching provider values ------------------------------------

/// Enrollment status as reported by the provider.
///
/// Raw status strings are mapped into this closed set at deserialization
/// time and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    /// Created, user has not started.
    New,
    /// User started but did not finish capture.
    Incomplete,
    /// User reached the end of the hosted flow; result not final yet.
    FunnelEnd,
    /// Liveness confirmed.
    Success,
    /// Liveness rejected.
    Failed,
    /// Provider-side failure while processing.
    SystemError,
    /// Enrollment invalidated; a new one is required.
    Void,
    /// Forward-compatible catch-all.
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::Incomplete => "incomplete",
            Self::FunnelEnd => "funnel_end",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::SystemError => "system_error",
            Self::Void => "void",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

// -- Types matching provider API schemas -------------------------------------

/// Request to create a new liveness enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnrollmentRequest {
    /// Caller-side reference for the user (account number or user id).
    pub ref_id: String,
    /// Provider flow to run, e.g. `"liveness"`.
    pub flow: String,
    /// Base URL the provider calls back on completion.
    pub callback_base_url: String,
    /// Path appended to `callback_base_url`.
    pub callback_path: String,
}

/// Handle to a remote enrollment.
///
/// Both fields are optional on the wire; the orchestrator decides whether
/// a handle is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentHandle {
    /// Provider's enrollment reference.
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    /// URL the end user opens to complete capture.
    #[serde(default)]
    pub resume_url: Option<String>,
}

/// Images captured during an enrollment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentImages {
    /// Location of the selfie frame, when the provider exposes it.
    #[serde(default)]
    pub selfie: Option<String>,
}

/// Status and artifacts of an enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentInfo {
    /// Normalized provider status.
    pub status: ProviderStatus,
    /// Captured images, if any.
    #[serde(default)]
    pub images: Option<EnrollmentImages>,
}

impl EnrollmentInfo {
    /// The selfie location, if the provider returned one.
    pub fn selfie(&self) -> Option<&str> {
        self.images
            .as_ref()
            .and_then(|images| images.selfie.as_deref())
            .filter(|s| !s.is_empty())
    }
}

// -- Provider seam ------------------------------------------------------------

/// The contract the liveness orchestrator requires from a verification
/// provider.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// async tasks behind an `Arc`. The trait is object-safe to support
/// runtime selection (HTTP vs. mock).
#[async_trait]
pub trait EnrollmentProvider: Send + Sync {
    /// Create a new enrollment for `request.ref_id`.
    async fn create_enrollment(
        &self,
        request: &CreateEnrollmentRequest,
    ) -> Result<EnrollmentHandle, ProviderError>;

    /// Find an existing enrollment by the caller-side reference.
    async fn get_enrollment_status(&self, ref_id: &str) -> Result<EnrollmentHandle, ProviderError>;

    /// Fetch the status and captured images of an enrollment.
    async fn get_enrollment_info(
        &self,
        reference: &EnrollmentRef,
    ) -> Result<EnrollmentInfo, ProviderError>;

    /// Human-readable name of this implementation, for logs.
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_status_parses_all_known_values() {
        let cases = [
            ("new", ProviderStatus::New),
            ("incomplete", ProviderStatus::Incomplete),
            ("funnel_end", ProviderStatus::FunnelEnd),
            ("success", ProviderStatus::Success),
            ("failed", ProviderStatus::Failed),
            ("system_error", ProviderStatus::SystemError),
            ("void", ProviderStatus::Void),
        ];
        for (raw, expected) in cases {
            let parsed: ProviderStatus = serde_json::from_value(serde_json::json!(raw)).unwrap();
            assert_eq!(parsed, expected);
            assert_eq!(parsed.to_string(), raw);
        }
    }

    #[test]
    fn provider_status_unknown_is_caught() {
        let parsed: ProviderStatus =
            serde_json::from_value(serde_json::json!("manual_review")).unwrap();
        assert_eq!(parsed, ProviderStatus::Unknown);
    }

    #[test]
    fn create_request_serializes_camel_case() {
        let req = CreateEnrollmentRequest {
            ref_id: "ACC-1".into(),
            flow: "liveness".into(),
            callback_base_url: "https://api.example.com".into(),
            callback_path: "/v1/onboarding/liveness/callback".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["refId"], "ACC-1");
        assert_eq!(json["callbackBaseUrl"], "https://api.example.com");
        assert_eq!(json["callbackPath"], "/v1/onboarding/liveness/callback");
    }

    #[test]
    fn handle_tolerates_missing_fields() {
        let handle: EnrollmentHandle = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(handle.reference.is_none());
        assert!(handle.resume_url.is_none());

        let handle: EnrollmentHandle = serde_json::from_value(serde_json::json!({
            "ref": "abc", "resumeUrl": "https://flow.example.com/abc"
        }))
        .unwrap();
        assert_eq!(handle.reference.as_deref(), Some("abc"));
    }

    #[test]
    fn selfie_ignores_empty_string() {
        let info: EnrollmentInfo = serde_json::from_value(serde_json::json!({
            "status": "success", "images": { "selfie": "" }
        }))
        .unwrap();
        assert!(info.selfie().is_none());
    }
}
