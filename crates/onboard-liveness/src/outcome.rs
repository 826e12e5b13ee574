//! Caller-facing result of a liveness check.

use serde::{Deserialize, Serialize};

/// What the caller should do next. This is the only field callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Next {
    /// Send the user to (or back to) the provider-hosted capture flow.
    #[default]
    VerifyValida,
    /// Liveness confirmed.
    VerifySuccess,
    /// Verification failed; show the message and offer a manual retry.
    VerifyWarning,
}

/// Result of [`LivenessOrchestrator::check_liveness`](crate::LivenessOrchestrator::check_liveness).
///
/// `resume_url` and `message` are presentation hints only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub resume_url: String,
    pub message: String,
    pub next: Next,
}

pub(crate) const MSG_CONTINUE: &str = "Continue liveness verification using the link provided.";
pub(crate) const MSG_SUCCESS: &str = "Liveness verified.";
pub(crate) const MSG_WARNING: &str =
    "We could not confirm your liveness check. Please try again or contact support.";

impl Outcome {
    /// Continue at `resume_url`.
    pub fn continue_at(resume_url: impl Into<String>) -> Self {
        Self {
            resume_url: resume_url.into(),
            message: MSG_CONTINUE.to_string(),
            next: Next::VerifyValida,
        }
    }

    /// Verified. Carries no resume data.
    pub fn success() -> Self {
        Self {
            resume_url: String::new(),
            message: MSG_SUCCESS.to_string(),
            next: Next::VerifySuccess,
        }
    }

    /// Verification failed on the provider side.
    pub fn warning() -> Self {
        Self {
            resume_url: String::new(),
            message: MSG_WARNING.to_string(),
            next: Next::VerifyWarning,
        }
    }

    /// Whether this is the empty default outcome (nothing happened; retry later).
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty_continue() {
        let o = Outcome::default();
        assert!(o.is_empty());
        assert_eq!(o.next, Next::VerifyValida);
        assert!(o.resume_url.is_empty());
    }

    #[test]
    fn wire_format() {
        let json = serde_json::to_value(Outcome::continue_at("https://x/1")).unwrap();
        assert_eq!(json["next"], "VERIFY_VALIDA");
        assert_eq!(json["resumeUrl"], "https://x/1");
        let json = serde_json::to_value(Outcome::warning()).unwrap();
        assert_eq!(json["next"], "VERIFY_WARNING");
    }
}
