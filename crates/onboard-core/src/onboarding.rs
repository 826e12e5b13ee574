//! # Onboarding State
//!
//! Tracks which onboarding milestones a user has completed. Steps are
//! idempotently markable: completing a step twice is a no-op.

use serde::{Deserialize, Serialize};

/// Identifier of a discrete onboarding milestone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OnboardingStep(pub String);

impl OnboardingStep {
    /// Selfie/video capture for liveness was completed.
    pub const LIVENESS_CAPTURE: &'static str = "identity-liveness-capture";
    /// Liveness was confirmed.
    pub const LIVENESS_VERIFY: &'static str = "identity-liveness-verify";

    /// Wrap a step identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The two steps a successful liveness verification completes.
    pub fn liveness_steps() -> [OnboardingStep; 2] {
        [
            Self::new(Self::LIVENESS_CAPTURE),
            Self::new(Self::LIVENESS_VERIFY),
        ]
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user's onboarding progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingState {
    /// Completed steps. Unique; order carries no meaning but is kept stable.
    #[serde(default)]
    pub completed_steps: Vec<OnboardingStep>,
    /// Steps pending a fix, in the order they were flagged. Owned by the
    /// correction workflow, never touched by liveness.
    #[serde(default)]
    pub needs_correction: Vec<OnboardingStep>,
}

/// Add completed-step markers without losing previously recorded steps.
///
/// - Steps already present are skipped.
/// - Existing entries keep their relative order; new ones are appended in
///   the order given, deduplicated.
/// - `needs_correction` is carried over untouched.
pub fn merge_completed_steps<I>(current: &OnboardingState, new_steps: I) -> OnboardingState
where
    I: IntoIterator<Item = OnboardingStep>,
{
    let mut merged = current.clone();
    for step in new_steps {
        if !merged.completed_steps.contains(&step) {
            merged.completed_steps.push(step);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(completed: &[&str], correction: &[&str]) -> OnboardingState {
        OnboardingState {
            completed_steps: completed.iter().map(|s| OnboardingStep::new(*s)).collect(),
            needs_correction: correction.iter().map(|s| OnboardingStep::new(*s)).collect(),
        }
    }

    #[test]
    fn merge_appends_missing_steps() {
        let current = state(&["email-verify"], &[]);
        let merged = merge_completed_steps(&current, OnboardingStep::liveness_steps());
        assert_eq!(
            merged.completed_steps,
            vec![
                OnboardingStep::new("email-verify"),
                OnboardingStep::new(OnboardingStep::LIVENESS_CAPTURE),
                OnboardingStep::new(OnboardingStep::LIVENESS_VERIFY),
            ]
        );
    }

    #[test]
    fn merge_existing_step_is_noop() {
        let current = state(&[OnboardingStep::LIVENESS_CAPTURE, "email-verify"], &[]);
        let merged = merge_completed_steps(&current, OnboardingStep::liveness_steps());
        assert_eq!(merged.completed_steps.len(), 3);
        assert_eq!(merged.completed_steps[0].as_str(), OnboardingStep::LIVENESS_CAPTURE);
        assert_eq!(merged.completed_steps[1].as_str(), "email-verify");
    }

    #[test]
    fn merge_deduplicates_within_input() {
        let current = OnboardingState::default();
        let merged = merge_completed_steps(
            &current,
            vec![OnboardingStep::new("a"), OnboardingStep::new("a")],
        );
        assert_eq!(merged.completed_steps, vec![OnboardingStep::new("a")]);
    }

    #[test]
    fn merge_leaves_needs_correction_alone() {
        let current = state(&[], &["address", "identity-document"]);
        let merged = merge_completed_steps(&current, OnboardingStep::liveness_steps());
        assert_eq!(merged.needs_correction, current.needs_correction);
    }

    #[test]
    fn serde_uses_camel_case() {
        let json = serde_json::to_value(state(&["a"], &["b"])).unwrap();
        assert_eq!(json["completedSteps"][0], "a");
        assert_eq!(json["needsCorrection"][0], "b");
    }
}
