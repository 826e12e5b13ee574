//! # Provider Status Table
//!
//! Maps a normalized [`ProviderStatus`] onto the action the orchestrator
//! takes for a user who already holds an enrollment reference.
//!
//! ```text
//! success                         ──▶ Complete   (stamp, steps, VERIFY_SUCCESS)
//! failed | system_error           ──▶ Reject     (status=error, VERIFY_WARNING, ref kept)
//! new | incomplete | funnel_end   ──▶ AwaitUser  (audit only, VERIFY_VALIDA)
//! void                            ──▶ Replace    (create fresh enrollment or look one up, VERIFY_VALIDA)
//! <unknown>                       ──▶ Unusable   (log, empty outcome)
//! ```

use onboard_provider::ProviderStatus;

/// What to do with an existing enrollment, given its provider status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnrollmentAction {
    /// Liveness confirmed: record it.
    Complete,
    /// Provider rejected or errored: flag for manual review.
    Reject,
    /// Still waiting on the user: send them back to the hosted flow.
    AwaitUser,
    /// Enrollment voided: create a new one.
    Replace,
    /// Status not recognised: do nothing this round.
    Unusable,
}

impl EnrollmentAction {
    /// Classify a provider status.
    pub fn for_status(status: ProviderStatus) -> Self {
        match status {
            ProviderStatus::Success => Self::Complete,
            ProviderStatus::Failed | ProviderStatus::SystemError => Self::Reject,
            ProviderStatus::New | ProviderStatus::Incomplete | ProviderStatus::FunnelEnd => {
                Self::AwaitUser
            }
            ProviderStatus::Void => Self::Replace,
            ProviderStatus::Unknown => Self::Unusable,
        }
    }
}
