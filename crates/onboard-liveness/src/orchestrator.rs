//! # Liveness Enrollment Orchestrator
//!
//! Drives one user through liveness verification per call.
//!
//! ## Flow
//!
//! ```text
//! check_liveness(user, capture?)
//!   │
//!   ├─ already verified ──────────────────────────▶ empty outcome, no writes
//!   │
//!   ├─ Simple mode ─▶ capture is an image? ──yes──▶ LOCAL_CAPTURE_ACCEPTED, VERIFY_SUCCESS
//!   │                                      └─no───▶ Validation error
//!   │
//!   └─ Provider mode
//!        ├─ no ref ─▶ create ──ok──▶ ENROLLMENT_CREATED, VERIFY_VALIDA
//!        │              └─err─▶ lookup by reference ──ok──▶ ENROLLMENT_RECOVERED, VERIFY_VALIDA
//!        │                                          └─err─▶ warn, empty outcome
//!        └─ ref ────▶ info ─▶ EnrollmentAction (see `status.rs`)
//!                               └─ void ─▶ create, lookup as above ─▶ fresh ref or empty outcome
//!
//! provider-mode error ─▶ capture is an image? ──yes──▶ DEGRADED_TO_LOCAL_CAPTURE, VERIFY_SUCCESS
//!                                             └─no───▶ ProviderUnavailable
//! ```
//!
//! Each call reads the record once, makes at most two provider calls per
//! branch (a voided enrollment adds the info call that found it) and
//! writes at most one [`UserPatch`], which carries exactly one audit entry.
//! The degrade path is the only exception: the failed provider branch has
//! written nothing, and the fallback writes once.

use std::sync::Arc;

use onboard_core::{
    merge_completed_steps, AuditEntry, Capture, EnrollmentRef, OnboardingStep, Timestamp,
    Transition, UserId, UserPatch, UserRecord, VerificationStatus,
};
use onboard_provider::{CreateEnrollmentRequest, EnrollmentHandle, EnrollmentProvider};
use tracing::Instrument;

use crate::config::{LivenessConfig, VerificationMode};
use crate::error::LivenessError;
use crate::lock::UserLocks;
use crate::outcome::Outcome;
use crate::status::EnrollmentAction;
use crate::store::UserRecordStore;

/// The liveness state machine over a user store and a verification provider.
pub struct LivenessOrchestrator {
    store: Arc<dyn UserRecordStore>,
    provider: Arc<dyn EnrollmentProvider>,
    config: LivenessConfig,
    locks: UserLocks,
}

impl std::fmt::Debug for LivenessOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LivenessOrchestrator")
            .field("provider", &self.provider.provider_name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LivenessOrchestrator {
    pub fn new(
        store: Arc<dyn UserRecordStore>,
        provider: Arc<dyn EnrollmentProvider>,
        config: LivenessConfig,
    ) -> Self {
        Self {
            store,
            provider,
            config,
            locks: UserLocks::new(),
        }
    }

    pub fn config(&self) -> &LivenessConfig {
        &self.config
    }

    /// Run one liveness check for `user_id`.
    ///
    /// `capture` is an optional locally captured image or video. It is
    /// required (as an image) in simple mode, and used as a fallback when
    /// the provider path fails in provider mode.
    ///
    /// # Errors
    ///
    /// - [`LivenessError::NotFound`] if the user does not exist.
    /// - [`LivenessError::Validation`] in simple mode without an image.
    /// - [`LivenessError::ProviderUnavailable`] if a provider call failed
    ///   and no image was supplied.
    /// - [`LivenessError::Store`] if the record could not be written.
    pub async fn check_liveness(
        &self,
        user_id: &UserId,
        capture: Option<Capture>,
    ) -> Result<Outcome, LivenessError> {
        let span = tracing::info_span!(
            "check_liveness",
            user_id = %user_id,
            mode = %self.config.mode,
        );
        async move {
            let _guard = if self.config.serialize_per_user {
                Some(self.locks.acquire(user_id).await)
            } else {
                None
            };

            let user = self.store.find_by_id(user_id).await?;

            if user.is_liveness_verified() {
                tracing::debug!("liveness already verified; nothing to do");
                return Ok(Outcome::default());
            }

            match self.config.mode {
                VerificationMode::Simple => {
                    let image = capture
                        .as_ref()
                        .and_then(Capture::as_image)
                        .ok_or_else(|| LivenessError::Validation("image required".to_string()))?;
                    self.accept_local_image(&user, image, Transition::LocalCaptureAccepted, None)
                        .await
                }
                VerificationMode::Provider => match self.run_provider_flow(&user).await {
                    Ok(outcome) => Ok(outcome),
                    Err(err) => self.degrade(&user, capture.as_ref(), err).await,
                },
            }
        }
        .instrument(span)
        .await
    }

    /// Handle a failure of the provider branch.
    async fn degrade(
        &self,
        user: &UserRecord,
        capture: Option<&Capture>,
        err: LivenessError,
    ) -> Result<Outcome, LivenessError> {
        match capture.and_then(Capture::as_image) {
            Some(image) => {
                tracing::warn!(error = %err, "provider flow failed; accepting local capture");
                self.accept_local_image(
                    user,
                    image,
                    Transition::DegradedToLocalCapture,
                    Some(err.to_string()),
                )
                .await
            }
            None => Err(err),
        }
    }

    /// Accept a locally captured still image as proof of liveness.
    async fn accept_local_image(
        &self,
        user: &UserRecord,
        image: &str,
        transition: Transition,
        detail: Option<String>,
    ) -> Result<Outcome, LivenessError> {
        let mut audit = AuditEntry::now(transition, user.enrollment_ref.clone());
        if let Some(detail) = detail {
            audit = audit.with_detail(detail);
        }
        let patch = UserPatch::audit_only(audit)
            .status(VerificationStatus::Verified)
            .liveness_image(image)
            .liveness_verified_at(Timestamp::now());
        self.persist(&user.id, patch).await?;
        Ok(Outcome::success())
    }

    async fn run_provider_flow(&self, user: &UserRecord) -> Result<Outcome, LivenessError> {
        match &user.enrollment_ref {
            None => self.start_enrollment(user).await,
            Some(reference) => self.advance_enrollment(user, reference).await,
        }
    }

    // ── No ref yet ───────────────────────────────────────────────────

    async fn start_enrollment(&self, user: &UserRecord) -> Result<Outcome, LivenessError> {
        let ref_id = user.provider_reference();
        let request = self.create_request(&ref_id);

        match self.provider.create_enrollment(&request).await {
            Ok(handle) => match usable_handle(&handle) {
                Some((reference, resume_url)) => {
                    self.persist(
                        &user.id,
                        UserPatch::audit_only(AuditEntry::now(
                            Transition::EnrollmentCreated,
                            Some(reference.clone()),
                        ))
                        .enrollment_ref(reference),
                    )
                    .await?;
                    Ok(Outcome::continue_at(resume_url))
                }
                None => {
                    tracing::warn!(ref_id = %ref_id, "create_enrollment returned no usable resume URL");
                    self.recover_enrollment(user, &ref_id, None).await
                }
            },
            Err(err) => {
                tracing::warn!(
                    ref_id = %ref_id,
                    error = %err,
                    "create_enrollment failed; looking for an existing enrollment",
                );
                self.recover_enrollment(user, &ref_id, None).await
            }
        }
    }

    /// Creation fell through: the enrollment may already exist from an
    /// earlier, retried request. When replacing `voided`, a lookup that
    /// hands the voided ref back is unusable.
    async fn recover_enrollment(
        &self,
        user: &UserRecord,
        ref_id: &str,
        voided: Option<&EnrollmentRef>,
    ) -> Result<Outcome, LivenessError> {
        let handle = match self.provider.get_enrollment_status(ref_id).await {
            Ok(handle) => handle,
            Err(err) => {
                tracing::warn!(
                    ref_id = %ref_id,
                    error = %err,
                    "no existing enrollment found; caller should retry later",
                );
                return Ok(Outcome::default());
            }
        };

        match usable_handle(&handle) {
            Some((reference, resume_url)) if Some(&reference) != voided => {
                let mut audit =
                    AuditEntry::now(Transition::EnrollmentRecovered, Some(reference.clone()));
                if let Some(voided) = voided {
                    audit = audit.with_detail(format!("provider_status=void replaces={voided}"));
                }
                self.persist(
                    &user.id,
                    UserPatch::audit_only(audit).enrollment_ref(reference),
                )
                .await?;
                Ok(Outcome::continue_at(resume_url))
            }
            _ => {
                tracing::warn!(ref_id = %ref_id, "enrollment lookup returned an unusable response");
                Ok(Outcome::default())
            }
        }
    }

    // ── Ref exists ───────────────────────────────────────────────────

    async fn advance_enrollment(
        &self,
        user: &UserRecord,
        reference: &EnrollmentRef,
    ) -> Result<Outcome, LivenessError> {
        let info = self.provider.get_enrollment_info(reference).await?;
        let action = EnrollmentAction::for_status(info.status);
        tracing::debug!(
            enrollment_ref = %reference,
            provider_status = %info.status,
            ?action,
            "enrollment info received",
        );
        let provider_status = format!("provider_status={}", info.status);

        match action {
            EnrollmentAction::Complete => {
                let onboarding =
                    merge_completed_steps(&user.onboarding_state, OnboardingStep::liveness_steps());
                let mut patch = UserPatch::audit_only(
                    AuditEntry::now(Transition::EnrollmentSucceeded, Some(reference.clone()))
                        .with_detail(provider_status),
                )
                .status(VerificationStatus::Verified)
                .liveness_verified_at(Timestamp::now())
                .onboarding_state(onboarding);
                if let Some(selfie) = info.selfie() {
                    patch = patch.liveness_image(selfie);
                }
                self.persist(&user.id, patch).await?;
                Ok(Outcome::success())
            }
            EnrollmentAction::Reject => {
                self.persist(
                    &user.id,
                    UserPatch::audit_only(
                        AuditEntry::now(Transition::EnrollmentFailed, Some(reference.clone()))
                            .with_detail(provider_status),
                    )
                    .status(VerificationStatus::Error),
                )
                .await?;
                Ok(Outcome::warning())
            }
            EnrollmentAction::AwaitUser => {
                self.persist(
                    &user.id,
                    UserPatch::audit_only(
                        AuditEntry::now(Transition::EnrollmentPending, Some(reference.clone()))
                            .with_detail(provider_status),
                    ),
                )
                .await?;
                Ok(Outcome::continue_at(self.config.resume_url_for(reference)))
            }
            EnrollmentAction::Replace => self.replace_enrollment(user, reference).await,
            EnrollmentAction::Unusable => {
                tracing::warn!(
                    enrollment_ref = %reference,
                    "provider returned an unrecognised enrollment status",
                );
                Ok(Outcome::default())
            }
        }
    }

    /// The enrollment was voided: create a fresh one and store its ref.
    /// A failed or unusable create takes the same lookup fallback as a
    /// first enrollment.
    async fn replace_enrollment(
        &self,
        user: &UserRecord,
        voided: &EnrollmentRef,
    ) -> Result<Outcome, LivenessError> {
        let ref_id = user.provider_reference();
        let request = self.create_request(&ref_id);

        match self.provider.create_enrollment(&request).await {
            Ok(handle) => match usable_handle(&handle) {
                Some((fresh, resume_url)) if &fresh != voided => {
                    self.persist(
                        &user.id,
                        UserPatch::audit_only(
                            AuditEntry::now(Transition::EnrollmentReplaced, Some(fresh.clone()))
                                .with_detail(format!("provider_status=void replaces={voided}")),
                        )
                        .enrollment_ref(fresh),
                    )
                    .await?;
                    Ok(Outcome::continue_at(resume_url))
                }
                _ => {
                    tracing::warn!(
                        enrollment_ref = %voided,
                        "replacement enrollment was unusable or reused the voided ref",
                    );
                    self.recover_enrollment(user, &ref_id, Some(voided)).await
                }
            },
            Err(err) => {
                tracing::warn!(
                    enrollment_ref = %voided,
                    error = %err,
                    "replacement create_enrollment failed; looking for an existing enrollment",
                );
                self.recover_enrollment(user, &ref_id, Some(voided)).await
            }
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn create_request(&self, ref_id: &str) -> CreateEnrollmentRequest {
        CreateEnrollmentRequest {
            ref_id: ref_id.to_string(),
            flow: self.config.flow.clone(),
            callback_base_url: self.config.callback_base(),
            callback_path: self.config.callback_path.clone(),
        }
    }

    async fn persist(&self, user_id: &UserId, patch: UserPatch) -> Result<(), LivenessError> {
        let transition = patch.audit.transition;
        let enrollment_ref = patch
            .audit
            .enrollment_ref
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        self.store.patch(user_id, patch).await?;
        tracing::info!(%transition, %enrollment_ref, "liveness transition recorded");
        Ok(())
    }
}

/// A handle is usable when it carries a non-empty resume URL from which
/// (or alongside which) a valid enrollment ref can be derived.
fn usable_handle(handle: &EnrollmentHandle) -> Option<(EnrollmentRef, String)> {
    let resume_url = handle
        .resume_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())?;
    let reference = EnrollmentRef::from_resume_url(resume_url).or_else(|| {
        handle
            .reference
            .as_deref()
            .and_then(|r| EnrollmentRef::new(r).ok())
    })?;
    Some((reference, resume_url.to_string()))
}
