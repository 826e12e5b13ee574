//! # onboard-core -- Foundational Types for Account Onboarding
//!
//! The leaf crate of the onboarding workspace. It defines the data that the
//! liveness orchestrator reads and writes, and nothing that talks to the
//! network or a database.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `UserId` and `EnrollmentRef` are
//!    distinct types. An enrollment reference cannot be passed where a user
//!    identifier is expected.
//!
//! 2. **UTC-only timestamps.** `Timestamp` is always UTC, seconds precision,
//!    rendered as `YYYY-MM-DDTHH:MM:SSZ`.
//!
//! 3. **Append-only audit trail.** `AuditTrail` only exposes `append`. Existing
//!    entries are never edited or removed; the display string is derived.
//!
//! 4. **Set semantics for completed onboarding steps.** See
//!    [`onboarding::merge_completed_steps`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `onboard-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod audit;
pub mod error;
pub mod identity;
pub mod onboarding;
pub mod temporal;
pub mod user;

pub use audit::{AuditEntry, AuditTrail, Transition};
pub use error::CoreError;
pub use identity::{EnrollmentRef, UserId};
pub use onboarding::{merge_completed_steps, OnboardingState, OnboardingStep};
pub use temporal::Timestamp;
pub use user::{Capture, UserPatch, UserRecord, VerificationStatus};
