//! # onboard-liveness -- Identity liveness enrollment orchestrator
//!
//! Given a user and an optional locally captured image or video,
//! [`LivenessOrchestrator::check_liveness`] decides whether to create a
//! remote enrollment, poll the existing one, accept the local capture, or
//! replace a voided enrollment. Every call returns one [`Outcome`] whose
//! [`Next`] tells the caller where to send the user.
//!
//! ## Crate Policy
//!
//! - User records are only written through [`UserRecordStore::patch`], one
//!   patch per persisted transition, each carrying one audit entry.
//! - Provider access goes through
//!   [`EnrollmentProvider`](onboard_provider::EnrollmentProvider). This crate
//!   never touches HTTP directly.
//! - Transient provider trouble on the recovery paths yields an empty
//!   outcome rather than an error, so callers can retry.

pub mod config;
pub mod error;
pub mod lock;
pub mod orchestrator;
pub mod outcome;
pub mod status;
pub mod store;

pub use config::{ConfigError, LivenessConfig, VerificationMode};
pub use error::{LivenessError, StoreError};
pub use lock::{UserLockGuard, UserLocks};
pub use orchestrator::LivenessOrchestrator;
pub use outcome::{Next, Outcome};
pub use status::EnrollmentAction;
pub use store::{InMemoryUserStore, UserRecordStore};
