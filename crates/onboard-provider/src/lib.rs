//! # onboard-provider -- Typed client for the liveness verification provider
//!
//! Wraps the provider's enrollment API:
//! - **Create** a liveness enrollment and receive a resumable URL
//! - **Look up** an enrollment by the caller-side reference (used to recover
//!   from a failed or retried create)
//! - **Inspect** an enrollment's status and captured selfie
//!
//! ## Architecture
//!
//! [`EnrollmentProvider`] is the seam the orchestrator depends on.
//! [`HttpEnrollmentClient`] implements it over reqwest;
//! [`MockEnrollmentProvider`] implements it in memory for tests and local
//! development.
//!
//! Provider status strings are mapped into [`ProviderStatus`] during
//! deserialization. No raw status string leaves this crate.
//!
//! The client performs no retries. Its HTTP timeout
//! ([`ProviderConfig::timeout_secs`]) is the only timeout on provider calls.

pub mod config;
pub mod enrollment;
pub mod error;
pub mod http;
pub mod mock;

pub use config::{ConfigError, ProviderConfig};
pub use enrollment::{
    CreateEnrollmentRequest, EnrollmentHandle, EnrollmentImages, EnrollmentInfo,
    EnrollmentProvider, ProviderStatus,
};
pub use error::ProviderError;
pub use http::HttpEnrollmentClient;
pub use mock::MockEnrollmentProvider;
