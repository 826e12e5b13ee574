//! # onboard-cli -- Operator CLI for liveness onboarding
//!
//! Provides the `onboard` command-line interface.
//!
//! ## Subcommands
//!
//! - `onboard check` -- Run one liveness check against a user record file.
//! - `onboard enrollment status` -- Look up an enrollment by caller reference.
//! - `onboard enrollment info` -- Show an enrollment's provider status.
//!
//! ```bash
//! LIVENESS_PROVIDER_API_KEY=... onboard check user.json
//! onboard check user.json --mode simple --image s3://captures/selfie.jpg
//! onboard enrollment info 6f1c0d2e
//! ```

pub mod check;
pub mod enrollment;
pub mod store;
