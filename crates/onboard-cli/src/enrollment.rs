//! # Enrollment Subcommand
//!
//! Read-only inspection of remote enrollments, for support staff chasing a
//! stuck user.
//!
//! - `status <ref-id>` looks an enrollment up by the caller-side reference
//!   (account number or user id) and prints its ref and resume URL.
//! - `info <enrollment-ref>` prints the provider status and selfie location.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use onboard_core::EnrollmentRef;
use onboard_provider::{EnrollmentProvider, HttpEnrollmentClient, ProviderConfig};

/// Arguments for `onboard enrollment`.
#[derive(Args, Debug)]
pub struct EnrollmentArgs {
    #[command(subcommand)]
    pub command: EnrollmentCommand,
}

/// Enrollment subcommands.
#[derive(Subcommand, Debug)]
pub enum EnrollmentCommand {
    /// Find an enrollment by caller-side reference.
    Status {
        /// Account number or user id the enrollment was created under.
        ref_id: String,
    },

    /// Show an enrollment's provider status.
    Info {
        /// Provider enrollment reference.
        reference: String,
    },
}

/// Execute the enrollment subcommand against the configured provider.
pub async fn run_enrollment(args: &EnrollmentArgs) -> Result<u8> {
    let config =
        ProviderConfig::from_env().context("invalid LIVENESS_PROVIDER_* configuration")?;
    let client = HttpEnrollmentClient::new(config)?;
    run_with(&client, args).await
}

/// Execute the enrollment subcommand against `provider`.
pub async fn run_with(provider: &dyn EnrollmentProvider, args: &EnrollmentArgs) -> Result<u8> {
    match &args.command {
        EnrollmentCommand::Status { ref_id } => {
            let handle = provider
                .get_enrollment_status(ref_id)
                .await
                .with_context(|| format!("no enrollment found for {ref_id}"))?;
            print_json(&handle)
        }
        EnrollmentCommand::Info { reference } => {
            let reference = EnrollmentRef::new(reference.as_str())
                .with_context(|| format!("invalid enrollment reference {reference:?}"))?;
            let info = provider
                .get_enrollment_info(&reference)
                .await
                .with_context(|| format!("failed to fetch enrollment {reference}"))?;
            print_json(&info)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<u8> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use onboard_provider::{MockEnrollmentProvider, ProviderStatus};

    #[tokio::test]
    async fn status_of_seeded_enrollment() {
        let provider = MockEnrollmentProvider::new();
        provider.seed_enrollment("ACC-7", ProviderStatus::Incomplete);
        let args = EnrollmentArgs {
            command: EnrollmentCommand::Status {
                ref_id: "ACC-7".into(),
            },
        };
        assert_eq!(run_with(&provider, &args).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn info_rejects_malformed_reference() {
        let provider = MockEnrollmentProvider::new();
        let args = EnrollmentArgs {
            command: EnrollmentCommand::Info {
                reference: "a/b".into(),
            },
        };
        let err = run_with(&provider, &args).await.unwrap_err();
        assert!(err.to_string().contains("invalid enrollment reference"));
        assert_eq!(provider.info_calls(), 0);
    }

    #[tokio::test]
    async fn info_of_unknown_enrollment_fails() {
        let provider = MockEnrollmentProvider::new();
        let args = EnrollmentArgs {
            command: EnrollmentCommand::Info {
                reference: "missing".into(),
            },
        };
        assert!(run_with(&provider, &args).await.is_err());
    }
}
