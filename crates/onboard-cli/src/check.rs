//! # Check Subcommand
//!
//! Runs one liveness check against a user record file and prints the
//! outcome as JSON on stdout.
//!
//! ```bash
//! onboard check user.json
//! onboard check user.json --image s3://captures/selfie.jpg
//! onboard check user.json --mode simple --image s3://captures/selfie.jpg
//! ```
//!
//! Orchestrator settings come from `LIVENESS_*` environment variables
//! (see [`LivenessConfig::from_env`]); `--mode` overrides `LIVENESS_MODE`.
//! Provider credentials come from `LIVENESS_PROVIDER_*` unless `--mock` is
//! given or the mode is `simple`. With `--mock`, resume URLs use the mock
//! provider's base and enrollments do not outlive the process.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use url::Url;

use onboard_core::Capture;
use onboard_liveness::{LivenessConfig, LivenessOrchestrator, Outcome, VerificationMode};
use onboard_provider::{EnrollmentProvider, HttpEnrollmentClient, MockEnrollmentProvider, ProviderConfig};

use crate::store::JsonFileUserStore;

/// Arguments for `onboard check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the user record JSON file. Updated in place.
    pub record: PathBuf,

    /// Location of a locally captured selfie image.
    #[arg(long, conflicts_with = "video")]
    pub image: Option<String>,

    /// Location of a locally captured liveness video.
    #[arg(long)]
    pub video: Option<String>,

    /// Verification mode (`simple` or `provider`).
    #[arg(long)]
    pub mode: Option<VerificationMode>,

    /// Use the in-memory mock provider instead of the HTTP client. Mock
    /// enrollments live only for this run, so a record that already holds
    /// an enrollment ref cannot be advanced with `--mock`.
    #[arg(long)]
    pub mock: bool,
}

impl CheckArgs {
    fn capture(&self) -> Option<Capture> {
        match (&self.image, &self.video) {
            (Some(image), _) => Some(Capture::Image(image.clone())),
            (None, Some(video)) => Some(Capture::Video(video.clone())),
            (None, None) => None,
        }
    }
}

/// Execute the check subcommand.
pub async fn run_check(args: &CheckArgs) -> Result<u8> {
    let mut config = LivenessConfig::from_env().context("invalid LIVENESS_* configuration")?;
    if let Some(mode) = args.mode {
        config.mode = mode;
    }

    let provider = select_provider(args.mock, &mut config)?;
    tracing::debug!(provider = provider.provider_name(), mode = %config.mode, "provider selected");

    let store = Arc::new(JsonFileUserStore::new(&args.record));
    let user_id = store
        .load()
        .await
        .with_context(|| format!("failed to load user record {}", args.record.display()))?
        .id;

    let orchestrator = LivenessOrchestrator::new(store, provider, config);
    let outcome = orchestrator
        .check_liveness(&user_id, args.capture())
        .await
        .with_context(|| format!("liveness check failed for user {user_id}"))?;

    print_outcome(&outcome)?;
    Ok(0)
}

/// The mock provider for `--mock` and simple mode, else the HTTP client.
/// With the mock, resume URLs are rebuilt on the mock's own base.
fn select_provider(mock: bool, config: &mut LivenessConfig) -> Result<Arc<dyn EnrollmentProvider>> {
    if mock || config.mode == VerificationMode::Simple {
        let mock = MockEnrollmentProvider::new();
        config.resume_base_url = mock
            .resume_base()
            .parse::<Url>()
            .context("invalid mock resume base URL")?;
        return Ok(Arc::new(mock));
    }
    let provider_config =
        ProviderConfig::from_env().context("invalid LIVENESS_PROVIDER_* configuration")?;
    Ok(Arc::new(HttpEnrollmentClient::new(provider_config)?))
}

fn print_outcome(outcome: &Outcome) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use onboard_provider::mock::MOCK_RESUME_BASE;

    fn args(image: Option<&str>, video: Option<&str>) -> CheckArgs {
        CheckArgs {
            record: PathBuf::from("user.json"),
            image: image.map(String::from),
            video: video.map(String::from),
            mode: None,
            mock: false,
        }
    }

    #[test]
    fn mock_provider_rebuilds_resume_urls_on_its_own_base() {
        let mut config = LivenessConfig::new(
            VerificationMode::Provider,
            "https://api.example.com".parse().unwrap(),
            "https://flow.verification-provider.example/enroll".parse().unwrap(),
        );

        let provider = select_provider(true, &mut config).unwrap();

        assert_eq!(provider.provider_name(), "MockEnrollmentProvider");
        let reference = onboard_core::EnrollmentRef::new("enr-1").unwrap();
        assert_eq!(
            config.resume_url_for(&reference),
            format!("{MOCK_RESUME_BASE}/enr-1")
        );
    }

    #[test]
    fn capture_prefers_image() {
        assert_eq!(
            args(Some("a.jpg"), None).capture(),
            Some(Capture::Image("a.jpg".into()))
        );
        assert_eq!(
            args(None, Some("a.mp4")).capture(),
            Some(Capture::Video("a.mp4".into()))
        );
        assert_eq!(args(None, None).capture(), None);
    }
}
