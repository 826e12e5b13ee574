//! Orchestrator configuration.
//!
//! The verification mode is a process-wide operational toggle. It is read
//! once into [`LivenessConfig`] and injected into the orchestrator, so tests
//! can exercise both modes side by side.

use serde::{Deserialize, Serialize};
use url::Url;

use onboard_core::EnrollmentRef;

/// Whether liveness goes through the external provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMode {
    /// Accept a locally captured still image as proof. The provider is
    /// never contacted.
    Simple,
    /// Run the provider-hosted enrollment flow.
    #[default]
    Provider,
}

impl std::fmt::Display for VerificationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => f.write_str("simple"),
            Self::Provider => f.write_str("provider"),
        }
    }
}

impl std::str::FromStr for VerificationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "provider" => Ok(Self::Provider),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

/// Orchestrator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivenessConfig {
    /// Simple or provider mode.
    pub mode: VerificationMode,
    /// Provider flow name sent on enrollment creation.
    pub flow: String,
    /// Base URL the provider calls back on.
    pub callback_base_url: Url,
    /// Path appended to `callback_base_url` by the provider.
    pub callback_path: String,
    /// Prefix a stored enrollment ref is appended to when the resume URL is
    /// reconstructed instead of re-fetched.
    pub resume_base_url: Url,
    /// Serialize concurrent checks for the same user within this process.
    pub serialize_per_user: bool,
}

impl LivenessConfig {
    /// Default provider flow name.
    pub const DEFAULT_FLOW: &'static str = "liveness";
    /// Default callback path.
    pub const DEFAULT_CALLBACK_PATH: &'static str = "/v1/onboarding/liveness/callback";

    /// Configuration with defaults for everything but the two URLs.
    pub fn new(mode: VerificationMode, callback_base_url: Url, resume_base_url: Url) -> Self {
        Self {
            mode,
            flow: Self::DEFAULT_FLOW.to_string(),
            callback_base_url,
            callback_path: Self::DEFAULT_CALLBACK_PATH.to_string(),
            resume_base_url,
            serialize_per_user: true,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `LIVENESS_MODE` (`simple` | `provider`, default: `provider`)
    /// - `LIVENESS_FLOW` (default: `liveness`)
    /// - `LIVENESS_CALLBACK_BASE_URL` (default: `http://localhost:8080`)
    /// - `LIVENESS_CALLBACK_PATH` (default: `/v1/onboarding/liveness/callback`)
    /// - `LIVENESS_RESUME_BASE_URL` (default: `https://flow.verification-provider.example/enroll`)
    /// - `LIVENESS_SERIALIZE_PER_USER` (`true` | `false`, default: `true`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mode = match std::env::var("LIVENESS_MODE") {
            Ok(raw) => raw.parse()?,
            Err(_) => VerificationMode::default(),
        };
        let serialize_per_user = match std::env::var("LIVENESS_SERIALIZE_PER_USER") {
            Ok(raw) => parse_flag("LIVENESS_SERIALIZE_PER_USER", &raw)?,
            Err(_) => true,
        };

        Ok(Self {
            mode,
            flow: std::env::var("LIVENESS_FLOW").unwrap_or_else(|_| Self::DEFAULT_FLOW.to_string()),
            callback_base_url: env_url("LIVENESS_CALLBACK_BASE_URL", "http://localhost:8080")?,
            callback_path: std::env::var("LIVENESS_CALLBACK_PATH")
                .unwrap_or_else(|_| Self::DEFAULT_CALLBACK_PATH.to_string()),
            resume_base_url: env_url(
                "LIVENESS_RESUME_BASE_URL",
                "https://flow.verification-provider.example/enroll",
            )?,
            serialize_per_user,
        })
    }

    /// Rebuild the resume URL for a stored enrollment reference.
    pub fn resume_url_for(&self, reference: &EnrollmentRef) -> String {
        format!(
            "{}/{}",
            self.resume_base_url.as_str().trim_end_matches('/'),
            reference
        )
    }

    /// The callback base URL as sent to the provider, without a trailing slash.
    pub fn callback_base(&self) -> String {
        self.callback_base_url
            .as_str()
            .trim_end_matches('/')
            .to_string()
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

fn parse_flag(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag(var.to_string(), raw.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid LIVENESS_MODE {0:?}: expected \"simple\" or \"provider\"")]
    InvalidMode(String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid boolean for {0}: {1:?}")]
    InvalidFlag(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LivenessConfig {
        LivenessConfig::new(
            VerificationMode::Provider,
            "https://api.example.com/".parse().unwrap(),
            "https://flow.provider.example/enroll/".parse().unwrap(),
        )
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Simple".parse::<VerificationMode>().unwrap(), VerificationMode::Simple);
        assert_eq!(" provider ".parse::<VerificationMode>().unwrap(), VerificationMode::Provider);
        assert!("off".parse::<VerificationMode>().is_err());
    }

    #[test]
    fn resume_url_for_joins_without_double_slash() {
        let reference = EnrollmentRef::new("enr-1").unwrap();
        assert_eq!(
            config().resume_url_for(&reference),
            "https://flow.provider.example/enroll/enr-1"
        );
    }

    #[test]
    fn callback_base_strips_trailing_slash() {
        assert_eq!(config().callback_base(), "https://api.example.com");
    }

    #[test]
    fn defaults_are_applied() {
        let cfg = config();
        assert_eq!(cfg.flow, "liveness");
        assert_eq!(cfg.callback_path, "/v1/onboarding/liveness/callback");
        assert!(cfg.serialize_per_user);
    }

    #[test]
    fn parse_flag_accepts_common_spellings() {
        assert!(parse_flag("X", "TRUE").unwrap());
        assert!(!parse_flag("X", "off").unwrap());
        assert!(parse_flag("X", "maybe").is_err());
    }
}
