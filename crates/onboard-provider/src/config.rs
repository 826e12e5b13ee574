//! Verification provider client configuration.
//!
//! Defaults point to the production endpoint. Override via environment
//! variables or explicit construction for staging/testing.

use url::Url;
use zeroize::Zeroizing;

/// Configuration for connecting to the verification provider.
///
/// Custom `Debug` implementation redacts the `api_key` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Base URL of the provider's enrollment API.
    pub base_url: Url,
    /// Bearer token for API authentication.
    pub api_key: Zeroizing<String>,
    /// Request timeout in seconds. This is the only timeout applied to
    /// provider calls.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `LIVENESS_PROVIDER_URL` (default: `https://api.verification-provider.example`)
    /// - `LIVENESS_PROVIDER_API_KEY` (required)
    /// - `LIVENESS_PROVIDER_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("LIVENESS_PROVIDER_API_KEY")
            .map_err(|_| ConfigError::MissingApiKey)?;

        Ok(Self {
            base_url: env_url(
                "LIVENESS_PROVIDER_URL",
                "https://api.verification-provider.example",
            )?,
            api_key: Zeroizing::new(api_key),
            timeout_secs: std::env::var("LIVENESS_PROVIDER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Create a configuration pointing to a local mock server (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the localhost URL cannot be parsed.
    pub fn local_mock(port: u16, api_key: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&format!("http://127.0.0.1:{port}"))
            .map_err(|e| ConfigError::InvalidUrl("localhost".to_string(), e.to_string()))?;
        Ok(Self {
            base_url,
            api_key: Zeroizing::new(api_key.to_string()),
            timeout_secs: 5,
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("LIVENESS_PROVIDER_API_KEY environment variable is required")]
    MissingApiKey,
    #[error("API key is not a valid HTTP header value")]
    InvalidApiKey,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
