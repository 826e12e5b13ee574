//! reqwest-backed implementation of [`EnrollmentProvider`].

use std::time::Duration;

use async_trait::async_trait;
use onboard_core::EnrollmentRef;
use serde::de::DeserializeOwned;

use crate::config::{ConfigError, ProviderConfig};
use crate::enrollment::{
    CreateEnrollmentRequest, EnrollmentHandle, EnrollmentInfo, EnrollmentProvider,
};
use crate::error::ProviderError;

/// Path prefix of the enrollment resource.
const ENROLLMENTS_PATH: [&str; 3] = ["api", "v1", "enrollments"];

/// HTTP client for the provider's enrollment API.
#[derive(Debug, Clone)]
pub struct HttpEnrollmentClient {
    http: reqwest::Client,
    base_url: url::Url,
}

impl HttpEnrollmentClient {
    /// Create a new client from configuration.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                let mut auth = reqwest::header::HeaderValue::from_str(&format!(
                    "Bearer {}",
                    config.api_key.as_str()
                ))
                .map_err(|_| ProviderError::Config(ConfigError::InvalidApiKey))?;
                auth.set_sensitive(true);
                headers.insert(reqwest::header::AUTHORIZATION, auth);
                headers
            })
            .build()
            .map_err(|e| ProviderError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Build `{base}/api/v1/enrollments/{segments...}` with each segment
    /// percent-encoded.
    fn enrollments_url(&self, segments: &[&str]) -> Result<url::Url, ProviderError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ProviderError::Config(ConfigError::InvalidUrl(
                    "base_url".to_string(),
                    format!("{} cannot be a base URL", self.base_url),
                ))
            })?;
            path.pop_if_empty()
                .extend(ENROLLMENTS_PATH)
                .extend(segments);
        }
        Ok(url)
    }

    /// Send a request and decode a JSON body, mapping every failure onto
    /// [`ProviderError`] tagged with `endpoint`.
    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ProviderError> {
        tracing::debug!(endpoint, "calling verification provider");

        let resp = request.send().await.map_err(|e| ProviderError::Http {
            endpoint: endpoint.to_string(),
            source: e,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                endpoint: endpoint.to_string(),
                status,
                body,
            });
        }

        resp.json().await.map_err(|e| ProviderError::Deserialization {
            endpoint: endpoint.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl EnrollmentProvider for HttpEnrollmentClient {
    /// Calls `POST {base}/api/v1/enrollments`.
    async fn create_enrollment(
        &self,
        request: &CreateEnrollmentRequest,
    ) -> Result<EnrollmentHandle, ProviderError> {
        let url = self.enrollments_url(&[])?;
        self.execute("POST /enrollments", self.http.post(url).json(request))
            .await
    }

    /// Calls `GET {base}/api/v1/enrollments/by-reference/{refId}`.
    async fn get_enrollment_status(&self, ref_id: &str) -> Result<EnrollmentHandle, ProviderError> {
        let url = self.enrollments_url(&["by-reference", ref_id])?;
        self.execute(
            &format!("GET /enrollments/by-reference/{ref_id}"),
            self.http.get(url),
        )
        .await
    }

    /// Calls `GET {base}/api/v1/enrollments/{ref}`.
    async fn get_enrollment_info(
        &self,
        reference: &EnrollmentRef,
    ) -> Result<EnrollmentInfo, ProviderError> {
        let url = self.enrollments_url(&[reference.as_str()])?;
        self.execute(&format!("GET /enrollments/{reference}"), self.http.get(url))
            .await
    }

    fn provider_name(&self) -> &str {
        "HttpEnrollmentClient"
    }
}
