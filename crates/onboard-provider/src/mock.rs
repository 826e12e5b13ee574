//! Mock verification provider for testing and development.
//!
//! Keeps enrollments in memory, lets tests script each enrollment's status
//! and inject failures per operation, and counts calls so tests can assert
//! how many remote enrollments were created.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use onboard_core::EnrollmentRef;
use parking_lot::Mutex;

use crate::enrollment::{
    CreateEnrollmentRequest, EnrollmentHandle, EnrollmentImages, EnrollmentInfo,
    EnrollmentProvider, ProviderStatus,
};
use crate::error::ProviderError;

/// Default prefix for generated resume URLs.
pub const MOCK_RESUME_BASE: &str = "https://flow.mock-provider.test/enroll";

#[derive(Debug, Clone)]
struct MockEnrollment {
    ref_id: String,
    status: ProviderStatus,
    selfie: Option<String>,
}

#[derive(Debug, Default)]
struct Failures {
    create: bool,
    status: bool,
    info: bool,
    unusable_create: bool,
}

/// In-memory [`EnrollmentProvider`].
#[derive(Debug)]
pub struct MockEnrollmentProvider {
    resume_base: String,
    enrollments: Mutex<HashMap<String, MockEnrollment>>,
    failures: Mutex<Failures>,
    create_calls: AtomicUsize,
    status_calls: AtomicUsize,
    info_calls: AtomicUsize,
}

impl Default for MockEnrollmentProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEnrollmentProvider {
    /// A provider with no enrollments and no injected failures.
    pub fn new() -> Self {
        Self {
            resume_base: MOCK_RESUME_BASE.to_string(),
            enrollments: Mutex::new(HashMap::new()),
            failures: Mutex::new(Failures::default()),
            create_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            info_calls: AtomicUsize::new(0),
        }
    }

    /// The prefix generated resume URLs start with.
    pub fn resume_base(&self) -> &str {
        &self.resume_base
    }

    /// Register an enrollment directly, bypassing `create_enrollment` and
    /// its call counter.
    pub fn seed_enrollment(&self, ref_id: &str, status: ProviderStatus) -> EnrollmentRef {
        let reference = EnrollmentRef::generate();
        self.enrollments.lock().insert(
            reference.as_str().to_string(),
            MockEnrollment {
                ref_id: ref_id.to_string(),
                status,
                selfie: None,
            },
        );
        reference
    }

    /// Change the status of an existing enrollment.
    pub fn set_status(&self, reference: &EnrollmentRef, status: ProviderStatus) {
        if let Some(e) = self.enrollments.lock().get_mut(reference.as_str()) {
            e.status = status;
        }
    }

    /// Attach a selfie location to an existing enrollment.
    pub fn set_selfie(&self, reference: &EnrollmentRef, selfie: impl Into<String>) {
        if let Some(e) = self.enrollments.lock().get_mut(reference.as_str()) {
            e.selfie = Some(selfie.into());
        }
    }

    /// Make `create_enrollment` fail.
    pub fn fail_create(&self, fail: bool) {
        self.failures.lock().create = fail;
    }

    /// Make `get_enrollment_status` fail.
    pub fn fail_status_lookup(&self, fail: bool) {
        self.failures.lock().status = fail;
    }

    /// Make `get_enrollment_info` fail.
    pub fn fail_info(&self, fail: bool) {
        self.failures.lock().info = fail;
    }

    /// Make `create_enrollment` succeed with an empty handle.
    pub fn respond_unusable_create(&self, unusable: bool) {
        self.failures.lock().unusable_create = unusable;
    }

    /// Number of `create_enrollment` calls so far.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Number of `get_enrollment_status` calls so far.
    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Number of `get_enrollment_info` calls so far.
    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    /// Number of enrollments held, including seeded ones.
    pub fn enrollment_count(&self) -> usize {
        self.enrollments.lock().len()
    }

    fn handle_for(&self, reference: &str) -> EnrollmentHandle {
        EnrollmentHandle {
            reference: Some(reference.to_string()),
            resume_url: Some(format!("{}/{reference}", self.resume_base)),
        }
    }
}

fn unavailable(operation: &str) -> ProviderError {
    ProviderError::Unavailable {
        reason: format!("mock provider configured to fail {operation}"),
    }
}

fn not_found(endpoint: String) -> ProviderError {
    ProviderError::ApiError {
        endpoint,
        status: 404,
        body: "enrollment not found".to_string(),
    }
}

#[async_trait]
impl EnrollmentProvider for MockEnrollmentProvider {
    async fn create_enrollment(
        &self,
        request: &CreateEnrollmentRequest,
    ) -> Result<EnrollmentHandle, ProviderError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        {
            let failures = self.failures.lock();
            if failures.create {
                return Err(unavailable("create_enrollment"));
            }
            if failures.unusable_create {
                return Ok(EnrollmentHandle::default());
            }
        }
        let reference = self.seed_enrollment(&request.ref_id, ProviderStatus::New);
        Ok(self.handle_for(reference.as_str()))
    }

    async fn get_enrollment_status(&self, ref_id: &str) -> Result<EnrollmentHandle, ProviderError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.failures.lock().status {
            return Err(unavailable("get_enrollment_status"));
        }
        let enrollments = self.enrollments.lock();
        // Void enrollments are never handed out again.
        enrollments
            .iter()
            .find(|(_, e)| e.ref_id == ref_id && e.status != ProviderStatus::Void)
            .map(|(reference, _)| self.handle_for(reference))
            .ok_or_else(|| not_found(format!("GET /enrollments/by-reference/{ref_id}")))
    }

    async fn get_enrollment_info(
        &self,
        reference: &EnrollmentRef,
    ) -> Result<EnrollmentInfo, ProviderError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        if self.failures.lock().info {
            return Err(unavailable("get_enrollment_info"));
        }
        self.enrollments
            .lock()
            .get(reference.as_str())
            .map(|e| EnrollmentInfo {
                status: e.status,
                images: e.selfie.clone().map(|selfie| EnrollmentImages {
                    selfie: Some(selfie),
                }),
            })
            .ok_or_else(|| not_found(format!("GET /enrollments/{reference}")))
    }

    fn provider_name(&self) -> &str {
        "MockEnrollmentProvider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(ref_id: &str) -> CreateEnrollmentRequest {
        CreateEnrollmentRequest {
            ref_id: ref_id.to_string(),
            flow: "liveness".to_string(),
            callback_base_url: "https://api.example.com".to_string(),
            callback_path: "/cb".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_lookup_by_reference() {
        let provider = MockEnrollmentProvider::new();
        let created = provider.create_enrollment(&request("ACC-1")).await.unwrap();
        let found = provider.get_enrollment_status("ACC-1").await.unwrap();
        assert_eq!(created, found);
        assert!(created
            .resume_url
            .as_deref()
            .unwrap()
            .starts_with(MOCK_RESUME_BASE));
        assert_eq!(provider.create_calls(), 1);
        assert_eq!(provider.status_calls(), 1);
    }

    #[tokio::test]
    async fn lookup_skips_void_enrollments() {
        let provider = MockEnrollmentProvider::new();
        provider.seed_enrollment("ACC-1", ProviderStatus::Void);
        assert!(provider.get_enrollment_status("ACC-1").await.is_err());
    }

    #[tokio::test]
    async fn info_reflects_scripted_status_and_selfie() {
        let provider = MockEnrollmentProvider::new();
        let reference = provider.seed_enrollment("ACC-1", ProviderStatus::Incomplete);
        provider.set_status(&reference, ProviderStatus::Success);
        provider.set_selfie(&reference, "s3://selfies/a.jpg");

        let info = provider.get_enrollment_info(&reference).await.unwrap();
        assert_eq!(info.status, ProviderStatus::Success);
        assert_eq!(info.selfie(), Some("s3://selfies/a.jpg"));
    }

    #[tokio::test]
    async fn injected_failures_surface_as_errors() {
        let provider = MockEnrollmentProvider::new();
        provider.fail_create(true);
        provider.fail_info(true);
        assert!(provider.create_enrollment(&request("ACC-1")).await.is_err());
        let reference = provider.seed_enrollment("ACC-1", ProviderStatus::New);
        assert!(provider.get_enrollment_info(&reference).await.is_err());
        assert_eq!(provider.create_calls(), 1);
    }

    #[tokio::test]
    async fn unusable_create_returns_empty_handle() {
        let provider = MockEnrollmentProvider::new();
        provider.respond_unusable_create(true);
        let handle = provider.create_enrollment(&request("ACC-1")).await.unwrap();
        assert_eq!(handle, EnrollmentHandle::default());
        assert_eq!(provider.enrollment_count(), 0);
    }
}
