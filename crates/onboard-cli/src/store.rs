//! # JSON File User Store
//!
//! A [`UserRecordStore`] over a single pretty-printed JSON user record. Lets
//! operators drive the orchestrator against a record exported from the user
//! service, inspect the result, and re-run.
//!
//! Writes go to a sibling temp file which is then renamed over the record,
//! so a crash never leaves a half-written file behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use onboard_core::{UserId, UserPatch, UserRecord};
use onboard_liveness::{StoreError, UserRecordStore};
use tokio::sync::Mutex;

/// Single-record store backed by a JSON file.
#[derive(Debug)]
pub struct JsonFileUserStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write: Mutex<()>,
}

impl JsonFileUserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the record.
    pub async fn load(&self) -> Result<UserRecord, StoreError> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|e| backend(&self.path, "read", e))?;
        serde_json::from_slice(&raw).map_err(|e| backend(&self.path, "parse", e))
    }

    async fn save(&self, record: &UserRecord) -> Result<(), StoreError> {
        let json =
            serde_json::to_vec_pretty(record).map_err(|e| backend(&self.path, "serialize", e))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| backend(&tmp, "write", e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| backend(&self.path, "replace", e))
    }

    async fn load_matching(&self, user_id: &UserId) -> Result<UserRecord, StoreError> {
        let record = self.load().await?;
        if &record.id != user_id {
            return Err(StoreError::NotFound {
                user_id: user_id.clone(),
            });
        }
        Ok(record)
    }
}

fn backend(path: &Path, op: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(format!("{op} {}: {err}", path.display()))
}

#[async_trait]
impl UserRecordStore for JsonFileUserStore {
    async fn find_by_id(&self, user_id: &UserId) -> Result<UserRecord, StoreError> {
        self.load_matching(user_id).await
    }

    async fn patch(&self, user_id: &UserId, patch: UserPatch) -> Result<UserRecord, StoreError> {
        let _write = self.write.lock().await;
        let mut record = self.load_matching(user_id).await?;
        patch.apply(&mut record);
        self.save(&record).await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onboard_core::{AuditEntry, Transition, VerificationStatus};

    fn write_record(dir: &Path, record: &UserRecord) -> PathBuf {
        let path = dir.join("user.json");
        std::fs::write(&path, serde_json::to_vec_pretty(record).unwrap()).unwrap();
        path
    }

    #[tokio::test]
    async fn patch_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let record = UserRecord::new(UserId::new());
        let id = record.id.clone();
        let store = JsonFileUserStore::new(write_record(dir.path(), &record));

        store
            .patch(
                &id,
                UserPatch::audit_only(AuditEntry::now(Transition::EnrollmentFailed, None))
                    .status(VerificationStatus::Error),
            )
            .await
            .unwrap();

        let reloaded = JsonFileUserStore::new(store.path()).load().await.unwrap();
        assert_eq!(reloaded.status, VerificationStatus::Error);
        assert_eq!(reloaded.audit_trail.len(), 1);
        assert!(!dir.path().join("user.json.tmp").exists());
    }

    #[tokio::test]
    async fn other_user_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileUserStore::new(write_record(dir.path(), &UserRecord::new(UserId::new())));

        let err = store.find_by_id(&UserId::new()).await.unwrap_err();

        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn missing_file_is_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileUserStore::new(dir.path().join("absent.json"));

        let err = store.load().await.unwrap_err();

        assert!(matches!(err, StoreError::Backend(_)));
    }
}
