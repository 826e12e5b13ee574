//! # User Record Store
//!
//! The persistence seam. Production deployments implement
//! [`UserRecordStore`] over their user table; [`InMemoryUserStore`] backs
//! tests and local development.
//!
//! A store must apply each [`UserPatch`] atomically: all of its fields and
//! its single audit entry, or nothing.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use onboard_core::{UserId, UserPatch, UserRecord};

use crate::error::StoreError;

/// Read-by-id and single-call field patch over user records.
#[async_trait]
pub trait UserRecordStore: Send + Sync {
    /// Load a user record.
    async fn find_by_id(&self, user_id: &UserId) -> Result<UserRecord, StoreError>;

    /// Apply `patch` atomically and return the updated record.
    async fn patch(&self, user_id: &UserId, patch: UserPatch) -> Result<UserRecord, StoreError>;
}

/// DashMap-backed store. Counts applied patches.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    records: DashMap<UserId, UserRecord>,
    patches: AtomicUsize,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record. Does not count as a patch.
    pub fn insert(&self, record: UserRecord) {
        self.records.insert(record.id.clone(), record);
    }

    /// Snapshot of a record.
    pub fn get(&self, user_id: &UserId) -> Option<UserRecord> {
        self.records.get(user_id).map(|r| r.value().clone())
    }

    /// Number of patches applied since construction.
    pub fn patch_count(&self) -> usize {
        self.patches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRecordStore for InMemoryUserStore {
    async fn find_by_id(&self, user_id: &UserId) -> Result<UserRecord, StoreError> {
        self.get(user_id).ok_or_else(|| StoreError::NotFound {
            user_id: user_id.clone(),
        })
    }

    async fn patch(&self, user_id: &UserId, patch: UserPatch) -> Result<UserRecord, StoreError> {
        let mut entry = self
            .records
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound {
                user_id: user_id.clone(),
            })?;
        patch.apply(entry.value_mut());
        self.patches.fetch_add(1, Ordering::SeqCst);
        Ok(entry.value().clone())
    }
}
