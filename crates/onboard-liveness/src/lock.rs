//! Per-user advisory locks.
//!
//! Two concurrent checks for the same user in the "no ref yet" state would
//! both create a remote enrollment. Holding a per-user lock for the length
//! of a check serializes them within one process; the second check then
//! sees the ref the first one stored. Nothing here coordinates across
//! processes.

use std::sync::Arc;

use dashmap::DashMap;
use onboard_core::UserId;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<UserId, Arc<Mutex<()>>>;

/// Registry of per-user mutexes. Entries are dropped once nobody holds or
/// waits on them.
#[derive(Debug, Default)]
pub struct UserLocks {
    locks: Arc<LockMap>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user_id`.
    pub async fn acquire(&self, user_id: &UserId) -> UserLockGuard {
        let mutex = self
            .locks
            .entry(user_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        let guard = mutex.lock_owned().await;
        UserLockGuard {
            guard: Some(guard),
            user_id: user_id.clone(),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of users with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one user until dropped.
#[derive(Debug)]
pub struct UserLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    user_id: UserId,
    locks: Arc<LockMap>,
}

impl Drop for UserLockGuard {
    fn drop(&mut self) {
        // Release first so the strong count below only sees waiters.
        drop(self.guard.take());
        self.locks
            .remove_if(&self.user_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
