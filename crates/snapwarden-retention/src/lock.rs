//! Mutual exclusion between the capture producer and the retention sweeper

use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lock guarding mutations of the managed directory
///
/// Cloning is cheap and every clone refers to the same lock. The producer holds it
/// while writing one capture; the sweeper holds it for a whole sweep (scan plus
/// deletions). No sweep and no write are ever concurrent.
///
/// # Examples
///
/// ```
/// use snapwarden_retention::MutationLock;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let lock = MutationLock::new();
/// let producer_side = lock.clone();
///
/// let guard = producer_side.acquire().await;
/// assert!(lock.try_acquire().is_none());
/// drop(guard);
/// assert!(lock.try_acquire().is_some());
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MutationLock {
    inner: Arc<Mutex<()>>,
}

/// Held while the managed directory is being mutated; released on drop
#[derive(Debug)]
pub struct MutationGuard {
    _guard: OwnedMutexGuard<()>,
}

impl MutationLock {
    /// Create a new, unlocked lock
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until the lock is free and take it
    pub async fn acquire(&self) -> MutationGuard {
        MutationGuard {
            _guard: Arc::clone(&self.inner).lock_owned().await,
        }
    }

    /// Take the lock if nobody holds it
    pub fn try_acquire(&self) -> Option<MutationGuard> {
        Arc::clone(&self.inner)
            .try_lock_owned()
            .ok()
            .map(|guard| MutationGuard { _guard: guard })
    }
}
