//! Advisory file locks shared between `hoyosign` processes
//!
//! The daemon and one-shot commands such as `hoyosign claim` are separate
//! processes over the same data directory. An in-process mutex cannot order
//! them, so read-modify-write cycles and account runs additionally take an
//! OS-level exclusive lock on a sibling `.lock` file.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use hoyosign_core::{AccountLease, AccountLock};
use hoyosign_domain::{HoyoSignError, Result};
use tracing::{trace, warn};

use crate::errors::domain;

/// Directory under the data directory holding per-account run locks.
pub const ACCOUNT_LOCK_DIR: &str = "locks";

/// Exclusive lock on one file, released on drop.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Waits until the lock on `path` is held, creating the file if needed.
    ///
    /// The wait happens on the blocking pool so the runtime keeps running.
    pub async fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        tokio::task::spawn_blocking(move || Self::acquire_blocking(path))
            .await
            .map_err(|err| HoyoSignError::Internal(format!("file lock task failed: {err}")))?
    }

    fn acquire_blocking(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(domain)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(domain)?;
        file.lock().map_err(domain)?;
        trace!(path = %path.display(), "Acquired file lock");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(err) = self.file.unlock() {
            warn!(error = %err, path = %self.path.display(), "Failed to release file lock");
        }
    }
}

/// [`AccountLock`] backed by one lock file per account under
/// `<data_dir>/locks`.
pub struct FileAccountLock {
    dir: PathBuf,
}

impl FileAccountLock {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self { dir: data_dir.as_ref().join(ACCOUNT_LOCK_DIR) }
    }

    /// Lock file for `account_id`; anything but `[A-Za-z0-9_-]` becomes `_`.
    pub fn lock_path(&self, account_id: &str) -> PathBuf {
        let name: String = account_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.lock"))
    }
}

#[async_trait]
impl AccountLock for FileAccountLock {
    async fn acquire(&self, account_id: &str) -> Result<AccountLease> {
        let lock = FileLock::acquire(self.lock_path(account_id)).await?;
        Ok(Box::new(lock))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    /// Validates mutual exclusion on one lock file.
    ///
    /// Assertions:
    /// - A second holder waits while the first lock is held
    /// - It gets the lock once the first one drops
    #[tokio::test]
    async fn second_holder_waits_for_release() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.lock");

        let first = FileLock::acquire(&path).await.unwrap();
        let contender = tokio::spawn({
            let path = path.clone();
            async move { FileLock::acquire(path).await }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!contender.is_finished());

        drop(first);
        let second = tokio::time::timeout(Duration::from_secs(5), contender)
            .await
            .expect("lock was not handed over")
            .unwrap()
            .unwrap();
        assert_eq!(second.path(), path.as_path());
    }

    #[tokio::test]
    async fn account_locks_are_independent_and_stay_in_the_lock_dir() {
        let dir = tempfile::tempdir().unwrap();
        let locks = FileAccountLock::new(dir.path());

        let _a = locks.acquire("10001").await.unwrap();
        let _b = tokio::time::timeout(Duration::from_secs(5), locks.acquire("10002"))
            .await
            .expect("different accounts must not block each other")
            .unwrap();

        let odd = locks.lock_path("../etc/passwd");
        assert_eq!(odd, dir.path().join(ACCOUNT_LOCK_DIR).join("___etc_passwd.lock"));
        assert!(dir.path().join(ACCOUNT_LOCK_DIR).join("10001.lock").exists());
    }
}
