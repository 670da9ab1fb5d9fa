//! JSON file storage
//!
//! Accounts, schedule settings and the claim log each live in one JSON
//! document under the data directory. Writes go to a temporary sibling and
//! are renamed into place, so a crash never leaves a half-written file.
//! Read-modify-write cycles hold a [`FileLock`] so concurrent `hoyosign`
//! processes never overwrite each other's changes.

pub mod claim_log;
pub mod file_lock;
pub mod json_store;

use std::path::{Path, PathBuf};

use hoyosign_domain::{HoyoSignError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::errors::domain;

pub use claim_log::{JsonClaimLog, LogQuery};
pub use file_lock::{FileAccountLock, FileLock};
pub use json_store::JsonAccountStore;

/// Directory name under the user's home directory.
pub const DATA_DIR_NAME: &str = ".hoyosign";

/// `~/.hoyosign`, or `./.hoyosign` when no home directory is known.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(DATA_DIR_NAME)
}

/// Reads and decodes `path`; `None` when the file does not exist.
pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(domain(err)),
    };
    serde_json::from_slice(&bytes).map(Some).map_err(|err| {
        HoyoSignError::Storage(format!("corrupt document {}: {err}", path.display()))
    })
}

/// Pretty-prints `value` to a temporary file and renames it over `path`.
pub(crate) async fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value).map_err(domain)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(domain)?;
    }

    let temp_path = path.with_extension("json.tmp");
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .await
        .map_err(domain)?;
    file.write_all(&data).await.map_err(domain)?;
    file.sync_all().await.map_err(domain)?;
    drop(file);

    fs::rename(&temp_path, path).await.map_err(domain)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let value: Option<Vec<u32>> = read_json(&dir.path().join("absent.json")).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn write_creates_parent_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.json");

        write_json_atomic(&path, &vec![1, 2, 3]).await.unwrap();

        let value: Option<Vec<u32>> = read_json(&path).await.unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_document_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let result: Result<Option<Vec<u32>>> = read_json(&path).await;
        assert!(matches!(result, Err(HoyoSignError::Storage(msg)) if msg.contains("corrupt")));
    }
}
