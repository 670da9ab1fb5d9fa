//! Bounded claim log backed by one JSON file

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hoyosign_common::Clock;
use hoyosign_core::ClaimResultSink;
use hoyosign_domain::constants::MAX_CLAIM_LOG_ENTRIES;
use hoyosign_domain::{Account, ClaimLogEntry, ClaimResult, Result};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{read_json, write_json_atomic, FileLock};

pub const CLAIM_LOG_FILE: &str = "claim_log.json";
pub const CLAIM_LOG_LOCK_FILE: &str = "claim_log.lock";

/// Filter for [`JsonClaimLog::query`].
#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    /// Most recent N entries; `None` for all.
    pub limit: Option<usize>,
    pub account_id: Option<String>,
    /// Only entries from the current local date.
    pub today: bool,
}

/// Claim results, oldest first on disk, capped at the newest
/// [`MAX_CLAIM_LOG_ENTRIES`].
pub struct JsonClaimLog {
    path: PathBuf,
    lock_path: PathBuf,
    clock: Arc<dyn Clock>,
    capacity: usize,
    lock: Mutex<()>,
}

impl JsonClaimLog {
    pub fn new(data_dir: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: data_dir.as_ref().join(CLAIM_LOG_FILE),
            lock_path: data_dir.as_ref().join(CLAIM_LOG_LOCK_FILE),
            clock,
            capacity: MAX_CLAIM_LOG_ENTRIES,
            lock: Mutex::new(()),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// A corrupt log is not worth failing a claim run over; it is logged and
    /// treated as empty, and the next append replaces it.
    async fn load(&self) -> Vec<ClaimLogEntry> {
        match read_json(&self.path).await {
            Ok(entries) => entries.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, path = %self.path.display(), "Discarding unreadable claim log");
                Vec::new()
            }
        }
    }

    pub async fn append(&self, new_entries: Vec<ClaimLogEntry>) -> Result<()> {
        if new_entries.is_empty() {
            return Ok(());
        }
        let _guard = self.lock.lock().await;
        let _file = FileLock::acquire(&self.lock_path).await?;
        let mut entries = self.load().await;
        entries.extend(new_entries);
        if entries.len() > self.capacity {
            let excess = entries.len() - self.capacity;
            entries.drain(..excess);
        }
        write_json_atomic(&self.path, &entries).await?;
        debug!(total = entries.len(), "Claim log updated");
        Ok(())
    }

    /// Matching entries, newest first.
    pub async fn query(&self, query: &LogQuery) -> Vec<ClaimLogEntry> {
        let _guard = self.lock.lock().await;
        let entries = self.load().await;
        let today = self.clock.today();
        let offset = self.clock.now_local() - self.clock.now_utc().naive_utc();
        let local_date = |ts: &DateTime<Utc>| (ts.naive_utc() + offset).date();

        entries
            .into_iter()
            .rev()
            .filter(|e| query.account_id.as_deref().map_or(true, |id| e.account_id == id))
            .filter(|e| !query.today || local_date(&e.timestamp) == today)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect()
    }

    pub async fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        let _file = FileLock::acquire(&self.lock_path).await?;
        write_json_atomic(&self.path, &Vec::<ClaimLogEntry>::new()).await
    }
}

#[async_trait]
impl ClaimResultSink for JsonClaimLog {
    async fn deliver(&self, account: &Account, results: &[ClaimResult]) -> Result<()> {
        let now = self.clock.now_utc();
        let entries = results
            .iter()
            .map(|result| ClaimLogEntry::from_result(&account.id, &account.name, result, now))
            .collect();
        self.append(entries).await
    }
}
