//! Storage module for persisting extracted articles
//!
//! This module is the hand-off point between a crawl run and the
//! synchronization client:
//! - SQLite database initialization and schema management
//! - Idempotent article storage keyed by entry id
//! - Converted block sequences stored as JSON
//! - Sync state tracking (pending, synced, failed)
//! - Run tracking with per-run counters

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{ArticleStore, StorageError, StorageResult};

use crate::blocks::ContentBlock;
use crate::state::SyncState;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Opens or creates an article store
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully initialized store
/// * `Err(StorageError)` - Failed to open the database
pub fn open_store(path: &Path) -> StorageResult<SqliteStore> {
    SqliteStore::new(path)
}

/// Represents a stored article
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    pub id: i64,
    pub entry_id: String,
    pub source: String,
    pub title: String,
    pub author: String,
    pub summary: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
    pub content_html: String,
    pub blocks: Vec<ContentBlock>,
    pub discovered_run: i64,
    pub saved_at: String,
    pub sync_state: SyncState,
    pub remote_id: Option<String>,
    pub sync_error: Option<String>,
}

/// Represents a crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub links_discovered: u64,
    pub articles_processed: u64,
    pub articles_saved: u64,
    pub articles_duplicate: u64,
    pub articles_errored: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_roundtrip() {
        for status in &[RunStatus::Running, RunStatus::Completed, RunStatus::Failed] {
            let db_str = status.to_db_string();
            let parsed = RunStatus::from_db_string(db_str);
            assert_eq!(Some(*status), parsed);
        }
    }

    #[test]
    fn test_run_status_invalid() {
        assert_eq!(RunStatus::from_db_string("interrupted"), None);
    }

    #[test]
    fn test_open_store_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.db");
        open_store(&path).unwrap();
        assert!(path.exists());
    }
}
