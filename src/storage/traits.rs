//! Storage traits and error types
//!
//! This module defines the interface the crawl run and the synchronization
//! client use to hand articles to each other.

use crate::blocks::ContentBlock;
use crate::extract::ExtractedArticle;
use crate::output::RunStats;
use crate::state::SyncState;
use crate::storage::{ArticleRecord, RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid stored record: {0}")]
    InvalidRecord(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for article store implementations
pub trait ArticleStore {
    // ===== Run Management =====

    /// Creates a new crawl run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent runs, newest first
    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>>;

    /// Updates the status of a run
    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Marks a run as completed and records its counters
    fn complete_run(&mut self, run_id: i64, stats: &RunStats) -> StorageResult<()>;

    // ===== Articles =====

    /// Stores an article and its converted blocks as pending
    ///
    /// Keyed by entry id: saving an id that is already stored changes
    /// nothing and returns `Ok(false)`.
    fn save_article(
        &mut self,
        run_id: i64,
        source: &str,
        article: &ExtractedArticle,
        blocks: &[ContentBlock],
    ) -> StorageResult<bool>;

    /// Checks whether an entry id is already stored
    fn has_entry(&self, entry_id: &str) -> StorageResult<bool>;

    /// Gets one stored article
    fn get_article(&self, entry_id: &str) -> StorageResult<Option<ArticleRecord>>;

    /// Articles the sync client still has to push, oldest publication first
    fn pending_articles(&self, limit: usize) -> StorageResult<Vec<ArticleRecord>>;

    /// Records a successful push
    fn mark_synced(&mut self, entry_id: &str, remote_id: &str) -> StorageResult<()>;

    /// Records a failed push; the article stays eligible for the next pass
    fn record_sync_error(&mut self, entry_id: &str, message: &str) -> StorageResult<()>;

    // ===== Statistics =====

    /// Counts stored articles in a specific sync state
    fn count_by_state(&self, state: SyncState) -> StorageResult<u64>;

    /// Counts all stored articles
    fn count_total_articles(&self) -> StorageResult<u64>;

    /// Stored article counts per source, largest first
    fn count_by_source(&self) -> StorageResult<Vec<(String, u64)>>;
}
