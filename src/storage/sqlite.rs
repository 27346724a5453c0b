//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ArticleStore trait.

use crate::blocks::ContentBlock;
use crate::extract::ExtractedArticle;
use crate::output::RunStats;
use crate::state::SyncState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ArticleStore, StorageError, StorageResult};
use crate::storage::{ArticleRecord, RunRecord, RunStatus};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const ARTICLE_COLUMNS: &str = "id, entry_id, source, title, author, summary, link, published_at,
     content_html, blocks_json, discovered_run, saved_at, sync_state, remote_id, sync_error";

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, links_discovered,
     articles_processed, articles_saved, articles_duplicate, articles_errored";

/// SQLite article store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Article row as read from the database, before decoding
struct RawArticle {
    id: i64,
    entry_id: String,
    source: String,
    title: String,
    author: String,
    summary: String,
    link: String,
    published_at: String,
    content_html: String,
    blocks_json: String,
    discovered_run: i64,
    saved_at: String,
    sync_state: String,
    remote_id: Option<String>,
    sync_error: Option<String>,
}

impl RawArticle {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            entry_id: row.get(1)?,
            source: row.get(2)?,
            title: row.get(3)?,
            author: row.get(4)?,
            summary: row.get(5)?,
            link: row.get(6)?,
            published_at: row.get(7)?,
            content_html: row.get(8)?,
            blocks_json: row.get(9)?,
            discovered_run: row.get(10)?,
            saved_at: row.get(11)?,
            sync_state: row.get(12)?,
            remote_id: row.get(13)?,
            sync_error: row.get(14)?,
        })
    }

    fn decode(self) -> StorageResult<ArticleRecord> {
        let published_at = DateTime::parse_from_rfc3339(&self.published_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                StorageError::InvalidRecord(format!(
                    "published_at '{}' of {}: {}",
                    self.published_at, self.entry_id, e
                ))
            })?;

        let sync_state = SyncState::from_db_string(&self.sync_state).ok_or_else(|| {
            StorageError::InvalidRecord(format!(
                "sync_state '{}' of {}",
                self.sync_state, self.entry_id
            ))
        })?;

        Ok(ArticleRecord {
            id: self.id,
            blocks: serde_json::from_str(&self.blocks_json)?,
            entry_id: self.entry_id,
            source: self.source,
            title: self.title,
            author: self.author,
            summary: self.summary,
            link: self.link,
            published_at,
            content_html: self.content_html,
            discovered_run: self.discovered_run,
            saved_at: self.saved_at,
            sync_state,
            remote_id: self.remote_id,
            sync_error: self.sync_error,
        })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
        links_discovered: row.get::<_, i64>(5)? as u64,
        articles_processed: row.get::<_, i64>(6)? as u64,
        articles_saved: row.get::<_, i64>(7)? as u64,
        articles_duplicate: row.get::<_, i64>(8)? as u64,
        articles_errored: row.get::<_, i64>(9)? as u64,
    })
}

impl ArticleStore for SqliteStore {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::NotFound(format!("run {}", run_id)))
    }

    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM runs ORDER BY id DESC LIMIT ?1",
            RUN_COLUMNS
        ))?;
        let runs = stmt
            .query_map(params![limit as i64], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }

    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE runs SET status = ?1 WHERE id = ?2",
            params![status.to_db_string(), run_id],
        )?;
        Ok(())
    }

    fn complete_run(&mut self, run_id: i64, stats: &RunStats) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, links_discovered = ?3,
             articles_processed = ?4, articles_saved = ?5, articles_duplicate = ?6,
             articles_errored = ?7
             WHERE id = ?8",
            params![
                RunStatus::Completed.to_db_string(),
                now,
                stats.links_discovered() as i64,
                stats.processed() as i64,
                stats.saved() as i64,
                stats.duplicates() as i64,
                stats.errored() as i64,
                run_id
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::NotFound(format!("run {}", run_id)));
        }
        Ok(())
    }

    // ===== Articles =====

    fn save_article(
        &mut self,
        run_id: i64,
        source: &str,
        article: &ExtractedArticle,
        blocks: &[ContentBlock],
    ) -> StorageResult<bool> {
        let blocks_json = serde_json::to_string(blocks)?;
        let now = Utc::now().to_rfc3339();

        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO articles (entry_id, source, title, author, summary, link,
             published_at, content_html, blocks_json, block_count, discovered_run, saved_at,
             sync_state)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                article.entry_id,
                source,
                article.title,
                article.author,
                article.summary,
                article.link,
                article.date.to_rfc3339(),
                article.content,
                blocks_json,
                blocks.len() as i64,
                run_id,
                now,
                SyncState::Pending.to_db_string()
            ],
        )?;

        Ok(inserted > 0)
    }

    fn has_entry(&self, entry_id: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM articles WHERE entry_id = ?1",
                params![entry_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn get_article(&self, entry_id: &str) -> StorageResult<Option<ArticleRecord>> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {} FROM articles WHERE entry_id = ?1", ARTICLE_COLUMNS),
                params![entry_id],
                RawArticle::from_row,
            )
            .optional()?;
        raw.map(RawArticle::decode).transpose()
    }

    fn pending_articles(&self, limit: usize) -> StorageResult<Vec<ArticleRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM articles WHERE sync_state IN (?1, ?2)
             ORDER BY published_at ASC, id ASC LIMIT ?3",
            ARTICLE_COLUMNS
        ))?;

        let raws = stmt
            .query_map(
                params![
                    SyncState::Pending.to_db_string(),
                    SyncState::Failed.to_db_string(),
                    limit as i64
                ],
                RawArticle::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        raws.into_iter().map(RawArticle::decode).collect()
    }

    fn mark_synced(&mut self, entry_id: &str, remote_id: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE articles SET sync_state = ?1, remote_id = ?2, sync_error = NULL, synced_at = ?3
             WHERE entry_id = ?4",
            params![SyncState::Synced.to_db_string(), remote_id, now, entry_id],
        )?;
        if updated == 0 {
            return Err(StorageError::NotFound(format!("article {}", entry_id)));
        }
        Ok(())
    }

    fn record_sync_error(&mut self, entry_id: &str, message: &str) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE articles SET sync_state = ?1, sync_error = ?2 WHERE entry_id = ?3",
            params![SyncState::Failed.to_db_string(), message, entry_id],
        )?;
        if updated == 0 {
            return Err(StorageError::NotFound(format!("article {}", entry_id)));
        }
        Ok(())
    }

    // ===== Statistics =====

    fn count_by_state(&self, state: SyncState) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM articles WHERE sync_state = ?1",
            params![state.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_total_articles(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_by_source(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT source, COUNT(*) AS n FROM articles GROUP BY source ORDER BY n DESC, source ASC",
        )?;
        let counts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }
}
