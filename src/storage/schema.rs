//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Gamewire database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    links_discovered INTEGER NOT NULL DEFAULT 0,
    articles_processed INTEGER NOT NULL DEFAULT 0,
    articles_saved INTEGER NOT NULL DEFAULT 0,
    articles_duplicate INTEGER NOT NULL DEFAULT 0,
    articles_errored INTEGER NOT NULL DEFAULT 0
);

-- Extracted articles, keyed by entry id, waiting for or done with sync
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entry_id TEXT NOT NULL UNIQUE,
    source TEXT NOT NULL,
    title TEXT NOT NULL,
    author TEXT NOT NULL,
    summary TEXT NOT NULL,
    link TEXT NOT NULL,
    published_at TEXT NOT NULL,
    content_html TEXT NOT NULL,
    blocks_json TEXT NOT NULL,
    block_count INTEGER NOT NULL,
    discovered_run INTEGER NOT NULL REFERENCES runs(id),
    saved_at TEXT NOT NULL,
    sync_state TEXT NOT NULL,
    remote_id TEXT,
    sync_error TEXT,
    synced_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_articles_source ON articles(source);
CREATE INDEX IF NOT EXISTS idx_articles_sync_state ON articles(sync_state);
CREATE INDEX IF NOT EXISTS idx_articles_published ON articles(published_at);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
