//! Run counters and database statistics
//!
//! This module provides the advisory counters a crawl run keeps, and the
//! statistics report printed by `--stats`.

use crate::state::SyncState;
use crate::storage::{ArticleStore, RunRecord, StorageResult};
use std::collections::HashMap;

/// Counters for one source within a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub name: String,
    /// Links left after deduplication and the article ceiling
    pub links_discovered: u64,
    /// Articles attempted
    pub processed: u64,
    /// Articles stored for the first time
    pub saved: u64,
    /// Articles whose entry id was already stored
    pub duplicates: u64,
    /// Articles skipped because of a fetch or storage error
    pub errored: u64,
}

impl SourceStats {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Counters for a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub sources: Vec<SourceStats>,
}

impl RunStats {
    pub fn record(&mut self, source: SourceStats) {
        self.sources.push(source);
    }

    pub fn links_discovered(&self) -> u64 {
        self.sources.iter().map(|s| s.links_discovered).sum()
    }

    pub fn processed(&self) -> u64 {
        self.sources.iter().map(|s| s.processed).sum()
    }

    pub fn saved(&self) -> u64 {
        self.sources.iter().map(|s| s.saved).sum()
    }

    pub fn duplicates(&self) -> u64 {
        self.sources.iter().map(|s| s.duplicates).sum()
    }

    pub fn errored(&self) -> u64 {
        self.sources.iter().map(|s| s.errored).sum()
    }
}

/// Prints the counters of a finished run
pub fn print_run_stats(stats: &RunStats) {
    println!("=== Run Summary ===\n");

    for source in &stats.sources {
        println!("{}:", source.name);
        println!("  Links discovered: {}", source.links_discovered);
        println!("  Articles processed: {}", source.processed);
        println!("  Saved: {}", source.saved);
        println!("  Already stored: {}", source.duplicates);
        println!("  Errors: {}", source.errored);
        println!();
    }

    println!(
        "Total: {} processed, {} saved, {} already stored, {} errors",
        stats.processed(),
        stats.saved(),
        stats.duplicates(),
        stats.errored()
    );
}

/// Database statistics summary
#[derive(Debug, Clone)]
pub struct DatabaseStatistics {
    /// Total number of stored articles
    pub total_articles: u64,

    /// Count of articles by sync state
    pub articles_by_state: HashMap<SyncState, u64>,

    /// Stored articles per source, largest first
    pub articles_by_source: Vec<(String, u64)>,

    /// Most recent runs, newest first
    pub recent_runs: Vec<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The store to query
/// * `recent_runs` - How many recent runs to include
pub fn load_statistics(
    store: &dyn ArticleStore,
    recent_runs: usize,
) -> StorageResult<DatabaseStatistics> {
    let mut articles_by_state = HashMap::new();
    for state in SyncState::all_states() {
        let count = store.count_by_state(state)?;
        if count > 0 {
            articles_by_state.insert(state, count);
        }
    }

    Ok(DatabaseStatistics {
        total_articles: store.count_total_articles()?,
        articles_by_state,
        articles_by_source: store.count_by_source()?,
        recent_runs: store.recent_runs(recent_runs)?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &DatabaseStatistics) {
    println!("=== Article Statistics ===\n");

    println!("Overview:");
    println!("  Total articles stored: {}", stats.total_articles);
    println!();

    println!("Articles by Sync State:");
    for state in SyncState::all_states() {
        let count = stats.articles_by_state.get(&state).copied().unwrap_or(0);
        let percentage = if stats.total_articles > 0 {
            (count as f64 / stats.total_articles as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    if !stats.articles_by_source.is_empty() {
        println!("Articles by Source:");
        for (source, count) in &stats.articles_by_source {
            println!("  {}: {}", source, count);
        }
        println!();
    }

    if !stats.recent_runs.is_empty() {
        println!("Recent Runs:");
        for run in &stats.recent_runs {
            println!(
                "  #{} {} [{}] saved {} / processed {}, {} errors",
                run.id,
                run.started_at,
                run.status.to_db_string(),
                run.articles_saved,
                run.articles_processed,
                run.articles_errored
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;
    use std::path::Path;

    fn source(name: &str, saved: u64, errored: u64) -> SourceStats {
        SourceStats {
            name: name.to_string(),
            links_discovered: saved + errored,
            processed: saved + errored,
            saved,
            duplicates: 0,
            errored,
        }
    }

    #[test]
    fn test_run_stats_totals() {
        let mut stats = RunStats::default();
        stats.record(source("A", 3, 1));
        stats.record(source("B", 2, 0));

        assert_eq!(stats.links_discovered(), 6);
        assert_eq!(stats.processed(), 6);
        assert_eq!(stats.saved(), 5);
        assert_eq!(stats.errored(), 1);
        assert_eq!(stats.duplicates(), 0);
    }

    #[test]
    fn test_load_statistics_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(&dir.path().join("stats.db")).unwrap();
        let stats = load_statistics(&store, 5).unwrap();

        assert_eq!(stats.total_articles, 0);
        assert!(stats.articles_by_state.is_empty());
        assert!(stats.articles_by_source.is_empty());
        assert!(stats.recent_runs.is_empty());
    }

    #[test]
    fn test_load_statistics_counts_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.db");
        let mut store = SqliteStore::new(Path::new(&path)).unwrap();
        store.create_run("a").unwrap();
        store.create_run("b").unwrap();

        let stats = load_statistics(&store, 1).unwrap();
        assert_eq!(stats.recent_runs.len(), 1);
        assert_eq!(stats.recent_runs[0].config_hash, "b");
    }
}
