//! Output module for run summaries and database reports
//!
//! This module handles:
//! - Per-source and per-run counters kept while crawling
//! - Statistics read back from the article store

pub mod stats;

pub use stats::{
    load_statistics, print_run_stats, print_statistics, DatabaseStatistics, RunStats, SourceStats,
};
