//! Configuration module for Gamewire
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use gamewire::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("gamewire.toml")).unwrap();
//! println!("Configured sources: {}", config.sources.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, CrawlerConfig, LimitsConfig, OutputConfig, PaginationMode, SourceRule,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
