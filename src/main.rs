//! Gamewire main entry point
//!
//! This is the command-line interface for the Gamewire news ingestion pipeline.

use clap::Parser;
use gamewire::config::{load_config_with_hash, Config, PaginationMode};
use gamewire::crawler::run_crawl;
use gamewire::extract::{overridden_sources, SelectorChain};
use gamewire::output::{load_statistics, print_run_stats, print_statistics};
use gamewire::storage::SqliteStore;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Number of recent runs shown by --stats
const RECENT_RUNS: usize = 5;

/// Gamewire: gaming news ingestion
///
/// Gamewire walks the listing pages of configured news sites, extracts each
/// article with per-site selector rules, converts its body into content
/// blocks and stores the result for a synchronization client.
#[derive(Parser, Debug)]
#[command(name = "gamewire")]
#[command(version)]
#[command(about = "Gaming news ingestion pipeline", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without fetching anything
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Only crawl the named source (repeatable)
    #[arg(long = "source", value_name = "NAME")]
    sources: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, &cli.sources);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(&config, &config_hash, &cli.sources).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` takes precedence when it is set.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else {
            match verbose {
                0 => EnvFilter::new("gamewire=info,warn"),
                1 => EnvFilter::new("gamewire=debug,info"),
                2 => EnvFilter::new("gamewire=trace,debug"),
                _ => EnvFilter::new("trace"),
            }
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows sources, selectors and limits
fn handle_dry_run(config: &Config, only: &[String]) {
    println!("=== Gamewire Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max attempts: {}", config.crawler.max_attempts);
    println!("  Request timeout: {}ms", config.crawler.request_timeout_ms);
    println!("  Retry delay: {}ms (linear)", config.crawler.retry_delay_ms);
    println!("  Article delay: {}ms", config.crawler.article_delay_ms);
    println!("  Max pages per source: {}", config.crawler.max_pages);
    println!("  Max articles per source: {}", config.crawler.max_articles);

    println!("\nLimits:");
    println!(
        "  Max rich text length: {}",
        config.limits.max_rich_text_length
    );
    println!("  Max blocks: {}", config.limits.max_blocks);

    println!("\nListing Driver:");
    match &config.browser {
        Some(browser) => println!(
            "  WebDriver at {} (headless: {})",
            browser.webdriver_url, browser.headless
        ),
        None => println!("  Static HTTP"),
    }

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    let overridden: Vec<&str> = overridden_sources().collect();
    println!("\nSources ({}):", config.sources.len());
    for source in &config.sources {
        let selected = only.is_empty() || only.contains(&source.name);
        println!(
            "  - {}{}",
            source.name,
            if selected { "" } else { " (not selected)" }
        );
        println!("    Listing: {}", source.listing_url());
        print_selector("Article links", &source.article_links);
        print_selector("Title", &source.title);
        print_selector("Author", &source.author);
        print_selector("Content", &source.content);
        print_selector("Date", &source.date);
        print_selector("Entry id", &source.entry_id);
        if let Some(summary) = &source.summary {
            print_selector("Summary", summary);
        }
        match &source.pagination {
            Some(pagination) => {
                let mode = match source.pagination_mode {
                    PaginationMode::Navigate => "navigate",
                    PaginationMode::SamePage => "same-page",
                };
                println!("    Pagination: {} ({})", pagination, mode);
            }
            None => println!("    Pagination: none"),
        }
        if let Some(format) = &source.date_format {
            println!("    Date format: {}", format);
        }
        if overridden.contains(&source.name.as_str()) {
            println!("    Source-specific overrides: yes");
        }
    }

    for name in only {
        if !config.sources.iter().any(|s| &s.name == name) {
            println!("\n✗ Unknown source: {}", name);
        }
    }

    println!("\n✓ Configuration is valid");
}

fn print_selector(label: &str, list: &str) {
    if list.trim().is_empty() {
        println!("    {}: (none)", label);
        return;
    }
    let chain = SelectorChain::parse(list);
    println!(
        "    {}: {} ({} alternatives)",
        label,
        chain.sources().collect::<Vec<_>>().join(" | "),
        chain.len()
    );
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.output.database_path);

    let store = SqliteStore::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&store, RECENT_RUNS)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    config_hash: &str,
    sources: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    if sources.is_empty() {
        tracing::info!("Crawling all {} sources", config.sources.len());
    } else {
        tracing::info!("Crawling selected sources: {}", sources.join(", "));
    }

    match run_crawl(config, config_hash, sources).await {
        Ok(stats) => {
            tracing::info!("Crawl completed successfully");
            print_run_stats(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
