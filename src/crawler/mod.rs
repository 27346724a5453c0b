//! Crawler module for listing discovery and article processing
//!
//! This module contains the core crawling logic, including:
//! - Page fetching with bounded retries and linear backoff
//! - Listing drivers (static HTTP, WebDriver browser session)
//! - Paginated article link discovery
//! - Source-by-source run coordination

mod browser;
mod coordinator;
mod discovery;
mod driver;
mod fetcher;

pub use browser::BrowserDriver;
pub use coordinator::{run_crawl, select_sources, ArticleOutcome, SourceRunner};
pub use discovery::{extract_links, finalize_links, DiscoveryLimits, LinkDiscoverer};
pub use driver::{control_target, selector_matches, ControlTarget, PageDriver, StaticDriver};
pub use fetcher::{build_http_client, retry, user_agent_string, RetryPolicy, RetryingFetcher};
