use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Gamewire
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub browser: Option<BrowserConfig>,
    pub output: OutputConfig,
    #[serde(default, rename = "source")]
    pub sources: Vec<SourceRule>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Attempts per fetch before giving up
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Timeout applied to each individual attempt (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Base retry delay; attempt `n` waits `n * retry_delay_ms`
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,

    /// Pause after every article fetch (milliseconds)
    #[serde(rename = "article-delay-ms")]
    pub article_delay_ms: u64,

    /// Maximum listing pages visited per source
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Maximum article links kept per source
    #[serde(rename = "max-articles")]
    pub max_articles: usize,

    /// How long to wait for the link selector to show up (milliseconds)
    #[serde(rename = "link-wait-ms")]
    pub link_wait_ms: u64,

    /// Settle time after an in-place pagination click (milliseconds)
    #[serde(rename = "settle-delay-ms")]
    pub settle_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            request_timeout_ms: 30_000,
            retry_delay_ms: 2_000,
            article_delay_ms: 1_000,
            max_pages: 5,
            max_articles: 50,
            link_wait_ms: 10_000,
            settle_delay_ms: 1_500,
        }
    }
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn article_delay(&self) -> Duration {
        Duration::from_millis(self.article_delay_ms)
    }

    pub fn link_wait(&self) -> Duration {
        Duration::from_millis(self.link_wait_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Output size ceilings imposed by the destination document format
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum characters in one paragraph block
    #[serde(rename = "max-rich-text-length")]
    pub max_rich_text_length: usize,

    /// Maximum blocks per article
    #[serde(rename = "max-blocks")]
    pub max_blocks: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_rich_text_length: 2000,
            max_blocks: 100,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub name: String,

    /// Version of the crawler
    pub version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

/// WebDriver endpoint used to render listing pages
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    #[serde(rename = "webdriver-url")]
    pub webdriver_url: String,

    #[serde(default = "default_headless")]
    pub headless: bool,
}

fn default_headless() -> bool {
    true
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// How a listing page reacts to its pagination control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaginationMode {
    /// Content is replaced in place without a page load
    SamePage,
    /// The control loads a new page
    #[default]
    Navigate,
}

/// Declarative extraction rules for one news site
///
/// Every selector field is a comma-separated list of alternatives, tried in
/// order until one produces output.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceRule {
    pub name: String,

    #[serde(rename = "base-url")]
    pub base_url: String,

    #[serde(rename = "listing-path", default)]
    pub listing_path: String,

    #[serde(rename = "article-links")]
    pub article_links: String,

    pub title: String,

    #[serde(default)]
    pub author: String,

    pub content: String,

    #[serde(default)]
    pub date: String,

    #[serde(rename = "entry-id", default)]
    pub entry_id: String,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub pagination: Option<String>,

    #[serde(rename = "pagination-mode", default)]
    pub pagination_mode: PaginationMode,

    #[serde(rename = "date-format", default)]
    pub date_format: Option<String>,
}

impl SourceRule {
    /// Absolute URL of the first listing page
    pub fn listing_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.listing_path.trim();
        if path.is_empty() {
            return format!("{}/", base);
        }
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}
