//! Crawl coordinator - source-by-source orchestration
//!
//! This module drives one crawl run:
//! - Opening the store and recording the run
//! - Choosing the listing driver (static HTTP or browser session)
//! - Discovering article links per source
//! - Fetching, extracting and converting each article in turn
//! - Handing results to the store and keeping run counters
//!
//! Sources are processed one at a time and so are the articles within a
//! source, with a fixed pause after every article fetch. Failures are
//! contained to the article or source they happen in.

use crate::blocks::{BlockLimits, Converter};
use crate::config::{Config, SourceRule};
use crate::crawler::browser::BrowserDriver;
use crate::crawler::discovery::{DiscoveryLimits, LinkDiscoverer};
use crate::crawler::driver::{PageDriver, StaticDriver};
use crate::crawler::fetcher::{user_agent_string, RetryingFetcher};
use crate::extract::FieldExtractor;
use crate::output::{RunStats, SourceStats};
use crate::storage::{ArticleStore, RunStatus, SqliteStore};
use crate::{ConfigError, GamewireError};
use std::path::Path;
use url::Url;

/// What happened to one article
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleOutcome {
    /// Stored for the first time
    Saved,
    /// Entry id was already stored
    Duplicate,
    /// Fetch or storage failed; the article was skipped
    Errored,
}

/// Runs sources through discovery, extraction, conversion and storage
pub struct SourceRunner<'a> {
    config: &'a Config,
    fetcher: RetryingFetcher,
    store: &'a mut dyn ArticleStore,
    run_id: i64,
}

impl<'a> SourceRunner<'a> {
    /// Creates a runner that records articles under `run_id`
    pub fn new(
        config: &'a Config,
        fetcher: RetryingFetcher,
        store: &'a mut dyn ArticleStore,
        run_id: i64,
    ) -> Self {
        Self {
            config,
            fetcher,
            store,
            run_id,
        }
    }

    /// Processes every source in order
    ///
    /// Never fails: each source's problems are logged and counted.
    pub async fn run(&mut self, driver: &mut dyn PageDriver, sources: &[SourceRule]) -> RunStats {
        let mut stats = RunStats::default();
        for rule in sources {
            let source_stats = self.run_source(driver, rule).await;
            tracing::info!(
                source = %rule.name,
                links = source_stats.links_discovered,
                saved = source_stats.saved,
                duplicates = source_stats.duplicates,
                errored = source_stats.errored,
                "Source finished"
            );
            stats.record(source_stats);
        }
        stats
    }

    /// Discovers and processes the articles of one source
    pub async fn run_source(&mut self, driver: &mut dyn PageDriver, rule: &SourceRule) -> SourceStats {
        let mut stats = SourceStats::new(&rule.name);

        let discoverer = LinkDiscoverer::new(rule, DiscoveryLimits::from_config(&self.config.crawler));
        let links = discoverer.discover(driver).await;
        stats.links_discovered = links.len() as u64;

        let extractor = FieldExtractor::new(rule);
        let converter = self.converter_for(rule);
        let delay = self.config.crawler.article_delay();

        for link in &links {
            stats.processed += 1;
            match self.process_article(&extractor, &converter, link).await {
                ArticleOutcome::Saved => stats.saved += 1,
                ArticleOutcome::Duplicate => stats.duplicates += 1,
                ArticleOutcome::Errored => stats.errored += 1,
            }
            tokio::time::sleep(delay).await;
        }

        stats
    }

    /// Fetches, extracts, converts and stores one article
    pub async fn process_article(
        &mut self,
        extractor: &FieldExtractor,
        converter: &Converter,
        url: &str,
    ) -> ArticleOutcome {
        let source = extractor.rule().name.as_str();

        let Some(article) = extractor.fetch_and_extract(&self.fetcher, url).await else {
            return ArticleOutcome::Errored;
        };

        let blocks = converter.convert(&article.content);
        tracing::debug!(
            %source,
            entry_id = %article.entry_id,
            blocks = blocks.len(),
            "Extracted article"
        );

        match self.store.save_article(self.run_id, source, &article, &blocks) {
            Ok(true) => {
                tracing::info!(%source, entry_id = %article.entry_id, title = %article.title, "Saved article");
                ArticleOutcome::Saved
            }
            Ok(false) => {
                tracing::debug!(%source, entry_id = %article.entry_id, "Article already stored");
                ArticleOutcome::Duplicate
            }
            Err(e) => {
                tracing::warn!(%source, %url, error = %e, "Failed to store article");
                ArticleOutcome::Errored
            }
        }
    }

    fn converter_for(&self, rule: &SourceRule) -> Converter {
        let converter = Converter::new(BlockLimits::from(self.config.limits));
        match Url::parse(&rule.base_url) {
            Ok(base) => converter.with_base_url(base),
            Err(_) => converter,
        }
    }
}

/// Picks the sources to crawl
///
/// An empty `names` list selects every configured source. Unknown names are a
/// configuration error.
pub fn select_sources(config: &Config, names: &[String]) -> Result<Vec<SourceRule>, ConfigError> {
    if names.is_empty() {
        return Ok(config.sources.clone());
    }

    for name in names {
        if !config.sources.iter().any(|s| &s.name == name) {
            return Err(ConfigError::Validation(format!("unknown source '{}'", name)));
        }
    }

    Ok(config
        .sources
        .iter()
        .filter(|s| names.contains(&s.name))
        .cloned()
        .collect())
}

/// Runs a complete crawl
///
/// This is the main entry point for a crawl run. It will:
/// 1. Select the sources to process
/// 2. Open the article store and record a new run
/// 3. Build the HTTP client and the listing driver
/// 4. Process every source
/// 5. Release the driver and mark the run completed
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `config_hash` - Hash of the configuration file, stored with the run
/// * `source_names` - Sources to crawl; empty means all
///
/// # Returns
///
/// * `Ok(RunStats)` - Counters of the finished run
/// * `Err(GamewireError)` - The run could not be set up or recorded
///
/// # Example
///
/// ```no_run
/// use gamewire::config::load_config_with_hash;
/// use gamewire::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("gamewire.toml"))?;
/// let stats = run_crawl(&config, &hash, &[]).await?;
/// println!("saved {} articles", stats.saved());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    config_hash: &str,
    source_names: &[String],
) -> Result<RunStats, GamewireError> {
    let sources = select_sources(config, source_names)?;

    let mut store = SqliteStore::new(Path::new(&config.output.database_path))?;
    let run_id = store.create_run(config_hash)?;
    tracing::info!("Starting crawl run {} over {} sources", run_id, sources.len());

    let fetcher = match RetryingFetcher::from_config(&config.crawler, &config.user_agent) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            store.update_run_status(run_id, RunStatus::Failed)?;
            return Err(e.into());
        }
    };

    let mut driver: Box<dyn PageDriver> = match &config.browser {
        Some(browser) => {
            let user_agent = user_agent_string(&config.user_agent);
            match BrowserDriver::connect(browser, &user_agent, *fetcher.policy()).await {
                Ok(driver) => Box::new(driver),
                Err(e) => {
                    store.update_run_status(run_id, RunStatus::Failed)?;
                    return Err(e.into());
                }
            }
        }
        None => Box::new(StaticDriver::new(fetcher.clone())),
    };

    let stats = {
        let mut runner = SourceRunner::new(config, fetcher, &mut store, run_id);
        runner.run(driver.as_mut(), &sources).await
    };

    if let Err(e) = driver.close().await {
        tracing::warn!(error = %e, "Failed to release listing driver");
    }

    store.complete_run(run_id, &stats)?;
    tracing::info!(
        "Crawl run {} complete: {} saved, {} already stored, {} errors",
        run_id,
        stats.saved(),
        stats.duplicates(),
        stats.errored()
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::crawler::fetcher::{build_http_client, RetryPolicy};
    use crate::state::SyncState;
    use crate::ContentBlock;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(base_url: &str) -> Config {
        let toml = format!(
            r#"
[crawler]
max-attempts = 1
retry-delay-ms = 1
article-delay-ms = 0
link-wait-ms = 1

[user-agent]
name = "TestCrawler"
version = "1.0"
contact-url = "https://example.com/about"

[output]
database-path = ":memory:"

[[source]]
name = "Mock News"
base-url = "{base}"
listing-path = "/news"
article-links = "h2 a"
title = "h1"
author = ".author"
content = ".body"
date = "time"
entry-id = "article"

[[source]]
name = "Other"
base-url = "https://other.example"
article-links = "a"
title = "h1"
content = ".body"
"#,
            base = base_url
        );
        parse_config(&toml).unwrap()
    }

    fn fetcher() -> RetryingFetcher {
        let policy = RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::from_millis(1),
            timeout: Duration::from_secs(5),
        };
        let user_agent = crate::config::UserAgentConfig {
            name: "TestCrawler".to_string(),
            version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
        };
        RetryingFetcher::new(build_http_client(&user_agent, policy.timeout).unwrap(), policy)
    }

    fn article_page(post_id: u32, title: &str) -> String {
        format!(
            r#"<html><body><article class="post post-{id}">
                <h1>{title}</h1>
                <span class="author">Sam</span>
                <time datetime="2024-05-01T10:00:00Z">1 May</time>
                <div class="body"><p>Intro <b>bold</b></p><img src="/img/{id}.png"></div>
            </article></body></html>"#,
            id = post_id,
            title = title
        )
    }

    async fn mount_page(server: &MockServer, route: &str, status: u16, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    #[test]
    fn test_select_sources() {
        let config = config_for("https://mock.example");
        assert_eq!(select_sources(&config, &[]).unwrap().len(), 2);

        let selected = select_sources(&config, &["Other".to_string()]).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "Other");

        assert!(matches!(
            select_sources(&config, &["Missing".to_string()]),
            Err(ConfigError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_run_source_saves_skips_and_counts() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            "/news",
            200,
            r#"<h2><a href="/news/one">One</a></h2>
               <h2><a href="/news/two">Two</a></h2>
               <h2><a href="/news/again">Again</a></h2>
               <h2><a href="/news/broken">Broken</a></h2>"#
                .to_string(),
        )
        .await;
        mount_page(&server, "/news/one", 200, article_page(1, "One")).await;
        mount_page(&server, "/news/two", 200, article_page(2, "Two")).await;
        mount_page(&server, "/news/again", 200, article_page(1, "One again")).await;
        mount_page(&server, "/news/broken", 500, String::new()).await;

        let config = config_for(&server.uri());
        let rule = config.sources[0].clone();
        let mut store = SqliteStore::new_in_memory().unwrap();
        let run_id = store.create_run("hash").unwrap();
        let mut driver = StaticDriver::new(fetcher());

        let stats = {
            let mut runner = SourceRunner::new(&config, fetcher(), &mut store, run_id);
            runner.run_source(&mut driver, &rule).await
        };

        assert_eq!(stats.links_discovered, 4);
        assert_eq!(stats.processed, 4);
        assert_eq!(stats.saved, 2);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.errored, 1);

        let stored = store.get_article("1").unwrap().unwrap();
        assert_eq!(stored.title, "One");
        assert_eq!(stored.author, "Sam");
        assert_eq!(stored.source, "Mock News");
        assert_eq!(stored.sync_state, SyncState::Pending);
        assert_eq!(stored.blocks.len(), 2);
        assert_eq!(
            stored.blocks[1],
            ContentBlock::Image {
                url: format!("{}/img/1.png", server.uri())
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_listing_yields_empty_source() {
        let server = MockServer::start().await;
        mount_page(&server, "/news", 503, String::new()).await;

        let config = config_for(&server.uri());
        let rule = config.sources[0].clone();
        let mut store = SqliteStore::new_in_memory().unwrap();
        let run_id = store.create_run("hash").unwrap();
        let mut driver = StaticDriver::new(fetcher());

        let mut runner = SourceRunner::new(&config, fetcher(), &mut store, run_id);
        let stats = runner.run_source(&mut driver, &rule).await;

        assert_eq!(stats, SourceStats::new("Mock News"));
    }
}
