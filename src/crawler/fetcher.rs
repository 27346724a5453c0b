//! Retrying page fetcher
//!
//! This module handles every network retrieval of the pipeline:
//! - Building the HTTP client with the configured user agent
//! - Bounded retries with linear backoff (`base_delay * attempt`)
//! - A timeout around each individual attempt
//! - Status classification (any non-2xx response is a failed attempt)
//!
//! The retry loop is generic over the attempt future so the browser backend
//! shares the exact same policy.

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::{FetchError, FetchResult};
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Overall timeout of a single request
///
/// # Example
///
/// ```no_run
/// use gamewire::config::UserAgentConfig;
/// use gamewire::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     name: "gamewire".to_string(),
///     version: "0.1.0".to_string(),
///     contact_url: "https://example.com/bot".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Format: Name/Version (+ContactURL)
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!("{}/{} (+{})", config.name, config.version, config.contact_url)
}

/// Attempt budget, backoff base and per-attempt timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.retry_delay(),
            timeout: config.request_timeout(),
        }
    }

    /// Pause after failed attempt number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Runs `attempt` until it succeeds or the policy's budget is spent
///
/// Each call receives the 1-based attempt number and is cut off after
/// `policy.timeout`. On final failure the last attempt's error is returned
/// wrapped in [`FetchError::Exhausted`].
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, url: &str, mut attempt: F) -> FetchResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = FetchResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut number = 1;

    loop {
        let outcome = match tokio::time::timeout(policy.timeout, attempt(number)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                after: policy.timeout,
            }),
        };

        match outcome {
            Ok(value) => {
                if number > 1 {
                    tracing::debug!(%url, attempt = number, "Fetch succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if number >= max_attempts => {
                return Err(FetchError::Exhausted {
                    url: url.to_string(),
                    attempts: number,
                    last: Box::new(e),
                });
            }
            Err(e) => {
                let delay = policy.delay_for(number);
                tracing::warn!(
                    %url,
                    attempt = number,
                    max_attempts,
                    error = %e,
                    "Fetch failed, retrying in {:?}",
                    delay
                );
                tokio::time::sleep(delay).await;
                number += 1;
            }
        }
    }
}

/// Static HTML fetcher with retries
#[derive(Debug, Clone)]
pub struct RetryingFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl RetryingFetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Builds the client and policy from the crawler configuration
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let policy = RetryPolicy::from_config(crawler);
        let client = build_http_client(user_agent, policy.timeout)?;
        Ok(Self::new(client, policy))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches the body of an HTML page
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Page markup from the first successful attempt
    /// * `Err(FetchError::Exhausted)` - Every attempt failed
    pub async fn fetch_html(&self, url: &str) -> FetchResult<String> {
        retry(&self.policy, url, |_| self.get_once(url)).await
    }

    async fn get_once(&self, url: &str) -> FetchResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| classify(url, source, self.policy.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| classify(url, source, self.policy.timeout))
    }
}

fn classify(url: &str, source: reqwest::Error, timeout: Duration) -> FetchError {
    if source.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            after: timeout,
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source,
        }
    }
}
