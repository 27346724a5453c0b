//! WebDriver-backed listing driver
//!
//! Renders listing pages in a real browser so script-generated listings and
//! click-driven pagination work. The session is owned by the driver and must
//! be released with [`PageDriver::close`]; the source runner does that on
//! every exit path.

use crate::config::{BrowserConfig, PaginationMode};
use crate::crawler::driver::PageDriver;
use crate::crawler::fetcher::{retry, RetryPolicy};
use crate::extract::SelectorChain;
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Interval between checks while waiting for an element or a navigation
const NAVIGATION_POLL: Duration = Duration::from_millis(250);

/// Browser session used as a [`PageDriver`]
pub struct BrowserDriver {
    client: Option<Client>,
    policy: RetryPolicy,
}

impl BrowserDriver {
    /// Connects to a running WebDriver service
    ///
    /// # Arguments
    ///
    /// * `config` - WebDriver endpoint and headless flag
    /// * `user_agent` - User agent string passed to the browser
    /// * `policy` - Retry policy applied to page loads
    pub async fn connect(
        config: &BrowserConfig,
        user_agent: &str,
        policy: RetryPolicy,
    ) -> FetchResult<Self> {
        let mut args = vec![
            json!(format!("--user-agent={}", user_agent)),
            json!("--disable-gpu"),
        ];
        if config.headless {
            args.push(json!("--headless"));
        }

        let mut caps = Map::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        if config.headless {
            caps.insert(
                "moz:firefoxOptions".to_string(),
                json!({ "args": ["-headless"] }),
            );
        }

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&config.webdriver_url)
            .await
            .map_err(|e| FetchError::Browser {
                url: config.webdriver_url.clone(),
                message: e.to_string(),
            })?;

        tracing::info!(webdriver = %config.webdriver_url, headless = config.headless, "Browser session started");

        Ok(Self {
            client: Some(client),
            policy,
        })
    }

    fn client(&self) -> FetchResult<&Client> {
        self.client.as_ref().ok_or_else(|| FetchError::Browser {
            url: String::new(),
            message: "browser session already closed".to_string(),
        })
    }

    async fn location(&self) -> FetchResult<String> {
        let client = self.client()?;
        client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(|e| browser_error("current page", e))
    }

    async fn ready_state(&self) -> FetchResult<String> {
        let client = self.client()?;
        let state = client
            .execute("return document.readyState;", vec![])
            .await
            .map_err(|e| browser_error("current page", e))?;
        Ok(match state {
            Value::String(state) => state,
            other => other.to_string(),
        })
    }

    /// Polls until the location differs from `previous` and the document has
    /// finished loading
    async fn wait_for_navigation(&self, previous: &str) -> FetchResult<()> {
        let deadline = tokio::time::Instant::now() + self.policy.timeout;
        loop {
            let location = self.location().await?;
            if location != previous && self.ready_state().await? == "complete" {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(FetchError::Timeout {
                    url: previous.to_string(),
                    after: self.policy.timeout,
                });
            }
            tokio::time::sleep(NAVIGATION_POLL).await;
        }
    }
}

#[async_trait]
impl PageDriver for BrowserDriver {
    async fn open(&mut self, url: &str) -> FetchResult<()> {
        let client = self.client()?.clone();
        retry(&self.policy, url, |_| {
            let client = client.clone();
            async move {
                // Reset first so nothing from the previous document survives.
                client
                    .goto("about:blank")
                    .await
                    .map_err(|e| browser_error(url, e))?;
                client.goto(url).await.map_err(|e| browser_error(url, e))
            }
        })
        .await
    }

    /// Polls every alternative of the list until one matches or `timeout`
    /// runs out
    async fn wait_for(&mut self, selectors: &str, timeout: Duration) -> FetchResult<bool> {
        let alternatives = css_alternatives(selectors);
        if alternatives.is_empty() {
            return Ok(false);
        }

        let client = self.client()?;
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            for alternative in &alternatives {
                let found = client
                    .find_all(Locator::Css(alternative))
                    .await
                    .map_err(|e| browser_error(alternative, e))?;
                if !found.is_empty() {
                    return Ok(true);
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(NAVIGATION_POLL).await;
        }
    }

    async fn html(&mut self) -> FetchResult<String> {
        let client = self.client()?;
        client
            .source()
            .await
            .map_err(|e| browser_error("current page", e))
    }

    async fn current_url(&mut self) -> FetchResult<String> {
        self.location().await
    }

    async fn activate(&mut self, selectors: &str, mode: PaginationMode) -> FetchResult<bool> {
        let previous = self.location().await?;
        let client = self.client()?;

        let mut control = None;
        for alternative in css_alternatives(selectors) {
            let found = client
                .find_all(Locator::Css(&alternative))
                .await
                .map_err(|e| browser_error(&previous, e))?;
            if let Some(element) = found.into_iter().next() {
                control = Some(element);
                break;
            }
        }
        let Some(control) = control else {
            return Ok(false);
        };

        control
            .click()
            .await
            .map_err(|e| browser_error(&previous, e))?;

        if mode == PaginationMode::Navigate {
            self.wait_for_navigation(&previous).await?;
        }
        Ok(true)
    }

    async fn close(&mut self) -> FetchResult<()> {
        match self.client.take() {
            Some(client) => {
                client
                    .close()
                    .await
                    .map_err(|e| browser_error("session", e))?;
                tracing::info!("Browser session closed");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

fn browser_error(url: &str, error: CmdError) -> FetchError {
    FetchError::Browser {
        url: url.to_string(),
        message: error.to_string(),
    }
}

/// Alternatives of a selector list that parse as CSS
///
/// The browser rejects a whole list when one member is invalid, so each
/// alternative is sent on its own and unparseable ones never reach it.
fn css_alternatives(selectors: &str) -> Vec<String> {
    SelectorChain::parse(selectors)
        .sources()
        .map(str::to_string)
        .collect()
}
