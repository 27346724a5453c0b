use crate::config::types::{Config, CrawlerConfig, LimitsConfig, SourceRule, UserAgentConfig};
use crate::extract::SelectorChain;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_limits(&config.limits)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    if let Some(browser) = &config.browser {
        Url::parse(&browser.webdriver_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid webdriver-url: {}", e)))?;
    }
    validate_sources(&config.sources)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(
            "max-attempts must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-ms must be >= 100ms, got {}ms",
            config.request_timeout_ms
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1".to_string(),
        ));
    }

    if config.max_articles < 1 {
        return Err(ConfigError::Validation(
            "max-articles must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_limits(limits: &LimitsConfig) -> Result<(), ConfigError> {
    if limits.max_rich_text_length < 1 {
        return Err(ConfigError::Validation(
            "max-rich-text-length must be >= 1".to_string(),
        ));
    }
    if limits.max_blocks < 1 {
        return Err(ConfigError::Validation(
            "max-blocks must be >= 1".to_string(),
        ));
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent name cannot be empty".to_string(),
        ));
    }

    if !config
        .name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "user-agent name must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            config.name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates the source rule set
fn validate_sources(sources: &[SourceRule]) -> Result<(), ConfigError> {
    if sources.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[source]] must be configured".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for source in sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name cannot be empty".to_string(),
            ));
        }
        if !names.insert(source.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name '{}'",
                source.name
            )));
        }

        let base = Url::parse(&source.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "Invalid base-url '{}' for source '{}': {}",
                source.base_url, source.name, e
            ))
        })?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "base-url of source '{}' must use http or https",
                source.name
            )));
        }

        validate_selector(&source.name, "article-links", &source.article_links, true)?;
        validate_selector(&source.name, "title", &source.title, true)?;
        validate_selector(&source.name, "content", &source.content, true)?;
        validate_selector(&source.name, "author", &source.author, false)?;
        validate_selector(&source.name, "date", &source.date, false)?;
        validate_selector(&source.name, "entry-id", &source.entry_id, false)?;
        if let Some(summary) = &source.summary {
            validate_selector(&source.name, "summary", summary, false)?;
        }
        if let Some(pagination) = &source.pagination {
            validate_selector(&source.name, "pagination", pagination, true)?;
        }
    }

    Ok(())
}

/// A selector list must be present when required, and when present at least
/// one of its alternatives must parse
fn validate_selector(
    source: &str,
    field: &str,
    selectors: &str,
    required: bool,
) -> Result<(), ConfigError> {
    if selectors.trim().is_empty() {
        if required {
            return Err(ConfigError::Validation(format!(
                "source '{}' is missing the '{}' selector",
                source, field
            )));
        }
        return Ok(());
    }

    if SelectorChain::parse(selectors).is_empty() {
        return Err(ConfigError::Validation(format!(
            "source '{}' has no valid selector in '{}': {}",
            source, field, selectors
        )));
    }

    Ok(())
}
