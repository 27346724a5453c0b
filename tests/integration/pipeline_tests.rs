//! Integration tests for the ingestion pipeline
//!
//! These tests use wiremock to stand in for a news site and run whole crawls
//! into an on-disk SQLite database.

use gamewire::config::{parse_config, Config};
use gamewire::crawler::run_crawl;
use gamewire::storage::{ArticleStore, RunStatus, SqliteStore};
use gamewire::{ContentBlock, GamewireError, SyncState};
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a config for one mock source that paginates through `a.next`
fn create_test_config(base_url: &str, db_path: &Path, max_attempts: u32) -> Config {
    let toml = format!(
        r#"
[crawler]
max-attempts = {attempts}
retry-delay-ms = 1
article-delay-ms = 0
link-wait-ms = 1
max-pages = 5

[user-agent]
name = "TestCrawler"
version = "1.0"
contact-url = "https://example.com/about"

[output]
database-path = '{db}'

[[source]]
name = "Mock News"
base-url = "{base}"
listing-path = "/news"
article-links = ".teaser h2 a, .teaser a"
title = "h1"
author = ".author"
content = ".body"
date = "time"
entry-id = "article"
pagination = "a.next"
"#,
        attempts = max_attempts,
        db = db_path.display(),
        base = base_url
    );
    parse_config(&toml).expect("Failed to parse test config")
}

fn article_page(post_id: u32, title: &str) -> String {
    format!(
        r#"<html><body><article class="post post-{id}">
            <h1>{title}</h1>
            <span class="author">Robin</span>
            <time datetime="2024-03-0{id}T09:30:00Z">March</time>
            <div class="body">
                <p>Hello <b>world</b></p>
                <p>Second <a href="/related">paragraph</a></p>
                <img src="/img/{id}.jpg">
            </div>
        </article></body></html>"#,
        id = post_id,
        title = title
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Two listing pages linked by `a.next`, three articles in total
async fn mount_site(server: &MockServer) {
    mount_page(
        server,
        "/news",
        r#"<html><body>
            <div class="teaser"><h2><a href="/news/one">One</a></h2></div>
            <div class="teaser"><h2><a href="/news/two">Two</a></h2></div>
            <a class="next" href="/news/page/2">Next</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_page(
        server,
        "/news/page/2",
        r#"<html><body>
            <div class="teaser"><h2><a href="/news/two">Two</a></h2></div>
            <div class="teaser"><h2><a href="/news/three">Three</a></h2></div>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_page(server, "/news/one", article_page(1, "First story")).await;
    mount_page(server, "/news/two", article_page(2, "Second story")).await;
    mount_page(server, "/news/three", article_page(3, "Third story")).await;
}

#[tokio::test]
async fn test_full_crawl_with_pagination() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("articles.db");
    let config = create_test_config(&server.uri(), &db_path, 1);

    let stats = run_crawl(&config, "hash-1", &[]).await.expect("Crawl failed");

    assert_eq!(stats.sources.len(), 1);
    assert_eq!(stats.links_discovered(), 3);
    assert_eq!(stats.saved(), 3);
    assert_eq!(stats.duplicates(), 0);
    assert_eq!(stats.errored(), 0);

    let store = SqliteStore::new(&db_path).expect("Failed to open store");
    assert_eq!(store.count_total_articles().unwrap(), 3);
    assert_eq!(store.count_by_state(SyncState::Pending).unwrap(), 3);

    let first = store.get_article("1").unwrap().expect("Article 1 missing");
    assert_eq!(first.title, "First story");
    assert_eq!(first.author, "Robin");
    assert_eq!(first.source, "Mock News");
    assert_eq!(first.link, format!("{}/news/one", server.uri()));
    assert_eq!(first.published_at.to_rfc3339(), "2024-03-01T09:30:00+00:00");

    assert_eq!(first.blocks.len(), 3);
    assert_eq!(first.blocks[0].plain_text(), "Hello world");
    match &first.blocks[0] {
        ContentBlock::Paragraph { spans } => {
            assert_eq!(spans.len(), 2);
            assert!(spans[1].annotations.bold);
        }
        other => panic!("Expected paragraph, got {:?}", other),
    }
    match &first.blocks[1] {
        ContentBlock::Paragraph { spans } => {
            let link = spans.iter().find_map(|s| s.link.clone());
            assert_eq!(link, Some(format!("{}/related", server.uri())));
        }
        other => panic!("Expected paragraph, got {:?}", other),
    }
    assert_eq!(
        first.blocks[2],
        ContentBlock::Image {
            url: format!("{}/img/1.jpg", server.uri())
        }
    );

    let runs = store.recent_runs(5).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Completed);
    assert_eq!(runs[0].config_hash, "hash-1");
    assert_eq!(runs[0].articles_saved, 3);
    assert!(runs[0].finished_at.is_some());
}

#[tokio::test]
async fn test_second_run_stores_nothing_new() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("articles.db");
    let config = create_test_config(&server.uri(), &db_path, 1);

    let first = run_crawl(&config, "hash", &[]).await.expect("First crawl failed");
    assert_eq!(first.saved(), 3);

    let second = run_crawl(&config, "hash", &[]).await.expect("Second crawl failed");
    assert_eq!(second.saved(), 0);
    assert_eq!(second.duplicates(), 3);

    let store = SqliteStore::new(&db_path).unwrap();
    assert_eq!(store.count_total_articles().unwrap(), 3);
    assert_eq!(store.recent_runs(10).unwrap().len(), 2);

    let article = store.get_article("2").unwrap().unwrap();
    assert_eq!(article.discovered_run, 1);
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/news",
        r#"<div class="teaser"><h2><a href="/news/flaky">Flaky</a></h2></div>"#.to_string(),
    )
    .await;

    // First two requests fail, the third succeeds
    Mock::given(method("GET"))
        .and(path("/news/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_page(&server, "/news/flaky", article_page(7, "Eventually")).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("articles.db");
    let config = create_test_config(&server.uri(), &db_path, 3);

    let stats = run_crawl(&config, "hash", &[]).await.expect("Crawl failed");
    assert_eq!(stats.saved(), 1);
    assert_eq!(stats.errored(), 0);

    let store = SqliteStore::new(&db_path).unwrap();
    assert_eq!(store.get_article("7").unwrap().unwrap().title, "Eventually");
}

#[tokio::test]
async fn test_failed_article_does_not_stop_source() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/news",
        r#"<div class="teaser"><h2><a href="/news/gone">Gone</a></h2></div>
           <div class="teaser"><h2><a href="/news/one">One</a></h2></div>"#
            .to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/news/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(&server, "/news/one", article_page(1, "Survivor")).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("articles.db");
    let config = create_test_config(&server.uri(), &db_path, 2);

    let stats = run_crawl(&config, "hash", &[]).await.expect("Crawl failed");
    assert_eq!(stats.processed(), 2);
    assert_eq!(stats.saved(), 1);
    assert_eq!(stats.errored(), 1);

    let store = SqliteStore::new(&db_path).unwrap();
    let runs = store.recent_runs(1).unwrap();
    assert_eq!(runs[0].status, RunStatus::Completed);
    assert_eq!(runs[0].articles_errored, 1);
}

#[tokio::test]
async fn test_unknown_source_is_rejected() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("articles.db");
    let config = create_test_config("https://news.example", &db_path, 1);

    let result = run_crawl(&config, "hash", &["Nope".to_string()]).await;
    assert!(matches!(result, Err(GamewireError::Config(_))));
    assert!(!db_path.exists());
}
