mod common;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{documents, init_test_logger, write_documents};
use toydesk::clock::ManualClock;
use toydesk::config::ContextConfig;
use toydesk::context::{
    build_loader, CacheState, ContextCache, ContextLoader, ContextLookup, ContextState,
    FileContextLoader, HttpContextLoader,
};

fn cache(clock: &ManualClock) -> ContextCache {
    ContextCache::new(
        Duration::seconds(300),
        StdDuration::from_secs(2),
        Arc::new(clock.clone()),
    )
}

async fn mount_documents(server: &MockServer, status: u16) {
    for (name, text) in documents().named() {
        Mock::given(method("GET"))
            .and(path(format!("/docs/{name}.txt")))
            .respond_with(ResponseTemplate::new(status).set_body_string(text))
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_file_loader_reads_all_documents() {
    let dir = TempDir::new().unwrap();
    write_documents(dir.path(), &documents());

    let loaded = FileContextLoader::new(dir.path())
        .load()
        .await
        .unwrap()
        .expect("documents should be present");
    assert_eq!(loaded, documents());
}

#[tokio::test]
async fn test_file_loader_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    write_documents(dir.path(), &documents());
    std::fs::remove_file(dir.path().join("privacy.txt")).unwrap();

    let result = FileContextLoader::new(dir.path()).load().await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_file_loader_blank_documents_are_absent() {
    let dir = TempDir::new().unwrap();
    write_documents(dir.path(), &Default::default());

    let result = FileContextLoader::new(dir.path()).load().await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_cache_serves_stale_documents_when_source_disappears() {
    init_test_logger();
    let dir = TempDir::new().unwrap();
    write_documents(dir.path(), &documents());
    let loader = FileContextLoader::new(dir.path());
    let clock = ManualClock::default();
    let cache = cache(&clock);

    let first = cache.get_or_load(&loader).await;
    assert_eq!(first.state(), ContextState::Fresh);

    std::fs::remove_file(dir.path().join("product.txt")).unwrap();

    // Still valid: the missing file is not noticed.
    clock.advance(Duration::seconds(299));
    assert_eq!(cache.get_or_load(&loader).await, first);

    clock.advance(Duration::seconds(1));
    let stale = cache.get_or_load(&loader).await;
    assert_eq!(stale.state(), ContextState::Stale);
    assert_eq!(stale.documents(), first.documents());
    assert_eq!(cache.status().status, CacheState::Expired);
}

#[tokio::test]
async fn test_cache_recovers_once_source_returns() {
    let dir = TempDir::new().unwrap();
    let loader = FileContextLoader::new(dir.path());
    let clock = ManualClock::default();
    let cache = cache(&clock);

    assert_eq!(cache.get_or_load(&loader).await, ContextLookup::Unavailable);
    assert_eq!(cache.status().status, CacheState::Empty);

    write_documents(dir.path(), &documents());
    let lookup = cache.get_or_load(&loader).await;
    assert_eq!(lookup.state(), ContextState::Fresh);
    assert_eq!(cache.status().status, CacheState::Valid);
    assert_eq!(cache.status().time_to_expiry_ms, 300_000);
}

#[tokio::test]
async fn test_http_loader_fetches_documents() {
    let server = MockServer::start().await;
    mount_documents(&server, 200).await;

    let loader =
        HttpContextLoader::new(&format!("{}/docs", server.uri()), StdDuration::from_secs(2))
            .unwrap();
    let loaded = loader.load().await.unwrap().expect("documents should be present");

    assert_eq!(loaded, documents());
}

#[tokio::test]
async fn test_http_loader_non_success_status_is_an_error() {
    let server = MockServer::start().await;
    mount_documents(&server, 503).await;

    let loader =
        HttpContextLoader::new(&format!("{}/docs/", server.uri()), StdDuration::from_secs(2))
            .unwrap();
    assert!(loader.load().await.is_err());

    let clock = ManualClock::default();
    assert_eq!(
        cache(&clock).get_or_load(&loader).await,
        ContextLookup::Unavailable
    );
}

#[tokio::test]
async fn test_slow_http_source_times_out_to_stale() {
    let server = MockServer::start().await;
    mount_documents(&server, 200).await;
    let loader =
        HttpContextLoader::new(&format!("{}/docs", server.uri()), StdDuration::from_secs(30))
            .unwrap();

    let clock = ManualClock::default();
    let cache = ContextCache::new(
        Duration::seconds(300),
        StdDuration::from_millis(500),
        Arc::new(clock.clone()),
    );
    assert_eq!(cache.get_or_load(&loader).await.state(), ContextState::Fresh);

    server.reset().await;
    for (name, text) in documents().named() {
        Mock::given(method("GET"))
            .and(path(format!("/docs/{name}.txt")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(text)
                    .set_delay(StdDuration::from_secs(5)),
            )
            .mount(&server)
            .await;
    }

    clock.advance(Duration::seconds(301));
    assert_eq!(cache.get_or_load(&loader).await.state(), ContextState::Stale);
}

#[test]
fn test_build_loader_picks_source_from_config() {
    let file = build_loader(&ContextConfig::default()).unwrap();
    assert!(file.describe().starts_with("file:"));

    let http = build_loader(&ContextConfig {
        base_url: Some("https://cdn.example.com/context".to_string()),
        ..ContextConfig::default()
    })
    .unwrap();
    assert_eq!(http.describe(), "https://cdn.example.com/context/");
}
