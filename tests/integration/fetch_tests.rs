//! Fetcher behavior against a mock server

use crate::{create_test_config, html_response};
use prospect_harvest::harvest::{FetchFailure, FetchResult, Fetcher};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(timeout_seconds: u64, max_retries: u32) -> Fetcher {
    let mut config = create_test_config(50.0, timeout_seconds);
    config.fetcher.max_retries = max_retries;
    Fetcher::from_config(&config.fetcher).expect("valid fetcher config")
}

#[tokio::test]
async fn test_fetch_page() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/co1"))
        .respond_with(html_response("<title>Acme</title>".to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/co1", mock_server.uri());
    match fetcher(5, 0).fetch(&url).await {
        FetchResult::Page {
            url: requested,
            final_url,
            status_code,
            body,
        } => {
            assert_eq!(requested, url);
            assert_eq!(final_url, url);
            assert_eq!(status_code, 200);
            assert!(body.contains("Acme"));
        }
        other => panic!("expected page, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_follows_redirects() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", "/new"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html_response("<title>Moved</title>".to_string()))
        .mount(&mock_server)
        .await;

    let url = format!("{}/old", mock_server.uri());
    match fetcher(5, 0).fetch(&url).await {
        FetchResult::Page { final_url, .. } => {
            assert_eq!(final_url, format!("{}/new", mock_server.uri()));
        }
        other => panic!("expected page, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_http_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/missing", mock_server.uri());
    let result = fetcher(5, 3)
        .fetch_with_retry(&url, &CancellationToken::new())
        .await
        .unwrap();

    // 404 is not transient, so no retry happens
    assert_eq!(result.failure(), Some(&FetchFailure::HttpStatus(404)));
}

#[tokio::test]
async fn test_fetch_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            html_response("<title>Slow</title>".to_string()).set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/slow", mock_server.uri());
    let start = Instant::now();
    let result = fetcher(1, 0).fetch(&url).await;

    assert_eq!(result.failure(), Some(&FetchFailure::Timeout));
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_fetch_connection_refused() {
    let result = fetcher(2, 0).fetch("http://127.0.0.1:1/").await;
    assert!(matches!(
        result.failure(),
        Some(FetchFailure::Network(_)) | Some(FetchFailure::Timeout)
    ));
}

#[tokio::test]
async fn test_fetch_sends_configured_user_agent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "OnlyAgent/9.9"))
        .respond_with(html_response("<title>UA</title>".to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(50.0, 5);
    config.fetcher.user_agents = vec!["OnlyAgent/9.9".to_string()];
    let fetcher = Fetcher::from_config(&config.fetcher).unwrap();

    let result = fetcher.fetch(&format!("{}/", mock_server.uri())).await;
    assert!(result.is_page());
}

#[tokio::test]
async fn test_retry_recovers_from_server_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(html_response("<title>Back</title>".to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = format!("{}/flaky", mock_server.uri());
    let result = fetcher(5, 2)
        .fetch_with_retry(&url, &CancellationToken::new())
        .await
        .unwrap();
    assert!(result.is_page(), "{:?}", result);
}

#[tokio::test]
async fn test_retry_gives_up_after_limit() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let url = format!("{}/down", mock_server.uri());
    let result = fetcher(5, 2)
        .fetch_with_retry(&url, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.failure(), Some(&FetchFailure::HttpStatus(500)));
}

#[tokio::test]
async fn test_requests_are_rate_limited() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_response("<title>Rate</title>".to_string()))
        .mount(&mock_server)
        .await;

    let config = create_test_config(10.0, 5);
    let fetcher = Fetcher::from_config(&config.fetcher).unwrap();
    let url = format!("{}/", mock_server.uri());

    let start = Instant::now();
    for _ in 0..4 {
        assert!(fetcher.fetch(&url).await.is_page());
    }

    // Four admissions at 10/s span at least three intervals
    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_cancel_stops_retries() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(50.0, 5);
    config.fetcher.max_retries = 3;
    config.fetcher.retry_backoff_ms = 2_000;
    let fetcher = Fetcher::from_config(&config.fetcher).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let url = format!("{}/flaky", mock_server.uri());
    assert!(fetcher.fetch_with_retry(&url, &cancel).await.is_none());
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_cancelled_token_sends_nothing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_response("<title>Never</title>".to_string()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let url = format!("{}/", mock_server.uri());
    assert!(fetcher(5, 0).fetch_with_retry(&url, &cancel).await.is_none());
}
