//! End-to-end pipeline runs against mock company sites

use crate::{company_page, create_test_config, html_response};
use prospect_harvest::config::{Config, TargetEntry};
use prospect_harvest::harvest::{ChannelSink, Coordinator};
use prospect_harvest::model::{CompanyRecord, IngestOutcome, ProgressSnapshot};
use prospect_harvest::source::StaticSource;
use prospect_harvest::storage::{CompanyStore, MemoryStore, StorageResult};
use prospect_harvest::HarvestError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACME_ADDRESS: &str = "100-0001 Tokyo-to Chiyoda-ku 1-1";

fn no_progress(_: &ProgressSnapshot) {}

fn coordinator(config: Config, store: Arc<dyn CompanyStore>) -> Coordinator {
    Coordinator::new(config, store).expect("valid test config")
}

async fn mount_acme(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/co1"))
        .respond_with(html_response(company_page("Acme Inc", ACME_ADDRESS)))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_acme_scenario() {
    let mock_server = MockServer::start().await;
    mount_acme(&mock_server).await;

    let store = Arc::new(MemoryStore::new());
    let urls = vec![format!("{}/co1", mock_server.uri())];

    let result = coordinator(create_test_config(50.0, 5), store.clone())
        .run(&urls, 2, &no_progress, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    let record = result.outcomes[0].record().expect("accepted");
    assert_eq!(record.company_name, "Acme Inc");
    assert_eq!(record.postal_code, "100-0001");
    assert_eq!(record.region, "Tokyo-to");
    assert_eq!(record.locality, "Chiyoda-ku");
    assert_eq!(record.remainder, "1-1");
    assert_eq!(record.tel, "03-0000-0000");
    assert_eq!(record.contact_url, format!("{}/contact", mock_server.uri()));
    assert_eq!(record.url, urls[0]);

    assert_eq!(store.len(), 1);
    assert_eq!(store.records()[0].company_name, "Acme Inc");
}

#[tokio::test]
async fn test_outcomes_are_index_aligned() {
    let mock_server = MockServer::start().await;
    mount_acme(&mock_server).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/nameless"))
        .respond_with(html_response("<html><body><p>hello</p></body></html>".to_string()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/co2"))
        .respond_with(html_response(company_page("Beta Corp", "大阪府大阪市北区1")))
        .mount(&mock_server)
        .await;

    let base = mock_server.uri();
    let urls = vec![
        format!("{}/gone", base),
        format!("{}/co1", base),
        "not a url".to_string(),
        format!("{}/nameless", base),
        format!("{}/co2", base),
    ];

    let result = coordinator(create_test_config(50.0, 5), Arc::new(MemoryStore::new()))
        .run(&urls, 3, &no_progress, CancellationToken::new())
        .await
        .unwrap();

    let tags: Vec<&str> = result.outcomes.iter().map(IngestOutcome::tag).collect();
    assert_eq!(
        tags,
        vec![
            "fetch-http-status",
            "accepted",
            "validation-failure",
            "validation-failure",
            "accepted"
        ]
    );
    for (outcome, url) in result.outcomes.iter().zip(&urls) {
        assert_eq!(outcome.url(), url);
    }
    assert_eq!(result.outcomes[4].record().unwrap().region, "大阪府");
}

#[tokio::test]
async fn test_timeout_does_not_stop_other_urls() {
    let mock_server = MockServer::start().await;
    mount_acme(&mock_server).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            html_response(company_page("Slow Ltd", ACME_ADDRESS))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/co3"))
        .respond_with(html_response(company_page("Gamma KK", "北海道札幌市中央区1")))
        .mount(&mock_server)
        .await;

    let base = mock_server.uri();
    let urls = vec![
        format!("{}/co1", base),
        format!("{}/slow", base),
        format!("{}/co3", base),
    ];

    let result = coordinator(create_test_config(50.0, 1), Arc::new(MemoryStore::new()))
        .run(&urls, 2, &no_progress, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.outcomes[0].tag(), "accepted");
    assert_eq!(result.outcomes[1].tag(), "fetch-timeout");
    assert_eq!(result.outcomes[2].tag(), "accepted");
}

#[tokio::test]
async fn test_same_url_twice_in_one_run() {
    let mock_server = MockServer::start().await;
    mount_acme(&mock_server).await;

    let url = format!("{}/co1", mock_server.uri());
    let urls = vec![url.clone(), url];

    let store = Arc::new(MemoryStore::new());
    let result = coordinator(create_test_config(50.0, 5), store.clone())
        .run(&urls, 2, &no_progress, CancellationToken::new())
        .await
        .unwrap();

    let accepted = result.outcomes.iter().filter(|o| o.is_accepted()).count();
    let duplicates = result.outcomes.iter().filter(|o| o.is_duplicate()).count();
    assert_eq!(accepted, 1);
    assert_eq!(duplicates, 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_same_url_across_runs() {
    let mock_server = MockServer::start().await;
    mount_acme(&mock_server).await;

    let urls = vec![format!("{}/co1", mock_server.uri())];
    let store = Arc::new(MemoryStore::new());
    let coordinator = coordinator(create_test_config(50.0, 5), store.clone());

    let first = coordinator
        .run(&urls, 1, &no_progress, CancellationToken::new())
        .await
        .unwrap();
    let second = coordinator
        .run(&urls, 1, &no_progress, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(first.outcomes[0].tag(), "accepted");
    assert_eq!(second.outcomes[0].tag(), "duplicate");
}

#[tokio::test]
async fn test_already_stored_urls_are_duplicates() {
    let mock_server = MockServer::start().await;
    mount_acme(&mock_server).await;
    Mock::given(method("GET"))
        .and(path("/co2"))
        .respond_with(html_response(company_page("Beta Corp", ACME_ADDRESS)))
        .mount(&mock_server)
        .await;

    let urls = vec![
        format!("{}/co1", mock_server.uri()),
        format!("{}/co2", mock_server.uri()),
    ];
    let store = Arc::new(MemoryStore::with_existing(urls.clone()));

    let result = coordinator(create_test_config(50.0, 5), store.clone())
        .run(&urls, 2, &no_progress, CancellationToken::new())
        .await
        .unwrap();

    assert!(result.outcomes.iter().all(IngestOutcome::is_duplicate));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_canonical_dedup_when_enabled() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_response(company_page("Acme Inc", ACME_ADDRESS)))
        .mount(&mock_server)
        .await;

    let urls = vec![
        format!("{}/co1", mock_server.uri()),
        format!("{}/co1/?utm_source=newsletter", mock_server.uri()),
    ];

    let mut config = create_test_config(50.0, 5);
    config.pipeline.canonicalize_urls = true;
    let result = coordinator(config, Arc::new(MemoryStore::new()))
        .run(&urls, 2, &no_progress, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.summary().accepted, 1);
    assert_eq!(result.summary().duplicates, 1);

    // Exact-match keys keep them apart
    let result = coordinator(create_test_config(50.0, 5), Arc::new(MemoryStore::new()))
        .run(&urls, 2, &no_progress, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.summary().accepted, 2);
}

#[tokio::test]
async fn test_invalid_config_fails_before_any_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_response(company_page("Acme Inc", ACME_ADDRESS)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(50.0, 5);
    config.fetcher.requests_per_second = 0.0;
    let result = Coordinator::new(config, Arc::new(MemoryStore::new()));
    assert!(matches!(result, Err(HarvestError::Config(_))));

    let mut config = create_test_config(50.0, 5);
    config.fetcher.user_agents.clear();
    let result = Coordinator::new(config, Arc::new(MemoryStore::new()));
    assert!(matches!(result, Err(HarvestError::Config(_))));

    let urls = vec![format!("{}/co1", mock_server.uri())];
    let coordinator = coordinator(create_test_config(50.0, 5), Arc::new(MemoryStore::new()));
    let result = coordinator
        .run(&urls, 0, &no_progress, CancellationToken::new())
        .await;
    assert!(matches!(result, Err(HarvestError::Config(_))));
}

#[tokio::test]
async fn test_progress_is_monotonic_and_complete() {
    let mock_server = MockServer::start().await;
    mount_acme(&mock_server).await;

    let base = mock_server.uri();
    let urls: Vec<String> = (0..5).map(|i| format!("{}/co1?page={}", base, i)).collect();
    let (sink, mut receiver) = ChannelSink::new();

    let result = coordinator(create_test_config(100.0, 5), Arc::new(MemoryStore::new()))
        .run(&urls, 3, &sink, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.len(), 5);

    let mut snapshots = Vec::new();
    while let Ok(snapshot) = receiver.try_recv() {
        snapshots.push(snapshot);
    }

    assert_eq!(snapshots.len(), 5);
    for (i, snapshot) in snapshots.iter().enumerate() {
        assert_eq!(snapshot.processed, i + 1);
        assert_eq!(snapshot.total, 5);
        assert!(urls.contains(snapshot.current_url.as_ref().unwrap()));
    }
    assert!(snapshots.last().unwrap().is_complete());
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            html_response(company_page("Delay Co", ACME_ADDRESS))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&mock_server)
        .await;

    let urls: Vec<String> = (0..4)
        .map(|i| format!("{}/co{}", mock_server.uri(), i))
        .collect();

    let start = Instant::now();
    let result = coordinator(create_test_config(100.0, 5), Arc::new(MemoryStore::new()))
        .run(&urls, 2, &no_progress, CancellationToken::new())
        .await
        .unwrap();

    // Two waves of two 200ms fetches
    assert!(start.elapsed() >= Duration::from_millis(400));
    assert_eq!(result.summary().accepted, 4);
}

#[tokio::test]
async fn test_cancellation_mid_run() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            html_response(company_page("Delay Co", ACME_ADDRESS))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    let urls: Vec<String> = (0..3)
        .map(|i| format!("{}/co{}", mock_server.uri(), i))
        .collect();

    let token = CancellationToken::new();
    let sink_token = token.clone();
    let cancel_on_first = move |_: &ProgressSnapshot| sink_token.cancel();

    let result = coordinator(create_test_config(100.0, 5), Arc::new(MemoryStore::new()))
        .run(&urls, 1, &cancel_on_first, token)
        .await
        .unwrap();

    assert_eq!(result.len(), 3);
    assert_eq!(result.outcomes[0].tag(), "accepted");
    assert_eq!(result.outcomes[2].tag(), "cancelled");
    assert!(result.was_cancelled());
}

/// Store whose insert always panics
struct PanickingStore;

impl CompanyStore for PanickingStore {
    fn exists_by_url(&self, _url: &str) -> StorageResult<bool> {
        Ok(false)
    }

    fn insert(&self, _record: &CompanyRecord) -> StorageResult<bool> {
        panic!("store exploded");
    }
}

#[tokio::test]
async fn test_panicking_task_becomes_errored_outcome() {
    let mock_server = MockServer::start().await;
    mount_acme(&mock_server).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let urls = vec![
        format!("{}/co1", mock_server.uri()),
        format!("{}/gone", mock_server.uri()),
    ];

    let result = coordinator(create_test_config(50.0, 5), Arc::new(PanickingStore))
        .run(&urls, 2, &no_progress, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.outcomes[0].tag(), "task-failed");
    assert_eq!(result.outcomes[0].url(), urls[0]);
    assert_eq!(result.outcomes[1].tag(), "fetch-http-status");
}

#[tokio::test]
async fn test_harvest_from_static_source() {
    let mock_server = MockServer::start().await;
    mount_acme(&mock_server).await;

    let source = StaticSource::new(vec![TargetEntry {
        keyword: "printing".to_string(),
        urls: vec![format!("{}/co1", mock_server.uri())],
    }]);
    let coordinator = coordinator(create_test_config(50.0, 5), Arc::new(MemoryStore::new()));

    let result = coordinator
        .harvest(&source, "Printing", &no_progress, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.summary().accepted, 1);

    let empty = coordinator
        .harvest(&source, "bakery", &no_progress, CancellationToken::new())
        .await
        .unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn test_cancel_reaches_urls_queued_in_rate_limiter() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_response(company_page("Acme Inc", ACME_ADDRESS)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let urls: Vec<String> = (0..4)
        .map(|i| format!("{}/co{}", mock_server.uri(), i))
        .collect();

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    // At 2 requests per second only the first URL is admitted before the cancel
    let start = Instant::now();
    let result = coordinator(create_test_config(2.0, 5), Arc::new(MemoryStore::new()))
        .run(&urls, 4, &no_progress, token)
        .await
        .unwrap();

    let tags: Vec<&str> = result.outcomes.iter().map(IngestOutcome::tag).collect();
    assert_eq!(tags.iter().filter(|tag| **tag == "accepted").count(), 1);
    assert_eq!(tags.iter().filter(|tag| **tag == "cancelled").count(), 3);
    assert!(start.elapsed() < Duration::from_millis(500));
}

#[tokio::test]
async fn test_stored_url_without_name_is_duplicate() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/co1"))
        .respond_with(html_response(
            "<html><body><p>moved</p></body></html>".to_string(),
        ))
        .mount(&mock_server)
        .await;

    let urls = vec![format!("{}/co1", mock_server.uri())];
    let store = Arc::new(MemoryStore::with_existing(urls.clone()));

    let result = coordinator(create_test_config(50.0, 5), store)
        .run(&urls, 1, &no_progress, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.outcomes[0].tag(), "duplicate");
}
