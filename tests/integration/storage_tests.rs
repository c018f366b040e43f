//! Runs backed by an on-disk SQLite store

use crate::{company_page, create_test_config, html_response};
use prospect_harvest::harvest::Coordinator;
use prospect_harvest::model::ProgressSnapshot;
use prospect_harvest::output::write_run_report;
use prospect_harvest::storage::{open_store, RunStatus};
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer};

#[tokio::test]
async fn test_records_survive_reopen() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/co1"))
        .respond_with(html_response(company_page(
            "Acme Inc",
            "100-0001 Tokyo-to Chiyoda-ku 1-1",
        )))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("companies.db");
    let urls = vec![format!("{}/co1", mock_server.uri())];

    {
        let store = Arc::new(open_store(&db_path).unwrap());
        let run_id = store.create_run("hash-1").unwrap();

        let result = Coordinator::new(create_test_config(50.0, 5), store.clone())
            .unwrap()
            .run(&urls, 1, &|_: &ProgressSnapshot| {}, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.outcomes[0].tag(), "accepted");

        store
            .complete_run(run_id, RunStatus::Completed, &result.summary())
            .unwrap();

        let run = store.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.total, 1);
        assert_eq!(run.accepted, 1);
        assert!(run.finished_at.is_some());
    }

    let store = Arc::new(open_store(&db_path).unwrap());
    let stored = store.get_company(&urls[0]).unwrap().expect("stored company");
    assert_eq!(stored.company_name, "Acme Inc");
    assert_eq!(stored.region, "Tokyo-to");
    assert_eq!(stored.locality, "Chiyoda-ku");

    let result = Coordinator::new(create_test_config(50.0, 5), store.clone())
        .unwrap()
        .run(&urls, 1, &|_: &ProgressSnapshot| {}, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.outcomes[0].tag(), "duplicate");
    assert_eq!(store.count_companies().unwrap(), 1);
}

#[tokio::test]
async fn test_report_written_after_run() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/co1"))
        .respond_with(html_response(company_page("Acme | Inc", "大阪府大阪市北区1")))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(open_store(&temp_dir.path().join("companies.db")).unwrap());
    let urls = vec![
        format!("{}/co1", mock_server.uri()),
        "mailto:someone@a.example".to_string(),
    ];

    let result = Coordinator::new(create_test_config(50.0, 5), store)
        .unwrap()
        .run(&urls, 2, &|_: &ProgressSnapshot| {}, CancellationToken::new())
        .await
        .unwrap();

    let report_path = temp_dir.path().join("report.md");
    write_run_report(&result, "abc123", &report_path).unwrap();

    let report = std::fs::read_to_string(&report_path).unwrap();
    assert!(report.contains("abc123"));
    assert!(report.contains(r"Acme \| Inc"));
    assert!(report.contains("validation-failure"));
    assert!(report.contains("mailto:someone@a.example"));
}
