//! Integration tests for Prospect-Harvest
//!
//! These tests use wiremock to stand up mock company sites and run the
//! fetcher and the full pipeline against them.

mod fetch_tests;
mod pipeline_tests;
mod storage_tests;

use prospect_harvest::config::{
    AddressConfig, Config, ExtractorConfig, FetcherConfig, OutputConfig, PipelineConfig,
};
use wiremock::ResponseTemplate;

/// Creates a fast test configuration
pub fn create_test_config(requests_per_second: f64, timeout_seconds: u64) -> Config {
    Config {
        fetcher: FetcherConfig {
            requests_per_second,
            timeout_seconds,
            user_agents: vec!["TestAgent/1.0".to_string(), "TestAgent/2.0".to_string()],
            max_retries: 0,
            retry_backoff_ms: 10,
        },
        pipeline: PipelineConfig {
            max_concurrency: 4,
            canonicalize_urls: false,
        },
        extractor: ExtractorConfig::default(),
        address: AddressConfig::default(),
        output: OutputConfig::default(),
        targets: vec![],
    }
}

/// A company page in the shape most sites use
pub fn company_page(name: &str, address: &str) -> String {
    format!(
        r#"<html><head><title>{}</title></head><body>
        <div class="company-info"><p>address: {}</p><p>TEL: 03-0000-0000</p></div>
        <a href="/contact">Contact</a>
        </body></html>"#,
        name, address
    )
}

pub fn html_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}
