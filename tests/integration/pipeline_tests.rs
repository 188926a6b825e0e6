//! Integration tests for the harvest pipeline
//!
//! These tests use wiremock to stand in for both the target site and the
//! lookup API, and run full jobs end-to-end against an in-memory store.

use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sumi_harvest::config::{
    Config, EnrichmentConfig, StorageBackend, StorageConfig, TargetConfig, UserAgentConfig,
};
use sumi_harvest::crawler::{Coordinator, EnrichmentOutcome, ExtractError, FetchError, JobFailure};
use sumi_harvest::storage::{
    MemoryStore, PartitionSummary, Record, RecordStore, SharedStore, StoreError, StoreResult,
};
use sumi_harvest::{HarvestError, JobState, JobStatus};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TURING_HTML: &str = r#"<html><head><title>Turing Award - Wikipedia</title></head><body>
    <h1 id="firstHeading"><span class="mw-page-title-main">Turing Award</span></h1>
    <div id="mw-content-text"><div class="mw-parser-output">
        <p>  An annual prize...  </p>
        <p>Second paragraph.</p>
    </div></div>
</body></html>"#;

/// Creates a test configuration pointing both endpoints at the mock server
fn create_test_config(base_url: &str) -> Config {
    Config {
        user_agent: UserAgentConfig {
            crawler_name: "TestHarvester".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        target: TargetConfig {
            url_template: format!("{}/wiki/{{query}}", base_url),
            title_selector: "h1#firstHeading".to_string(),
            summary_selector: "div#mw-content-text p".to_string(),
            require_summary: true,
            request_timeout_secs: 5,
        },
        enrichment: EnrichmentConfig {
            enabled: true,
            api_url: format!("{}/w/api.php", base_url),
            sentences: 2,
        },
        storage: StorageConfig {
            backend: StorageBackend::Memory,
            path: String::new(),
        },
    }
}

fn memory_store() -> SharedStore {
    Arc::new(Mutex::new(MemoryStore::new()))
}

fn stored(store: &SharedStore, query: &str) -> Vec<Record> {
    store.lock().unwrap().query(query).unwrap()
}

/// A store whose backend has gone away
struct UnavailableStore;

impl RecordStore for UnavailableStore {
    fn append(&mut self, _query: &str, _records: &[Record]) -> StoreResult<()> {
        Err(StoreError::Unavailable("database is locked".to_string()))
    }

    fn query(&self, _query: &str) -> StoreResult<Vec<Record>> {
        Err(StoreError::Unavailable("database is locked".to_string()))
    }

    fn queries(&self) -> StoreResult<Vec<PartitionSummary>> {
        Err(StoreError::Unavailable("database is locked".to_string()))
    }
}

async fn mount_page(server: &MockServer, page_path: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html)
                .insert_header("content-type", "text/html; charset=UTF-8"),
        )
        .mount(server)
        .await;
}

async fn mount_lookup(server: &MockServer, title: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "query"))
        .and(query_param("format", "json"))
        .and(query_param("prop", "extracts|info"))
        .and(query_param("titles", title))
        .and(query_param("exsentences", "2"))
        .and(query_param("explaintext", "1"))
        .and(query_param("inprop", "url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn turing_lookup() -> serde_json::Value {
    json!({
        "batchcomplete": "",
        "query": {
            "pages": {
                "30435": {
                    "pageid": 30435,
                    "ns": 0,
                    "title": "Turing Award",
                    "fullurl": "https://en.wikipedia.org/wiki/Turing_Award"
                }
            }
        }
    })
}

#[tokio::test]
async fn test_turing_award_scenario() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/wiki/Turing_Award", TURING_HTML).await;
    mount_lookup(&mock_server, "Turing Award", turing_lookup()).await;

    let store = memory_store();
    let coordinator =
        Coordinator::new(create_test_config(&mock_server.uri()), store.clone()).unwrap();

    let result = coordinator.run("Turing_Award").await.expect("Job errored");

    assert_eq!(result.status, JobStatus::Succeeded);
    assert_eq!(result.state, JobState::Completed);
    assert_eq!(result.enrichment, Some(EnrichmentOutcome::Matched));

    let expected = Record {
        title: "Turing Award".to_string(),
        summary: "An annual prize...".to_string(),
        url: Some("https://en.wikipedia.org/wiki/Turing_Award".to_string()),
        query: "Turing_Award".to_string(),
    };
    assert_eq!(result.records, vec![expected.clone()]);
    assert_eq!(stored(&store, "Turing_Award"), vec![expected.clone()]);
    assert_eq!(coordinator.records_for("Turing_Award").unwrap(), vec![expected]);
}

#[tokio::test]
async fn test_enriched_summary_preferred() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/wiki/Turing_Award", TURING_HTML).await;
    mount_lookup(
        &mock_server,
        "Turing Award",
        json!({"query": {"pages": {"30435": {
            "title": "Turing Award",
            "extract": "The ACM A.M. Turing Award is an annual prize. It is given by ACM.",
            "fullurl": "https://en.wikipedia.org/wiki/Turing_Award"
        }}}}),
    )
    .await;

    let store = memory_store();
    let coordinator =
        Coordinator::new(create_test_config(&mock_server.uri()), store.clone()).unwrap();
    let result = coordinator.run("Turing_Award").await.unwrap();

    assert_eq!(
        result.records[0].summary,
        "The ACM A.M. Turing Award is an annual prize. It is given by ACM."
    );
}

#[tokio::test]
async fn test_http_404_fails_job_without_append() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/Nothing_Here"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    // The lookup API must never be consulted for a failed fetch
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(turing_lookup()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let store = memory_store();
    let coordinator =
        Coordinator::new(create_test_config(&mock_server.uri()), store.clone()).unwrap();
    let result = coordinator.run("Nothing_Here").await.unwrap();

    assert_eq!(result.status, JobStatus::Failed);
    assert_eq!(result.state, JobState::Failed);
    assert!(result.records.is_empty());
    assert!(matches!(
        result.failure,
        Some(JobFailure::Fetch(FetchError::HttpStatus { status: 404, .. }))
    ));
    assert_eq!(store.lock().unwrap().count_records().unwrap(), 0);
}

#[tokio::test]
async fn test_missing_summary_fails_job() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/wiki/Stub",
        r#"<html><body><h1 id="firstHeading">Stub</h1></body></html>"#,
    )
    .await;

    let store = memory_store();
    let coordinator =
        Coordinator::new(create_test_config(&mock_server.uri()), store.clone()).unwrap();
    let result = coordinator.run("Stub").await.unwrap();

    assert_eq!(result.status, JobStatus::Failed);
    assert!(matches!(
        result.failure,
        Some(JobFailure::Extract(ExtractError::MissingRequiredField("summary")))
    ));
    assert!(stored(&store, "Stub").is_empty());
}

#[tokio::test]
async fn test_missing_title_fails_job() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/wiki/Untitled",
        r#"<html><body><div id="mw-content-text"><p>Text</p></div></body></html>"#,
    )
    .await;

    let store = memory_store();
    let coordinator =
        Coordinator::new(create_test_config(&mock_server.uri()), store.clone()).unwrap();
    let result = coordinator.run("Untitled").await.unwrap();

    assert!(matches!(
        result.failure,
        Some(JobFailure::Extract(ExtractError::MissingRequiredField("title")))
    ));
    assert!(stored(&store, "Untitled").is_empty());
}

#[tokio::test]
async fn test_relaxed_summary_stores_record() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/wiki/Stub",
        r#"<html><body><h1 id="firstHeading">Stub</h1></body></html>"#,
    )
    .await;
    mount_lookup(&mock_server, "Stub", json!({"query": {"pages": {}}})).await;

    let mut config = create_test_config(&mock_server.uri());
    config.target.require_summary = false;

    let store = memory_store();
    let coordinator = Coordinator::new(config, store.clone()).unwrap();
    let result = coordinator.run("Stub").await.unwrap();

    assert_eq!(result.status, JobStatus::Succeeded);
    assert_eq!(stored(&store, "Stub")[0].summary, "");
}

#[tokio::test]
async fn test_enrichment_failure_degrades_record() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/wiki/Turing_Award", TURING_HTML).await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let store = memory_store();
    let coordinator =
        Coordinator::new(create_test_config(&mock_server.uri()), store.clone()).unwrap();
    let result = coordinator.run("Turing_Award").await.unwrap();

    assert_eq!(result.status, JobStatus::PartiallyFailed);
    assert_eq!(result.state, JobState::Completed);
    assert!(matches!(
        result.enrichment,
        Some(EnrichmentOutcome::Failed(_))
    ));

    let records = stored(&store, "Turing_Award");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, None);
    assert_eq!(records[0].summary, "An annual prize...");
}

#[tokio::test]
async fn test_enrichment_malformed_json_degrades_record() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/wiki/Turing_Award", TURING_HTML).await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let store = memory_store();
    let coordinator =
        Coordinator::new(create_test_config(&mock_server.uri()), store.clone()).unwrap();
    let result = coordinator.run("Turing_Award").await.unwrap();

    assert_eq!(result.status, JobStatus::PartiallyFailed);
    assert_eq!(stored(&store, "Turing_Award")[0].url, None);
}

#[tokio::test]
async fn test_enrichment_no_match_keeps_extracted_summary() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/wiki/Turing_Award", TURING_HTML).await;
    mount_lookup(
        &mock_server,
        "Turing Award",
        json!({"query": {"pages": {"-1": {"ns": 0, "title": "Turing Award", "missing": ""}}}}),
    )
    .await;

    let store = memory_store();
    let coordinator =
        Coordinator::new(create_test_config(&mock_server.uri()), store.clone()).unwrap();
    let result = coordinator.run("Turing_Award").await.unwrap();

    assert_eq!(result.status, JobStatus::Succeeded);
    assert_eq!(result.enrichment, Some(EnrichmentOutcome::NoMatch));

    let records = stored(&store, "Turing_Award");
    assert_eq!(records[0].url, None);
    assert_eq!(records[0].summary, "An annual prize...");
}

#[tokio::test]
async fn test_enrichment_disabled_skips_lookup() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/wiki/Turing_Award", TURING_HTML).await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(turing_lookup()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri());
    config.enrichment.enabled = false;

    let coordinator = Coordinator::new(config, memory_store()).unwrap();
    let result = coordinator.run("Turing_Award").await.unwrap();

    assert_eq!(result.enrichment, Some(EnrichmentOutcome::Disabled));
    assert_eq!(result.records[0].url, None);
}

#[tokio::test]
async fn test_repeat_query_accumulates() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/wiki/Turing_Award", TURING_HTML).await;
    mount_lookup(&mock_server, "Turing Award", turing_lookup()).await;

    let coordinator =
        Coordinator::new(create_test_config(&mock_server.uri()), memory_store()).unwrap();

    coordinator.run("Turing_Award").await.unwrap();
    coordinator.run("Turing_Award").await.unwrap();

    let records = coordinator.records_for("Turing_Award").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], records[1]);
}

#[tokio::test]
async fn test_query_term_is_trimmed() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/wiki/Turing_Award", TURING_HTML).await;
    mount_lookup(&mock_server, "Turing Award", turing_lookup()).await;

    let coordinator =
        Coordinator::new(create_test_config(&mock_server.uri()), memory_store()).unwrap();
    let result = coordinator.run("  Turing_Award \n").await.unwrap();

    assert_eq!(result.query, "Turing_Award");
    assert_eq!(result.records[0].query, "Turing_Award");
    assert_eq!(coordinator.records_for(" Turing_Award ").unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_query_rejected_before_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let coordinator =
        Coordinator::new(create_test_config(&mock_server.uri()), memory_store()).unwrap();

    assert!(matches!(
        coordinator.run("   ").await,
        Err(HarvestError::EmptyQuery)
    ));
}

#[tokio::test]
async fn test_timeout_fails_job() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/Slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(TURING_HTML)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri());
    config.target.request_timeout_secs = 1;

    let store = memory_store();
    let coordinator = Coordinator::new(config, store.clone()).unwrap();
    let result = coordinator.run("Slow").await.unwrap();

    assert!(matches!(
        result.failure,
        Some(JobFailure::Fetch(FetchError::Timeout { .. }))
    ));
    assert!(stored(&store, "Slow").is_empty());
}

#[tokio::test]
async fn test_unreachable_host_fails_job() {
    // Nothing listens on the discard port
    let config = create_test_config("http://127.0.0.1:9");

    let coordinator = Coordinator::new(config, memory_store()).unwrap();
    let result = coordinator.run("Anything").await.unwrap();

    assert_eq!(result.status, JobStatus::Failed);
    assert!(matches!(
        result.failure,
        Some(JobFailure::Fetch(FetchError::Unreachable { .. }))
    ));
}

#[tokio::test]
async fn test_user_agent_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/Turing_Award"))
        .and(header(
            "user-agent",
            "TestHarvester/1.0 (+https://example.com/contact; test@example.com)",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(TURING_HTML))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_lookup(&mock_server, "Turing Award", turing_lookup()).await;

    let coordinator =
        Coordinator::new(create_test_config(&mock_server.uri()), memory_store()).unwrap();
    let result = coordinator.run("Turing_Award").await.unwrap();

    assert_eq!(result.status, JobStatus::Succeeded);
}

#[tokio::test]
async fn test_concurrent_jobs_keep_partitions_apart() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/wiki/Turing_Award", TURING_HTML).await;
    mount_page(
        &mock_server,
        "/wiki/Rust",
        r#"<h1 id="firstHeading">Rust</h1><div id="mw-content-text"><p>A language.</p></div>"#,
    )
    .await;
    mount_lookup(&mock_server, "Turing Award", turing_lookup()).await;
    mount_lookup(&mock_server, "Rust", json!({"query": {"pages": {}}})).await;

    let coordinator = Arc::new(
        Coordinator::new(create_test_config(&mock_server.uri()), memory_store()).unwrap(),
    );

    let handles: Vec<_> = ["Turing_Award", "Rust", "Turing_Award", "Rust"]
        .into_iter()
        .map(|query| {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.run(query).await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert!(result.status.produced_record());
    }

    let turing = coordinator.records_for("Turing_Award").unwrap();
    let rust = coordinator.records_for("Rust").unwrap();
    assert_eq!(turing.len(), 2);
    assert_eq!(rust.len(), 2);
    assert!(turing.iter().all(|r| r.title == "Turing Award"));
    assert!(rust.iter().all(|r| r.title == "Rust" && r.url.is_none()));
}

#[tokio::test]
async fn test_store_failure_aborts_job() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/wiki/Turing_Award", TURING_HTML).await;
    mount_lookup(&mock_server, "Turing Award", turing_lookup()).await;

    let store: SharedStore = Arc::new(Mutex::new(UnavailableStore));
    let coordinator = Coordinator::new(create_test_config(&mock_server.uri()), store).unwrap();

    assert!(matches!(
        coordinator.run("Turing_Award").await,
        Err(HarvestError::Store(StoreError::Unavailable(_)))
    ));
    assert!(matches!(
        coordinator.records_for("Turing_Award"),
        Err(HarvestError::Store(StoreError::Unavailable(_)))
    ));
}
