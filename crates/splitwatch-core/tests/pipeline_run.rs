//! Full pass wired from configuration: rows file, mocked model, lookup and
//! webhook, output into a temp directory.

use chrono::{Days, Local};
use serde_json::json;
use splitwatch_core::classify::BatchStatus;
use splitwatch_core::config::AppConfig;
use splitwatch_core::history::NotifiedHistory;
use splitwatch_core::pipeline::{run_once, RunOptions};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn day(offset: u64) -> String {
    Local::now()
        .date_naive()
        .checked_add_days(Days::new(offset))
        .unwrap()
        .format("%Y-%m-%d")
        .to_string()
}

fn config(server: &MockServer, dir: &std::path::Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.source.rows_file = Some(dir.join("rows.json"));
    config.source.exchange_lookup_url = Some(server.uri());
    config.classifier.api_key = Some("test-key".into());
    config.classifier.base_url = Some(server.uri());
    config.notify.webhook_url = Some(format!("{}/hook", server.uri()));
    config.notify.delay_ms = 0;
    config.paths.csv = dir.join("out/splits.csv");
    config.paths.history = dir.join("out/history.log");
    config.paths.audit_log = dir.join("out/audit.jsonl");
    config
}

fn write_rows(dir: &std::path::Path) {
    let rows = json!([
        ["ABCD", "", "Abcd Corp", "1:10", day(5)],
        ["FWD", "", "Fwd Inc", "3-for-2", day(6)],
        ["GONE", "", "Gone Inc", "1:8", day(0)],
        ["", "", "", "", ""]
    ]);
    std::fs::write(dir.join("rows.json"), rows.to_string()).unwrap();
}

async fn mount_lookup(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/finance/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quotes": [
                {"symbol": "ABCD", "exchange": "NYQ"},
                {"symbol": "FWD", "exchange": "NYQ"}
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_run_once_writes_report_and_notifies() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    write_rows(tmp.path());
    mount_lookup(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash-latest:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "ABCD: Cash-in-Lieu Likely - cash paid for fractions"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&server)
        .await;

    let config = config(&server, tmp.path());
    let summary = run_once(&config, &RunOptions::default()).await.expect("run failed");
    assert_eq!(summary.ingest.rows_seen, 3);
    assert_eq!(summary.records, 2);
    assert_eq!(summary.reverse_splits, 1);
    assert_eq!(summary.classified, 1);
    assert_eq!(summary.batch_status, BatchStatus::Classified);
    assert_eq!(summary.notifications_sent, 2);
    assert!(!summary.is_degraded());

    let csv = std::fs::read_to_string(&config.paths.csv).unwrap();
    assert!(csv.contains(&format!("ABCD,NYSE,Abcd Corp,1:10,{},cash-in-lieu likely", day(5))));
    assert!(csv.contains("n/a (forward split)"));
    assert!(!csv.contains("GONE"));

    let history = NotifiedHistory::load(&config.paths.history);
    assert!(history.contains(&format!("ABCD_{}", day(5))));
    assert!(config.paths.audit_log.exists());
}

#[tokio::test]
async fn test_run_once_degrades_on_model_failure() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    write_rows(tmp.path());
    mount_lookup(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash-latest:generateContent"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let config = config(&server, tmp.path());
    let options = RunOptions {
        no_notify: true,
        ..Default::default()
    };
    let summary = run_once(&config, &options).await.expect("run failed");
    assert!(summary.is_degraded());
    assert_eq!(summary.sentinels, 1);
    assert_eq!(summary.notifications_sent, 0);

    let csv = std::fs::read_to_string(&config.paths.csv).unwrap();
    assert!(csv.contains("api error"));
    assert!(!config.paths.history.exists());
}

#[tokio::test]
async fn test_run_once_missing_rows_file_is_error() {
    let server = MockServer::start().await;
    let tmp = tempfile::tempdir().unwrap();
    let config = config(&server, tmp.path());
    let err = run_once(&config, &RunOptions::default()).await.unwrap_err();
    assert!(format!("{err:#}").contains("rows.json"));
}
