//! End-to-end crawl tests against a mock site

use crate::common::*;
use lyngsat_wayback::config::CrawlerConfig;
use lyngsat_wayback::crawler::{
    build_http_client, run_crawl, Coordinator, HttpGateway, PageSource, RetryPolicy,
};
use lyngsat_wayback::model::SnapshotStatus;
use lyngsat_wayback::output::{export_csv, write_csv};
use lyngsat_wayback::storage::{SqliteStorage, Storage};
use lyngsat_wayback::SiteProfile;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Mounts the whole Free TV → Asia → Japan/Korea → NHK-G site
async fn mount_site(server: &MockServer) {
    mount_page(server, "/", ROOT_PAGE).await;
    mount_page(server, "/free/index.html", FREE_INDEX_PAGE).await;
    mount_page(server, "/free/Asia.html", ASIA_PAGE).await;
    mount_page(server, "/free/Japan.html", JAPAN_PAGE).await;
    mount_page(server, "/free/Korea.html", KOREA_PAGE).await;
    mount_page(server, "/tvchannels/jp/NHK.html", NHK_DETAIL_PAGE).await;
}

fn gateway() -> Arc<dyn PageSource> {
    let config = create_test_config(vec![], Path::new("."));
    Arc::new(HttpGateway::new(&config.http, None).expect("Failed to build gateway"))
}

#[tokio::test]
async fn test_full_snapshot_crawl() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let coordinator = Coordinator::new(gateway(), CrawlerConfig::default(), SiteProfile::default());
    let snapshot = coordinator
        .crawl_snapshot(&format!("{}/", mock_server.uri()))
        .await;

    assert_eq!(
        snapshot.free_tv_url.as_deref(),
        Some(format!("{}/free/index.html", mock_server.uri()).as_str())
    );
    assert_eq!(snapshot.regions.len(), 1);
    assert_eq!(snapshot.regions[0].name, "Asia");
    assert_eq!(snapshot.regions[0].countries.len(), 2);
    assert_eq!(snapshot.status(), SnapshotStatus::Complete);

    let japan = snapshot.regions[0]
        .countries
        .iter()
        .find(|c| c.name == "Japan")
        .expect("Japan missing");
    assert_eq!(japan.channels.len(), 2);

    // NHK-G: detail rows merged, summary columns other than name and logo dropped
    let nhk = &japan.channels[0];
    assert_eq!(nhk.name("Channel Name"), Some("NHK-G"));
    assert_eq!(
        nhk.detail_page_url.as_deref(),
        Some(format!("{}/tvchannels/jp/NHK.html", mock_server.uri()).as_str())
    );
    assert_eq!(nhk.detail_records.len(), 2);
    assert_eq!(nhk.detail_records[1]["Satellite"].text(), "JCSAT 4B");
    assert!(nhk.get("Position").is_none());
    assert!(nhk.get("Satellite").is_none());
    assert!(nhk.get("Beam").is_none());
    assert!(nhk
        .get("Logo")
        .and_then(|c| c.href())
        .is_some_and(|href| href.ends_with("/logo/nhk.html")));

    // Japan Wake: no detail page, continuation-free row kept as is
    let wake = &japan.channels[1];
    assert_eq!(wake.name("Channel Name"), Some("Japan Wake"));
    assert!(wake.detail_page_url.is_none());
    assert_eq!(wake.get("Satellite").map(|c| c.text()), Some("JCSAT 3A"));

    assert_eq!(snapshot.counters.detail_pages_merged, 1);
    assert_eq!(snapshot.counters.errors, 0);
}

#[tokio::test]
async fn test_gateway_retries_count_as_one_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_site(&mock_server).await;

    let config = create_test_config(vec![], Path::new("."));
    let client = build_http_client(&config.http, None).expect("Failed to build client");
    let retry = RetryPolicy {
        max_retries: 1,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    };
    let gateway = Arc::new(HttpGateway::with_client(client, 4, retry));

    let coordinator = Coordinator::new(gateway, CrawlerConfig::default(), SiteProfile::default());
    let snapshot = coordinator
        .crawl_snapshot(&format!("{}/", mock_server.uri()))
        .await;

    // root, free TV index, Asia, Japan, Korea, NHK-G detail
    assert_eq!(snapshot.status(), SnapshotStatus::Complete);
    assert_eq!(snapshot.counters.requests_issued, 6);
}

#[tokio::test]
async fn test_continuation_row_merged_before_detail_failure() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", ROOT_PAGE).await;
    mount_page(&mock_server, "/free/index.html", FREE_INDEX_PAGE).await;
    mount_page(&mock_server, "/free/Asia.html", ASIA_PAGE).await;
    mount_page(&mock_server, "/free/Japan.html", JAPAN_PAGE).await;
    mount_page(&mock_server, "/free/Korea.html", KOREA_PAGE).await;
    // Detail page answers 404: no retry, summary columns survive

    let coordinator = Coordinator::new(gateway(), CrawlerConfig::default(), SiteProfile::default());
    let snapshot = coordinator
        .crawl_snapshot(&format!("{}/", mock_server.uri()))
        .await;

    let japan = snapshot.regions[0]
        .countries
        .iter()
        .find(|c| c.name == "Japan")
        .expect("Japan missing");
    let nhk = &japan.channels[0];

    assert!(japan.error.is_none());
    assert!(nhk.detail_error.is_some());
    assert_eq!(nhk.get("Position").map(|c| c.text()), Some("110.0°E"));
    assert_eq!(nhk.get("Satellite").map(|c| c.text()), Some("BSAT 3A, JCSAT 4B"));
    assert_eq!(nhk.get("Beam").map(|c| c.text()), Some("Japan, Asia"));
}

#[tokio::test]
async fn test_run_crawl_stores_and_skips_complete_snapshots() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = format!("{}/", mock_server.uri());
    let config = create_test_config(vec![root.clone()], temp_dir.path());

    let report = run_crawl(&config, "test-hash", false)
        .await
        .expect("Crawl failed");
    assert_eq!(report.crawled, 1);
    assert_eq!(report.skipped, 0);
    assert!(report.needs_reprocessing.is_empty());

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .expect("Failed to open storage");
    let summaries = storage.list_snapshots().expect("Failed to list snapshots");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].status, SnapshotStatus::Complete);
    assert_eq!(summaries[0].config_hash, "test-hash");
    assert_eq!(summaries[0].channel_count, 3);

    let snapshot = storage
        .load_snapshot(&summaries[0].snapshot_id)
        .expect("Failed to load snapshot");
    assert_eq!(snapshot.root_url, root);
    assert_eq!(snapshot.channel_count(), 3);

    let json_dir = Path::new(config.output.json_dir.as_deref().expect("json dir set"));
    assert_eq!(std::fs::read_dir(json_dir).expect("json dir missing").count(), 1);

    // Second run leaves the complete snapshot alone
    let report = run_crawl(&config, "test-hash", false)
        .await
        .expect("Crawl failed");
    assert_eq!(report.crawled, 0);
    assert_eq!(report.skipped, 1);

    // Unless asked to start over
    let report = run_crawl(&config, "test-hash", true)
        .await
        .expect("Crawl failed");
    assert_eq!(report.crawled, 1);
}

#[tokio::test]
async fn test_run_crawl_recrawls_partial_snapshots() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", ROOT_PAGE).await;
    mount_page(&mock_server, "/free/index.html", FREE_INDEX_PAGE).await;
    mount_page(&mock_server, "/free/Asia.html", ASIA_PAGE).await;
    mount_page(&mock_server, "/free/Korea.html", KOREA_PAGE).await;
    Mock::given(method("GET"))
        .and(path("/free/Japan.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(vec![format!("{}/", mock_server.uri())], temp_dir.path());

    let report = run_crawl(&config, "test-hash", false)
        .await
        .expect("Crawl failed");
    assert_eq!(report.crawled, 1);
    assert_eq!(report.needs_reprocessing.len(), 1);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .expect("Failed to open storage");
    let summaries = storage.list_snapshots().expect("Failed to list snapshots");
    assert_eq!(summaries[0].status, SnapshotStatus::Partial);
    assert_eq!(summaries[0].failed_countries, 1);
    assert_eq!(summaries[0].channel_count, 1);

    // Partial snapshots are crawled again without --fresh
    let report = run_crawl(&config, "test-hash", false)
        .await
        .expect("Crawl failed");
    assert_eq!(report.crawled, 1);
    assert_eq!(report.skipped, 0);
}

#[tokio::test]
async fn test_csv_export_from_stored_snapshots() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(vec![format!("{}/", mock_server.uri())], temp_dir.path());

    run_crawl(&config, "test-hash", false)
        .await
        .expect("Crawl failed");

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .expect("Failed to open storage");
    let snapshots = storage.load_all_snapshots().expect("Failed to load snapshots");
    let csv_path = Path::new(&config.output.csv_path);

    let rows = export_csv(&snapshots, &config.site, csv_path).expect("Failed to export");
    assert_eq!(rows, 3);

    let content = std::fs::read_to_string(csv_path).expect("Failed to read csv");
    let mut lines = content.lines();
    let header = lines.next().expect("Missing header");
    assert!(header.starts_with(
        r#""Archived on","Timestamp","Region","Country","Channel Name","Logo","Channel Page""#
    ));
    assert!(content.contains(r#""NHK-G""#));
    assert!(content.contains(r#""BSAT 3A, JCSAT 4B""#));
    assert_eq!(lines.count(), 3);

    // Re-writing the same table gives the same file
    let table = lyngsat_wayback::output::flatten_snapshots(&snapshots, &config.site);
    let again = temp_dir.path().join("again.csv");
    write_csv(&table, &again).expect("Failed to write csv");
    assert_eq!(std::fs::read_to_string(again).expect("Failed to read csv"), content);
}
