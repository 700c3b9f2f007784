//! Archive index discovery against a mock CDX service

use crate::common::create_test_config;
use lyngsat_wayback::archive::{resolve_roots, RootSource};
use lyngsat_wayback::storage::{SqliteStorage, Storage};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CDX_BODY: &str = r#"[
    ["timestamp","original"],
    ["20150102195325","http://www.lyngsat.com/"],
    ["20120615080910","http://www.lyngsat.com:80/"]
]"#;

#[tokio::test]
async fn test_index_query_then_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cdx/search/cdx"))
        .and(query_param("url", "http://www.lyngsat.com"))
        .and(query_param("output", "json"))
        .and(query_param("filter", "statuscode:200"))
        .and(query_param("collapse", "timestamp:6"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CDX_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(vec![], temp_dir.path());
    config.archive.cdx_endpoint = format!("{}/cdx/search/cdx", mock_server.uri());
    let cache = temp_dir.path().join("wayback_urls.json");
    config.archive.index_cache = Some(cache.to_string_lossy().into_owned());

    let client = reqwest::Client::new();
    let mut storage = SqliteStorage::new_in_memory().expect("Failed to create storage");

    let (roots, source) = resolve_roots(&config, &mut storage, &client)
        .await
        .expect("Failed to resolve roots");

    assert_eq!(source, RootSource::Query);
    assert_eq!(
        roots,
        vec![
            "http://web.archive.org/web/20120615080910/http://www.lyngsat.com:80/".to_string(),
            "http://web.archive.org/web/20150102195325/http://www.lyngsat.com/".to_string(),
        ]
    );
    assert!(cache.exists());
    assert_eq!(
        storage
            .load_index_entries("http://www.lyngsat.com")
            .expect("Failed to load index")
            .len(),
        2
    );

    // Second resolution comes from the cache file; the mock expects one query only
    let (cached, source) = resolve_roots(&config, &mut storage, &client)
        .await
        .expect("Failed to resolve roots");
    assert_eq!(source, RootSource::Cache);
    assert_eq!(cached, roots);
}

#[tokio::test]
async fn test_database_index_used_without_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cdx/search/cdx"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CDX_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(vec![], temp_dir.path());
    config.archive.cdx_endpoint = format!("{}/cdx/search/cdx", mock_server.uri());

    let client = reqwest::Client::new();
    let mut storage = SqliteStorage::new_in_memory().expect("Failed to create storage");

    let (first, _) = resolve_roots(&config, &mut storage, &client)
        .await
        .expect("Failed to resolve roots");
    let (second, source) = resolve_roots(&config, &mut storage, &client)
        .await
        .expect("Failed to resolve roots");

    assert_eq!(source, RootSource::Database);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_configured_roots_skip_the_index() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CDX_BODY))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = "http://web.archive.org/web/20150102195325/http://www.lyngsat.com/".to_string();
    let mut config = create_test_config(vec![root.clone()], temp_dir.path());
    config.archive.cdx_endpoint = format!("{}/cdx/search/cdx", mock_server.uri());

    let client = reqwest::Client::new();
    let mut storage = SqliteStorage::new_in_memory().expect("Failed to create storage");

    let (roots, source) = resolve_roots(&config, &mut storage, &client)
        .await
        .expect("Failed to resolve roots");

    assert_eq!(source, RootSource::Config);
    assert_eq!(roots, vec![root]);
}

#[tokio::test]
async fn test_index_service_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(vec![], temp_dir.path());
    config.archive.cdx_endpoint = format!("{}/cdx/search/cdx", mock_server.uri());

    let client = reqwest::Client::new();
    let mut storage = SqliteStorage::new_in_memory().expect("Failed to create storage");

    let result = resolve_roots(&config, &mut storage, &client).await;
    assert!(matches!(
        result,
        Err(lyngsat_wayback::WaybackError::ArchiveIndex(_))
    ));
}
