//! Fetch gateway behavior over HTTP

use lyngsat_wayback::config::{HttpConfig, ProxyConfig};
use lyngsat_wayback::crawler::{build_http_client, FetchError, HttpGateway, PageSource, RetryPolicy};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_gateway(max_retries: u32) -> HttpGateway {
    let client = build_http_client(&HttpConfig::default(), None).expect("Failed to build client");
    let retry = RetryPolicy {
        max_retries,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    };
    HttpGateway::with_client(client, 4, retry)
}

fn page_url(server: &MockServer, page_path: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), page_path)).expect("Failed to parse URL")
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/free/Japan.html"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/free/Japan.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Japan</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let page = fast_gateway(3)
        .fetch(&page_url(&mock_server, "/free/Japan.html"))
        .await
        .expect("Fetch should succeed after retries");

    assert_eq!(page.body, "<html>Japan</html>");
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/free/Atlantis.html"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = fast_gateway(3)
        .fetch(&page_url(&mock_server, "/free/Atlantis.html"))
        .await;

    match result {
        Err(FetchError::Http { status, .. }) => assert_eq!(status, 404),
        other => panic!("Expected HTTP 404, got {:?}", other),
    }
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/free/Korea.html"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let result = fast_gateway(2)
        .fetch(&page_url(&mock_server, "/free/Korea.html"))
        .await;

    let error = result.expect_err("Fetch should fail");
    assert!(error.is_retryable());
    assert!(matches!(error, FetchError::Http { status: 500, .. }));
}

#[tokio::test]
async fn test_redirect_target_becomes_page_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/free/old.html"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/free/new.html", mock_server.uri())),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/free/new.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&mock_server)
        .await;

    let page = fast_gateway(0)
        .fetch(&page_url(&mock_server, "/free/old.html"))
        .await
        .expect("Fetch should follow the redirect");

    assert_eq!(page.url, page_url(&mock_server, "/free/new.html"));
    assert_eq!(page.body, "moved");
}

#[tokio::test]
async fn test_requests_go_through_proxy() {
    // The mock server plays the proxy: every request lands on it whatever the target host
    let proxy_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("via proxy"))
        .expect(1)
        .mount(&proxy_server)
        .await;

    let proxy = ProxyConfig {
        url: proxy_server.uri(),
        username: Some("crawler".to_string()),
        password: Some("secret".to_string()),
        password_env: None,
    };
    let gateway =
        HttpGateway::new(&HttpConfig::default(), Some(&proxy)).expect("Failed to build gateway");

    let url = Url::parse("http://www.lyngsat.com/free/index.html").expect("Failed to parse URL");
    let page = gateway.fetch(&url).await.expect("Fetch through proxy failed");

    assert_eq!(page.body, "via proxy");

    let requests = proxy_server
        .received_requests()
        .await
        .expect("Request recording disabled");
    assert!(requests[0]
        .headers
        .iter()
        .any(|(name, _)| name.as_str().eq_ignore_ascii_case("proxy-authorization")));
}
