use crate::common::{mount_page, test_api, test_config, wait_idle, TEST_USER_AGENT};
use lexicrawl::storage::lock;
use lexicrawl::SiteStatus;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_crawl_discovers_linked_pages_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // A links to B and C, B links to C again
    mount_page(
        &mock_server,
        "/",
        "Home",
        r#"<p>Welcome home</p><a href="/b">B</a> <a href="/c">C</a>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/b",
        "Page B",
        r#"<p>Second page</p><a href="/c">C again</a> <a href="/">Home</a>"#,
    )
    .await;
    mount_page(&mock_server, "/c", "Page C", "<p>Third page</p>").await;

    let (api, storage) = test_api(test_config(&[(&base_url, "Mock site")]));

    let response = api.start_indexing().await;
    assert!(response.ok, "start failed: {:?}", response.error_message);
    wait_idle(&api).await;

    let stats = api.statistics().statistics.expect("Failed to load statistics");
    let site = &stats.per_site[0];
    assert_eq!(site.status, SiteStatus::Indexed);
    assert_eq!(site.pages, 3, "Expected exactly 3 pages, got {}", site.pages);
    assert!(site.last_error.is_none());
    assert!(site.lemmas > 0);

    let storage = lock(&storage).expect("Failed to lock storage");
    assert_eq!(storage.count_all_pages().unwrap(), 3);
}

#[tokio::test]
async fn test_crawl_ignores_external_and_fragment_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        "Home",
        r##"<a href="https://elsewhere.example/page">External</a>
            <a href="#top">Top</a>
            <a href="mailto:someone@example.com">Mail</a>
            <a href="/file.pdf" download>Download</a>
            <a href="/inner">Inner</a>"##,
    )
    .await;
    mount_page(&mock_server, "/inner", "Inner", "<p>Inner page</p>").await;

    let (api, _storage) = test_api(test_config(&[(&base_url, "Mock site")]));
    assert!(api.start_indexing().await.ok);
    wait_idle(&api).await;

    let stats = api.statistics().statistics.unwrap();
    assert_eq!(stats.per_site[0].pages, 2);
    assert_eq!(stats.per_site[0].status, SiteStatus::Indexed);
}

#[tokio::test]
async fn test_crawl_records_fetch_failure_and_continues() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        "Home",
        r#"<a href="/missing">Missing</a> <a href="/ok">Ok</a>"#,
    )
    .await;
    mount_page(&mock_server, "/ok", "Ok", "<p>Fine</p>").await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let (api, _storage) = test_api(test_config(&[(&base_url, "Mock site")]));
    assert!(api.start_indexing().await.ok);
    wait_idle(&api).await;

    let stats = api.statistics().statistics.unwrap();
    let site = &stats.per_site[0];
    assert_eq!(site.status, SiteStatus::Indexed);
    assert_eq!(site.pages, 2);
    assert_eq!(site.last_error.as_deref(), Some("404 Not Found"));
}

#[tokio::test]
async fn test_crawl_sends_configured_headers() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Unmatched requests get a 404 from wiremock, so the page is only
    // stored when both headers are present
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", TEST_USER_AGENT))
        .and(header("referer", "https://www.google.com"))
        .respond_with(crate::common::html_response(crate::common::html_page(
            "Home", "Hello",
        )))
        .mount(&mock_server)
        .await;

    let (api, _storage) = test_api(test_config(&[(&base_url, "Mock site")]));
    assert!(api.start_indexing().await.ok);
    wait_idle(&api).await;

    let stats = api.statistics().statistics.unwrap();
    assert_eq!(stats.per_site[0].pages, 1);
    assert!(stats.per_site[0].last_error.is_none());
}

#[tokio::test]
async fn test_crawl_of_unreachable_root_finishes_with_error() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let (api, _storage) = test_api(test_config(&[(&base_url, "Mock site")]));
    assert!(api.start_indexing().await.ok);
    wait_idle(&api).await;

    let stats = api.statistics().statistics.unwrap();
    let site = &stats.per_site[0];
    assert_eq!(site.pages, 0);
    assert_eq!(site.last_error.as_deref(), Some("503 Service Unavailable"));
}

#[tokio::test]
async fn test_crawl_indexes_several_sites() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    mount_page(&first, "/", "First", r#"<a href="/one">One</a>"#).await;
    mount_page(&first, "/one", "One", "<p>One</p>").await;
    mount_page(&second, "/", "Second", "<p>Only page</p>").await;

    let (api, _storage) = test_api(test_config(&[
        (&first.uri(), "First"),
        (&second.uri(), "Second"),
    ]));
    assert!(api.start_indexing().await.ok);
    wait_idle(&api).await;

    let stats = api.statistics().statistics.unwrap();
    assert_eq!(stats.total_sites, 2);
    assert_eq!(stats.total_pages, 3);
    assert!(stats
        .per_site
        .iter()
        .all(|site| site.status == SiteStatus::Indexed));
}
