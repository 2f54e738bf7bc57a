use crate::common::{html_page, html_response, mount_page, test_api, test_config, wait_idle};
use lexicrawl::indexing::STOPPED_BY_USER;
use lexicrawl::storage::lock;
use lexicrawl::{Language, LemmaExtractor, SiteStatus, Storage};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts a root page that takes far longer to answer than any test waits
async fn mount_slow_site(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(html_response(html_page("Slow", "Slow page")).set_delay(Duration::from_secs(5)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_stop_marks_running_sites_failed() {
    let mock_server = MockServer::start().await;
    mount_slow_site(&mock_server).await;

    let (api, _storage) = test_api(test_config(&[(&mock_server.uri(), "Slow site")]));
    assert!(api.start_indexing().await.ok);
    assert!(api.indexing().is_running().unwrap());

    let response = api.stop_indexing().await;
    assert!(response.ok, "stop failed: {:?}", response.error_message);
    assert!(!api.indexing().is_running().unwrap());

    let stats = api.statistics().statistics.unwrap();
    let site = &stats.per_site[0];
    assert_eq!(site.status, SiteStatus::Failed);
    assert_eq!(site.last_error.as_deref(), Some(STOPPED_BY_USER));

    // Nothing is left to wait for
    wait_idle(&api).await;
}

#[tokio::test]
async fn test_stop_when_idle_reports_not_running() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", "Home", "<p>Home</p>").await;

    let (api, storage) = test_api(test_config(&[(&mock_server.uri(), "Mock site")]));
    assert!(api.start_indexing().await.ok);
    wait_idle(&api).await;

    let before = lock(&storage).unwrap().list_sites().unwrap();

    let response = api.stop_indexing().await;
    assert!(!response.ok);
    assert_eq!(
        response.error_message.as_deref(),
        Some("Indexing is not running")
    );

    let after = lock(&storage).unwrap().list_sites().unwrap();
    assert_eq!(before.len(), after.len());
    assert_eq!(after[0].status, SiteStatus::Indexed);
    assert_eq!(before[0].status_time, after[0].status_time);
}

#[tokio::test]
async fn test_start_while_running_is_rejected() {
    let mock_server = MockServer::start().await;
    mount_slow_site(&mock_server).await;

    let (api, storage) = test_api(test_config(&[(&mock_server.uri(), "Slow site")]));
    assert!(api.start_indexing().await.ok);

    let response = api.start_indexing().await;
    assert!(!response.ok);
    assert_eq!(
        response.error_message.as_deref(),
        Some("Indexing is already running")
    );

    // The running crawl was not disturbed
    assert_eq!(lock(&storage).unwrap().list_sites().unwrap().len(), 1);
    assert!(api.stop_indexing().await.ok);
}

#[tokio::test]
async fn test_restart_clears_previous_index() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", "Home", r#"<a href="/a">A</a>"#).await;
    mount_page(&mock_server, "/a", "A", "<p>Alpha</p>").await;

    let (api, storage) = test_api(test_config(&[(&mock_server.uri(), "Mock site")]));
    for _ in 0..2 {
        assert!(api.start_indexing().await.ok);
        wait_idle(&api).await;
    }

    let storage = lock(&storage).unwrap();
    let sites = storage.list_sites().unwrap();
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].status, SiteStatus::Indexed);
    assert_eq!(storage.count_all_pages().unwrap(), 2);
}

#[tokio::test]
async fn test_malformed_site_url_is_recorded_as_failed() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", "Home", "<p>Home</p>").await;

    let (api, _storage) = test_api(test_config(&[
        ("not a url", "Broken"),
        (&mock_server.uri(), "Mock site"),
    ]));
    assert!(api.start_indexing().await.ok);
    wait_idle(&api).await;

    let stats = api.statistics().statistics.unwrap();
    let broken = &stats.per_site[0];
    assert_eq!(broken.status, SiteStatus::Failed);
    assert!(broken
        .last_error
        .as_deref()
        .unwrap()
        .starts_with("Invalid site URL"));
    assert_eq!(stats.per_site[1].status, SiteStatus::Indexed);
}

#[tokio::test]
async fn test_recover_interrupted_sites() {
    let (api, storage) = test_api(test_config(&[("https://example.com", "Example")]));
    {
        let mut storage = lock(&storage).unwrap();
        storage
            .insert_site("https://example.com", "Example", SiteStatus::Indexing)
            .unwrap();
    }

    assert_eq!(api.indexing().recover_interrupted_sites().unwrap(), 1);

    let stats = api.statistics().statistics.unwrap();
    assert_eq!(stats.per_site[0].status, SiteStatus::Failed);
    assert!(stats.per_site[0].last_error.is_some());
}

#[tokio::test]
async fn test_index_page_twice_keeps_one_page() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/news", "News", "<p>Fresh news today</p>").await;

    let base_url = mock_server.uri();
    let (api, storage) = test_api(test_config(&[(&base_url, "Mock site")]));
    let page_url = format!("{}/news", base_url);

    for _ in 0..2 {
        let response = api.index_page(&page_url).await;
        assert!(response.ok, "index_page failed: {:?}", response.error_message);
    }

    let storage = lock(&storage).unwrap();
    let sites = storage.list_sites().unwrap();
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].status, SiteStatus::Indexed);
    assert_eq!(storage.count_pages(sites[0].id).unwrap(), 1);

    // Frequencies count pages, so a reindexed page still counts once
    let lemmas = LemmaExtractor::new().extract("fresh", Language::English);
    let fresh = lemmas.keys().next().unwrap();
    let lemma = storage.find_lemma(sites[0].id, fresh).unwrap().unwrap();
    assert_eq!(lemma.frequency, 1);
}

#[tokio::test]
async fn test_index_page_rejects_roots_and_foreign_urls() {
    let (api, _storage) = test_api(test_config(&[("https://example.com", "Example")]));
    let expected = Some("The page is outside the sites listed in the configuration file");

    for url in [
        "https://example.com",
        "https://example.com/",
        "https://other.org/page",
        "https://example.community/page",
    ] {
        let response = api.index_page(url).await;
        assert!(!response.ok, "{} should be rejected", url);
        assert_eq!(response.error_message.as_deref(), expected);
    }
}

#[tokio::test]
async fn test_index_page_fetch_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let base_url = mock_server.uri();
    let (api, storage) = test_api(test_config(&[(&base_url, "Mock site")]));

    let response = api.index_page(&format!("{}/gone", base_url)).await;
    assert!(!response.ok);
    assert_eq!(
        response.error_message.as_deref(),
        Some("Failed to process page lemmas")
    );

    let storage = lock(&storage).unwrap();
    let site = &storage.list_sites().unwrap()[0];
    assert_eq!(storage.count_pages(site.id).unwrap(), 0);
    assert_eq!(site.last_error.as_deref(), Some("404 Not Found"));
}

#[tokio::test]
async fn test_stop_fails_when_jobs_do_not_match_indexing_sites() {
    let (api, storage) = test_api(test_config(&[("https://example.com", "Example")]));
    let site_id = lock(&storage)
        .unwrap()
        .insert_site("https://example.com", "Example", SiteStatus::Indexing)
        .unwrap();

    let response = api.stop_indexing().await;
    assert!(!response.ok);
    assert_eq!(
        response.error_message.as_deref(),
        Some("Failed to stop indexing")
    );

    let site = lock(&storage).unwrap().get_site(site_id).unwrap();
    assert_eq!(site.status, SiteStatus::Indexing);
    assert!(site.last_error.is_none());
}
