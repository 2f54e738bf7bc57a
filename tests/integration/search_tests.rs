use crate::common::{mount_page, test_api, test_config, wait_idle};
use lexicrawl::SearchApi;
use wiremock::MockServer;

/// Serves a small Russian site: the home page links to three articles
async fn mount_cat_site(server: &MockServer) {
    mount_page(
        server,
        "/",
        "Главная",
        r#"<p>Главная страница</p>
           <a href="/a">Первая</a> <a href="/b">Вторая</a> <a href="/c">Третья</a>"#,
    )
    .await;
    mount_page(server, "/a", "Первая заметка", "<p>Кот, кот и кот гуляют во дворе</p>").await;
    mount_page(server, "/b", "Вторая заметка", "<p>Кот спит на диване</p>").await;
    mount_page(server, "/c", "Собака", "<p>Собака громко лает</p>").await;
}

async fn indexed_api(servers: &[(&MockServer, &str)]) -> SearchApi {
    let uris: Vec<String> = servers.iter().map(|(server, _)| server.uri()).collect();
    let sites: Vec<(&str, &str)> = uris
        .iter()
        .zip(servers)
        .map(|(uri, (_, name))| (uri.as_str(), *name))
        .collect();

    let (api, _storage) = test_api(test_config(&sites));
    assert!(api.start_indexing().await.ok);
    wait_idle(&api).await;
    api
}

#[tokio::test]
async fn test_search_ranks_pages_by_weight() {
    let mock_server = MockServer::start().await;
    mount_cat_site(&mock_server).await;
    let api = indexed_api(&[(&mock_server, "Коты")]).await;

    let response = api.search("кот", None, 0, 20);
    assert!(response.ok, "search failed: {:?}", response.error_message);
    assert_eq!(response.count, 2);

    let first = &response.items[0];
    assert_eq!(first.uri, "/a");
    assert_eq!(first.title, "Первая заметка");
    assert_eq!(first.site_name, "Коты");
    assert!((first.relevance - 1.0).abs() < 1e-9);
    assert!(first.snippet.contains("<b>"));

    let second = &response.items[1];
    assert_eq!(second.uri, "/b");
    assert!((second.relevance - 1.0 / 3.0).abs() < 1e-3);
}

#[tokio::test]
async fn test_search_pagination_reports_full_count() {
    let mock_server = MockServer::start().await;
    mount_cat_site(&mock_server).await;
    let api = indexed_api(&[(&mock_server, "Коты")]).await;

    let response = api.search("кот", None, 1, 1);
    assert!(response.ok);
    assert_eq!(response.count, 2);
    assert_eq!(response.items.len(), 1);
    assert_eq!(response.items[0].uri, "/b");

    let past_end = api.search("кот", None, 5, 10);
    assert_eq!(past_end.count, 2);
    assert!(past_end.items.is_empty());
}

#[tokio::test]
async fn test_search_requires_every_lemma() {
    let mock_server = MockServer::start().await;
    mount_cat_site(&mock_server).await;
    let api = indexed_api(&[(&mock_server, "Коты")]).await;

    let both = api.search("кот спит", None, 0, 20);
    assert!(both.ok);
    assert_eq!(both.count, 1);
    assert_eq!(both.items[0].uri, "/b");

    let unknown = api.search("кот жираф", None, 0, 20);
    assert!(unknown.ok);
    assert_eq!(unknown.count, 0);
    assert!(unknown.items.is_empty());
}

#[tokio::test]
async fn test_search_site_filter() {
    let cats = MockServer::start().await;
    let dogs = MockServer::start().await;
    mount_cat_site(&cats).await;
    mount_page(&dogs, "/", "Псы", r#"<a href="/kot">Сосед</a>"#).await;
    mount_page(&dogs, "/kot", "Соседи", "<p>Соседский кот дразнит собаку</p>").await;

    let api = indexed_api(&[(&cats, "Коты"), (&dogs, "Собаки")]).await;

    let everywhere = api.search("кот", None, 0, 20);
    assert_eq!(everywhere.count, 3);

    let filtered = api.search("кот", Some(&format!("{}/", dogs.uri())), 0, 20);
    assert!(filtered.ok, "search failed: {:?}", filtered.error_message);
    assert_eq!(filtered.count, 1);
    assert_eq!(filtered.items[0].site_name, "Собаки");
    assert_eq!(filtered.items[0].uri, "/kot");

    let unknown = api.search("кот", Some("https://unknown.example"), 0, 20);
    assert!(!unknown.ok);
    assert_eq!(
        unknown.error_message.as_deref(),
        Some("Selected site is not indexed")
    );
}

#[tokio::test]
async fn test_search_errors_before_indexing() {
    let (api, _storage) = test_api(test_config(&[("https://example.com", "Example")]));

    let empty = api.search("   ", None, 0, 20);
    assert!(!empty.ok);
    assert_eq!(empty.error_message.as_deref(), Some("Search query is empty"));

    let nothing = api.search("кот", None, 0, 20);
    assert!(!nothing.ok);
    assert_eq!(nothing.error_message.as_deref(), Some("No indexed sites"));
}
