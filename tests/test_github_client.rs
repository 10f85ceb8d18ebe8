//! GitHub client behaviour against a mock REST server
//!
//! Covers the search parameters the catalog relies on, reply validation and
//! the classification of failures.

use mockito::Matcher;

use repo_catalog::github::{ApiError, RepositorySearchExecutor};
use repo_catalog::types::{RepositoryId, SearchQuery};
use test_util::{create_mock_github_client, repository_json, search_page_json};

#[tokio::test]
async fn test_search_sends_star_sorted_query() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search/repositories")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "stars:>1000 language:rust".into()),
            Matcher::UrlEncoded("sort".into(), "stars".into()),
            Matcher::UrlEncoded("order".into(), "desc".into()),
            Matcher::UrlEncoded("page".into(), "3".into()),
            Matcher::UrlEncoded("per_page".into(), "24".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(search_page_json(4321, 1, 24, 0).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = create_mock_github_client(&server.url());
    let batch = client
        .search_repositories(&SearchQuery::new("stars:>1000 language:rust"), 3, 24)
        .await
        .expect("search should succeed");

    mock.assert_async().await;
    assert_eq!(batch.total_count, 4321);
    assert_eq!(batch.received, 24);
    assert_eq!(batch.items.len(), 24);
    assert_eq!(batch.items[0].full_name, RepositoryId::new("acme", "tool-1"));
    assert_eq!(batch.items[0].topics, vec!["cli", "terminal"]);
}

#[tokio::test]
async fn test_search_drops_invalid_items_but_counts_them() {
    let mut server = mockito::Server::new_async().await;
    let body = serde_json::json!({
        "total_count": 3,
        "items": [
            repository_json(1, "acme/first", "First"),
            { "id": 2, "full_name": "missing-slash", "html_url": "https://github.com/x" },
            { "id": 3, "full_name": "acme/bad-url", "html_url": "javascript:alert(1)" }
        ]
    });
    server
        .mock("GET", "/search/repositories")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let client = create_mock_github_client(&server.url());
    let batch = client
        .search_repositories(&SearchQuery::new("stars:>1000"), 1, 24)
        .await
        .unwrap();

    assert_eq!(batch.received, 3);
    assert_eq!(batch.items.len(), 1);
    assert_eq!(batch.rejected(), 2);
}

#[tokio::test]
async fn test_search_without_items_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/search/repositories")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"total_count": 10}"#)
        .create_async()
        .await;

    let client = create_mock_github_client(&server.url());
    let result = client
        .search_repositories(&SearchQuery::new("stars:>1000"), 1, 24)
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_rate_limit_is_classified() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/search/repositories")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"message": "API rate limit exceeded for 127.0.0.1.", "documentation_url": "https://docs.github.com/rest/overview/resources-in-the-rest-api#rate-limiting"}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let client = create_mock_github_client(&server.url());
    let error = client
        .search_repositories(&SearchQuery::new("stars:>1000"), 1, 24)
        .await
        .expect_err("rate limited search must fail");

    // Not retried
    mock.assert_async().await;
    let api_error = error
        .downcast_ref::<ApiError>()
        .expect("error should carry the ApiError");
    assert!(api_error.is_rate_limit(), "unexpected error: {:?}", api_error);
}

#[tokio::test]
async fn test_server_error_is_classified() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/search/repositories")
        .match_query(Matcher::Any)
        .with_status(502)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Server Error"}"#)
        .create_async()
        .await;

    let client = create_mock_github_client(&server.url());
    let error = client
        .search_repositories(&SearchQuery::new("stars:>1000"), 1, 24)
        .await
        .unwrap_err();

    assert!(matches!(
        error.downcast_ref::<ApiError>(),
        Some(ApiError::Server(_))
    ));
}

#[tokio::test]
async fn test_fetch_repository() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/repos/excalidraw/excalidraw")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(repository_json(42, "excalidraw/excalidraw", "Virtual whiteboard").to_string())
        .create_async()
        .await;

    let client = create_mock_github_client(&server.url());
    let repository = client
        .fetch_repository(&RepositoryId::new("excalidraw", "excalidraw"))
        .await
        .unwrap();

    assert_eq!(repository.id, 42);
    assert_eq!(repository.name, "excalidraw");
    assert_eq!(repository.description(), Some("Virtual whiteboard"));
    assert_eq!(
        repository.html_url.as_str(),
        "https://github.com/excalidraw/excalidraw"
    );
}

#[tokio::test]
async fn test_fetch_repositories_skips_failures_and_keeps_order() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/repos/acme/one")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(repository_json(1, "acme/one", "One").to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/repos/acme/missing")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Not Found"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/repos/acme/three")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(repository_json(3, "acme/three", "Three").to_string())
        .create_async()
        .await;

    let client = create_mock_github_client(&server.url());
    let repositories = client
        .fetch_repositories(&[
            RepositoryId::new("acme", "one"),
            RepositoryId::new("acme", "missing"),
            RepositoryId::new("acme", "three"),
        ])
        .await;

    let ids: Vec<u64> = repositories.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3]);
}
