use serde_json::json;
use skimmer_common::SkimmerError;
use skimmer_web::{BraveClient, BraveSettings, SearchClient};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> BraveClient {
    BraveClient::new(&BraveSettings {
        endpoint: server.uri(),
        auth_token: Some("brave-token".into()),
    })
    .unwrap()
}

#[tokio::test]
async fn returns_web_results_in_provider_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .and(query_param("q", "election results 2024"))
        .and(header("x-subscription-token", "brave-token"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "search",
            "web": {
                "type": "search",
                "results": [
                    {"title": "First", "url": "https://a.example/", "description": "one"},
                    {"title": "Second", "url": "https://b.example/", "page_age": "2024-11-06"}
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = client_for(&server)
        .search("election   results 2024")
        .await
        .unwrap();

    let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second"]);
    assert_eq!(results[0].description.as_deref(), Some("one"));
    assert_eq!(results[1].extra["page_age"], "2024-11-06");
}

#[tokio::test]
async fn zero_matches_is_empty_not_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "search",
            "query": {"original": "zzqqxx"}
        })))
        .mount(&server)
        .await;

    let results = client_for(&server).search("zzqqxx").await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn non_success_status_is_request_error_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "type": "ErrorResponse",
            "error": {"code": "RATE_LIMITED", "detail": "Request rate limit exceeded"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).search("anything").await.unwrap_err();
    assert!(matches!(err, SkimmerError::Request(ref m) if m.contains("429")));
}
