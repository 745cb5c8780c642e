use std::time::Duration;

use relay_engine::{FailureKind, JsonPassthrough};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn passthrough_returns_body_verbatim() {
    let server = MockServer::start().await;
    let body = json!({"userId": 1, "id": 1, "title": "hello", "tags": [null, true]});
    Mock::given(method("GET"))
        .and(path("/posts/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&server)
        .await;

    let passthrough = JsonPassthrough::new(Duration::from_secs(5), 1024 * 1024).expect("client");
    let fetched = passthrough
        .fetch(&format!("{}/posts/1", server.uri()))
        .await
        .expect("json");

    assert_eq!(fetched, body);
}

#[tokio::test]
async fn passthrough_rejects_bad_urls_and_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
        .mount(&server)
        .await;

    let passthrough = JsonPassthrough::new(Duration::from_secs(5), 1024).expect("client");

    let err = passthrough.fetch("not a url").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);

    let err = passthrough.fetch(&server.uri()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Parse);
}

#[tokio::test]
async fn passthrough_enforces_size_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[1,2,3,4,5,6,7,8,9,10]"))
        .mount(&server)
        .await;

    let passthrough = JsonPassthrough::new(Duration::from_secs(5), 8).expect("client");
    let err = passthrough.fetch(&server.uri()).await.unwrap_err();

    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 8, .. }));
}

#[tokio::test]
async fn passthrough_forwards_json_error_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"err": "nf"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let passthrough = JsonPassthrough::new(Duration::from_secs(5), 1024).expect("client");

    let fetched = passthrough
        .fetch(&format!("{}/missing", server.uri()))
        .await
        .expect("json error body");
    assert_eq!(fetched, json!({"err": "nf"}));

    let err = passthrough
        .fetch(&format!("{}/broken", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(502));
}
