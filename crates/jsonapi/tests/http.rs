//! HTTP tests for the listing routes.

mod common;

use axum::http::{StatusCode, header};
use axum_test::TestServer;
use serde_json::{Value, json};
use tessera_jsonapi::{MEDIA_TYPE, ServerConfig, create_app};

use common::fixtures::blog_api;

fn create_test_server() -> TestServer {
    let app = create_app(blog_api(), ServerConfig::for_testing());
    TestServer::new(app).expect("Failed to create test server")
}

#[tokio::test]
async fn test_list_returns_document() {
    let server = create_test_server();

    let response = server.get("/articles").await;

    response.assert_status_ok();
    assert_eq!(response.header(header::CONTENT_TYPE), MEDIA_TYPE);

    let body: Value = response.json();
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["data"][0]["type"], "articles");
    assert_eq!(body["data"][0]["attributes"]["title"], "Alpha");
    assert_eq!(body["meta"]["total"], 5);
    assert_eq!(body["links"]["self"], "http://example.com/articles");
    assert!(body.get("included").is_none());
}

#[tokio::test]
async fn test_list_with_query_parameters() {
    let server = create_test_server();

    let response = server
        .get("/articles")
        .add_query_param("filter[author]", "1")
        .add_query_param("include", "author")
        .add_query_param("page[limit]", "1")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"][0]["id"], "1");
    assert_eq!(
        body["included"],
        json!([{
            "type": "people",
            "id": "1",
            "attributes": {"name": "Ada"},
            "links": {"self": "http://example.com/people/1"}
        }])
    );
    assert_eq!(
        body["links"]["next"],
        "http://example.com/articles?filter%5Bauthor%5D=1&include=author&page%5Blimit%5D=1&page%5Boffset%5D=1"
    );
}

#[tokio::test]
async fn test_invalid_parameter_returns_error_document() {
    let server = create_test_server();

    let response = server
        .get("/articles")
        .add_query_param("sort", "author")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.header(header::CONTENT_TYPE), MEDIA_TYPE);

    let body: Value = response.json();
    let error = &body["errors"][0];
    assert_eq!(error["status"], "400");
    assert_eq!(error["detail"], "Invalid sort field [author]");
    assert_eq!(error["source"]["parameter"], "sort");
}

#[tokio::test]
async fn test_invalid_include_returns_400() {
    let server = create_test_server();

    let response = server
        .get("/articles")
        .add_query_param("include", "comments.body")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["source"]["parameter"], "include");
}

#[tokio::test]
async fn test_unknown_resource_type_returns_404() {
    let server = create_test_server();

    let response = server.get("/tags").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["status"], "404");
    assert!(body["errors"][0].get("source").is_none());
}

#[tokio::test]
async fn test_health() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["resource_types"], json!(["articles", "people", "comments"]));

    server.get("/_liveness").await.assert_status_ok();
}
