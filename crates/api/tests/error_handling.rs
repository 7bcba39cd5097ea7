//! Error envelope shape for the main failure classes.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, login, post_json, post_json_auth, AGENT_EMAIL};
use serde_json::json;

#[tokio::test]
async fn missing_token_is_401_with_envelope() {
    let app = common::build_test_app().await;
    let response = get(&app.router, "/api/v1/documents").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "UNAUTHORIZED");
    assert!(json["error"]["message"].is_string());
}

#[tokio::test]
async fn garbage_token_is_401() {
    let app = common::build_test_app().await;
    let response = get_auth(&app.router, "/api/v1/templates", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_document_is_404() {
    let app = common::build_test_app().await;
    let token = login(&app.router, AGENT_EMAIL).await;

    let uri = format!("/api/v1/documents/{}", uuid::Uuid::new_v4());
    let response = get_auth(&app.router, &uri, &token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn invalid_transaction_id_is_a_validation_error() {
    let app = common::build_test_app().await;
    let token = login(&app.router, AGENT_EMAIL).await;

    let body = json!({ "templateCode": "RPA", "transactionId": "../escape", "fields": {} });
    let response = post_json_auth(&app.router, "/api/v1/documents/generate", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn missing_body_field_is_400_with_envelope() {
    let app = common::build_test_app().await;
    let token = login(&app.router, AGENT_EMAIL).await;

    let body = json!({ "fields": {} });
    let response = post_json_auth(&app.router, "/api/v1/documents/generate", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("templateCode"));
}

#[tokio::test]
async fn malformed_login_body_is_400_with_envelope() {
    let app = common::build_test_app().await;
    let response = post_json(&app.router, "/api/v1/auth/login", json!(["not", "an", "object"])).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn non_uuid_document_id_is_400_with_envelope() {
    let app = common::build_test_app().await;
    let token = login(&app.router, AGENT_EMAIL).await;

    let response = get_auth(&app.router, "/api/v1/documents/not-a-uuid", &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn bad_pagination_query_is_400_with_envelope() {
    let app = common::build_test_app().await;
    let token = login(&app.router, AGENT_EMAIL).await;

    let response = get_auth(&app.router, "/api/v1/documents?limit=lots", &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn failed_generation_leaves_no_draft_behind() {
    let app = common::build_test_app_with(|config| {
        // A regular file where the storage directory should be.
        let blocker = config.storage.local_dir.with_file_name("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        config.storage.local_dir = blocker;
    })
    .await;
    let token = login(&app.router, AGENT_EMAIL).await;

    let body = json!({ "templateCode": "RPA", "fields": { "buyerName": "Jane Buyer" } });
    let response = post_json_auth(&app.router, "/api/v1/documents/generate", body, &token).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "STORAGE_ERROR");

    let response = get_auth(&app.router, "/api/v1/documents", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 0);
}
