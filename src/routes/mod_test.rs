use super::*;
use axum::body::Body;
use axum::http::Request;
use axum::http::header::{AUTHORIZATION, CONTENT_DISPOSITION};
use tower::ServiceExt;

use crate::state::test_helpers::test_app_state;

async fn send(request: Request<Body>) -> axum::response::Response {
    app(test_app_state()).oneshot(request).await.unwrap()
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn healthz_is_ok() {
    assert_eq!(send(get_req("/healthz")).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn me_without_token_is_unauthorized() {
    assert_eq!(send(get_req("/api/auth/me")).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_require_a_session() {
    for uri in ["/api/admin/discovery/template.csv", "/api/admin/events", "/api/admin/registrations"] {
        assert_eq!(send(get_req(uri)).await.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn admin_route_with_token_but_no_provider_is_unavailable() {
    let request = Request::builder()
        .uri("/api/admin/discovery/template.csv")
        .header(AUTHORIZATION, "Bearer tok")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(request).await.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn review_create_requires_a_session() {
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/discovery/{}/reviews", uuid::Uuid::new_v4()))
        .header("content-type", "application/json")
        .body(Body::from(r#"{"rating":5}"#))
        .unwrap();
    assert_eq!(send(request).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn blank_admit_card_lookup_is_bad_request() {
    let response = send(get_req("/api/competition/admit-card?form_no=%20")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_result_lookup_is_bad_request() {
    assert_eq!(send(get_req("/api/competition/result")).await.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn registration_missing_fields_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/registrations")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"full_name":"Asha"}"#))
        .unwrap();
    assert_eq!(send(request).await.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_type_filter_is_bad_request() {
    assert_eq!(send(get_req("/api/discovery?type=zoo")).await.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_asset_is_not_found() {
    let response = send(get_req("/assets/answer-keys/does-not-exist.pdf")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(CONTENT_DISPOSITION).is_none());
}
