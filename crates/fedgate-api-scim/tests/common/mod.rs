//! Common test utilities for the SCIM API tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use fedgate_api_scim::router::{scim_router, ScimConfig};
use fedgate_db::{DirectoryStore, MemoryDirectory, NewUser};

/// Shared secret used by the test router.
pub const TOKEN: &str = "fg_scim_test_token";

/// Build a router over a fresh in-memory directory.
pub fn test_app() -> (Router, Arc<MemoryDirectory>) {
    let store = Arc::new(MemoryDirectory::new());
    let router = scim_router(ScimConfig::new(store.clone(), Some(TOKEN.to_string())));
    (router, store)
}

/// Build a router with no shared secret configured.
pub fn unconfigured_app() -> Router {
    let store: Arc<MemoryDirectory> = Arc::new(MemoryDirectory::new());
    scim_router(ScimConfig::new(store, None))
}

/// Send an authenticated request and return status + parsed body.
pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    send_with_token(router, method, uri, body, Some(TOKEN)).await
}

/// Send a request with an explicit (or absent) bearer token.
pub async fn send_with_token(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
    token: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let response = raw_response(router, method, uri, body, token).await;
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Send a request and return the raw response (for header assertions).
pub async fn raw_response(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
    token: Option<&str>,
) -> axum::response::Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, "idm.example.com");

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/scim+json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    router.clone().oneshot(request).await.unwrap()
}

/// Seed a directory user, returning its id.
pub async fn seed_user(store: &MemoryDirectory, user_name: &str) -> uuid::Uuid {
    store
        .create_user(NewUser {
            user_name: user_name.to_string(),
            email: Some(format!("{user_name}@example.com")),
            active: true,
            ..NewUser::default()
        })
        .await
        .unwrap()
        .id
}
