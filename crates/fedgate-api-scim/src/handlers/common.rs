//! Shared helpers for SCIM handlers.

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// SCIM content type header.
pub const SCIM_CONTENT_TYPE: &str = "application/scim+json";

/// Wrap response with SCIM content type.
pub fn scim_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    let json = Json(body);
    let mut response = (status, json).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(SCIM_CONTENT_TYPE),
    );
    response
}

/// Derive the externally visible base URL from the request's own headers.
///
/// Resource locations must reflect the scheme/host the caller used, not
/// server configuration, so provisioning keeps working behind any reverse
/// proxy. Forwarded headers are only trustworthy when the proxy in front
/// overwrites them; that guarantee belongs to the deployment, not to this
/// code.
pub fn request_base_url(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("http");

    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(header::HOST))
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("localhost");

    format!("{scheme}://{host}")
}
