//! SCIM Bearer token authentication middleware.
//!
//! Authenticates every SCIM-root request against a static shared secret.
//! Contract: no configured secret means every call fails closed with a
//! server-configuration error; a missing or malformed Authorization header
//! gets a Bearer challenge; a mismatched token does not.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::ScimError;

/// Shared-secret configuration for the SCIM surface.
#[derive(Clone)]
pub struct BearerGuard {
    token: Option<Arc<str>>,
}

impl BearerGuard {
    /// Create a guard; `None` fails every request closed.
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.map(Arc::from),
        }
    }
}

/// Middleware enforcing the Bearer token contract on SCIM routes.
pub async fn bearer_guard(
    State(guard): State<BearerGuard>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ScimError> {
    let Some(expected) = guard.token.as_deref() else {
        tracing::error!("SCIM bearer token not configured; refusing protocol call");
        return Err(ScimError::NotConfigured);
    };

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(auth_header) = auth_header else {
        return Err(ScimError::AuthenticationRequired);
    };

    let scheme_matches = auth_header
        .get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("bearer "));
    if !scheme_matches {
        return Err(ScimError::AuthenticationRequired);
    }

    let token = auth_header[7..].trim();
    if token != expected {
        tracing::warn!("SCIM request with mismatched bearer token");
        return Err(ScimError::InvalidToken);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_without_secret_has_no_token() {
        let guard = BearerGuard::new(None);
        assert!(guard.token.is_none());
    }

    #[test]
    fn test_bearer_prefix_extraction() {
        let auth_header = "Bearer fg_scim_ABCDEFGHIJKLMNOP";
        let token = auth_header.strip_prefix("Bearer ");
        assert_eq!(token, Some("fg_scim_ABCDEFGHIJKLMNOP"));
    }
}
