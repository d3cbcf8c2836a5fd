//! Per-request identity gatekeeper middleware.
//!
//! Runs after the assertion-authentication collaborator has established the
//! session and before application handlers. Requests on infrastructure
//! paths, and requests without an established session, pass through
//! untouched; session enforcement itself belongs to the collaborator.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use fedgate_db::{DirectoryStore, DirectoryUser};

use crate::claims::ClaimSet;
use crate::last_login::LoginTouchHandle;
use crate::resolver::{IdentityResolver, Resolution};

/// The validated session established by the assertion layer, delivered as a
/// request extension.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The principal's validated claim set.
    pub claims: ClaimSet,
}

/// The directory identity bound to the request, inserted for downstream
/// handlers once the gatekeeper allows it.
#[derive(Debug, Clone)]
pub struct DirectoryIdentity {
    pub user: DirectoryUser,
}

/// Gatekeeper configuration.
#[derive(Debug, Clone)]
pub struct GatekeeperConfig {
    /// Redirect target on denial.
    pub denied_path: String,
    /// Session cookie expired on denial (sign-out).
    pub session_cookie: String,
    /// Path prefixes excluded from the identity check: protocol endpoints,
    /// health check, login and denial pages, static assets.
    pub skip_prefixes: Vec<String>,
    /// Path suffixes excluded from the identity check (static assets).
    pub skip_suffixes: Vec<String>,
}

impl Default for GatekeeperConfig {
    fn default() -> Self {
        Self {
            denied_path: "/access-denied".to_string(),
            session_cookie: "session".to_string(),
            skip_prefixes: vec![
                "/login".to_string(),
                "/login-success".to_string(),
                "/access-denied".to_string(),
                "/saml".to_string(),
                "/scim".to_string(),
                "/health".to_string(),
                "/assets".to_string(),
                "/css".to_string(),
                "/js".to_string(),
                "/lib".to_string(),
            ],
            skip_suffixes: vec![".css".to_string(), ".js".to_string(), ".map".to_string()],
        }
    }
}

/// Middleware state binding resolver, config and the touch queue.
#[derive(Clone)]
pub struct Gatekeeper {
    config: Arc<GatekeeperConfig>,
    resolver: Arc<IdentityResolver>,
    touch: LoginTouchHandle,
}

impl Gatekeeper {
    pub fn new(
        store: Arc<dyn DirectoryStore>,
        config: GatekeeperConfig,
        touch: LoginTouchHandle,
    ) -> Self {
        Self {
            config: Arc::new(config),
            resolver: Arc::new(IdentityResolver::new(store)),
            touch,
        }
    }

    fn skips(&self, path: &str) -> bool {
        self.config
            .skip_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
            || self
                .config
                .skip_suffixes
                .iter()
                .any(|suffix| path.ends_with(suffix.as_str()))
    }

    /// Deny: expire the session cookie and redirect to the denial page.
    /// The same response for every deny reason.
    fn deny_response(&self) -> Response {
        let cookie = format!(
            "{}=; Max-Age=0; Path=/; HttpOnly",
            self.config.session_cookie
        );
        let mut response = StatusCode::FOUND.into_response();
        response
            .headers_mut()
            .insert(header::LOCATION, self.config.denied_path.parse().unwrap());
        if let Ok(value) = cookie.parse() {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        response
    }
}

/// Gatekeeper middleware: bind the session to an active directory identity
/// or terminate it.
pub async fn gatekeeper_middleware(
    State(gatekeeper): State<Gatekeeper>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    if gatekeeper.skips(&path) {
        return next.run(req).await;
    }

    // No established session: authentication enforcement is the assertion
    // layer's job, not ours.
    let Some(session) = req.extensions().get::<AuthSession>().cloned() else {
        return next.run(req).await;
    };

    match gatekeeper.resolver.resolve(&session.claims).await {
        Ok(Resolution::Allowed(user)) => {
            // Never block the request on telemetry persistence.
            gatekeeper.touch.submit(user.id);
            req.extensions_mut().insert(DirectoryIdentity { user });
            next.run(req).await
        }
        Ok(Resolution::Denied(reason)) => {
            tracing::warn!(path = %path, reason = %reason, "Access denied; terminating session");
            gatekeeper.deny_response()
        }
        Err(err) => {
            tracing::error!(path = %path, error = %err, "Directory lookup failed during gatekeeping");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}
