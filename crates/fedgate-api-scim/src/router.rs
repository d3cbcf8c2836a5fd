//! SCIM 2.0 API router configuration

use axum::{middleware, routing::get, Extension, Router};
use std::sync::Arc;

use fedgate_db::DirectoryStore;

use crate::handlers::{groups, users};
use crate::middleware::auth::{bearer_guard, BearerGuard};
use crate::services::{GroupService, UserService};

/// Configuration for the SCIM router.
pub struct ScimConfig {
    /// Directory store handle.
    pub store: Arc<dyn DirectoryStore>,
    /// Static shared secret. `None` makes every protocol call fail closed.
    pub bearer_token: Option<String>,
}

impl ScimConfig {
    /// Create a SCIM router configuration.
    pub fn new(store: Arc<dyn DirectoryStore>, bearer_token: Option<String>) -> Self {
        Self {
            store,
            bearer_token,
        }
    }
}

/// Create the SCIM 2.0 resource router.
///
/// Mount at `/scim/v2`:
/// - GET/POST /Users
/// - GET/PUT/PATCH/DELETE /Users/{id}
/// - GET/POST /Groups
/// - GET/PUT/PATCH/DELETE /Groups/{id}
///
/// Every route requires the static Bearer token.
pub fn scim_router(config: ScimConfig) -> Router {
    let user_service = Arc::new(UserService::new(config.store.clone()));
    let group_service = Arc::new(GroupService::new(config.store));
    let guard = BearerGuard::new(config.bearer_token);

    Router::new()
        // User endpoints
        .route("/Users", get(users::list_users).post(users::create_user))
        .route(
            "/Users/{id}",
            get(users::get_user)
                .put(users::replace_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        // Group endpoints
        .route(
            "/Groups",
            get(groups::list_groups).post(groups::create_group),
        )
        .route(
            "/Groups/{id}",
            get(groups::get_group)
                .put(groups::replace_group)
                .patch(groups::update_group)
                .delete(groups::delete_group),
        )
        // Layers run outermost-last: services are attached before the guard
        // fires, the guard fires before any handler.
        .layer(middleware::from_fn_with_state(guard, bearer_guard))
        .layer(Extension(group_service))
        .layer(Extension(user_service))
}
