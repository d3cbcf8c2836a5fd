//! SCIM User resource handlers.

use axum::{
    extract::{Path, Query},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ScimError;
use crate::handlers::common::{request_base_url, scim_response};
use crate::models::{CreateScimUserRequest, ScimPagination, ScimPatchRequest, ScimUser};
use crate::services::UserService;

/// Query parameters for list users.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    filter: Option<String>,
    start_index: Option<i64>,
    count: Option<i64>,
}

/// Resource ids arrive as opaque path segments; anything that does not parse
/// can only be an unknown resource.
fn parse_id(id: &str, resource: &'static str) -> Result<Uuid, ScimError> {
    id.parse().map_err(|_| ScimError::NotFound(resource))
}

/// List users with optional filtering.
///
/// GET /scim/v2/Users
#[utoipa::path(
    get,
    path = "/scim/v2/Users",
    responses(
        (status = 200, description = "List of SCIM users"),
        (status = 401, description = "Not authenticated"),
    ),
    tag = "SCIM Users"
)]
pub async fn list_users(
    Extension(user_service): Extension<Arc<UserService>>,
    headers: HeaderMap,
    Query(query): Query<ListUsersQuery>,
) -> Result<Response, ScimError> {
    let pagination = ScimPagination::from_query(query.start_index, query.count);
    let base_url = request_base_url(&headers);

    let response = user_service
        .list_users(query.filter.as_deref(), pagination, &base_url)
        .await?;

    Ok(scim_response(StatusCode::OK, response))
}

/// Get a user by ID.
///
/// GET /scim/v2/Users/{id}
#[utoipa::path(
    get,
    path = "/scim/v2/Users/{id}",
    responses(
        (status = 200, description = "SCIM user", body = ScimUser),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found"),
    ),
    tag = "SCIM Users"
)]
pub async fn get_user(
    Extension(user_service): Extension<Arc<UserService>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, ScimError> {
    let user_id = parse_id(&id, "User")?;
    let base_url = request_base_url(&headers);

    let user = user_service.get_user(user_id, &base_url).await?;
    Ok(scim_response(StatusCode::OK, user))
}

/// Create a new user.
///
/// POST /scim/v2/Users
#[utoipa::path(
    post,
    path = "/scim/v2/Users",
    request_body = CreateScimUserRequest,
    responses(
        (status = 201, description = "User created", body = ScimUser),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "User already exists"),
    ),
    tag = "SCIM Users"
)]
pub async fn create_user(
    Extension(user_service): Extension<Arc<UserService>>,
    headers: HeaderMap,
    Json(request): Json<CreateScimUserRequest>,
) -> Result<Response, ScimError> {
    let base_url = request_base_url(&headers);
    let user = user_service.create_user(request, &base_url).await?;

    let location = user
        .meta
        .as_ref()
        .and_then(|m| m.location.clone())
        .unwrap_or_default();

    let mut response = scim_response(StatusCode::CREATED, user);
    if let Ok(value) = location.parse() {
        response.headers_mut().insert(header::LOCATION, value);
    }
    Ok(response)
}

/// Replace a user (full update).
///
/// PUT /scim/v2/Users/{id}
#[utoipa::path(
    put,
    path = "/scim/v2/Users/{id}",
    request_body = CreateScimUserRequest,
    responses(
        (status = 200, description = "User replaced", body = ScimUser),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found"),
    ),
    tag = "SCIM Users"
)]
pub async fn replace_user(
    Extension(user_service): Extension<Arc<UserService>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<CreateScimUserRequest>,
) -> Result<Response, ScimError> {
    let user_id = parse_id(&id, "User")?;
    let base_url = request_base_url(&headers);

    let user = user_service
        .replace_user(user_id, request, &base_url)
        .await?;
    Ok(scim_response(StatusCode::OK, user))
}

/// Patch a user (partial update).
///
/// PATCH /scim/v2/Users/{id}
#[utoipa::path(
    patch,
    path = "/scim/v2/Users/{id}",
    request_body = ScimPatchRequest,
    responses(
        (status = 200, description = "User updated", body = ScimUser),
        (status = 400, description = "Invalid patch request"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found"),
    ),
    tag = "SCIM Users"
)]
pub async fn update_user(
    Extension(user_service): Extension<Arc<UserService>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<ScimPatchRequest>,
) -> Result<Response, ScimError> {
    let user_id = parse_id(&id, "User")?;
    let base_url = request_base_url(&headers);

    let user = user_service.patch_user(user_id, request, &base_url).await?;
    Ok(scim_response(StatusCode::OK, user))
}

/// Delete a user.
///
/// DELETE /scim/v2/Users/{id}
#[utoipa::path(
    delete,
    path = "/scim/v2/Users/{id}",
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found"),
    ),
    tag = "SCIM Users"
)]
pub async fn delete_user(
    Extension(user_service): Extension<Arc<UserService>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ScimError> {
    let user_id = parse_id(&id, "User")?;
    user_service.delete_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
