//! SCIM Group resource handlers.

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
use crate::models::{CreateScimGroupRequest, ScimGroup, ScimPagination, ScimPatchRequest};
use crate::services::GroupService;

/// Query parameters for list groups.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGroupsQuery {
    start_index: Option<i64>,
    count: Option<i64>,
}

fn parse_id(id: &str) -> Result<Uuid, ScimError> {
    id.parse().map_err(|_| ScimError::NotFound("Group"))
}

/// List groups.
///
/// GET /scim/v2/Groups
#[utoipa::path(
    get,
    path = "/scim/v2/Groups",
    responses(
        (status = 200, description = "List of SCIM groups"),
        (status = 401, description = "Not authenticated"),
    ),
    tag = "SCIM Groups"
)]
pub async fn list_groups(
    Extension(group_service): Extension<Arc<GroupService>>,
    headers: HeaderMap,
    Query(query): Query<ListGroupsQuery>,
) -> Result<Response, ScimError> {
    let pagination = ScimPagination::from_query(query.start_index, query.count);
    let base_url = request_base_url(&headers);

    let response = group_service.list_groups(pagination, &base_url).await?;
    Ok(scim_response(StatusCode::OK, response))
}

/// Get a group by ID.
///
/// GET /scim/v2/Groups/{id}
#[utoipa::path(
    get,
    path = "/scim/v2/Groups/{id}",
    responses(
        (status = 200, description = "SCIM group", body = ScimGroup),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Group not found"),
    ),
    tag = "SCIM Groups"
)]
pub async fn get_group(
    Extension(group_service): Extension<Arc<GroupService>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, ScimError> {
    let group_id = parse_id(&id)?;
    let base_url = request_base_url(&headers);

    let group = group_service.get_group(group_id, &base_url).await?;
    Ok(scim_response(StatusCode::OK, group))
}

/// Create a new group.
///
/// POST /scim/v2/Groups
#[utoipa::path(
    post,
    path = "/scim/v2/Groups",
    request_body = CreateScimGroupRequest,
    responses(
        (status = 201, description = "Group created", body = ScimGroup),
        (status = 401, description = "Not authenticated"),
    ),
    tag = "SCIM Groups"
)]
pub async fn create_group(
    Extension(group_service): Extension<Arc<GroupService>>,
    headers: HeaderMap,
    Json(request): Json<CreateScimGroupRequest>,
) -> Result<Response, ScimError> {
    let base_url = request_base_url(&headers);
    let group = group_service.create_group(request, &base_url).await?;

    let location = group
        .meta
        .as_ref()
        .and_then(|m| m.location.clone())
        .unwrap_or_default();

    let mut response = scim_response(StatusCode::CREATED, group);
    if let Ok(value) = location.parse() {
        response.headers_mut().insert(header::LOCATION, value);
    }
    Ok(response)
}

/// Replace a group (full update). Membership is replaced wholesale.
///
/// PUT /scim/v2/Groups/{id}
#[utoipa::path(
    put,
    path = "/scim/v2/Groups/{id}",
    request_body = CreateScimGroupRequest,
    responses(
        (status = 200, description = "Group replaced", body = ScimGroup),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Group not found"),
    ),
    tag = "SCIM Groups"
)]
pub async fn replace_group(
    Extension(group_service): Extension<Arc<GroupService>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<CreateScimGroupRequest>,
) -> Result<Response, ScimError> {
    let group_id = parse_id(&id)?;
    let base_url = request_base_url(&headers);

    let group = group_service
        .replace_group(group_id, request, &base_url)
        .await?;
    Ok(scim_response(StatusCode::OK, group))
}

/// Patch a group (partial update).
///
/// PATCH /scim/v2/Groups/{id}
#[utoipa::path(
    patch,
    path = "/scim/v2/Groups/{id}",
    request_body = ScimPatchRequest,
    responses(
        (status = 200, description = "Group updated", body = ScimGroup),
        (status = 400, description = "Invalid patch request"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Group not found"),
    ),
    tag = "SCIM Groups"
)]
pub async fn update_group(
    Extension(group_service): Extension<Arc<GroupService>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<ScimPatchRequest>,
) -> Result<Response, ScimError> {
    let group_id = parse_id(&id)?;
    let base_url = request_base_url(&headers);

    let group = group_service
        .patch_group(group_id, request, &base_url)
        .await?;
    Ok(scim_response(StatusCode::OK, group))
}

/// Delete a group.
///
/// DELETE /scim/v2/Groups/{id}
#[utoipa::path(
    delete,
    path = "/scim/v2/Groups/{id}",
    responses(
        (status = 204, description = "Group deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Group not found"),
    ),
    tag = "SCIM Groups"
)]
pub async fn delete_group(
    Extension(group_service): Extension<Arc<GroupService>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ScimError> {
    let group_id = parse_id(&id)?;
    group_service.delete_group(group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
