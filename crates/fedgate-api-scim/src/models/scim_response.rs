//! SCIM response and request envelope schemas (RFC 7644).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::scim_group::ScimGroup;
use super::scim_user::ScimUser;

/// SCIM List Response (RFC 7644 Section 3.4.2).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScimListResponse<T> {
    /// SCIM schemas.
    pub schemas: Vec<String>,

    /// Total number of results matching the query.
    pub total_results: i64,

    /// 1-based index of the first result in this page.
    pub start_index: i64,

    /// Number of items actually returned in this page.
    pub items_per_page: i64,

    /// The resources in this page.
    #[serde(rename = "Resources")]
    pub resources: Vec<T>,
}

impl<T> ScimListResponse<T> {
    /// SCIM List Response schema URI.
    pub const SCHEMA: &'static str = "urn:ietf:params:scim:api:messages:2.0:ListResponse";

    /// Create a new list response; `itemsPerPage` reflects the actual page.
    #[must_use]
    pub fn new(resources: Vec<T>, total_results: i64, start_index: i64) -> Self {
        Self {
            schemas: vec![Self::SCHEMA.to_string()],
            total_results,
            start_index,
            items_per_page: resources.len() as i64,
            resources,
        }
    }
}

/// Type alias for user list response.
pub type ScimUserListResponse = ScimListResponse<ScimUser>;

/// Type alias for group list response.
pub type ScimGroupListResponse = ScimListResponse<ScimGroup>;

/// SCIM PATCH operation (RFC 7644 Section 3.5.2).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScimPatchOp {
    /// Operation type: add, remove, or replace.
    pub op: String,

    /// Attribute path (e.g., "displayName", "members[value eq \"123\"]").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Value to set (for add/replace operations).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// SCIM PATCH request (RFC 7644 Section 3.5.2).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScimPatchRequest {
    /// SCIM schemas.
    pub schemas: Vec<String>,

    /// Operations to perform, in order.
    #[serde(rename = "Operations", default)]
    pub operations: Vec<ScimPatchOp>,
}

impl ScimPatchRequest {
    /// SCIM Patch Operation schema URI.
    pub const SCHEMA: &'static str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";

    /// Validate the request envelope.
    ///
    /// Only the schema URN is checked here; unrecognized operations inside
    /// the request degrade to no-ops at interpretation time instead of
    /// failing the request.
    pub fn validate(&self) -> Result<(), String> {
        if !self.schemas.iter().any(|s| s == Self::SCHEMA) {
            return Err("Missing PatchOp schema".to_string());
        }
        Ok(())
    }
}

/// Pagination parameters from the query string.
#[derive(Debug, Clone, Copy, ToSchema)]
pub struct ScimPagination {
    /// 1-based start index.
    pub start_index: i64,
    /// Items per page.
    pub count: i64,
}

impl ScimPagination {
    /// Default items per page when `count` is absent.
    pub const DEFAULT_COUNT: i64 = 100;

    /// Create pagination from query parameters.
    #[must_use]
    pub fn from_query(start_index: Option<i64>, count: Option<i64>) -> Self {
        Self {
            start_index: start_index.unwrap_or(1).max(1),
            count: count.unwrap_or(Self::DEFAULT_COUNT).max(0),
        }
    }

    /// Convert to a store page.
    #[must_use]
    pub fn page(&self) -> fedgate_db::Page {
        fedgate_db::Page::new(self.start_index, self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_response_counts_returned_items() {
        let users = vec![ScimUser::new("a"), ScimUser::new("b")];
        let response = ScimListResponse::new(users, 100, 1);

        assert_eq!(response.schemas.len(), 1);
        assert_eq!(response.total_results, 100);
        assert_eq!(response.start_index, 1);
        assert_eq!(response.items_per_page, 2);
    }

    #[test]
    fn test_patch_request_validation() {
        let valid = ScimPatchRequest {
            schemas: vec![ScimPatchRequest::SCHEMA.to_string()],
            operations: vec![ScimPatchOp {
                op: "replace".to_string(),
                path: Some("displayName".to_string()),
                value: Some(serde_json::json!("New Name")),
            }],
        };
        assert!(valid.validate().is_ok());

        let missing_schema = ScimPatchRequest {
            schemas: vec![],
            operations: vec![],
        };
        assert!(missing_schema.validate().is_err());
    }

    #[test]
    fn test_pagination_defaults() {
        let p = ScimPagination::from_query(None, None);
        assert_eq!(p.start_index, 1);
        assert_eq!(p.count, 100);

        let p = ScimPagination::from_query(Some(101), Some(50));
        assert_eq!(p.start_index, 101);
        assert_eq!(p.count, 50);

        // Out-of-range values clamp instead of failing.
        let p = ScimPagination::from_query(Some(-3), Some(-1));
        assert_eq!(p.start_index, 1);
        assert_eq!(p.count, 0);
    }

    #[test]
    fn test_resources_key_is_capitalized() {
        let response: ScimUserListResponse = ScimListResponse::new(vec![], 0, 1);
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("Resources").is_some());
        assert!(json.get("totalResults").is_some());
    }
}
