//! SCIM Group resource schema (RFC 7643).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::scim_user::ScimMeta;

/// SCIM Group member reference.
///
/// `value` stays a string on the wire: member ids that do not parse as ids
/// of existing users are silently dropped rather than rejected, so a typed
/// field (failing at deserialization) would be wrong here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScimGroupMember {
    /// Member user ID.
    pub value: String,

    /// Member display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl ScimGroupMember {
    /// Parse the member id, leniently.
    #[must_use]
    pub fn user_id(&self) -> Option<Uuid> {
        self.value.parse().ok()
    }
}

/// SCIM Group resource (RFC 7643 Section 4.2).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScimGroup {
    /// SCIM schemas.
    pub schemas: Vec<String>,

    /// Unique resource ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    /// External identifier from the provisioning IdP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    /// Group display name.
    pub display_name: String,

    /// Group members.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<ScimGroupMember>,

    /// Resource metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ScimMeta>,
}

impl ScimGroup {
    /// SCIM Core Group schema URI.
    pub const SCHEMA: &'static str = "urn:ietf:params:scim:schemas:core:2.0:Group";

    /// Create a new SCIM Group with required fields.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            schemas: vec![Self::SCHEMA.to_string()],
            id: None,
            external_id: None,
            display_name: display_name.into(),
            members: vec![],
            meta: None,
        }
    }

    /// Member ids that parse; the rest drop out.
    #[must_use]
    pub fn member_ids(&self) -> Vec<Uuid> {
        self.members.iter().filter_map(ScimGroupMember::user_id).collect()
    }
}

/// Request to create a SCIM group.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateScimGroupRequest {
    #[serde(default)]
    pub schemas: Vec<String>,
    pub display_name: String,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub members: Vec<ScimGroupMember>,
}

impl CreateScimGroupRequest {
    /// Member ids that parse; the rest drop out.
    #[must_use]
    pub fn member_ids(&self) -> Vec<Uuid> {
        self.members.iter().filter_map(ScimGroupMember::user_id).collect()
    }
}

/// Request to replace a SCIM group (PUT).
pub type ReplaceScimGroupRequest = CreateScimGroupRequest;
