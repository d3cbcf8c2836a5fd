//! SCIM User resource schema (RFC 7643).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// SCIM User name component.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScimName {
    /// Formatted full name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,

    /// Family name (last name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,

    /// Given name (first name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
}

/// SCIM Email value.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScimEmail {
    /// Email address.
    pub value: String,

    /// Email type (e.g., "work", "home").
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub email_type: Option<String>,

    /// Whether this is the primary email.
    #[serde(default)]
    pub primary: bool,
}

/// SCIM Resource metadata.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScimMeta {
    /// Resource type (User or Group).
    pub resource_type: String,

    /// When the resource was created.
    pub created: DateTime<Utc>,

    /// When the resource was last modified.
    pub last_modified: DateTime<Utc>,

    /// Resource location URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// SCIM User resource (RFC 7643 Section 4.1).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScimUser {
    /// SCIM schemas.
    pub schemas: Vec<String>,

    /// Unique resource ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    /// External identifier from the provisioning IdP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    /// Unique username (typically email).
    pub user_name: String,

    /// User's name components.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<ScimName>,

    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Whether the user is active.
    #[serde(default = "default_active")]
    pub active: bool,

    /// User's email addresses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<ScimEmail>,

    /// Resource metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ScimMeta>,
}

fn default_active() -> bool {
    true
}

impl ScimUser {
    /// SCIM Core User schema URI.
    pub const SCHEMA: &'static str = "urn:ietf:params:scim:schemas:core:2.0:User";

    /// Create a new SCIM User with required fields.
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            schemas: vec![Self::SCHEMA.to_string()],
            id: None,
            external_id: None,
            user_name: user_name.into(),
            name: None,
            display_name: None,
            active: true,
            emails: vec![],
            meta: None,
        }
    }

    /// Get the primary email address, falling back to the first entry.
    #[must_use]
    pub fn primary_email(&self) -> Option<&str> {
        self.emails
            .iter()
            .find(|e| e.primary)
            .or(self.emails.first())
            .map(|e| e.value.as_str())
    }
}

/// Request to create a SCIM user.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateScimUserRequest {
    #[serde(default)]
    pub schemas: Vec<String>,
    pub user_name: String,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub name: Option<ScimName>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub emails: Vec<ScimEmail>,
}

impl CreateScimUserRequest {
    /// Get the primary email address, falling back to the first entry.
    #[must_use]
    pub fn primary_email(&self) -> Option<&str> {
        self.emails
            .iter()
            .find(|e| e.primary)
            .or(self.emails.first())
            .map(|e| e.value.as_str())
    }
}

/// Request to replace a SCIM user (PUT).
pub type ReplaceScimUserRequest = CreateScimUserRequest;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scim_user_new() {
        let user = ScimUser::new("john@example.com");

        assert_eq!(user.schemas.len(), 1);
        assert_eq!(user.schemas[0], ScimUser::SCHEMA);
        assert_eq!(user.user_name, "john@example.com");
        assert!(user.active);
    }

    #[test]
    fn test_primary_email() {
        let mut user = ScimUser::new("john@example.com");
        user.emails = vec![
            ScimEmail {
                value: "john@personal.com".to_string(),
                email_type: Some("home".to_string()),
                primary: false,
            },
            ScimEmail {
                value: "john@work.com".to_string(),
                email_type: Some("work".to_string()),
                primary: true,
            },
        ];

        assert_eq!(user.primary_email(), Some("john@work.com"));
    }

    #[test]
    fn test_primary_email_falls_back_to_first() {
        let mut user = ScimUser::new("john@example.com");
        user.emails = vec![ScimEmail {
            value: "john@personal.com".to_string(),
            email_type: None,
            primary: false,
        }];
        assert_eq!(user.primary_email(), Some("john@personal.com"));
    }

    #[test]
    fn test_deserialize_create_request() {
        let json = r#"{
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
            "userName": "john@example.com",
            "name": {
                "givenName": "John",
                "familyName": "Doe"
            },
            "active": true,
            "emails": [
                {
                    "value": "john@example.com",
                    "type": "work",
                    "primary": true
                }
            ]
        }"#;

        let user: CreateScimUserRequest = serde_json::from_str(json).unwrap();
        assert_eq!(user.user_name, "john@example.com");
        assert!(user.name.is_some());
        assert_eq!(user.emails.len(), 1);
    }

    #[test]
    fn test_active_defaults_to_true() {
        let json = r#"{"userName": "jdoe"}"#;
        let user: CreateScimUserRequest = serde_json::from_str(json).unwrap();
        assert!(user.active);
    }

    #[test]
    fn test_serialized_user_is_camel_case() {
        let mut user = ScimUser::new("jdoe");
        user.external_id = Some("ext-1".to_string());
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["userName"], "jdoe");
        assert_eq!(json["externalId"], "ext-1");
        // Absent optionals are omitted entirely.
        assert!(json.get("meta").is_none());
    }
}
