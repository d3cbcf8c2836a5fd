//! Directory user entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user record in the directory.
///
/// Users are created and mutated by the SCIM engine; the only write that
/// bypasses it is the gatekeeper's last-login touch, which sets
/// `last_login_at` without bumping `updated_at`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DirectoryUser {
    /// Unique identifier, server-assigned, immutable.
    pub id: Uuid,

    /// Unique username (compared case-sensitively).
    pub user_name: String,

    /// External ID supplied by the provisioning IdP. Opaque; never used for
    /// lookup.
    pub external_id: Option<String>,

    /// Email address. Binding key between SCIM provisioning and assertion
    /// sign-in; compared case-insensitively.
    pub email: Option<String>,

    /// Given name (first name).
    pub given_name: Option<String>,

    /// Family name (last name).
    pub family_name: Option<String>,

    /// Whether the user may sign in. Inactive users are invisible to the
    /// gatekeeper.
    pub active: bool,

    /// When the user was created.
    pub created_at: DateTime<Utc>,

    /// Monotonic insertion sequence; tie-break for equal `created_at`.
    pub created_seq: i64,

    /// When the user was last updated by a provisioning write.
    pub updated_at: DateTime<Utc>,

    /// When the user last signed in through an assertion (None until then).
    pub last_login_at: Option<DateTime<Utc>>,
}

impl DirectoryUser {
    /// Case-insensitive email comparison against a lowercased candidate.
    #[must_use]
    pub fn email_matches(&self, candidate_lower: &str) -> bool {
        self.email
            .as_deref()
            .is_some_and(|e| e.to_lowercase() == candidate_lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DirectoryUser {
        DirectoryUser {
            id: Uuid::new_v4(),
            user_name: "jdoe".to_string(),
            external_id: None,
            email: Some("John.Doe@Example.com".to_string()),
            given_name: Some("John".to_string()),
            family_name: Some("Doe".to_string()),
            active: true,
            created_at: Utc::now(),
            created_seq: 1,
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_email_matches_case_insensitive() {
        let user = sample();
        assert!(user.email_matches("john.doe@example.com"));
        assert!(!user.email_matches("other@example.com"));
    }

    #[test]
    fn test_email_matches_none() {
        let mut user = sample();
        user.email = None;
        assert!(!user.email_matches("john.doe@example.com"));
    }
}
