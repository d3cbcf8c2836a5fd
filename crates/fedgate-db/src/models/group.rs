//! Directory group entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A group record in the directory.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DirectoryGroup {
    /// Unique identifier, server-assigned, immutable.
    pub id: Uuid,

    /// External ID supplied by the provisioning IdP.
    pub external_id: Option<String>,

    /// Group display name.
    pub display_name: String,

    /// When the group was created.
    pub created_at: DateTime<Utc>,

    /// Monotonic insertion sequence; tie-break for equal `created_at`.
    pub created_seq: i64,

    /// When the group was last updated by a provisioning write.
    pub updated_at: DateTime<Utc>,
}

/// Membership row joined with the member's username, for wire responses.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct GroupMember {
    pub user_id: Uuid,
    pub user_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_member_fields() {
        let member = GroupMember {
            user_id: Uuid::new_v4(),
            user_name: "jdoe".to_string(),
        };
        assert_eq!(member.user_name, "jdoe");
    }
}
