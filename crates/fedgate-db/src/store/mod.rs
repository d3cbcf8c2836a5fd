//! Directory store trait and shared query types.
//!
//! The store is the single shared resource of the system. Components hold an
//! explicit `Arc<dyn DirectoryStore>` handle; every trait method is one
//! logical unit of work, committed atomically by the implementation.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DirectoryError;
use crate::models::{DirectoryGroup, DirectoryUser, GroupMember};

/// 1-based pagination window.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    /// 1-based index of the first item.
    pub start_index: i64,
    /// Number of items to return.
    pub count: i64,
}

impl Page {
    /// Create a page, clamping `start_index` to >= 1 and `count` to >= 0.
    #[must_use]
    pub fn new(start_index: i64, count: i64) -> Self {
        Self {
            start_index: start_index.max(1),
            count: count.max(0),
        }
    }

    /// 0-based offset for the window.
    #[must_use]
    pub fn offset(&self) -> i64 {
        self.start_index - 1
    }
}

/// One page of results plus the unpaged total.
#[derive(Debug, Clone)]
pub struct PageOf<T> {
    pub total: i64,
    pub items: Vec<T>,
}

/// Recognized user list predicates.
///
/// The protocol whitelists a single filter form; anything else degrades to
/// `All` before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserQuery {
    All,
    /// Exact, case-sensitive username equality.
    UserNameEq(String),
}

/// Fields for a new user record.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub user_name: String,
    pub external_id: Option<String>,
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub active: bool,
}

/// Full overwrite of a user's mutable fields.
///
/// Callers load the record, mutate a working copy, and commit the final
/// field set in one call; the store bumps `updated_at`.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub user_name: String,
    pub external_id: Option<String>,
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub active: bool,
}

impl From<&DirectoryUser> for UserUpdate {
    fn from(user: &DirectoryUser) -> Self {
        Self {
            user_name: user.user_name.clone(),
            external_id: user.external_id.clone(),
            email: user.email.clone(),
            given_name: user.given_name.clone(),
            family_name: user.family_name.clone(),
            active: user.active,
        }
    }
}

/// Fields for a new group record.
#[derive(Debug, Clone, Default)]
pub struct NewGroup {
    pub display_name: String,
    pub external_id: Option<String>,
    /// Initial members; ids that resolve to no user are silently dropped.
    pub member_ids: Vec<Uuid>,
}

/// Full overwrite of a group's mutable fields.
#[derive(Debug, Clone)]
pub struct GroupUpdate {
    pub display_name: String,
    pub external_id: Option<String>,
}

impl From<&DirectoryGroup> for GroupUpdate {
    fn from(group: &DirectoryGroup) -> Self {
        Self {
            display_name: group.display_name.clone(),
            external_id: group.external_id.clone(),
        }
    }
}

/// Membership change accompanying a group update.
///
/// Membership is a set: replacement deduplicates and drops ids that resolve
/// to no user.
#[derive(Debug, Clone)]
pub enum MembershipWrite {
    /// Leave memberships untouched.
    Keep,
    /// Replace the membership set wholesale.
    Replace(Vec<Uuid>),
}

/// Persistent directory of users, groups and memberships.
///
/// List ordering is creation-time ascending with the monotonic insertion
/// sequence as tie-break, so pages concatenate into the full creation order
/// with no duplicates or gaps.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    // -- users --

    /// Insert a new user. The store assigns id, timestamps and sequence.
    async fn create_user(&self, new: NewUser) -> Result<DirectoryUser, DirectoryError>;

    /// Look up a user by id.
    async fn get_user(&self, id: Uuid) -> Result<Option<DirectoryUser>, DirectoryError>;

    /// Look up a user by exact username (case-sensitive).
    async fn find_user_by_user_name(
        &self,
        user_name: &str,
    ) -> Result<Option<DirectoryUser>, DirectoryError>;

    /// All users whose email matches any candidate, case-insensitively.
    ///
    /// Candidates are expected lowercased. Active and inactive records are
    /// both returned; callers apply policy.
    async fn find_users_by_email(
        &self,
        candidates: &[String],
    ) -> Result<Vec<DirectoryUser>, DirectoryError>;

    /// List users matching `query`, creation-ordered, one page at a time.
    async fn list_users(
        &self,
        query: &UserQuery,
        page: Page,
    ) -> Result<PageOf<DirectoryUser>, DirectoryError>;

    /// Overwrite a user's mutable fields, bumping `updated_at`.
    ///
    /// Returns `None` when the id is unknown.
    async fn update_user(
        &self,
        id: Uuid,
        update: UserUpdate,
    ) -> Result<Option<DirectoryUser>, DirectoryError>;

    /// Delete a user and cascade its memberships. Returns false when the id
    /// is unknown.
    async fn delete_user(&self, id: Uuid) -> Result<bool, DirectoryError>;

    /// Set `last_login_at` to now. Does not touch `updated_at`. Returns
    /// false when the id is unknown.
    async fn touch_last_login(&self, id: Uuid) -> Result<bool, DirectoryError>;

    // -- groups --

    /// Insert a new group with its initial member set.
    async fn create_group(&self, new: NewGroup) -> Result<DirectoryGroup, DirectoryError>;

    /// Look up a group by id.
    async fn get_group(&self, id: Uuid) -> Result<Option<DirectoryGroup>, DirectoryError>;

    /// List groups, creation-ordered, one page at a time.
    async fn list_groups(&self, page: Page) -> Result<PageOf<DirectoryGroup>, DirectoryError>;

    /// Overwrite a group's mutable fields and optionally its membership set,
    /// as one commit. Returns `None` when the id is unknown.
    async fn update_group(
        &self,
        id: Uuid,
        update: GroupUpdate,
        members: MembershipWrite,
    ) -> Result<Option<DirectoryGroup>, DirectoryError>;

    /// Delete a group and cascade its memberships. Returns false when the id
    /// is unknown.
    async fn delete_group(&self, id: Uuid) -> Result<bool, DirectoryError>;

    /// Members of a group with their usernames, username-ordered.
    async fn group_members(&self, group_id: Uuid) -> Result<Vec<GroupMember>, DirectoryError>;

    /// Display names of the groups a user belongs to, name-ordered.
    async fn user_group_names(&self, user_id: Uuid) -> Result<Vec<String>, DirectoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_clamps() {
        let page = Page::new(0, -5);
        assert_eq!(page.start_index, 1);
        assert_eq!(page.count, 0);
        assert_eq!(page.offset(), 0);

        let page = Page::new(101, 50);
        assert_eq!(page.offset(), 100);
    }

    #[test]
    fn test_user_update_from_record() {
        let user = DirectoryUser {
            id: Uuid::new_v4(),
            user_name: "jdoe".to_string(),
            external_id: Some("ext-1".to_string()),
            email: Some("jdoe@example.com".to_string()),
            given_name: None,
            family_name: None,
            active: true,
            created_at: chrono::Utc::now(),
            created_seq: 1,
            updated_at: chrono::Utc::now(),
            last_login_at: None,
        };
        let update = UserUpdate::from(&user);
        assert_eq!(update.user_name, "jdoe");
        assert_eq!(update.external_id.as_deref(), Some("ext-1"));
        assert!(update.active);
    }
}
