//! Administration read surface.
//!
//! Admin rights come from the assertion's role claims; the directory itself
//! carries no role model.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fedgate_db::{DirectoryError, DirectoryStore, Page, UserQuery};

use crate::claims::{has_role, ClaimSet};

/// Role value granting access to the admin surface.
pub const ADMIN_ROLE: &str = "Admin";

/// Whether the principal's claim set grants admin access.
#[must_use]
pub fn is_admin(claims: &ClaimSet) -> bool {
    has_role(claims, ADMIN_ROLE)
}

/// Admin view of a directory user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: Uuid,
    pub user_name: String,
    pub external_id: Option<String>,
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub groups: Vec<String>,
}

/// Read-side accessor for the admin pages.
pub struct AdminService {
    store: Arc<dyn DirectoryStore>,
}

impl AdminService {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    /// All directory users with their group names, newest first.
    pub async fn list_users(&self) -> Result<Vec<AdminUser>, DirectoryError> {
        let page = self
            .store
            .list_users(&UserQuery::All, Page::new(1, i64::MAX))
            .await?;

        let mut users = Vec::with_capacity(page.items.len());
        for user in page.items.into_iter().rev() {
            let groups = self.store.user_group_names(user.id).await?;
            users.push(AdminUser {
                id: user.id,
                user_name: user.user_name,
                external_id: user.external_id,
                email: user.email,
                given_name: user.given_name,
                family_name: user.family_name,
                active: user.active,
                created_at: user.created_at,
                last_login_at: user.last_login_at,
                groups,
            });
        }
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedgate_db::{MemoryDirectory, NewUser};

    #[test]
    fn test_is_admin_from_role_claim() {
        let claims: ClaimSet = [("role", "admin")].into_iter().collect();
        assert!(is_admin(&claims));

        let claims: ClaimSet = [("role", "Viewer")].into_iter().collect();
        assert!(!is_admin(&claims));
    }

    #[tokio::test]
    async fn test_list_users_newest_first() {
        let store = Arc::new(MemoryDirectory::new());
        for name in ["first", "second", "third"] {
            store
                .create_user(NewUser {
                    user_name: name.to_string(),
                    active: true,
                    ..NewUser::default()
                })
                .await
                .unwrap();
        }

        let service = AdminService::new(store);
        let users = service.list_users().await.unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.user_name.as_str()).collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }
}
