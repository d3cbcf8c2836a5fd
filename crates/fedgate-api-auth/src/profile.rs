//! Profile lookup for application display.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fedgate_db::{DirectoryError, DirectoryStore};

/// Profile view of a directory user, with group display names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_name: String,
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub groups: Vec<String>,
}

/// Read-side accessor for profile display.
pub struct ProfileService {
    store: Arc<dyn DirectoryStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    /// Look up a profile by identifier (email, case-insensitive).
    ///
    /// Requires a single match; zero or multiple matches yield `None`, the
    /// same ambiguity policy the gatekeeper applies.
    pub async fn by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<UserProfile>, DirectoryError> {
        let candidates = vec![identifier.to_lowercase()];
        let mut matches = self.store.find_users_by_email(&candidates).await?;

        if matches.len() > 1 {
            tracing::warn!(
                matches = matches.len(),
                "Profile lookup matched multiple directory users"
            );
            return Ok(None);
        }
        let Some(user) = matches.pop() else {
            return Ok(None);
        };

        let groups = self.store.user_group_names(user.id).await?;
        Ok(Some(UserProfile {
            id: user.id,
            user_name: user.user_name,
            email: user.email,
            given_name: user.given_name,
            family_name: user.family_name,
            active: user.active,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
            groups,
        }))
    }
}
