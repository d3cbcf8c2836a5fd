//! In-memory directory store.
//!
//! Backs tests and lightweight embeddings. Mirrors the PostgreSQL adapter's
//! semantics exactly: set-based membership, creation-sequence ordering, and
//! one logical commit per trait call (the write lock spans each call).

use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::DirectoryError;
use crate::models::{DirectoryGroup, DirectoryUser, GroupMember};
use crate::store::{
    DirectoryStore, GroupUpdate, MembershipWrite, NewGroup, NewUser, Page, PageOf, UserQuery,
    UserUpdate,
};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, DirectoryUser>,
    groups: HashMap<Uuid, DirectoryGroup>,
    /// (group_id, user_id) edges; set semantics by construction.
    memberships: HashSet<(Uuid, Uuid)>,
    seq: i64,
}

impl Inner {
    fn next_seq(&mut self) -> i64 {
        self.seq += 1;
        self.seq
    }

    /// Keep only ids that resolve to existing users, deduplicated.
    fn resolve_members(&self, ids: &[Uuid]) -> BTreeSet<Uuid> {
        ids.iter()
            .filter(|id| self.users.contains_key(id))
            .copied()
            .collect()
    }
}

/// In-memory [`DirectoryStore`] implementation.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    inner: RwLock<Inner>,
}

impl MemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn page_out<T>(items: Vec<T>, page: Page) -> PageOf<T> {
    let total = items.len() as i64;
    let offset = page.offset().max(0) as usize;
    let count = page.count.max(0) as usize;
    let items = items.into_iter().skip(offset).take(count).collect();
    PageOf { total, items }
}

#[async_trait]
impl DirectoryStore for MemoryDirectory {
    async fn create_user(&self, new: NewUser) -> Result<DirectoryUser, DirectoryError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.user_name == new.user_name) {
            return Err(DirectoryError::Conflict {
                field: "user_name".to_string(),
                value: new.user_name,
            });
        }
        let now = Utc::now();
        let user = DirectoryUser {
            id: Uuid::new_v4(),
            user_name: new.user_name,
            external_id: new.external_id,
            email: new.email,
            given_name: new.given_name,
            family_name: new.family_name,
            active: new.active,
            created_at: now,
            created_seq: inner.next_seq(),
            updated_at: now,
            last_login_at: None,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<DirectoryUser>, DirectoryError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_user_name(
        &self,
        user_name: &str,
    ) -> Result<Option<DirectoryUser>, DirectoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.user_name == user_name)
            .cloned())
    }

    async fn find_users_by_email(
        &self,
        candidates: &[String],
    ) -> Result<Vec<DirectoryUser>, DirectoryError> {
        let inner = self.inner.read().await;
        let mut matches: Vec<DirectoryUser> = inner
            .users
            .values()
            .filter(|u| candidates.iter().any(|c| u.email_matches(c)))
            .cloned()
            .collect();
        matches.sort_by_key(|u| u.created_seq);
        Ok(matches)
    }

    async fn list_users(
        &self,
        query: &UserQuery,
        page: Page,
    ) -> Result<PageOf<DirectoryUser>, DirectoryError> {
        let inner = self.inner.read().await;
        let mut users: Vec<DirectoryUser> = inner
            .users
            .values()
            .filter(|u| match query {
                UserQuery::All => true,
                UserQuery::UserNameEq(name) => &u.user_name == name,
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.created_seq.cmp(&b.created_seq))
        });
        Ok(page_out(users, page))
    }

    async fn update_user(
        &self,
        id: Uuid,
        update: UserUpdate,
    ) -> Result<Option<DirectoryUser>, DirectoryError> {
        let mut inner = self.inner.write().await;
        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        user.user_name = update.user_name;
        user.external_id = update.external_id;
        user.email = update.email;
        user.given_name = update.given_name;
        user.family_name = update.family_name;
        user.active = update.active;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, DirectoryError> {
        let mut inner = self.inner.write().await;
        if inner.users.remove(&id).is_none() {
            return Ok(false);
        }
        inner.memberships.retain(|(_, user_id)| *user_id != id);
        Ok(true)
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<bool, DirectoryError> {
        let mut inner = self.inner.write().await;
        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(false);
        };
        user.last_login_at = Some(Utc::now());
        Ok(true)
    }

    async fn create_group(&self, new: NewGroup) -> Result<DirectoryGroup, DirectoryError> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let group = DirectoryGroup {
            id: Uuid::new_v4(),
            external_id: new.external_id,
            display_name: new.display_name,
            created_at: now,
            created_seq: inner.next_seq(),
            updated_at: now,
        };
        let members = inner.resolve_members(&new.member_ids);
        for user_id in members {
            inner.memberships.insert((group.id, user_id));
        }
        inner.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn get_group(&self, id: Uuid) -> Result<Option<DirectoryGroup>, DirectoryError> {
        Ok(self.inner.read().await.groups.get(&id).cloned())
    }

    async fn list_groups(&self, page: Page) -> Result<PageOf<DirectoryGroup>, DirectoryError> {
        let inner = self.inner.read().await;
        let mut groups: Vec<DirectoryGroup> = inner.groups.values().cloned().collect();
        groups.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.created_seq.cmp(&b.created_seq))
        });
        Ok(page_out(groups, page))
    }

    async fn update_group(
        &self,
        id: Uuid,
        update: GroupUpdate,
        members: MembershipWrite,
    ) -> Result<Option<DirectoryGroup>, DirectoryError> {
        let mut inner = self.inner.write().await;
        if !inner.groups.contains_key(&id) {
            return Ok(None);
        }
        if let MembershipWrite::Replace(member_ids) = members {
            let resolved = inner.resolve_members(&member_ids);
            inner.memberships.retain(|(group_id, _)| *group_id != id);
            for user_id in resolved {
                inner.memberships.insert((id, user_id));
            }
        }
        let group = inner.groups.get_mut(&id).expect("checked above");
        group.display_name = update.display_name;
        group.external_id = update.external_id;
        group.updated_at = Utc::now();
        Ok(Some(group.clone()))
    }

    async fn delete_group(&self, id: Uuid) -> Result<bool, DirectoryError> {
        let mut inner = self.inner.write().await;
        if inner.groups.remove(&id).is_none() {
            return Ok(false);
        }
        inner.memberships.retain(|(group_id, _)| *group_id != id);
        Ok(true)
    }

    async fn group_members(&self, group_id: Uuid) -> Result<Vec<GroupMember>, DirectoryError> {
        let inner = self.inner.read().await;
        let mut members: Vec<GroupMember> = inner
            .memberships
            .iter()
            .filter(|(gid, _)| *gid == group_id)
            .filter_map(|(_, user_id)| {
                inner.users.get(user_id).map(|u| GroupMember {
                    user_id: *user_id,
                    user_name: u.user_name.clone(),
                })
            })
            .collect();
        members.sort_by(|a, b| a.user_name.cmp(&b.user_name));
        Ok(members)
    }

    async fn user_group_names(&self, user_id: Uuid) -> Result<Vec<String>, DirectoryError> {
        let inner = self.inner.read().await;
        let mut names: Vec<String> = inner
            .memberships
            .iter()
            .filter(|(_, uid)| *uid == user_id)
            .filter_map(|(gid, _)| inner.groups.get(gid).map(|g| g.display_name.clone()))
            .collect();
        names.sort();
        Ok(names)
    }
}
