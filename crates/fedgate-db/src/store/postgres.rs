//! PostgreSQL directory store.
//!
//! Schema expectations: `users` and `groups` carry a `created_seq BIGSERIAL`
//! column alongside `created_at`, and `group_members (group_id, user_id)` has
//! a unique index over the pair. Membership writes run inside one
//! transaction per trait call.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DirectoryError;
use crate::models::{DirectoryGroup, DirectoryUser, GroupMember};
use crate::store::{
    DirectoryStore, GroupUpdate, MembershipWrite, NewGroup, NewUser, Page, PageOf, UserQuery,
    UserUpdate,
};

/// PostgreSQL-backed [`DirectoryStore`] implementation.
#[derive(Debug, Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryStore for PgDirectory {
    async fn create_user(&self, new: NewUser) -> Result<DirectoryUser, DirectoryError> {
        let user = sqlx::query_as(
            r"
            INSERT INTO users (user_name, external_id, email, given_name, family_name, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            ",
        )
        .bind(&new.user_name)
        .bind(&new.external_id)
        .bind(&new.email)
        .bind(&new.given_name)
        .bind(&new.family_name)
        .bind(new.active)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<DirectoryUser>, DirectoryError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_user_name(
        &self,
        user_name: &str,
    ) -> Result<Option<DirectoryUser>, DirectoryError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE user_name = $1")
            .bind(user_name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_users_by_email(
        &self,
        candidates: &[String],
    ) -> Result<Vec<DirectoryUser>, DirectoryError> {
        let users = sqlx::query_as(
            r"
            SELECT * FROM users
            WHERE email IS NOT NULL AND LOWER(email) = ANY($1)
            ORDER BY created_seq
            ",
        )
        .bind(candidates)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn list_users(
        &self,
        query: &UserQuery,
        page: Page,
    ) -> Result<PageOf<DirectoryUser>, DirectoryError> {
        let (total, items) = match query {
            UserQuery::All => {
                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                    .fetch_one(&self.pool)
                    .await?;
                let items = sqlx::query_as(
                    r"
                    SELECT * FROM users
                    ORDER BY created_at ASC, created_seq ASC
                    LIMIT $1 OFFSET $2
                    ",
                )
                .bind(page.count)
                .bind(page.offset())
                .fetch_all(&self.pool)
                .await?;
                (total, items)
            }
            UserQuery::UserNameEq(name) => {
                let total: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE user_name = $1")
                        .bind(name)
                        .fetch_one(&self.pool)
                        .await?;
                let items = sqlx::query_as(
                    r"
                    SELECT * FROM users
                    WHERE user_name = $1
                    ORDER BY created_at ASC, created_seq ASC
                    LIMIT $2 OFFSET $3
                    ",
                )
                .bind(name)
                .bind(page.count)
                .bind(page.offset())
                .fetch_all(&self.pool)
                .await?;
                (total, items)
            }
        };
        Ok(PageOf { total, items })
    }

    async fn update_user(
        &self,
        id: Uuid,
        update: UserUpdate,
    ) -> Result<Option<DirectoryUser>, DirectoryError> {
        let user = sqlx::query_as(
            r"
            UPDATE users
            SET user_name = $2,
                external_id = $3,
                email = $4,
                given_name = $5,
                family_name = $6,
                active = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(&update.user_name)
        .bind(&update.external_id)
        .bind(&update.email)
        .bind(&update.given_name)
        .bind(&update.family_name)
        .bind(update.active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, DirectoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM group_members WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<bool, DirectoryError> {
        let result = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_group(&self, new: NewGroup) -> Result<DirectoryGroup, DirectoryError> {
        let mut tx = self.pool.begin().await?;
        let group: DirectoryGroup = sqlx::query_as(
            r"
            INSERT INTO groups (display_name, external_id)
            VALUES ($1, $2)
            RETURNING *
            ",
        )
        .bind(&new.display_name)
        .bind(&new.external_id)
        .fetch_one(&mut *tx)
        .await?;

        if !new.member_ids.is_empty() {
            // Resolve against existing users; unknown ids drop out of the
            // SELECT, duplicate ids collapse on the unique pair index.
            sqlx::query(
                r"
                INSERT INTO group_members (group_id, user_id)
                SELECT $1, u.id FROM users u WHERE u.id = ANY($2)
                ON CONFLICT (group_id, user_id) DO NOTHING
                ",
            )
            .bind(group.id)
            .bind(&new.member_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(group)
    }

    async fn get_group(&self, id: Uuid) -> Result<Option<DirectoryGroup>, DirectoryError> {
        let group = sqlx::query_as("SELECT * FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(group)
    }

    async fn list_groups(&self, page: Page) -> Result<PageOf<DirectoryGroup>, DirectoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM groups")
            .fetch_one(&self.pool)
            .await?;
        let items = sqlx::query_as(
            r"
            SELECT * FROM groups
            ORDER BY created_at ASC, created_seq ASC
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(page.count)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(PageOf { total, items })
    }

    async fn update_group(
        &self,
        id: Uuid,
        update: GroupUpdate,
        members: MembershipWrite,
    ) -> Result<Option<DirectoryGroup>, DirectoryError> {
        let mut tx = self.pool.begin().await?;
        let group: Option<DirectoryGroup> = sqlx::query_as(
            r"
            UPDATE groups
            SET display_name = $2,
                external_id = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(&update.display_name)
        .bind(&update.external_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(group) = group else {
            return Ok(None);
        };

        if let MembershipWrite::Replace(member_ids) = members {
            sqlx::query("DELETE FROM group_members WHERE group_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            if !member_ids.is_empty() {
                sqlx::query(
                    r"
                    INSERT INTO group_members (group_id, user_id)
                    SELECT $1, u.id FROM users u WHERE u.id = ANY($2)
                    ON CONFLICT (group_id, user_id) DO NOTHING
                    ",
                )
                .bind(id)
                .bind(&member_ids)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(Some(group))
    }

    async fn delete_group(&self, id: Uuid) -> Result<bool, DirectoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM group_members WHERE group_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn group_members(&self, group_id: Uuid) -> Result<Vec<GroupMember>, DirectoryError> {
        let members = sqlx::query_as(
            r"
            SELECT u.id AS user_id, u.user_name
            FROM group_members gm
            JOIN users u ON u.id = gm.user_id
            WHERE gm.group_id = $1
            ORDER BY u.user_name
            ",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    async fn user_group_names(&self, user_id: Uuid) -> Result<Vec<String>, DirectoryError> {
        let names = sqlx::query_scalar(
            r"
            SELECT g.display_name
            FROM group_members gm
            JOIN groups g ON g.id = gm.group_id
            WHERE gm.user_id = $1
            ORDER BY g.display_name
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }
}
