//! SCIM user provisioning service.

use std::sync::Arc;
use uuid::Uuid;

use fedgate_db::{DirectoryStore, DirectoryUser, UserUpdate};

use crate::error::{ScimError, ScimResult};
use crate::models::{
    CreateScimUserRequest, ReplaceScimUserRequest, ScimPagination, ScimPatchRequest, ScimUser,
    ScimUserListResponse,
};
use crate::services::filter::parse_user_filter;
use crate::services::mapper;
use crate::services::patch::apply_user_op;

/// Service for SCIM user operations.
pub struct UserService {
    store: Arc<dyn DirectoryStore>,
}

impl UserService {
    /// Create a new user service.
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    async fn find_user(&self, user_id: Uuid) -> ScimResult<DirectoryUser> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or(ScimError::NotFound("User"))
    }

    /// List users with optional filtering and pagination.
    pub async fn list_users(
        &self,
        filter: Option<&str>,
        pagination: ScimPagination,
        base_url: &str,
    ) -> ScimResult<ScimUserListResponse> {
        let query = parse_user_filter(filter);
        let page = self.store.list_users(&query, pagination.page()).await?;

        let resources = page
            .items
            .iter()
            .map(|user| mapper::user_to_scim(user, base_url))
            .collect();

        Ok(ScimUserListResponse::new(
            resources,
            page.total,
            pagination.start_index,
        ))
    }

    /// Get a user by ID.
    pub async fn get_user(&self, user_id: Uuid, base_url: &str) -> ScimResult<ScimUser> {
        let user = self.find_user(user_id).await?;
        Ok(mapper::user_to_scim(&user, base_url))
    }

    /// Create a new user. Duplicate userName fails with a conflict and
    /// creates no record.
    pub async fn create_user(
        &self,
        request: CreateScimUserRequest,
        base_url: &str,
    ) -> ScimResult<ScimUser> {
        if self
            .store
            .find_user_by_user_name(&request.user_name)
            .await?
            .is_some()
        {
            return Err(ScimError::Conflict {
                resource_type: "User",
                field: "userName",
                value: request.user_name,
            });
        }

        let new = mapper::new_user_from_request(&request);
        let user = self.store.create_user(new).await.map_err(|err| {
            // Two creates can race past the existence check; the store's
            // unique index reports the loser.
            if err.is_conflict() {
                ScimError::Conflict {
                    resource_type: "User",
                    field: "userName",
                    value: request.user_name.clone(),
                }
            } else {
                ScimError::from(err)
            }
        })?;

        tracing::info!(user_id = %user.id, user_name = %user.user_name, "SCIM user created");
        Ok(mapper::user_to_scim(&user, base_url))
    }

    /// Replace a user (full update).
    pub async fn replace_user(
        &self,
        user_id: Uuid,
        request: ReplaceScimUserRequest,
        base_url: &str,
    ) -> ScimResult<ScimUser> {
        let _ = self.find_user(user_id).await?;

        let update = mapper::user_update_from_request(&request);
        let user = self
            .store
            .update_user(user_id, update)
            .await?
            .ok_or(ScimError::NotFound("User"))?;

        Ok(mapper::user_to_scim(&user, base_url))
    }

    /// Patch a user (partial update).
    ///
    /// Operations fold into one working copy in order; the store write
    /// happens once after the whole sequence, even when every operation was
    /// ignored.
    pub async fn patch_user(
        &self,
        user_id: Uuid,
        request: ScimPatchRequest,
        base_url: &str,
    ) -> ScimResult<ScimUser> {
        request.validate().map_err(ScimError::BadRequest)?;

        let user = self.find_user(user_id).await?;
        let mut work = UserUpdate::from(&user);

        for op in &request.operations {
            apply_user_op(&mut work, op);
        }

        let user = self
            .store
            .update_user(user_id, work)
            .await?
            .ok_or(ScimError::NotFound("User"))?;

        Ok(mapper::user_to_scim(&user, base_url))
    }

    /// Delete a user, cascading its memberships.
    pub async fn delete_user(&self, user_id: Uuid) -> ScimResult<()> {
        if !self.store.delete_user(user_id).await? {
            return Err(ScimError::NotFound("User"));
        }
        tracing::info!(user_id = %user_id, "SCIM user deleted");
        Ok(())
    }
}
