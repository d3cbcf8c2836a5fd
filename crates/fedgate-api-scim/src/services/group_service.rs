//! SCIM group provisioning service.

use std::sync::Arc;
use uuid::Uuid;

use fedgate_db::{DirectoryGroup, DirectoryStore, GroupUpdate, MembershipWrite};

use crate::error::{ScimError, ScimResult};
use crate::models::{
    CreateScimGroupRequest, ReplaceScimGroupRequest, ScimGroup, ScimGroupListResponse,
    ScimPagination, ScimPatchRequest,
};
use crate::services::mapper;
use crate::services::patch::{apply_group_op, GroupWorkingCopy};

/// Service for SCIM group operations.
pub struct GroupService {
    store: Arc<dyn DirectoryStore>,
}

impl GroupService {
    /// Create a new group service.
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    async fn find_group(&self, group_id: Uuid) -> ScimResult<DirectoryGroup> {
        self.store
            .get_group(group_id)
            .await?
            .ok_or(ScimError::NotFound("Group"))
    }

    /// Convert a group record to SCIM format with its current members.
    async fn to_scim_group(
        &self,
        group: &DirectoryGroup,
        base_url: &str,
    ) -> ScimResult<ScimGroup> {
        let members = self.store.group_members(group.id).await?;
        Ok(mapper::group_to_scim(group, &members, base_url))
    }

    /// List groups with pagination.
    pub async fn list_groups(
        &self,
        pagination: ScimPagination,
        base_url: &str,
    ) -> ScimResult<ScimGroupListResponse> {
        let page = self.store.list_groups(pagination.page()).await?;

        let mut resources = Vec::with_capacity(page.items.len());
        for group in &page.items {
            resources.push(self.to_scim_group(group, base_url).await?);
        }

        Ok(ScimGroupListResponse::new(
            resources,
            page.total,
            pagination.start_index,
        ))
    }

    /// Get a group by ID.
    pub async fn get_group(&self, group_id: Uuid, base_url: &str) -> ScimResult<ScimGroup> {
        let group = self.find_group(group_id).await?;
        self.to_scim_group(&group, base_url).await
    }

    /// Create a new group.
    ///
    /// Members that do not resolve to existing users are silently dropped.
    pub async fn create_group(
        &self,
        request: CreateScimGroupRequest,
        base_url: &str,
    ) -> ScimResult<ScimGroup> {
        let new = mapper::new_group_from_request(&request);
        let group = self.store.create_group(new).await?;

        tracing::info!(group_id = %group.id, display_name = %group.display_name, "SCIM group created");
        self.to_scim_group(&group, base_url).await
    }

    /// Replace a group (full update). Membership is replaced wholesale, not
    /// merged.
    pub async fn replace_group(
        &self,
        group_id: Uuid,
        request: ReplaceScimGroupRequest,
        base_url: &str,
    ) -> ScimResult<ScimGroup> {
        let _ = self.find_group(group_id).await?;

        let update = GroupUpdate {
            display_name: request.display_name.clone(),
            external_id: request.external_id.clone(),
        };
        let group = self
            .store
            .update_group(group_id, update, MembershipWrite::Replace(request.member_ids()))
            .await?
            .ok_or(ScimError::NotFound("Group"))?;

        self.to_scim_group(&group, base_url).await
    }

    /// Patch a group (partial update).
    ///
    /// Operations fold into one working copy in order; the membership set
    /// and the group fields are persisted in a single commit afterwards.
    pub async fn patch_group(
        &self,
        group_id: Uuid,
        request: ScimPatchRequest,
        base_url: &str,
    ) -> ScimResult<ScimGroup> {
        request.validate().map_err(ScimError::BadRequest)?;

        let group = self.find_group(group_id).await?;
        let member_ids = self
            .store
            .group_members(group_id)
            .await?
            .into_iter()
            .map(|m| m.user_id)
            .collect();
        let mut work = GroupWorkingCopy::new(&group, member_ids);

        for op in &request.operations {
            apply_group_op(&mut work, op);
        }

        let update = GroupUpdate {
            display_name: work.display_name.clone(),
            external_id: work.external_id.clone(),
        };
        let members = if work.members_touched {
            MembershipWrite::Replace(work.members.iter().copied().collect())
        } else {
            MembershipWrite::Keep
        };

        let group = self
            .store
            .update_group(group_id, update, members)
            .await?
            .ok_or(ScimError::NotFound("Group"))?;

        self.to_scim_group(&group, base_url).await
    }

    /// Delete a group, cascading its memberships.
    pub async fn delete_group(&self, group_id: Uuid) -> ScimResult<()> {
        if !self.store.delete_group(group_id).await? {
            return Err(ScimError::NotFound("Group"));
        }
        tracing::info!(group_id = %group_id, "SCIM group deleted");
        Ok(())
    }
}
