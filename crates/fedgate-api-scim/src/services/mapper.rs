//! Translation between directory records and SCIM wire resources.
//!
//! Pure functions; no store access and no side effects.

use fedgate_db::{DirectoryGroup, DirectoryUser, GroupMember, NewUser, UserUpdate};

use crate::models::{
    CreateScimGroupRequest, CreateScimUserRequest, ScimEmail, ScimGroup, ScimGroupMember,
    ScimMeta, ScimName, ScimUser,
};

/// Join given and family name, trimmed; None when both are empty.
fn full_name(given: Option<&str>, family: Option<&str>) -> Option<String> {
    let given = given.unwrap_or("");
    let family = family.unwrap_or("");
    let joined = format!("{given} {family}");
    let joined = joined.trim();
    if joined.is_empty() {
        None
    } else {
        Some(joined.to_string())
    }
}

/// Map a directory user to its SCIM representation.
#[must_use]
pub fn user_to_scim(user: &DirectoryUser, base_url: &str) -> ScimUser {
    let formatted = full_name(user.given_name.as_deref(), user.family_name.as_deref());

    let mut scim = ScimUser::new(&user.user_name);
    scim.id = Some(user.id);
    scim.external_id = user.external_id.clone();
    scim.display_name = Some(
        formatted
            .clone()
            .unwrap_or_else(|| user.user_name.clone()),
    );
    scim.name = Some(ScimName {
        formatted,
        family_name: user.family_name.clone(),
        given_name: user.given_name.clone(),
    });
    scim.emails = user
        .email
        .iter()
        .map(|value| ScimEmail {
            value: value.clone(),
            email_type: None,
            primary: true,
        })
        .collect();
    scim.active = user.active;
    scim.meta = Some(ScimMeta {
        resource_type: "User".to_string(),
        created: user.created_at,
        last_modified: user.updated_at,
        location: Some(format!("{base_url}/scim/v2/Users/{}", user.id)),
    });
    scim
}

/// Build store fields for a user create from the wire request.
#[must_use]
pub fn new_user_from_request(request: &CreateScimUserRequest) -> NewUser {
    NewUser {
        user_name: request.user_name.clone(),
        external_id: request.external_id.clone(),
        email: request.primary_email().map(ToString::to_string),
        given_name: request
            .name
            .as_ref()
            .and_then(|n| n.given_name.clone()),
        family_name: request
            .name
            .as_ref()
            .and_then(|n| n.family_name.clone()),
        active: request.active,
    }
}

/// Build the full field overwrite for a user replace (PUT).
#[must_use]
pub fn user_update_from_request(request: &CreateScimUserRequest) -> UserUpdate {
    let new = new_user_from_request(request);
    UserUpdate {
        user_name: new.user_name,
        external_id: new.external_id,
        email: new.email,
        given_name: new.given_name,
        family_name: new.family_name,
        active: new.active,
    }
}

/// Map a directory group and its members to the SCIM representation.
#[must_use]
pub fn group_to_scim(group: &DirectoryGroup, members: &[GroupMember], base_url: &str) -> ScimGroup {
    let mut scim = ScimGroup::new(&group.display_name);
    scim.id = Some(group.id);
    scim.external_id = group.external_id.clone();
    scim.members = members
        .iter()
        .map(|m| ScimGroupMember {
            value: m.user_id.to_string(),
            display: Some(m.user_name.clone()),
        })
        .collect();
    scim.meta = Some(ScimMeta {
        resource_type: "Group".to_string(),
        created: group.created_at,
        last_modified: group.updated_at,
        location: Some(format!("{base_url}/scim/v2/Groups/{}", group.id)),
    });
    scim
}

/// Build store fields for a group create from the wire request.
#[must_use]
pub fn new_group_from_request(request: &CreateScimGroupRequest) -> fedgate_db::NewGroup {
    fedgate_db::NewGroup {
        display_name: request.display_name.clone(),
        external_id: request.external_id.clone(),
        member_ids: request.member_ids(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_user() -> DirectoryUser {
        DirectoryUser {
            id: Uuid::new_v4(),
            user_name: "jdoe".to_string(),
            external_id: Some("ext-42".to_string()),
            email: Some("jdoe@example.com".to_string()),
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
    fn test_display_name_from_name_parts() {
        let user = sample_user();
        let scim = user_to_scim(&user, "https://idm.example.com");
        assert_eq!(scim.display_name.as_deref(), Some("John Doe"));
        assert_eq!(
            scim.name.as_ref().unwrap().formatted.as_deref(),
            Some("John Doe")
        );
    }

    #[test]
    fn test_display_name_falls_back_to_user_name() {
        let mut user = sample_user();
        user.given_name = None;
        user.family_name = None;
        let scim = user_to_scim(&user, "https://idm.example.com");
        assert_eq!(scim.display_name.as_deref(), Some("jdoe"));
        assert!(scim.name.as_ref().unwrap().formatted.is_none());
    }

    #[test]
    fn test_location_uses_request_base_url() {
        let user = sample_user();
        let scim = user_to_scim(&user, "https://idm.example.com");
        assert_eq!(
            scim.meta.unwrap().location.unwrap(),
            format!("https://idm.example.com/scim/v2/Users/{}", user.id)
        );
    }

    #[test]
    fn test_email_becomes_single_primary_entry() {
        let user = sample_user();
        let scim = user_to_scim(&user, "http://localhost");
        assert_eq!(scim.emails.len(), 1);
        assert!(scim.emails[0].primary);
        assert_eq!(scim.emails[0].value, "jdoe@example.com");

        let mut user = sample_user();
        user.email = None;
        let scim = user_to_scim(&user, "http://localhost");
        assert!(scim.emails.is_empty());
    }

    #[test]
    fn test_round_trip_preserves_identity_fields() {
        // Directory record -> resource -> create request fields must keep
        // userName, externalId, active and email intact.
        let user = sample_user();
        let scim = user_to_scim(&user, "http://localhost");

        let request = CreateScimUserRequest {
            schemas: scim.schemas.clone(),
            user_name: scim.user_name.clone(),
            external_id: scim.external_id.clone(),
            name: scim.name.clone(),
            active: scim.active,
            emails: scim.emails.clone(),
        };
        let new = new_user_from_request(&request);

        assert_eq!(new.user_name, user.user_name);
        assert_eq!(new.external_id, user.external_id);
        assert_eq!(new.active, user.active);
        assert_eq!(new.email, user.email);
    }

    #[test]
    fn test_group_members_carry_user_names() {
        let group = DirectoryGroup {
            id: Uuid::new_v4(),
            external_id: None,
            display_name: "Engineering".to_string(),
            created_at: Utc::now(),
            created_seq: 1,
            updated_at: Utc::now(),
        };
        let member = GroupMember {
            user_id: Uuid::new_v4(),
            user_name: "jdoe".to_string(),
        };
        let scim = group_to_scim(&group, &[member.clone()], "http://localhost");
        assert_eq!(scim.members.len(), 1);
        assert_eq!(scim.members[0].value, member.user_id.to_string());
        assert_eq!(scim.members[0].display.as_deref(), Some("jdoe"));
    }
}
