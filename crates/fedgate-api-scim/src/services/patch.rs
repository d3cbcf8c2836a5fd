//! SCIM PATCH interpretation.
//!
//! Each `{op, path?, value?}` operation is classified into a tagged action
//! first, then applied to an in-memory working copy. Unrecognized
//! combinations classify as `Ignored`: they never fail the request, and a
//! request whose operations were all ignored still commits unchanged (wire
//! compatibility with IdPs that send op shapes outside the supported set).
//!
//! Path matching is case-insensitive; the member-filter literal is extracted
//! verbatim from the original path string.

use std::collections::BTreeSet;

use serde_json::Value;
use uuid::Uuid;

use fedgate_db::{DirectoryGroup, UserUpdate};

use crate::models::ScimPatchOp;

/// Recognized operations against a User resource.
#[derive(Debug, Clone, PartialEq)]
pub enum UserPatchAction {
    /// `replace` with path `active`.
    SetActive(bool),
    /// `replace` with an `emails` path: first entry's `value` wins.
    SetEmail(String),
    /// `replace` with no path and an object value: merge recognized keys.
    Merge(UserMerge),
    /// Anything else: no-op.
    Ignored,
}

/// Recognized keys of a no-path User merge.
///
/// Outer `Option` = key present in the value object; inner `Option` = the
/// key's (possibly null) value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserMerge {
    pub active: Option<bool>,
    pub user_name: Option<String>,
    pub external_id: Option<Option<String>>,
    pub given_name: Option<Option<String>>,
    pub family_name: Option<Option<String>>,
    pub email: Option<String>,
}

/// Recognized operations against a Group resource.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupPatchAction {
    /// `replace` with path `displayName`.
    SetDisplayName(String),
    /// `replace` with path `members`: wholesale membership replace.
    ReplaceMembers(Vec<Uuid>),
    /// `add` with path `members` (or no path): union into membership.
    AddMembers(Vec<Uuid>),
    /// `remove` with path `members[value eq "<id>"]`.
    RemoveMember(Uuid),
    /// `replace` with no path and an object value.
    Merge(GroupMerge),
    /// Anything else: no-op.
    Ignored,
}

/// Recognized keys of a no-path Group merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupMerge {
    pub display_name: Option<String>,
    /// Present `members` key: full membership replace.
    pub members: Option<Vec<Uuid>>,
}

/// Working copy a Group PATCH sequence is folded into.
///
/// The persisted write happens once, after the whole sequence.
#[derive(Debug, Clone)]
pub struct GroupWorkingCopy {
    pub display_name: String,
    pub external_id: Option<String>,
    pub members: BTreeSet<Uuid>,
    pub members_touched: bool,
}

impl GroupWorkingCopy {
    #[must_use]
    pub fn new(group: &DirectoryGroup, member_ids: Vec<Uuid>) -> Self {
        Self {
            display_name: group.display_name.clone(),
            external_id: group.external_id.clone(),
            members: member_ids.into_iter().collect(),
            members_touched: false,
        }
    }
}

/// Extract the literal from a `members[value eq "<literal>"]` path.
///
/// Attribute and operator match case-insensitively; the literal itself is
/// returned verbatim (quotes trimmed, nothing else).
#[must_use]
pub fn parse_member_filter(path: &str) -> Option<&str> {
    let open = path.get(..8)?;
    if !open.eq_ignore_ascii_case("members[") {
        return None;
    }
    let inner = path.get(8..)?.strip_suffix(']')?;

    let parts: Vec<&str> = inner.splitn(3, ' ').collect();
    if parts.len() != 3
        || !parts[0].eq_ignore_ascii_case("value")
        || !parts[1].eq_ignore_ascii_case("eq")
    {
        return None;
    }

    Some(parts[2].trim_matches('"'))
}

/// Pull member user ids out of a patch value: an array of member objects or
/// a single member object; entries without a parseable `value` drop out.
fn parse_member_refs(value: &Value) -> Vec<Uuid> {
    let entries: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    entries
        .iter()
        .filter_map(|m| {
            m.get("value")
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok())
        })
        .collect()
}

/// Classify a patch operation against a User resource.
#[must_use]
pub fn classify_user_op(op: &ScimPatchOp) -> UserPatchAction {
    if !op.op.eq_ignore_ascii_case("replace") {
        return UserPatchAction::Ignored;
    }

    match op.path.as_deref() {
        Some(path) if path.eq_ignore_ascii_case("active") => match op.value.as_ref() {
            Some(Value::Bool(active)) => UserPatchAction::SetActive(*active),
            _ => UserPatchAction::Ignored,
        },
        Some(path) if path.to_lowercase().contains("emails") => {
            let email = op
                .value
                .as_ref()
                .and_then(Value::as_array)
                .and_then(|items| items.first())
                .and_then(|entry| entry.get("value"))
                .and_then(Value::as_str);
            match email {
                Some(email) => UserPatchAction::SetEmail(email.to_string()),
                None => UserPatchAction::Ignored,
            }
        }
        Some(_) => UserPatchAction::Ignored,
        None => match op.value.as_ref() {
            Some(Value::Object(fields)) => {
                let mut merge = UserMerge::default();
                merge.active = fields.get("active").and_then(Value::as_bool);
                merge.user_name = fields
                    .get("userName")
                    .and_then(Value::as_str)
                    .map(ToString::to_string);
                merge.external_id = fields
                    .get("externalId")
                    .map(|v| v.as_str().map(ToString::to_string));
                if let Some(name) = fields.get("name") {
                    if let Some(given) = name.get("givenName") {
                        merge.given_name = Some(given.as_str().map(ToString::to_string));
                    }
                    if let Some(family) = name.get("familyName") {
                        merge.family_name = Some(family.as_str().map(ToString::to_string));
                    }
                }
                merge.email = fields
                    .get("emails")
                    .and_then(Value::as_array)
                    .and_then(|items| items.first())
                    .and_then(|entry| entry.get("value"))
                    .and_then(Value::as_str)
                    .map(ToString::to_string);
                UserPatchAction::Merge(merge)
            }
            _ => UserPatchAction::Ignored,
        },
    }
}

/// Classify a patch operation against a Group resource.
#[must_use]
pub fn classify_group_op(op: &ScimPatchOp) -> GroupPatchAction {
    let op_name = op.op.to_lowercase();
    let path = op.path.as_deref();

    match op_name.as_str() {
        "replace" => match path {
            Some(p) if p.eq_ignore_ascii_case("displayname") => match op.value.as_ref() {
                Some(Value::String(name)) => GroupPatchAction::SetDisplayName(name.clone()),
                _ => GroupPatchAction::Ignored,
            },
            Some(p) if p.eq_ignore_ascii_case("members") => match op.value.as_ref() {
                Some(value) => GroupPatchAction::ReplaceMembers(parse_member_refs(value)),
                None => GroupPatchAction::Ignored,
            },
            Some(_) => GroupPatchAction::Ignored,
            None => match op.value.as_ref() {
                Some(Value::Object(fields)) => {
                    let mut merge = GroupMerge::default();
                    merge.display_name = fields
                        .get("displayName")
                        .and_then(Value::as_str)
                        .map(ToString::to_string);
                    merge.members = fields.get("members").map(parse_member_refs);
                    GroupPatchAction::Merge(merge)
                }
                _ => GroupPatchAction::Ignored,
            },
        },
        "add" => match path {
            Some(p) if p.to_lowercase().starts_with("members") => match op.value.as_ref() {
                Some(value) => GroupPatchAction::AddMembers(parse_member_refs(value)),
                None => GroupPatchAction::Ignored,
            },
            None => match op.value.as_ref() {
                Some(value) => GroupPatchAction::AddMembers(parse_member_refs(value)),
                None => GroupPatchAction::Ignored,
            },
            Some(_) => GroupPatchAction::Ignored,
        },
        "remove" => match path.and_then(parse_member_filter) {
            Some(literal) => match literal.parse::<Uuid>() {
                Ok(user_id) => GroupPatchAction::RemoveMember(user_id),
                Err(_) => GroupPatchAction::Ignored,
            },
            None => GroupPatchAction::Ignored,
        },
        _ => GroupPatchAction::Ignored,
    }
}

/// Apply one operation to a User working copy.
pub fn apply_user_op(work: &mut UserUpdate, op: &ScimPatchOp) {
    match classify_user_op(op) {
        UserPatchAction::SetActive(active) => work.active = active,
        UserPatchAction::SetEmail(email) => work.email = Some(email),
        UserPatchAction::Merge(merge) => {
            if let Some(active) = merge.active {
                work.active = active;
            }
            if let Some(user_name) = merge.user_name {
                work.user_name = user_name;
            }
            if let Some(external_id) = merge.external_id {
                work.external_id = external_id;
            }
            if let Some(given_name) = merge.given_name {
                work.given_name = given_name;
            }
            if let Some(family_name) = merge.family_name {
                work.family_name = family_name;
            }
            if let Some(email) = merge.email {
                work.email = Some(email);
            }
        }
        UserPatchAction::Ignored => {
            tracing::debug!(op = %op.op, path = ?op.path, "Ignoring unrecognized user patch operation");
        }
    }
}

/// Apply one operation to a Group working copy.
pub fn apply_group_op(work: &mut GroupWorkingCopy, op: &ScimPatchOp) {
    match classify_group_op(op) {
        GroupPatchAction::SetDisplayName(name) => work.display_name = name,
        GroupPatchAction::ReplaceMembers(member_ids) => {
            work.members = member_ids.into_iter().collect();
            work.members_touched = true;
        }
        GroupPatchAction::AddMembers(member_ids) => {
            work.members.extend(member_ids);
            work.members_touched = true;
        }
        GroupPatchAction::RemoveMember(user_id) => {
            // Removing an absent member stays a successful no-op.
            work.members.remove(&user_id);
            work.members_touched = true;
        }
        GroupPatchAction::Merge(merge) => {
            if let Some(display_name) = merge.display_name {
                work.display_name = display_name;
            }
            if let Some(member_ids) = merge.members {
                work.members = member_ids.into_iter().collect();
                work.members_touched = true;
            }
        }
        GroupPatchAction::Ignored => {
            tracing::debug!(op = %op.op, path = ?op.path, "Ignoring unrecognized group patch operation");
        }
    }
}
