use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::contract::model::{
    Group, GroupPatch, GroupWithMembers, Member, MemberPatch, MemberWithGroup, NewGroup,
    NewMember,
};

/// REST DTO for group representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GroupDto {
    pub id: i32,
    pub name: String,
    pub location: String,
}

/// Group with its current members (single-item read)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GroupWithMembersDto {
    pub id: i32,
    pub name: String,
    pub location: String,
    pub members: Vec<MemberDto>,
}

/// REST DTO for member representation. Never carries the secret or its hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MemberDto {
    pub id: i32,
    pub name: String,
    pub alias: String,
    pub age: Option<i32>,
    pub group_id: Option<i32>,
}

/// Member with the group it belongs to (single-item read)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MemberWithGroupDto {
    pub id: i32,
    pub name: String,
    pub alias: String,
    pub age: Option<i32>,
    pub group_id: Option<i32>,
    pub group: Option<GroupDto>,
}

/// REST DTO for creating a new group
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateGroupReq {
    pub name: String,
    pub location: String,
}

/// REST DTO for updating a group (partial). Absent fields stay untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateGroupReq {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// REST DTO for creating a new member
#[derive(Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateMemberReq {
    pub name: String,
    pub alias: String,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub group_id: Option<i32>,
    /// Plaintext secret; stored only as a salted hash.
    #[schema(write_only)]
    pub secret: String,
}

impl fmt::Debug for CreateMemberReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateMemberReq")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("age", &self.age)
            .field("group_id", &self.group_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// REST DTO for updating a member (partial).
///
/// `age` and `group_id` accept an explicit `null`, which clears the value.
#[derive(Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateMemberReq {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i32>)]
    pub age: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i32>)]
    pub group_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(write_only)]
    pub secret: Option<String>,
}

impl fmt::Debug for UpdateMemberReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateMemberReq")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("age", &self.age)
            .field("group_id", &self.group_id)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Offset/limit query for list endpoints
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Number of records to skip (default 0)
    pub offset: Option<u64>,
    /// Maximum number of records to return; clamped to the server ceiling
    pub limit: Option<u64>,
}

/// A field that may be omitted but, when given, must hold a value (no `null`).
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// A field where omission and explicit `null` mean different things.
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// Conversion implementations between REST DTOs and contract models

impl From<Group> for GroupDto {
    fn from(g: Group) -> Self {
        Self {
            id: g.id,
            name: g.name,
            location: g.location,
        }
    }
}

impl From<GroupWithMembers> for GroupWithMembersDto {
    fn from(g: GroupWithMembers) -> Self {
        Self {
            id: g.group.id,
            name: g.group.name,
            location: g.group.location,
            members: g.members.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Member> for MemberDto {
    fn from(m: Member) -> Self {
        Self {
            id: m.id,
            name: m.name,
            alias: m.alias,
            age: m.age,
            group_id: m.group_id,
        }
    }
}

impl From<MemberWithGroup> for MemberWithGroupDto {
    fn from(m: MemberWithGroup) -> Self {
        Self {
            id: m.member.id,
            name: m.member.name,
            alias: m.member.alias,
            age: m.member.age,
            group_id: m.member.group_id,
            group: m.group.map(Into::into),
        }
    }
}

impl From<CreateGroupReq> for NewGroup {
    fn from(req: CreateGroupReq) -> Self {
        Self {
            name: req.name,
            location: req.location,
        }
    }
}

impl From<UpdateGroupReq> for GroupPatch {
    fn from(req: UpdateGroupReq) -> Self {
        Self {
            name: req.name,
            location: req.location,
        }
    }
}

impl From<CreateMemberReq> for NewMember {
    fn from(req: CreateMemberReq) -> Self {
        Self {
            name: req.name,
            alias: req.alias,
            age: req.age,
            group_id: req.group_id,
            secret: req.secret,
        }
    }
}

impl From<UpdateMemberReq> for MemberPatch {
    fn from(req: UpdateMemberReq) -> Self {
        Self {
            name: req.name,
            alias: req.alias,
            age: req.age,
            group_id: req.group_id,
            secret: req.secret,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn member_patch_distinguishes_absent_from_null() {
        let req: UpdateMemberReq = serde_json::from_value(json!({ "age": null })).unwrap();
        assert_eq!(req.age, Some(None));
        assert_eq!(req.group_id, None);

        let req: UpdateMemberReq = serde_json::from_value(json!({ "group_id": 3 })).unwrap();
        assert_eq!(req.group_id, Some(Some(3)));
        assert_eq!(req.age, None);
    }

    #[test]
    fn null_on_required_field_is_rejected() {
        let res: Result<UpdateMemberReq, _> = serde_json::from_value(json!({ "name": null }));
        assert!(res.is_err());
        let res: Result<UpdateGroupReq, _> = serde_json::from_value(json!({ "location": null }));
        assert!(res.is_err());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<CreateGroupReq, _> = serde_json::from_value(json!({
            "name": "Preventers", "location": "Sharp Tower", "motto": "x"
        }));
        assert!(res.is_err());
        let res: Result<UpdateMemberReq, _> =
            serde_json::from_value(json!({ "credential_hash": "x" }));
        assert!(res.is_err());
    }

    #[test]
    fn create_member_optional_fields_default_to_none() {
        let req: CreateMemberReq = serde_json::from_value(json!({
            "name": "Deadpond", "alias": "Wade Wilson", "secret": "chimichanga"
        }))
        .unwrap();
        assert_eq!(req.age, None);
        assert_eq!(req.group_id, None);
        let new_member: NewMember = req.into();
        assert_eq!(new_member.secret, "chimichanga");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let req: CreateMemberReq = serde_json::from_value(json!({
            "name": "Deadpond", "alias": "Wade Wilson", "secret": "chimichanga"
        }))
        .unwrap();
        assert!(!format!("{req:?}").contains("chimichanga"));

        let patch = UpdateMemberReq {
            secret: Some("chimichanga".into()),
            ..Default::default()
        };
        assert!(!format!("{patch:?}").contains("chimichanga"));
    }

    #[test]
    fn member_dto_serializes_nulls_and_no_secret() {
        let dto = MemberDto::from(Member {
            id: 1,
            name: "Deadpond".into(),
            alias: "Wade Wilson".into(),
            age: None,
            group_id: None,
        });
        let v = serde_json::to_value(dto).unwrap();
        assert_eq!(
            v,
            json!({ "id": 1, "name": "Deadpond", "alias": "Wade Wilson", "age": null, "group_id": null })
        );
    }

    #[test]
    fn group_with_members_flattens_group_fields() {
        let dto = GroupWithMembersDto::from(GroupWithMembers {
            group: Group {
                id: 2,
                name: "Z-Force".into(),
                location: "Sister Margaret's Bar".into(),
            },
            members: vec![],
        });
        let v = serde_json::to_value(dto).unwrap();
        assert_eq!(v["id"], 2);
        assert_eq!(v["members"], json!([]));
    }
}
