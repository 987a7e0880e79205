use std::fmt;

/// Kind of roster entity, carried by not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Group,
    Member,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Group => "Group",
            EntityKind::Member => "Member",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pure group model for inter-module communication (no serde/schemars)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: i32,
    pub name: String,
    pub location: String,
}

/// Group together with its current members, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupWithMembers {
    pub group: Group,
    pub members: Vec<Member>,
}

/// Data for creating a new group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub name: String,
    pub location: String,
}

/// Partial update data for a group. `None` means "leave untouched".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupPatch {
    pub name: Option<String>,
    pub location: Option<String>,
}

/// Pure member model. The stored credential hash is never part of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: i32,
    pub name: String,
    pub alias: String,
    pub age: Option<i32>,
    pub group_id: Option<i32>,
}

/// Member together with the group it belongs to, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberWithGroup {
    pub member: Member,
    pub group: Option<Group>,
}

/// Data for creating a new member. `secret` is plaintext and is consumed by hashing.
#[derive(Clone, PartialEq, Eq)]
pub struct NewMember {
    pub name: String,
    pub alias: String,
    pub age: Option<i32>,
    pub group_id: Option<i32>,
    pub secret: String,
}

impl fmt::Debug for NewMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewMember")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("age", &self.age)
            .field("group_id", &self.group_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Partial update data for a member.
///
/// The outer `Option` records whether the caller provided the field at all.
/// For the nullable `age` and `group_id`, `Some(None)` is an explicit clear.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub alias: Option<String>,
    pub age: Option<Option<i32>>,
    pub group_id: Option<Option<i32>>,
    pub secret: Option<String>,
}

impl fmt::Debug for MemberPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberPatch")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("age", &self.age)
            .field("group_id", &self.group_id)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
