use async_trait::async_trait;

use crate::contract::{
    error::RosterError,
    model::{
        Group, GroupPatch, GroupWithMembers, Member, MemberPatch, MemberWithGroup, NewGroup,
        NewMember,
    },
};

/// Public API trait for the roster module that other modules can use
#[async_trait]
pub trait RosterApi: Send + Sync {
    /// Create a new group
    async fn create_group(&self, new_group: NewGroup) -> Result<Group, RosterError>;

    /// Get a group by ID together with its members
    async fn get_group(&self, id: i32) -> Result<GroupWithMembers, RosterError>;

    /// List groups with offset/limit pagination
    async fn list_groups(
        &self,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<Group>, RosterError>;

    /// Update a group with partial data
    async fn update_group(&self, id: i32, patch: GroupPatch) -> Result<Group, RosterError>;

    /// Delete a group by ID
    async fn delete_group(&self, id: i32) -> Result<(), RosterError>;

    /// Create a new member
    async fn create_member(&self, new_member: NewMember) -> Result<Member, RosterError>;

    /// Get a member by ID together with its group
    async fn get_member(&self, id: i32) -> Result<MemberWithGroup, RosterError>;

    /// List members with offset/limit pagination
    async fn list_members(
        &self,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<Member>, RosterError>;

    /// Update a member with partial data
    async fn update_member(&self, id: i32, patch: MemberPatch) -> Result<Member, RosterError>;

    /// Delete a member by ID
    async fn delete_member(&self, id: i32) -> Result<(), RosterError>;
}
