use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::RosterApi,
    error::RosterError,
    model::{
        Group, GroupPatch, GroupWithMembers, Member, MemberPatch, MemberWithGroup, NewGroup,
        NewMember,
    },
};
use crate::domain::service::Service;

/// Local implementation of the RosterApi trait that delegates to the domain service
pub struct RosterLocalClient {
    service: Arc<Service>,
}

impl RosterLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl RosterApi for RosterLocalClient {
    async fn create_group(&self, new_group: NewGroup) -> Result<Group, RosterError> {
        self.service
            .create_group(new_group)
            .await
            .map_err(Into::into)
    }

    async fn get_group(&self, id: i32) -> Result<GroupWithMembers, RosterError> {
        self.service.get_group(id).await.map_err(Into::into)
    }

    async fn list_groups(
        &self,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<Group>, RosterError> {
        self.service
            .list_groups(offset, limit)
            .await
            .map_err(Into::into)
    }

    async fn update_group(&self, id: i32, patch: GroupPatch) -> Result<Group, RosterError> {
        self.service
            .update_group(id, patch)
            .await
            .map_err(Into::into)
    }

    async fn delete_group(&self, id: i32) -> Result<(), RosterError> {
        self.service.delete_group(id).await.map_err(Into::into)
    }

    async fn create_member(&self, new_member: NewMember) -> Result<Member, RosterError> {
        self.service
            .create_member(new_member)
            .await
            .map_err(Into::into)
    }

    async fn get_member(&self, id: i32) -> Result<MemberWithGroup, RosterError> {
        self.service.get_member(id).await.map_err(Into::into)
    }

    async fn list_members(
        &self,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<Member>, RosterError> {
        self.service
            .list_members(offset, limit)
            .await
            .map_err(Into::into)
    }

    async fn update_member(&self, id: i32, patch: MemberPatch) -> Result<Member, RosterError> {
        self.service
            .update_member(id, patch)
            .await
            .map_err(Into::into)
    }

    async fn delete_member(&self, id: i32) -> Result<(), RosterError> {
        self.service.delete_member(id).await.map_err(Into::into)
    }
}
