use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::contract::model::{
    Group, GroupPatch, GroupWithMembers, Member, MemberPatch, MemberWithGroup, NewGroup,
    NewMember,
};
use crate::domain::credentials::{hash_secret, CredentialHasher};
use crate::domain::error::DomainError;
use crate::domain::repo::{NewStoredMember, Transaction, UnitOfWork};
use crate::domain::{groups, members};

/// Domain service: opens one transaction per operation and hands it to the
/// group/member operations. Depends only on ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    uow: Arc<dyn UnitOfWork>,
    hasher: Arc<dyn CredentialHasher>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub groups: PageLimits,
    pub members: PageLimits,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            groups: PageLimits {
                default_limit: 15,
                max_limit: 15,
            },
            members: PageLimits {
                default_limit: 40,
                max_limit: 40,
            },
        }
    }
}

const MAX_SQL_BOUND: u64 = i64::MAX as u64;

/// Default page size and hard ceiling for one list operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl PageLimits {
    /// Apply defaults and clamp the requested limit to the ceiling.
    ///
    /// Both values are also capped at `i64::MAX`, the widest the SQL
    /// backends bind; an offset that far out simply yields an empty page.
    pub fn resolve(&self, offset: Option<u64>, limit: Option<u64>) -> PageRequest {
        PageRequest {
            offset: offset.unwrap_or(0).min(MAX_SQL_BOUND),
            limit: limit
                .unwrap_or(self.default_limit)
                .min(self.max_limit)
                .min(MAX_SQL_BOUND),
        }
    }
}

/// Effective offset/limit handed to the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(
        uow: Arc<dyn UnitOfWork>,
        hasher: Arc<dyn CredentialHasher>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            uow,
            hasher,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // --- groups ---

    #[instrument(name = "roster.service.create_group", skip(self), fields(name = %new_group.name))]
    pub async fn create_group(&self, new_group: NewGroup) -> Result<Group, DomainError> {
        info!("Creating new group");
        let tx = self.begin().await?;
        let group = groups::create(&*tx, new_group).await?;
        commit(tx).await?;
        info!("Successfully created group with id={}", group.id);
        Ok(group)
    }

    #[instrument(name = "roster.service.get_group", skip(self), fields(group_id = id))]
    pub async fn get_group(&self, id: i32) -> Result<GroupWithMembers, DomainError> {
        debug!("Getting group by id");
        let tx = self.begin().await?;
        let group = groups::get(&*tx, id).await?;
        commit(tx).await?;
        debug!("Successfully retrieved group with {} members", group.members.len());
        Ok(group)
    }

    #[instrument(name = "roster.service.list_groups", skip(self))]
    pub async fn list_groups(
        &self,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<Group>, DomainError> {
        let page = self.config.groups.resolve(offset, limit);
        debug!(offset = page.offset, limit = page.limit, "Listing groups");
        let tx = self.begin().await?;
        let items = groups::list(&*tx, page).await?;
        commit(tx).await?;
        debug!("Successfully listed {} groups", items.len());
        Ok(items)
    }

    #[instrument(name = "roster.service.update_group", skip(self), fields(group_id = id))]
    pub async fn update_group(&self, id: i32, patch: GroupPatch) -> Result<Group, DomainError> {
        info!("Updating group");
        let tx = self.begin().await?;
        let group = groups::update(&*tx, id, patch).await?;
        commit(tx).await?;
        info!("Successfully updated group");
        Ok(group)
    }

    #[instrument(name = "roster.service.delete_group", skip(self), fields(group_id = id))]
    pub async fn delete_group(&self, id: i32) -> Result<(), DomainError> {
        info!("Deleting group");
        let tx = self.begin().await?;
        groups::delete(&*tx, id).await?;
        commit(tx).await?;
        info!("Successfully deleted group");
        Ok(())
    }

    // --- members ---

    #[instrument(
        name = "roster.service.create_member",
        skip(self),
        fields(name = %new_member.name, group_id = ?new_member.group_id)
    )]
    pub async fn create_member(&self, new_member: NewMember) -> Result<Member, DomainError> {
        info!("Creating new member");
        let NewMember {
            name,
            alias,
            age,
            group_id,
            secret,
        } = new_member;
        let credential_hash = hash_secret(self.hasher.clone(), secret).await?;

        let tx = self.begin().await?;
        let member = members::create(
            &*tx,
            NewStoredMember {
                name,
                alias,
                age,
                group_id,
                credential_hash,
            },
        )
        .await?;
        commit(tx).await?;
        info!("Successfully created member with id={}", member.id);
        Ok(member)
    }

    #[instrument(name = "roster.service.get_member", skip(self), fields(member_id = id))]
    pub async fn get_member(&self, id: i32) -> Result<MemberWithGroup, DomainError> {
        debug!("Getting member by id");
        let tx = self.begin().await?;
        let member = members::get(&*tx, id).await?;
        commit(tx).await?;
        debug!("Successfully retrieved member");
        Ok(member)
    }

    #[instrument(name = "roster.service.list_members", skip(self))]
    pub async fn list_members(
        &self,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<Member>, DomainError> {
        let page = self.config.members.resolve(offset, limit);
        debug!(offset = page.offset, limit = page.limit, "Listing members");
        let tx = self.begin().await?;
        let items = members::list(&*tx, page).await?;
        commit(tx).await?;
        debug!("Successfully listed {} members", items.len());
        Ok(items)
    }

    #[instrument(name = "roster.service.update_member", skip(self), fields(member_id = id))]
    pub async fn update_member(
        &self,
        id: i32,
        mut patch: MemberPatch,
    ) -> Result<Member, DomainError> {
        info!("Updating member");
        let new_hash = match patch.secret.take() {
            Some(secret) => {
                // Unknown ids must not cost a hash
                let tx = self.begin().await?;
                members::ensure_exists(&*tx, id).await?;
                commit(tx).await?;
                Some(hash_secret(self.hasher.clone(), secret).await?)
            }
            None => None,
        };

        let tx = self.begin().await?;
        let member = members::update(&*tx, id, patch, new_hash).await?;
        commit(tx).await?;
        info!("Successfully updated member");
        Ok(member)
    }

    #[instrument(name = "roster.service.delete_member", skip(self), fields(member_id = id))]
    pub async fn delete_member(&self, id: i32) -> Result<(), DomainError> {
        info!("Deleting member");
        let tx = self.begin().await?;
        members::delete(&*tx, id).await?;
        commit(tx).await?;
        info!("Successfully deleted member");
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn Transaction>, DomainError> {
        self.uow.begin().await.map_err(DomainError::store)
    }
}

async fn commit(tx: Box<dyn Transaction>) -> Result<(), DomainError> {
    tx.commit().await.map_err(DomainError::store)
}
