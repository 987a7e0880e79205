//! Group operations. Each takes the transaction-scoped repository explicitly.

use tracing::debug;

use crate::contract::model::{Group, GroupPatch, GroupWithMembers, NewGroup};
use crate::domain::error::DomainError;
use crate::domain::repo::{GroupsRepository, RosterRepository, StoredMember};
use crate::domain::service::PageRequest;

pub async fn create<R>(repo: &R, new_group: NewGroup) -> Result<Group, DomainError>
where
    R: GroupsRepository + ?Sized,
{
    repo.insert_group(new_group)
        .await
        .map_err(DomainError::store)
}

pub async fn get<R>(repo: &R, id: i32) -> Result<GroupWithMembers, DomainError>
where
    R: RosterRepository + ?Sized,
{
    let group = load(repo, id).await?;
    let members = repo
        .members_of_group(id)
        .await
        .map_err(DomainError::store)?
        .into_iter()
        .map(StoredMember::into_member)
        .collect();
    Ok(GroupWithMembers { group, members })
}

pub async fn list<R>(repo: &R, page: PageRequest) -> Result<Vec<Group>, DomainError>
where
    R: GroupsRepository + ?Sized,
{
    repo.list_groups(page.offset, page.limit)
        .await
        .map_err(DomainError::store)
}

pub async fn update<R>(repo: &R, id: i32, patch: GroupPatch) -> Result<Group, DomainError>
where
    R: GroupsRepository + ?Sized,
{
    let mut current = load(repo, id).await?;
    apply_patch(&mut current, patch);
    repo.update_group(current.clone())
        .await
        .map_err(DomainError::store)?;
    Ok(current)
}

/// Delete a group. Its members stay, detached (`group_id` cleared).
pub async fn delete<R>(repo: &R, id: i32) -> Result<(), DomainError>
where
    R: RosterRepository + ?Sized,
{
    load(repo, id).await?;
    let detached = repo.detach_members(id).await.map_err(DomainError::store)?;
    debug!(detached, "Detached members from group");
    if !repo.delete_group(id).await.map_err(DomainError::store)? {
        return Err(DomainError::group_not_found(id));
    }
    Ok(())
}

/// Copy the provided fields of `patch` onto `group`.
pub fn apply_patch(group: &mut Group, patch: GroupPatch) {
    if let Some(name) = patch.name {
        group.name = name;
    }
    if let Some(location) = patch.location {
        group.location = location;
    }
}

async fn load<R>(repo: &R, id: i32) -> Result<Group, DomainError>
where
    R: GroupsRepository + ?Sized,
{
    repo.find_group(id)
        .await
        .map_err(DomainError::store)?
        .ok_or_else(|| DomainError::group_not_found(id))
}
