//! Member operations. Each takes the transaction-scoped repository explicitly.
//! Secrets arrive here already hashed; the service hashes them before it
//! opens a transaction.

use crate::contract::model::{Member, MemberPatch, MemberWithGroup};
use crate::domain::error::DomainError;
use crate::domain::repo::{MembersRepository, NewStoredMember, RosterRepository, StoredMember};
use crate::domain::service::PageRequest;

pub async fn create<R>(repo: &R, new_member: NewStoredMember) -> Result<Member, DomainError>
where
    R: RosterRepository + ?Sized,
{
    if let Some(group_id) = new_member.group_id {
        ensure_group_exists(repo, group_id).await?;
    }

    let stored = repo
        .insert_member(new_member)
        .await
        .map_err(DomainError::store)?;
    Ok(stored.into_member())
}

pub async fn get<R>(repo: &R, id: i32) -> Result<MemberWithGroup, DomainError>
where
    R: RosterRepository + ?Sized,
{
    let member = load(repo, id).await?.into_member();
    let group = match member.group_id {
        Some(group_id) => repo
            .find_group(group_id)
            .await
            .map_err(DomainError::store)?,
        None => None,
    };
    Ok(MemberWithGroup { member, group })
}

pub async fn list<R>(repo: &R, page: PageRequest) -> Result<Vec<Member>, DomainError>
where
    R: MembersRepository + ?Sized,
{
    let rows = repo
        .list_members(page.offset, page.limit)
        .await
        .map_err(DomainError::store)?;
    Ok(rows.into_iter().map(StoredMember::into_member).collect())
}

/// Apply `patch`; `new_hash` replaces the stored credential when present.
pub async fn update<R>(
    repo: &R,
    id: i32,
    patch: MemberPatch,
    new_hash: Option<String>,
) -> Result<Member, DomainError>
where
    R: RosterRepository + ?Sized,
{
    let mut current = load(repo, id).await?;

    if let Some(Some(group_id)) = patch.group_id {
        ensure_group_exists(repo, group_id).await?;
    }

    apply_patch(&mut current, patch);
    if let Some(credential_hash) = new_hash {
        current.credential_hash = credential_hash;
    }

    repo.update_member(current.clone())
        .await
        .map_err(DomainError::store)?;
    Ok(current.into_member())
}

/// Fail with `NotFound` unless member `id` exists.
pub async fn ensure_exists<R>(repo: &R, id: i32) -> Result<(), DomainError>
where
    R: MembersRepository + ?Sized,
{
    load(repo, id).await.map(|_| ())
}

pub async fn delete<R>(repo: &R, id: i32) -> Result<(), DomainError>
where
    R: MembersRepository + ?Sized,
{
    if !repo.delete_member(id).await.map_err(DomainError::store)? {
        return Err(DomainError::member_not_found(id));
    }
    Ok(())
}

/// Copy the provided profile fields of `patch` onto `member`.
///
/// The plaintext secret is not a column; callers hash it and set
/// `credential_hash` themselves.
pub fn apply_patch(member: &mut StoredMember, patch: MemberPatch) {
    let MemberPatch {
        name,
        alias,
        age,
        group_id,
        secret: _,
    } = patch;

    if let Some(name) = name {
        member.name = name;
    }
    if let Some(alias) = alias {
        member.alias = alias;
    }
    if let Some(age) = age {
        member.age = age;
    }
    if let Some(group_id) = group_id {
        member.group_id = group_id;
    }
}

async fn load<R>(repo: &R, id: i32) -> Result<StoredMember, DomainError>
where
    R: MembersRepository + ?Sized,
{
    repo.find_member(id)
        .await
        .map_err(DomainError::store)?
        .ok_or_else(|| DomainError::member_not_found(id))
}

async fn ensure_group_exists<R>(repo: &R, group_id: i32) -> Result<(), DomainError>
where
    R: RosterRepository + ?Sized,
{
    match repo
        .find_group(group_id)
        .await
        .map_err(DomainError::store)?
    {
        Some(_) => Ok(()),
        None => Err(DomainError::unknown_group(group_id)),
    }
}
