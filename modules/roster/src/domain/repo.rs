use std::fmt;

use async_trait::async_trait;

use crate::contract::model::{Group, Member, NewGroup};

/// Member row as persisted, including the credential hash.
///
/// Only the member operations see this type; everything leaving the domain
/// goes through [`StoredMember::into_member`], which drops the hash.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredMember {
    pub id: i32,
    pub name: String,
    pub alias: String,
    pub age: Option<i32>,
    pub group_id: Option<i32>,
    pub credential_hash: String,
}

impl StoredMember {
    pub fn into_member(self) -> Member {
        Member {
            id: self.id,
            name: self.name,
            alias: self.alias,
            age: self.age,
            group_id: self.group_id,
        }
    }
}

impl fmt::Debug for StoredMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredMember")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("age", &self.age)
            .field("group_id", &self.group_id)
            .finish_non_exhaustive()
    }
}

/// Fully-formed member row ready for insertion (hash already computed).
#[derive(Clone, PartialEq, Eq)]
pub struct NewStoredMember {
    pub name: String,
    pub alias: String,
    pub age: Option<i32>,
    pub group_id: Option<i32>,
    pub credential_hash: String,
}

/// Persistence operations on groups.
#[async_trait]
pub trait GroupsRepository: Send + Sync {
    /// Load a group by id.
    async fn find_group(&self, id: i32) -> anyhow::Result<Option<Group>>;
    /// Insert a new group; the store assigns the id.
    async fn insert_group(&self, new_group: NewGroup) -> anyhow::Result<Group>;
    /// Overwrite the mutable columns of an existing group (by `group.id`).
    async fn update_group(&self, group: Group) -> anyhow::Result<()>;
    /// Delete by id. Returns true if a row was deleted.
    async fn delete_group(&self, id: i32) -> anyhow::Result<bool>;
    /// Groups in insertion order.
    async fn list_groups(&self, offset: u64, limit: u64) -> anyhow::Result<Vec<Group>>;
}

/// Persistence operations on members.
#[async_trait]
pub trait MembersRepository: Send + Sync {
    async fn find_member(&self, id: i32) -> anyhow::Result<Option<StoredMember>>;
    async fn insert_member(&self, new_member: NewStoredMember) -> anyhow::Result<StoredMember>;
    async fn update_member(&self, member: StoredMember) -> anyhow::Result<()>;
    async fn delete_member(&self, id: i32) -> anyhow::Result<bool>;
    /// Members in insertion order.
    async fn list_members(&self, offset: u64, limit: u64) -> anyhow::Result<Vec<StoredMember>>;
    /// All members referencing `group_id`, in insertion order.
    async fn members_of_group(&self, group_id: i32) -> anyhow::Result<Vec<StoredMember>>;
    /// Clear `group_id` on every member of the group. Returns the affected count.
    async fn detach_members(&self, group_id: i32) -> anyhow::Result<u64>;
}

/// Everything an operation may touch within one transaction.
pub trait RosterRepository: GroupsRepository + MembersRepository {}

impl<T> RosterRepository for T where T: GroupsRepository + MembersRepository + ?Sized {}

/// A store transaction that doubles as the repository for its operations.
///
/// Dropping it without calling [`Transaction::commit`] rolls everything back.
#[async_trait]
pub trait Transaction: RosterRepository {
    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
}

/// Opens transactions against the store.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    async fn begin(&self) -> anyhow::Result<Box<dyn Transaction>>;
}
