//! SeaORM-backed implementation of the repository ports.
//!
//! `SeaOrmRosterRepository` is generic over `C: ConnectionTrait`, so the same
//! queries run on a plain `DatabaseConnection` or inside a
//! `DatabaseTransaction`. The service only ever sees the transactional flavor,
//! handed out by [`SeaOrmUnitOfWork`].

use anyhow::Context;
use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::contract::model::{Group, NewGroup};
use crate::domain::repo::{
    GroupsRepository, MembersRepository, NewStoredMember, StoredMember, Transaction, UnitOfWork,
};
use crate::infra::storage::entity::{group, member};
use crate::infra::storage::mapper::{group_to_contract, member_to_stored};

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmRosterRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmRosterRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C> GroupsRepository for SeaOrmRosterRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_group(&self, id: i32) -> anyhow::Result<Option<Group>> {
        let found = group::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_group failed")?;
        Ok(found.map(group_to_contract))
    }

    async fn insert_group(&self, new_group: NewGroup) -> anyhow::Result<Group> {
        let m = group::ActiveModel {
            name: Set(new_group.name),
            location: Set(new_group.location),
            ..Default::default()
        };
        let row = m.insert(&self.conn).await.context("insert_group failed")?;
        Ok(group_to_contract(row))
    }

    async fn update_group(&self, g: Group) -> anyhow::Result<()> {
        let m = group::ActiveModel {
            id: Set(g.id),
            name: Set(g.name),
            location: Set(g.location),
        };
        let _ = m.update(&self.conn).await.context("update_group failed")?;
        Ok(())
    }

    async fn delete_group(&self, id: i32) -> anyhow::Result<bool> {
        let res = group::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete_group failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_groups(&self, offset: u64, limit: u64) -> anyhow::Result<Vec<Group>> {
        let rows = group::Entity::find()
            .order_by_asc(group::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("list_groups failed")?;
        Ok(rows.into_iter().map(group_to_contract).collect())
    }
}

#[async_trait]
impl<C> MembersRepository for SeaOrmRosterRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_member(&self, id: i32) -> anyhow::Result<Option<StoredMember>> {
        let found = member::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_member failed")?;
        Ok(found.map(member_to_stored))
    }

    async fn insert_member(&self, m: NewStoredMember) -> anyhow::Result<StoredMember> {
        let am = member::ActiveModel {
            name: Set(m.name),
            alias: Set(m.alias),
            age: Set(m.age),
            group_id: Set(m.group_id),
            credential_hash: Set(m.credential_hash),
            ..Default::default()
        };
        let row = am.insert(&self.conn).await.context("insert_member failed")?;
        Ok(member_to_stored(row))
    }

    async fn update_member(&self, m: StoredMember) -> anyhow::Result<()> {
        let am = member::ActiveModel {
            id: Set(m.id),
            name: Set(m.name),
            alias: Set(m.alias),
            age: Set(m.age),
            group_id: Set(m.group_id),
            credential_hash: Set(m.credential_hash),
        };
        let _ = am.update(&self.conn).await.context("update_member failed")?;
        Ok(())
    }

    async fn delete_member(&self, id: i32) -> anyhow::Result<bool> {
        let res = member::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete_member failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_members(&self, offset: u64, limit: u64) -> anyhow::Result<Vec<StoredMember>> {
        let rows = member::Entity::find()
            .order_by_asc(member::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("list_members failed")?;
        Ok(rows.into_iter().map(member_to_stored).collect())
    }

    async fn members_of_group(&self, group_id: i32) -> anyhow::Result<Vec<StoredMember>> {
        let rows = member::Entity::find()
            .filter(member::Column::GroupId.eq(group_id))
            .order_by_asc(member::Column::Id)
            .all(&self.conn)
            .await
            .context("members_of_group failed")?;
        Ok(rows.into_iter().map(member_to_stored).collect())
    }

    async fn detach_members(&self, group_id: i32) -> anyhow::Result<u64> {
        let res = member::Entity::update_many()
            .col_expr(member::Column::GroupId, Expr::value(Option::<i32>::None))
            .filter(member::Column::GroupId.eq(group_id))
            .exec(&self.conn)
            .await
            .context("detach_members failed")?;
        Ok(res.rows_affected)
    }
}

#[async_trait]
impl Transaction for SeaOrmRosterRepository<DatabaseTransaction> {
    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        self.conn.commit().await.context("commit failed")
    }
}

/// Opens a `DatabaseTransaction` per unit of work.
#[derive(Clone)]
pub struct SeaOrmUnitOfWork {
    db: DatabaseConnection,
}

impl SeaOrmUnitOfWork {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UnitOfWork for SeaOrmUnitOfWork {
    async fn begin(&self) -> anyhow::Result<Box<dyn Transaction>> {
        let txn = self.db.begin().await.context("begin transaction failed")?;
        Ok(Box::new(SeaOrmRosterRepository::new(txn)))
    }
}
