use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_groups_table::Groups;

#[derive(DeriveIden)]
enum Members {
    Table,
    Id,
    Name,
    Alias,
    Age,
    GroupId,
    CredentialHash,
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250101_000002_create_members_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Members::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Members::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Members::Name).string().not_null())
                    .col(ColumnDef::new(Members::Alias).string().not_null())
                    .col(ColumnDef::new(Members::Age).integer().null())
                    .col(ColumnDef::new(Members::GroupId).integer().null())
                    .col(ColumnDef::new(Members::CredentialHash).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_members_group")
                            .from(Members::Table, Members::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_members_name")
                    .table(Members::Table)
                    .col(Members::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_members_age")
                    .table(Members::Table)
                    .col(Members::Age)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_members_age").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_members_name").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Members::Table).to_owned())
            .await
    }
}
