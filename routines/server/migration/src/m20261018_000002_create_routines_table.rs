use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

use crate::m20261018_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

const FK_ROUTINES_TO_USERS: &str = "fk-routines-owner_id";
const IDX_ROUTINES_OWNER: &str = "idx-routines-owner_id";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Routines::Table)
                    .if_not_exists()
                    .col(pk_auto(Routines::Id))
                    .col(string(Routines::Title))
                    .col(string_null(Routines::Description))
                    .col(integer(Routines::Priority))
                    .col(boolean(Routines::Complete).default(false))
                    .col(integer(Routines::OwnerId))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_ROUTINES_TO_USERS)
                            .from(Routines::Table, Routines::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(IDX_ROUTINES_OWNER)
                    .table(Routines::Table)
                    .col(Routines::OwnerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_ROUTINES_OWNER)
                    .table(Routines::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Routines::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Routines {
    Table,
    Id,
    Title,
    Description,
    Priority,
    Complete,
    OwnerId,
}
