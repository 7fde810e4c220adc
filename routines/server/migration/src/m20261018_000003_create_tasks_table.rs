use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

use crate::m20261018_000002_create_routines_table::Routines;

#[derive(DeriveMigrationName)]
pub struct Migration;

const FK_TASKS_TO_ROUTINES: &str = "fk-tasks-routine_id";
const IDX_TASKS_ROUTINE: &str = "idx-tasks-routine_id";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(pk_auto(Tasks::Id))
                    .col(string(Tasks::Title))
                    .col(string_null(Tasks::Description))
                    .col(integer(Tasks::Priority))
                    .col(boolean(Tasks::Complete).default(false))
                    .col(integer(Tasks::RoutineId))
                    // Deleting a routine takes its tasks with it.
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_TASKS_TO_ROUTINES)
                            .from(Tasks::Table, Tasks::RoutineId)
                            .to(Routines::Table, Routines::Id)
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
                    .name(IDX_TASKS_ROUTINE)
                    .table(Tasks::Table)
                    .col(Tasks::RoutineId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_TASKS_ROUTINE)
                    .table(Tasks::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
    Title,
    Description,
    Priority,
    Complete,
    RoutineId,
}
