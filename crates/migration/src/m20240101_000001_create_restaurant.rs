//! Create `restaurant` table.
//!
//! Reservations are embedded in the `reservations` jsonb column rather than
//! living in their own table; `version` backs the conditional rewrite.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Restaurant::Table)
                    .if_not_exists()
                    .col(uuid(Restaurant::Id).primary_key())
                    .col(string_len(Restaurant::Name, 256).not_null())
                    .col(text(Restaurant::Description).not_null())
                    .col(json_binary(Restaurant::Reservations).not_null())
                    .col(big_integer(Restaurant::Version).not_null().default(0))
                    .col(timestamp_with_time_zone(Restaurant::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Restaurant::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Restaurant { Table, Id, Name, Description, Reservations, Version, CreatedAt }
