//! Index supporting the creation-ordered restaurant listing.
use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_restaurant::Restaurant;

#[derive(DeriveMigrationName)]
pub struct Migration;

const IDX_RESTAURANT_CREATED_AT: &str = "idx_restaurant_created_at";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name(IDX_RESTAURANT_CREATED_AT)
                    .table(Restaurant::Table)
                    .col(Restaurant::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name(IDX_RESTAURANT_CREATED_AT).table(Restaurant::Table).to_owned())
            .await
    }
}
