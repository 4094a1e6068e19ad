use sea_orm_migration::prelude::*;

use crate::m20260110_000001_create_subscribers::Subscribers;
use crate::m20260110_000002_create_products::Products;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Watches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Watches::ProductId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Watches::SubscriberId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(Watches::ProductId)
                            .col(Watches::SubscriberId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watches_product")
                            .from(Watches::Table, Watches::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watches_subscriber")
                            .from(Watches::Table, Watches::SubscriberId)
                            .to(Subscribers::Table, Subscribers::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Cycle enumeration and "my products" listings both key on subscriber
        manager
            .create_index(
                Index::create()
                    .name("idx_watches_subscriber")
                    .table(Watches::Table)
                    .col(Watches::SubscriberId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Watches::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Watches {
    Table,
    ProductId,
    SubscriberId,
}
