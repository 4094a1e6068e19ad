use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subscribers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscribers::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Subscribers::Name)
                            .string()
                            .not_null(),
                    )
                    // Settings columns are nullable; NULL resolves to the
                    // defaults (rub / decrease / 10) at read time.
                    .col(
                        ColumnDef::new(Subscribers::Currency)
                            .string()
                            .null()
                            .default("rub"),
                    )
                    .col(
                        ColumnDef::new(Subscribers::Direction)
                            .string()
                            .null()
                            .default("decrease"),
                    )
                    .col(
                        ColumnDef::new(Subscribers::ThresholdPercent)
                            .integer()
                            .null()
                            .default(10),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subscribers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Subscribers {
    Table,
    Id,
    Name,
    Currency,
    Direction,
    ThresholdPercent,
}
