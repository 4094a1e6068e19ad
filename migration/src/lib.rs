pub use sea_orm_migration::prelude::*;

mod m20260110_000001_create_subscribers;
mod m20260110_000002_create_products;
mod m20260110_000003_create_watches;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260110_000001_create_subscribers::Migration),
            Box::new(m20260110_000002_create_products::Migration),
            Box::new(m20260110_000003_create_watches::Migration),
        ]
    }
}
