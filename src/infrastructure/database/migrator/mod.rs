//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20240901_000001_create_couriers;
mod m20240901_000002_create_motorcycles;
mod m20240901_000003_create_rentals;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240901_000001_create_couriers::Migration),
            Box::new(m20240901_000002_create_motorcycles::Migration),
            Box::new(m20240901_000003_create_rentals::Migration),
        ]
    }
}
