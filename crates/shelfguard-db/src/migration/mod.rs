//! database migrations for shelfguard.

pub use sea_orm_migration::prelude::*;

mod m20261019_000001_create_license_types;
mod m20261019_000002_create_users;
mod m20261019_000003_create_network_ranges;
mod m20261019_000004_create_licenses;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_create_license_types::Migration),
            Box::new(m20261019_000002_create_users::Migration),
            Box::new(m20261019_000003_create_network_ranges::Migration),
            Box::new(m20261019_000004_create_licenses::Migration),
        ]
    }
}
