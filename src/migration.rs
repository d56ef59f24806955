//! Schema migrations (feature `migration`).

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_tables;

/// Applies the portfolio schema: sessions, accounts, profiles and their
/// linked accounts, skills and contact messages.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    // Override the name of migration table to avoid conflicts
    fn migration_table_name() -> sea_orm::DynIden {
        Alias::new("portfolio_api_migrations").into_iden()
    }

    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250101_000001_create_tables::Migration)]
    }
}
