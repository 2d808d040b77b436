pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_creators;
mod m20251001_000002_create_posts;
mod m20251001_000003_create_token_holdings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_creators::Migration),
            Box::new(m20251001_000002_create_posts::Migration),
            Box::new(m20251001_000003_create_token_holdings::Migration),
        ]
    }
}
