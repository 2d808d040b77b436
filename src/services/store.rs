//! Data access boundary
//!
//! `TokenStore` is the one schema every data source maps into. The mock
//! fixtures, the hosted REST service and the SQL database each get an adapter.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;

use crate::config::{AppConfig, DataSourceKind};
use crate::error::AppError;
use crate::models::{creator::Creator, holding::Holding, post::Post};
use crate::services::{database::DatabaseStore, mock_store::MockStore, postgrest::PostgrestStore};

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Short name used in logs
    fn source_name(&self) -> &'static str;

    /// All creators, highest market cap first
    async fn creators(&self) -> Result<Vec<Creator>, AppError>;

    async fn creator(&self, id: &str) -> Result<Option<Creator>, AppError>;

    /// Posts newest first, optionally restricted to one creator
    async fn posts(&self, creator_id: Option<&str>) -> Result<Vec<Post>, AppError>;

    async fn post(&self, id: &str) -> Result<Option<Post>, AppError>;

    async fn holdings(&self, user_id: &str) -> Result<Vec<Holding>, AppError>;

    async fn holding(&self, user_id: &str, creator_id: &str) -> Result<Option<Holding>, AppError>;

    /// Insert or replace the holding for its (user, creator) pair
    async fn save_holding(&self, holding: &Holding) -> Result<(), AppError>;

    async fn delete_holding(&self, user_id: &str, creator_id: &str) -> Result<(), AppError>;
}

/// Build the store selected by `DATA_SOURCE`. The database source runs
/// pending migrations before returning.
pub async fn connect(
    config: &AppConfig,
) -> Result<Arc<dyn TokenStore>, Box<dyn std::error::Error + Send + Sync>> {
    match config.data_source {
        DataSourceKind::Mock => {
            tracing::info!("Using in-memory mock data source");
            Ok(Arc::new(MockStore::seeded()))
        }
        DataSourceKind::Postgrest => {
            let base_url = config
                .postgrest_url
                .clone()
                .ok_or("POSTGREST_URL must be set")?;
            tracing::info!(base_url = %base_url, "Using PostgREST data source");
            Ok(Arc::new(PostgrestStore::new(
                base_url,
                config.postgrest_api_key.clone(),
                config.cache_ttl,
            )))
        }
        DataSourceKind::Database => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or("DATABASE_URL must be set")?;

            tracing::info!("Connecting to database...");
            let db = Database::connect(database_url).await?;

            tracing::info!("Running migrations...");
            migration::Migrator::up(&db, None).await?;

            Ok(Arc::new(DatabaseStore::new(db)))
        }
    }
}
