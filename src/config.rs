//! Runtime configuration read from the environment (and `.env` via dotenvy)

use std::env;
use std::time::Duration;

use crate::services::trading::DEFAULT_SETTLEMENT_DELAY_MS;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_CACHE_TTL_SECS: u64 = 30;

/// Which implementation backs the data access layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceKind {
    /// In-memory fixtures, process lifetime only
    Mock,
    /// Hosted REST query service (PostgREST / Supabase)
    Postgrest,
    /// Direct Postgres access through SeaORM
    Database,
}

impl DataSourceKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "mock" => Some(DataSourceKind::Mock),
            "postgrest" | "supabase" => Some(DataSourceKind::Postgrest),
            "database" | "postgres" => Some(DataSourceKind::Database),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub data_source: DataSourceKind,
    pub database_url: Option<String>,
    pub postgrest_url: Option<String>,
    pub postgrest_api_key: Option<String>,
    pub settlement_delay: Duration,
    pub cache_ttl: Duration,
    pub cors_allow_origin: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            data_source: DataSourceKind::Mock,
            database_url: None,
            postgrest_url: None,
            postgrest_api_key: None,
            settlement_delay: Duration::from_millis(DEFAULT_SETTLEMENT_DELAY_MS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cors_allow_origin: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup so tests don't touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error + Send + Sync>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_source = match non_empty("DATA_SOURCE") {
            Some(raw) => DataSourceKind::parse(&raw)
                .ok_or_else(|| format!("Unknown DATA_SOURCE '{}' (expected mock, postgrest or database)", raw))?,
            None => defaults.data_source,
        };

        let settlement_delay = non_empty("SETTLEMENT_DELAY_MS")
            .and_then(|raw| match raw.trim().parse::<u64>() {
                Ok(ms) => Some(Duration::from_millis(ms)),
                Err(_) => {
                    tracing::warn!("Invalid SETTLEMENT_DELAY_MS '{}', using default", raw);
                    None
                }
            })
            .unwrap_or(defaults.settlement_delay);

        let cache_ttl = non_empty("CACHE_TTL_SECS")
            .and_then(|raw| match raw.trim().parse::<u64>() {
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    tracing::warn!("Invalid CACHE_TTL_SECS '{}', using default", raw);
                    None
                }
            })
            .unwrap_or(defaults.cache_ttl);

        let config = Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr),
            data_source,
            database_url: non_empty("DATABASE_URL"),
            postgrest_url: non_empty("POSTGREST_URL"),
            postgrest_api_key: non_empty("POSTGREST_API_KEY"),
            settlement_delay,
            cache_ttl,
            cors_allow_origin: non_empty("CORS_ALLOW_ORIGIN"),
        };

        match config.data_source {
            DataSourceKind::Database if config.database_url.is_none() => {
                return Err("DATABASE_URL must be set when DATA_SOURCE=database".into());
            }
            DataSourceKind::Postgrest if config.postgrest_url.is_none() => {
                return Err("POSTGREST_URL must be set when DATA_SOURCE=postgrest".into());
            }
            _ => {}
        }

        Ok(config)
    }
}
