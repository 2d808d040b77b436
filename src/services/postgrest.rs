//! Hosted backend query service (PostgREST / Supabase REST)
//!
//! Rows come back in the backend's own naming (`current_price`,
//! `is_locked`, `unlock_token_amount`, nested `profile`) and are mapped into
//! the canonical models here. Reads are cached per query identity for a short
//! TTL; holding writes invalidate the affected entries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::creator::{non_negative, Creator, CreatorIdentity};
use crate::models::{holding::Holding, post::Post};
use crate::services::store::TokenStore;

const CREATOR_SELECT: &str = "*,profile:profiles(username,display_name,avatar_url,bio)";

#[derive(Debug, Deserialize)]
struct ProfileRow {
    username: Option<String>,
    display_name: Option<String>,
    avatar_url: Option<String>,
    bio: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatorRow {
    id: String,
    token_symbol: String,
    token_name: String,
    banner_url: Option<String>,
    current_price: Decimal,
    #[serde(default)]
    price_change_24h: Decimal,
    market_cap: Decimal,
    holder_count: i64,
    #[serde(default)]
    post_count: i64,
    total_supply: Option<Decimal>,
    #[serde(default)]
    verified: bool,
    profile: Option<ProfileRow>,
}

impl From<CreatorRow> for Creator {
    fn from(row: CreatorRow) -> Self {
        let profile = row.profile.unwrap_or(ProfileRow {
            username: None,
            display_name: None,
            avatar_url: None,
            bio: None,
        });

        let (handle, display_name) = CreatorIdentity {
            handle: profile.username,
            display_name: profile.display_name,
            token_symbol: row.token_symbol.clone(),
            token_name: row.token_name.clone(),
        }
        .resolve();

        Creator {
            current_price: non_negative(row.current_price, "current_price", &row.id),
            market_cap: non_negative(row.market_cap, "market_cap", &row.id),
            holder_count: row.holder_count.max(0) as u64,
            post_count: row.post_count.max(0) as u64,
            id: row.id,
            handle,
            display_name,
            token_symbol: row.token_symbol,
            token_name: row.token_name,
            bio: profile.bio,
            avatar_url: profile.avatar_url,
            banner_url: row.banner_url,
            location: None,
            verified: row.verified,
            price_change_24h: row.price_change_24h,
            total_supply: row.total_supply,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PostRow {
    id: String,
    creator_id: String,
    content: String,
    image_url: Option<String>,
    is_locked: bool,
    unlock_token_amount: Decimal,
    #[serde(default)]
    likes_count: i64,
    #[serde(default)]
    comments_count: i64,
    created_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            creator_id: row.creator_id,
            content: row.content,
            media_url: row.image_url,
            gated: row.is_locked,
            required_tokens: row.unlock_token_amount,
            likes_count: row.likes_count.clamp(0, u32::MAX as i64) as u32,
            comments_count: row.comments_count.clamp(0, u32::MAX as i64) as u32,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct HoldingRow {
    user_id: String,
    creator_id: String,
    amount: Decimal,
    purchase_price: Decimal,
}

impl From<HoldingRow> for Holding {
    fn from(row: HoldingRow) -> Self {
        Holding {
            user_id: row.user_id,
            creator_id: row.creator_id,
            amount: row.amount,
            purchase_price: row.purchase_price,
        }
    }
}

impl From<&Holding> for HoldingRow {
    fn from(holding: &Holding) -> Self {
        HoldingRow {
            user_id: holding.user_id.clone(),
            creator_id: holding.creator_id.clone(),
            amount: holding.amount,
            purchase_price: holding.purchase_price,
        }
    }
}

#[derive(Clone)]
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    cache: Arc<Cache<String, serde_json::Value>>,
}

impl PostgrestStore {
    pub fn new(base_url: String, api_key: Option<String>, cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(cache_ttl)
            .build();

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            cache: Arc::new(cache),
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    /// Cache key is the table plus the exact query, so identical reads share an entry
    fn cache_key(table: &str, params: &[(&str, String)]) -> String {
        let query: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        format!("{}?{}", table, query.join("&"))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, AppError> {
        let cache_key = Self::cache_key(table, params);

        let rows = match self.cache.get(&cache_key).await {
            Some(cached) => {
                tracing::debug!("Cache hit for {}", cache_key);
                cached
            }
            None => {
                let url = format!("{}/{}", self.base_url, table);
                let response = self
                    .authorize(self.client.get(&url))
                    .header("accept", "application/json")
                    .query(params)
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(AppError::FetchFailure(format!(
                        "PostgREST error {} on {}: {}",
                        status, table, error_text
                    )));
                }

                let rows: serde_json::Value = response.json().await?;
                self.cache.insert(cache_key, rows.clone()).await;
                rows
            }
        };

        Ok(serde_json::from_value(rows)?)
    }

    async fn invalidate_holdings(&self, user_id: &str, creator_id: &str) {
        self.cache
            .invalidate(&Self::cache_key("token_holdings", &holdings_params(user_id)))
            .await;
        self.cache
            .invalidate(&Self::cache_key(
                "token_holdings",
                &holding_params(user_id, creator_id),
            ))
            .await;
    }

    async fn check_write(response: reqwest::Response, action: &str) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        Err(AppError::FetchFailure(format!(
            "PostgREST {} failed {}: {}",
            action, status, error_text
        )))
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

fn holdings_params(user_id: &str) -> Vec<(&'static str, String)> {
    vec![
        ("select", "*".to_string()),
        ("user_id", eq(user_id)),
        ("order", "creator_id.asc".to_string()),
    ]
}

fn holding_params(user_id: &str, creator_id: &str) -> Vec<(&'static str, String)> {
    vec![
        ("select", "*".to_string()),
        ("user_id", eq(user_id)),
        ("creator_id", eq(creator_id)),
    ]
}

#[async_trait]
impl TokenStore for PostgrestStore {
    fn source_name(&self) -> &'static str {
        "postgrest"
    }

    async fn creators(&self) -> Result<Vec<Creator>, AppError> {
        let rows: Vec<CreatorRow> = self
            .select(
                "creators",
                &[
                    ("select", CREATOR_SELECT.to_string()),
                    ("order", "market_cap.desc".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(Creator::from).collect())
    }

    async fn creator(&self, id: &str) -> Result<Option<Creator>, AppError> {
        let rows: Vec<CreatorRow> = self
            .select(
                "creators",
                &[("select", CREATOR_SELECT.to_string()), ("id", eq(id))],
            )
            .await?;
        Ok(rows.into_iter().next().map(Creator::from))
    }

    async fn posts(&self, creator_id: Option<&str>) -> Result<Vec<Post>, AppError> {
        let mut params = vec![
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
        ];
        if let Some(creator_id) = creator_id {
            params.push(("creator_id", eq(creator_id)));
        }

        let rows: Vec<PostRow> = self.select("posts", &params).await?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn post(&self, id: &str) -> Result<Option<Post>, AppError> {
        let rows: Vec<PostRow> = self
            .select("posts", &[("select", "*".to_string()), ("id", eq(id))])
            .await?;
        Ok(rows.into_iter().next().map(Post::from))
    }

    async fn holdings(&self, user_id: &str) -> Result<Vec<Holding>, AppError> {
        let rows: Vec<HoldingRow> = self
            .select("token_holdings", &holdings_params(user_id))
            .await?;
        Ok(rows.into_iter().map(Holding::from).collect())
    }

    async fn holding(&self, user_id: &str, creator_id: &str) -> Result<Option<Holding>, AppError> {
        let rows: Vec<HoldingRow> = self
            .select("token_holdings", &holding_params(user_id, creator_id))
            .await?;
        Ok(rows.into_iter().next().map(Holding::from))
    }

    async fn save_holding(&self, holding: &Holding) -> Result<(), AppError> {
        let url = format!("{}/token_holdings", self.base_url);
        let response = self
            .authorize(self.client.post(&url))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .query(&[("on_conflict", "user_id,creator_id")])
            .json(&HoldingRow::from(holding))
            .send()
            .await?;

        Self::check_write(response, "upsert").await?;
        self.invalidate_holdings(&holding.user_id, &holding.creator_id).await;
        Ok(())
    }

    async fn delete_holding(&self, user_id: &str, creator_id: &str) -> Result<(), AppError> {
        let url = format!("{}/token_holdings", self.base_url);
        let response = self
            .authorize(self.client.delete(&url))
            .query(&[("user_id", eq(user_id)), ("creator_id", eq(creator_id))])
            .send()
            .await?;

        Self::check_write(response, "delete").await?;
        self.invalidate_holdings(user_id, creator_id).await;
        Ok(())
    }
}
