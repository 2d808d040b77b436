//! Relational data source over the canonical schema (SeaORM)

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{creators, posts, prelude::*, token_holdings};
use crate::error::AppError;
use crate::models::creator::{non_negative, Creator, CreatorIdentity};
use crate::models::{holding::Holding, post::Post};
use crate::services::store::TokenStore;

pub struct DatabaseStore {
    db: DatabaseConnection,
}

impl DatabaseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<creators::Model> for Creator {
    fn from(model: creators::Model) -> Self {
        let (handle, display_name) = CreatorIdentity {
            handle: model.handle,
            display_name: model.display_name,
            token_symbol: model.token_symbol.clone(),
            token_name: model.token_name.clone(),
        }
        .resolve();

        Creator {
            current_price: non_negative(model.current_price, "current_price", &model.id),
            market_cap: non_negative(model.market_cap, "market_cap", &model.id),
            holder_count: model.holder_count.max(0) as u64,
            post_count: model.post_count.max(0) as u64,
            id: model.id,
            handle,
            display_name,
            token_symbol: model.token_symbol,
            token_name: model.token_name,
            bio: model.bio,
            avatar_url: model.avatar_url,
            banner_url: model.banner_url,
            location: None,
            verified: model.verified,
            price_change_24h: model.price_change_24h,
            total_supply: model.total_supply,
        }
    }
}

impl From<posts::Model> for Post {
    fn from(model: posts::Model) -> Self {
        Post {
            id: model.id,
            creator_id: model.creator_id,
            content: model.content,
            media_url: model.image_url,
            gated: model.is_locked,
            required_tokens: model.unlock_token_amount,
            likes_count: model.likes_count.max(0) as u32,
            comments_count: model.comments_count.max(0) as u32,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<token_holdings::Model> for Holding {
    fn from(model: token_holdings::Model) -> Self {
        Holding {
            user_id: model.user_id,
            creator_id: model.creator_id,
            amount: model.amount,
            purchase_price: model.purchase_price,
        }
    }
}

#[async_trait]
impl TokenStore for DatabaseStore {
    fn source_name(&self) -> &'static str {
        "database"
    }

    async fn creators(&self) -> Result<Vec<Creator>, AppError> {
        let rows = Creators::find()
            .order_by_desc(creators::Column::MarketCap)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Creator::from).collect())
    }

    async fn creator(&self, id: &str) -> Result<Option<Creator>, AppError> {
        let row = Creators::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(row.map(Creator::from))
    }

    async fn posts(&self, creator_id: Option<&str>) -> Result<Vec<Post>, AppError> {
        let mut query = Posts::find();
        if let Some(creator_id) = creator_id {
            query = query.filter(posts::Column::CreatorId.eq(creator_id));
        }

        let rows = query
            .order_by_desc(posts::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn post(&self, id: &str) -> Result<Option<Post>, AppError> {
        let row = Posts::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(row.map(Post::from))
    }

    async fn holdings(&self, user_id: &str) -> Result<Vec<Holding>, AppError> {
        let rows = TokenHoldings::find()
            .filter(token_holdings::Column::UserId.eq(user_id))
            .order_by_asc(token_holdings::Column::CreatorId)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Holding::from).collect())
    }

    async fn holding(&self, user_id: &str, creator_id: &str) -> Result<Option<Holding>, AppError> {
        let row = TokenHoldings::find()
            .filter(token_holdings::Column::UserId.eq(user_id))
            .filter(token_holdings::Column::CreatorId.eq(creator_id))
            .one(&self.db)
            .await?;
        Ok(row.map(Holding::from))
    }

    async fn save_holding(&self, holding: &Holding) -> Result<(), AppError> {
        let now = Utc::now().fixed_offset();

        let existing = TokenHoldings::find()
            .filter(token_holdings::Column::UserId.eq(holding.user_id.as_str()))
            .filter(token_holdings::Column::CreatorId.eq(holding.creator_id.as_str()))
            .one(&self.db)
            .await?;

        match existing {
            Some(record) => {
                let mut active_model: token_holdings::ActiveModel = record.into();
                active_model.amount = Set(holding.amount);
                active_model.purchase_price = Set(holding.purchase_price);
                active_model.updated_at = Set(now);
                active_model.update(&self.db).await?;
            }
            None => {
                let new_record = token_holdings::ActiveModel {
                    user_id: Set(holding.user_id.clone()),
                    creator_id: Set(holding.creator_id.clone()),
                    amount: Set(holding.amount),
                    purchase_price: Set(holding.purchase_price),
                    updated_at: Set(now),
                    ..Default::default()
                };
                new_record.insert(&self.db).await?;
            }
        }

        Ok(())
    }

    async fn delete_holding(&self, user_id: &str, creator_id: &str) -> Result<(), AppError> {
        let result = TokenHoldings::delete_many()
            .filter(token_holdings::Column::UserId.eq(user_id))
            .filter(token_holdings::Column::CreatorId.eq(creator_id))
            .exec(&self.db)
            .await?;

        tracing::debug!(
            user_id = %user_id,
            creator_id = %creator_id,
            rows = result.rows_affected,
            "Deleted holding"
        );
        Ok(())
    }
}
