//! SeaORM Entity for creator token profiles

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "creators")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub handle: Option<String>,
    pub display_name: Option<String>,
    #[sea_orm(unique)]
    pub token_symbol: String,
    pub token_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    #[sea_orm(column_type = "Decimal(None)")]
    pub current_price: Decimal,
    #[sea_orm(column_name = "price_change_24h", column_type = "Decimal(None)")]
    pub price_change_24h: Decimal,
    /// Stored aggregate, maintained outside this service
    #[sea_orm(column_type = "Decimal(None)")]
    pub market_cap: Decimal,
    pub holder_count: i64,
    pub post_count: i64,
    #[sea_orm(column_type = "Decimal(None)", nullable)]
    pub total_supply: Option<Decimal>,
    pub verified: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
