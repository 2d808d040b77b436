//! SeaORM Entity for per-user creator token balances

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "token_holdings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Unique together with creator_id
    pub user_id: String,
    pub creator_id: String,
    #[sea_orm(column_type = "Decimal(None)")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Decimal(None)")]
    pub purchase_price: Decimal,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
