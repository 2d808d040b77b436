use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One user's position in one creator token. At most one per (user, creator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub user_id: String,
    pub creator_id: String,
    pub amount: Decimal,
    /// Average acquisition price; reporting only, never used for balance arithmetic
    pub purchase_price: Decimal,
}

impl Holding {
    pub fn empty(user_id: &str, creator_id: &str, purchase_price: Decimal) -> Self {
        Self {
            user_id: user_id.to_string(),
            creator_id: creator_id.to_string(),
            amount: Decimal::ZERO,
            purchase_price,
        }
    }
}

/// GET /api/creators/{id}/balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub creator_id: String,
    pub token_symbol: String,
    pub balance: Decimal,
}

/// Single row of the portfolio view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioEntry {
    pub creator_id: String,
    pub token_symbol: String,
    pub display_name: String,
    pub handle: String,
    pub amount: Decimal,
    pub current_price: Decimal,
    pub purchase_price: Decimal,
    pub value: Decimal,
    pub cost_basis: Decimal,
    pub unrealized_pnl: Decimal,
    pub price_change_24h: Decimal,
}

/// GET /api/holdings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioResponse {
    pub holdings: Vec<PortfolioEntry>,
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub total_unrealized_pnl: Decimal,
}
