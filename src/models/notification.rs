use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::trade::{Settlement, TradeSide};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TradeSettled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub creator_id: String,
    pub token_symbol: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn trade_settled(user_id: &str, settlement: &Settlement) -> Self {
        let amount = settlement.amount.normalize();
        let message = match settlement.side {
            TradeSide::Buy => format!(
                "Transaction successful! {} ${} added to your wallet.",
                amount, settlement.token_symbol
            ),
            TradeSide::Sell => format!(
                "Transaction successful! Sold {} ${}.",
                amount, settlement.token_symbol
            ),
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind: NotificationKind::TradeSettled,
            message,
            creator_id: settlement.creator_id.clone(),
            token_symbol: settlement.token_symbol.clone(),
            amount,
            created_at: settlement.settled_at,
        }
    }
}

/// GET /api/notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn settlement(side: TradeSide) -> Settlement {
        Settlement {
            side,
            creator_id: "1".to_string(),
            token_symbol: "TILL".to_string(),
            amount: dec!(10.00),
            currency_amount: dec!(3.40),
            unit_price: dec!(0.34),
            new_balance: dec!(10),
            settled_at: Utc::now(),
        }
    }

    #[test]
    fn test_buy_message() {
        let n = Notification::trade_settled("alice", &settlement(TradeSide::Buy));
        assert_eq!(n.message, "Transaction successful! 10 $TILL added to your wallet.");
        assert_eq!(n.kind, NotificationKind::TradeSettled);
        assert_eq!(n.user_id, "alice");
    }

    #[test]
    fn test_sell_message() {
        let n = Notification::trade_settled("alice", &settlement(TradeSide::Sell));
        assert_eq!(n.message, "Transaction successful! Sold 10 $TILL.");
    }
}
