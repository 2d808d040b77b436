//! Trade request/response types and the per-attempt phase machine
//!
//! Phases progress: idle → validating → executing → settled
//!                                    ↘ rejected

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradePhase {
    Idle,
    Validating,
    Executing,
    Settled,
    Rejected,
}

impl TradePhase {
    pub fn can_transition_to(self, next: TradePhase) -> bool {
        matches!(
            (self, next),
            (TradePhase::Idle, TradePhase::Validating)
                | (TradePhase::Validating, TradePhase::Executing)
                | (TradePhase::Validating, TradePhase::Rejected)
                | (TradePhase::Executing, TradePhase::Settled)
                // Settlement write failed at the data source
                | (TradePhase::Executing, TradePhase::Rejected)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TradePhase::Settled | TradePhase::Rejected)
    }
}

impl std::fmt::Display for TradePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradePhase::Idle => write!(f, "idle"),
            TradePhase::Validating => write!(f, "validating"),
            TradePhase::Executing => write!(f, "executing"),
            TradePhase::Settled => write!(f, "settled"),
            TradePhase::Rejected => write!(f, "rejected"),
        }
    }
}

/// What the user typed into the trading panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeInput {
    /// Token amount, used as-is
    Tokens(String),
    /// Payment-currency amount, converted to tokens at the current price
    Currency(String),
}

/// POST /api/creators/{id}/buy and /sell
///
/// Amounts may be JSON strings or numbers. `tokens` wins when both are set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeRequest {
    pub tokens: Option<serde_json::Value>,
    pub currency: Option<serde_json::Value>,
}

impl TradeRequest {
    pub fn into_input(self) -> Result<TradeInput, AppError> {
        if let Some(tokens) = self.tokens.as_ref().and_then(raw_amount) {
            return Ok(TradeInput::Tokens(tokens));
        }
        if let Some(currency) = self.currency.as_ref().and_then(raw_amount) {
            return Ok(TradeInput::Currency(currency));
        }
        Err(AppError::InvalidAmount)
    }
}

fn raw_amount(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Result of a settled trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub side: TradeSide,
    pub creator_id: String,
    pub token_symbol: String,
    /// Token amount traded
    pub amount: Decimal,
    /// Payment-currency amount, rounded for display
    pub currency_amount: Decimal,
    pub unit_price: Decimal,
    pub new_balance: Decimal,
    pub settled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeResponse {
    pub status: TradePhase,
    pub settlement: Settlement,
}

/// Query parameters for GET /api/creators/{id}/quote
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteQuery {
    pub tokens: Option<String>,
    pub currency: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_phase_transitions() {
        assert!(TradePhase::Idle.can_transition_to(TradePhase::Validating));
        assert!(TradePhase::Validating.can_transition_to(TradePhase::Executing));
        assert!(TradePhase::Validating.can_transition_to(TradePhase::Rejected));
        assert!(TradePhase::Executing.can_transition_to(TradePhase::Settled));

        assert!(!TradePhase::Idle.can_transition_to(TradePhase::Executing));
        assert!(TradePhase::Executing.can_transition_to(TradePhase::Rejected));
        assert!(!TradePhase::Rejected.can_transition_to(TradePhase::Settled));
        assert!(!TradePhase::Settled.can_transition_to(TradePhase::Validating));
    }

    #[test]
    fn test_terminal_phases() {
        assert!(TradePhase::Settled.is_terminal());
        assert!(TradePhase::Rejected.is_terminal());
        assert!(!TradePhase::Executing.is_terminal());
    }

    #[test]
    fn test_request_accepts_string_or_number() {
        let req: TradeRequest = serde_json::from_value(json!({ "tokens": "10" })).unwrap();
        assert_eq!(req.into_input().unwrap(), TradeInput::Tokens("10".to_string()));

        let req: TradeRequest = serde_json::from_value(json!({ "currency": 20.5 })).unwrap();
        assert_eq!(req.into_input().unwrap(), TradeInput::Currency("20.5".to_string()));
    }

    #[test]
    fn test_request_tokens_take_precedence() {
        let req: TradeRequest =
            serde_json::from_value(json!({ "tokens": "3", "currency": "99" })).unwrap();
        assert_eq!(req.into_input().unwrap(), TradeInput::Tokens("3".to_string()));
    }

    #[test]
    fn test_empty_request_is_invalid() {
        assert_eq!(TradeRequest::default().into_input(), Err(AppError::InvalidAmount));

        let req: TradeRequest = serde_json::from_value(json!({ "tokens": "  " })).unwrap();
        assert_eq!(req.into_input(), Err(AppError::InvalidAmount));

        let req: TradeRequest = serde_json::from_value(json!({ "tokens": true })).unwrap();
        assert_eq!(req.into_input(), Err(AppError::InvalidAmount));
    }

    #[test]
    fn test_side_serde() {
        assert_eq!(serde_json::to_string(&TradeSide::Sell).unwrap(), "\"sell\"");
        assert_eq!(TradeSide::Buy.to_string(), "buy");
    }
}
