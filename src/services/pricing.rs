//! Currency ↔ token conversion at a fixed unit price
//!
//! All arithmetic is `Decimal` fixed point. Rounding is applied only to the
//! values shown to users, never to the amounts fed into balance updates.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Decimal places shown for token amounts
pub const TOKEN_DISPLAY_DP: u32 = 2;

/// Decimal places shown for payment-currency amounts
pub const CURRENCY_DISPLAY_DP: u32 = 2;

/// `tokens = currency / unit_price`. None when the price is not positive.
pub fn currency_to_tokens(currency: Decimal, unit_price: Decimal) -> Option<Decimal> {
    if unit_price <= Decimal::ZERO {
        return None;
    }
    currency.checked_div(unit_price)
}

/// `currency = tokens * unit_price`
pub fn tokens_to_currency(tokens: Decimal, unit_price: Decimal) -> Option<Decimal> {
    tokens.checked_mul(unit_price)
}

/// Half-away-from-zero, matching how the trading panel formats numbers
pub fn round_display(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse a user-entered amount. Zero, negative and unparseable input are all
/// rejected as [`AppError::InvalidAmount`].
pub fn parse_amount(input: &str) -> Result<Decimal, AppError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidAmount);
    }

    let value = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| AppError::InvalidAmount)?;

    if value <= Decimal::ZERO {
        return Err(AppError::InvalidAmount);
    }

    Ok(value)
}

/// Both sides of a conversion, raw and display-rounded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub unit_price: Decimal,
    pub tokens: Decimal,
    pub currency: Decimal,
    pub tokens_display: Decimal,
    pub currency_display: Decimal,
}

impl Quote {
    pub fn from_tokens(tokens: Decimal, unit_price: Decimal) -> Result<Self, AppError> {
        let currency = tokens_to_currency(tokens, unit_price).ok_or(AppError::InvalidAmount)?;
        Ok(Self::new(tokens, currency, unit_price))
    }

    pub fn from_currency(currency: Decimal, unit_price: Decimal) -> Result<Self, AppError> {
        let tokens = currency_to_tokens(currency, unit_price).ok_or(AppError::InvalidAmount)?;
        Ok(Self::new(tokens, currency, unit_price))
    }

    fn new(tokens: Decimal, currency: Decimal, unit_price: Decimal) -> Self {
        Self {
            unit_price,
            tokens,
            currency,
            tokens_display: round_display(tokens, TOKEN_DISPLAY_DP),
            currency_display: round_display(currency, CURRENCY_DISPLAY_DP),
        }
    }
}
