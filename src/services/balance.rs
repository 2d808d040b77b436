//! Balance/holding model on top of a [`TokenStore`]

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::error::AppError;
use crate::models::holding::Holding;
use crate::services::store::TokenStore;

#[derive(Clone)]
pub struct BalanceBook {
    store: Arc<dyn TokenStore>,
}

impl BalanceBook {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Holding amount for the pair, zero when there is no holding or no user
    pub async fn get_balance(&self, user_id: Option<&str>, creator_id: &str) -> Result<Decimal, AppError> {
        let Some(user_id) = user_id else {
            return Ok(Decimal::ZERO);
        };

        Ok(self
            .store
            .holding(user_id, creator_id)
            .await?
            .map(|h| h.amount)
            .unwrap_or(Decimal::ZERO))
    }

    /// Add `signed_amount` to the holding and return the new balance.
    ///
    /// Callers must not sell more than the current balance; the trading
    /// simulator checks that before getting here. A holding that reaches zero
    /// is deleted. Buys fold `unit_price` into the average purchase price.
    pub async fn apply_trade(
        &self,
        user_id: &str,
        creator_id: &str,
        signed_amount: Decimal,
        unit_price: Decimal,
    ) -> Result<Decimal, AppError> {
        let existing = self.store.holding(user_id, creator_id).await?;
        let mut holding = existing.unwrap_or_else(|| Holding::empty(user_id, creator_id, unit_price));

        let new_amount = holding
            .amount
            .checked_add(signed_amount)
            .ok_or(AppError::InvalidAmount)?;

        if new_amount <= Decimal::ZERO {
            if new_amount < Decimal::ZERO {
                tracing::warn!(
                    user_id = %user_id,
                    creator_id = %creator_id,
                    balance = %holding.amount,
                    signed_amount = %signed_amount,
                    "Trade would drive balance negative, clamping to zero"
                );
            }
            self.store.delete_holding(user_id, creator_id).await?;
            return Ok(Decimal::ZERO);
        }

        if signed_amount > Decimal::ZERO {
            holding.purchase_price = average_price(
                holding.amount,
                holding.purchase_price,
                signed_amount,
                unit_price,
            )
            .ok_or(AppError::InvalidAmount)?;
        }
        holding.amount = new_amount;

        self.store.save_holding(&holding).await?;

        tracing::debug!(
            user_id = %user_id,
            creator_id = %creator_id,
            signed_amount = %signed_amount,
            balance = %new_amount,
            "Applied trade to holding"
        );

        Ok(new_amount)
    }
}

/// Size-weighted average of the old position and the newly bought amount.
/// None on overflow.
fn average_price(
    held: Decimal,
    held_price: Decimal,
    bought: Decimal,
    bought_price: Decimal,
) -> Option<Decimal> {
    let total = held.checked_add(bought)?;
    if total.is_zero() {
        return Some(bought_price);
    }
    let held_cost = held.checked_mul(held_price)?;
    let bought_cost = bought.checked_mul(bought_price)?;
    held_cost.checked_add(bought_cost)?.checked_div(total)
}
