use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::models::creator::Creator;
use crate::models::holding::{Holding, PortfolioEntry, PortfolioResponse};
use crate::services::pricing::{round_display, CURRENCY_DISPLAY_DP};

/// Value each holding at its creator's current price.
/// Holdings whose creator is unknown are skipped.
pub fn value_portfolio(holdings: &[Holding], creators: &[Creator]) -> PortfolioResponse {
    let by_id: HashMap<&str, &Creator> = creators.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut response = PortfolioResponse::default();

    for holding in holdings {
        let Some(creator) = by_id.get(holding.creator_id.as_str()) else {
            tracing::debug!(creator_id = %holding.creator_id, "Skipping holding for unknown creator");
            continue;
        };

        let valued = holding
            .amount
            .checked_mul(creator.current_price)
            .zip(holding.amount.checked_mul(holding.purchase_price));
        let totals = valued.and_then(|(value, cost_basis)| {
            let pnl = value.checked_sub(cost_basis)?;
            Some((
                response.total_value.checked_add(value)?,
                response.total_cost.checked_add(cost_basis)?,
                response.total_unrealized_pnl.checked_add(pnl)?,
                pnl,
            ))
        });
        let (Some((value, cost_basis)), Some((total_value, total_cost, total_pnl, pnl))) =
            (valued, totals)
        else {
            tracing::warn!(
                creator_id = %holding.creator_id,
                amount = %holding.amount,
                "Holding value out of range, skipping"
            );
            continue;
        };

        response.total_value = total_value;
        response.total_cost = total_cost;
        response.total_unrealized_pnl = total_pnl;

        response.holdings.push(PortfolioEntry {
            creator_id: creator.id.clone(),
            token_symbol: creator.token_symbol.clone(),
            display_name: creator.display_name.clone(),
            handle: creator.handle.clone(),
            amount: holding.amount,
            current_price: creator.current_price,
            purchase_price: holding.purchase_price,
            value: round_display(value, CURRENCY_DISPLAY_DP),
            cost_basis: round_display(cost_basis, CURRENCY_DISPLAY_DP),
            unrealized_pnl: round_display(pnl, CURRENCY_DISPLAY_DP),
            price_change_24h: creator.price_change_24h,
        });
    }

    // Largest positions first
    response.holdings.sort_by(|a, b| b.value.cmp(&a.value));

    response.total_unrealized_pnl = round_display(response.total_unrealized_pnl, CURRENCY_DISPLAY_DP);
    response.total_value = round_display(response.total_value, CURRENCY_DISPLAY_DP);
    response.total_cost = round_display(response.total_cost, CURRENCY_DISPLAY_DP);

    response
}

/// Holding amounts keyed by creator id
pub fn balances_by_creator(holdings: &[Holding]) -> HashMap<String, Decimal> {
    holdings
        .iter()
        .map(|h| (h.creator_id.clone(), h.amount))
        .collect()
}
