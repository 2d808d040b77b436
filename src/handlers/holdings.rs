use axum::{extract::State, Json};

use crate::{
    error::AppError,
    handlers::identity::MaybeIdentity,
    models::holding::PortfolioResponse,
    services::portfolio::value_portfolio,
    AppState,
};

/// Handler for GET /api/holdings
/// Anonymous callers get an empty portfolio.
pub async fn get_holdings(
    State(state): State<AppState>,
    identity: MaybeIdentity,
) -> Result<Json<PortfolioResponse>, AppError> {
    let Some(user_id) = identity.user_id() else {
        return Ok(Json(PortfolioResponse::default()));
    };

    let holdings = state.store.holdings(user_id).await?;
    if holdings.is_empty() {
        return Ok(Json(PortfolioResponse::default()));
    }

    let creators = state.store.creators().await?;
    let portfolio = value_portfolio(&holdings, &creators);

    tracing::debug!(
        user_id = %user_id,
        positions = portfolio.holdings.len(),
        total_value = %portfolio.total_value,
        "Valued portfolio"
    );

    Ok(Json(portfolio))
}
