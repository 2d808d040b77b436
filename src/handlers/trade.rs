use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppError,
    handlers::identity::MaybeIdentity,
    models::trade::{TradePhase, TradeRequest, TradeResponse},
    AppState,
};

/// Handler for POST /api/creators/{id}/buy
/// Resolves after the settlement delay.
pub async fn buy(
    State(state): State<AppState>,
    Path(creator_id): Path<String>,
    identity: MaybeIdentity,
    Json(request): Json<TradeRequest>,
) -> Result<Json<TradeResponse>, AppError> {
    let input = request.into_input()?;
    let settlement = state
        .trading
        .buy(identity.user_id(), &creator_id, input)
        .await?;

    Ok(Json(TradeResponse {
        status: TradePhase::Settled,
        settlement,
    }))
}

/// Handler for POST /api/creators/{id}/sell
pub async fn sell(
    State(state): State<AppState>,
    Path(creator_id): Path<String>,
    identity: MaybeIdentity,
    Json(request): Json<TradeRequest>,
) -> Result<Json<TradeResponse>, AppError> {
    let input = request.into_input()?;
    let settlement = state
        .trading
        .sell(identity.user_id(), &creator_id, input)
        .await?;

    Ok(Json(TradeResponse {
        status: TradePhase::Settled,
        settlement,
    }))
}
