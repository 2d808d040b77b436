use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppError,
    handlers::{identity::MaybeIdentity, posts::build_feed},
    models::{
        creator::{Creator, CreatorListResponse},
        holding::BalanceResponse,
        post::FeedResponse,
        trade::{QuoteQuery, TradeInput},
    },
    services::pricing::Quote,
    AppState,
};

/// Handler for GET /api/creators
/// Creators by market cap, largest first. A failing data source yields an empty, degraded list.
pub async fn list_creators(State(state): State<AppState>) -> Json<CreatorListResponse> {
    match state.store.creators().await {
        Ok(creators) => {
            tracing::debug!(
                source = state.store.source_name(),
                "Loaded {} creators",
                creators.len()
            );
            Json(CreatorListResponse {
                total_count: creators.len(),
                creators,
                degraded: false,
            })
        }
        Err(e) => {
            tracing::warn!("Failed to load creators: {}", e);
            Json(CreatorListResponse {
                creators: Vec::new(),
                total_count: 0,
                degraded: true,
            })
        }
    }
}

/// Handler for GET /api/creators/{id}
pub async fn get_creator(
    State(state): State<AppState>,
    Path(creator_id): Path<String>,
) -> Result<Json<Creator>, AppError> {
    let creator = state
        .store
        .creator(&creator_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Creator".to_string()))?;

    Ok(Json(creator))
}

/// Handler for GET /api/creators/{id}/posts
pub async fn get_creator_posts(
    State(state): State<AppState>,
    Path(creator_id): Path<String>,
    identity: MaybeIdentity,
) -> Result<Json<FeedResponse>, AppError> {
    match state.store.creator(&creator_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(AppError::NotFound("Creator".to_string())),
        Err(e) => {
            tracing::warn!(creator_id = %creator_id, "Failed to load creator: {}", e);
            return Ok(Json(FeedResponse {
                posts: Vec::new(),
                degraded: true,
            }));
        }
    }

    Ok(Json(
        build_feed(&state, identity.user_id(), Some(&creator_id)).await,
    ))
}

/// Handler for GET /api/creators/{id}/balance
/// Anonymous callers always see zero.
pub async fn get_balance(
    State(state): State<AppState>,
    Path(creator_id): Path<String>,
    identity: MaybeIdentity,
) -> Result<Json<BalanceResponse>, AppError> {
    let creator = state
        .store
        .creator(&creator_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Creator".to_string()))?;

    let balance = state
        .balances
        .get_balance(identity.user_id(), &creator.id)
        .await?;

    Ok(Json(BalanceResponse {
        creator_id: creator.id,
        token_symbol: creator.token_symbol,
        balance,
    }))
}

/// Handler for GET /api/creators/{id}/quote?tokens=..|currency=..
pub async fn get_quote(
    State(state): State<AppState>,
    Path(creator_id): Path<String>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<Quote>, AppError> {
    let input = match (query.tokens, query.currency) {
        (Some(tokens), _) if !tokens.trim().is_empty() => TradeInput::Tokens(tokens),
        (_, Some(currency)) if !currency.trim().is_empty() => TradeInput::Currency(currency),
        _ => return Err(AppError::InvalidAmount),
    };

    let quote = state.trading.quote(&creator_id, input).await?;
    Ok(Json(quote))
}
