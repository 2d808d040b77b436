use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;

use crate::{
    error::AppError,
    handlers::identity::MaybeIdentity,
    models::{
        creator::{Creator, CreatorSummary},
        post::{FeedPost, FeedQuery, FeedResponse, Post},
    },
    services::{
        portfolio::balances_by_creator,
        unlock::{self, UnlockResponse},
    },
    AppState,
};

/// Handler for GET /api/posts
pub async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
    identity: MaybeIdentity,
) -> Json<FeedResponse> {
    Json(build_feed(&state, identity.user_id(), query.creator_id.as_deref()).await)
}

/// Handler for GET /api/posts/{id}/unlock
/// Returns the unlock prompt for a gated post, or `can_view: true` when the caller already qualifies.
pub async fn get_unlock(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    identity: MaybeIdentity,
) -> Result<Json<UnlockResponse>, AppError> {
    let post = state
        .store
        .post(&post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post".to_string()))?;

    let creator = state
        .store
        .creator(&post.creator_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Creator".to_string()))?;

    let balance = state
        .balances
        .get_balance(identity.user_id(), &creator.id)
        .await?;

    let prompt = unlock::prompt(&post, &creator, balance);
    if let Some(prompt) = &prompt {
        tracing::debug!(
            post_id = %post.id,
            shortfall = %prompt.shortfall,
            "Unlock prompt issued"
        );
    }

    Ok(Json(UnlockResponse::new(&post.id, prompt)))
}

/// Posts newest first, each with the caller's view decision.
/// Any data source failure degrades to an empty feed.
pub(crate) async fn build_feed(
    state: &AppState,
    user_id: Option<&str>,
    creator_id: Option<&str>,
) -> FeedResponse {
    let loaded = async {
        let posts = state.store.posts(creator_id).await?;
        let creators = state.store.creators().await?;
        let balances = match user_id {
            Some(user_id) => balances_by_creator(&state.store.holdings(user_id).await?),
            None => HashMap::new(),
        };
        Ok::<_, AppError>((posts, creators, balances))
    }
    .await;

    match loaded {
        Ok((posts, creators, balances)) => FeedResponse {
            posts: render_feed(posts, &creators, &balances),
            degraded: false,
        },
        Err(e) => {
            tracing::warn!("Failed to load feed: {}", e);
            FeedResponse {
                posts: Vec::new(),
                degraded: true,
            }
        }
    }
}

fn render_feed(
    posts: Vec<Post>,
    creators: &[Creator],
    balances: &HashMap<String, Decimal>,
) -> Vec<FeedPost> {
    let by_id: HashMap<&str, &Creator> = creators.iter().map(|c| (c.id.as_str(), c)).collect();

    posts
        .into_iter()
        .filter_map(|post| {
            let creator = by_id.get(post.creator_id.as_str())?;
            let balance = balances
                .get(&post.creator_id)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let view = unlock::decide(&post, balance);
            let required_tokens = post.effective_requirement();

            // Obscured posts never leave the server with their content
            let (content, media_url) = if view.is_visible() {
                (Some(post.content), post.media_url)
            } else {
                (None, None)
            };

            Some(FeedPost {
                id: post.id,
                creator: CreatorSummary::from(*creator),
                content,
                media_url,
                gated: post.gated,
                required_tokens,
                likes_count: post.likes_count,
                comments_count: post.comments_count,
                created_at: post.created_at,
                view,
            })
        })
        .collect()
}
