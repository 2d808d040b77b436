use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod creators;
pub mod holdings;
pub mod identity;
pub mod notifications;
pub mod posts;
pub mod trade;

async fn hello_amplifi() -> &'static str {
    "Hello from AmpliFi Backend!"
}

/// Every route the service exposes. CORS is layered on by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello_amplifi))
        .route("/api/creators", get(creators::list_creators))
        .route("/api/creators/{id}", get(creators::get_creator))
        .route("/api/creators/{id}/posts", get(creators::get_creator_posts))
        .route("/api/creators/{id}/balance", get(creators::get_balance))
        .route("/api/creators/{id}/quote", get(creators::get_quote))
        .route("/api/creators/{id}/buy", post(trade::buy))
        .route("/api/creators/{id}/sell", post(trade::sell))
        .route("/api/posts", get(posts::get_feed))
        .route("/api/posts/{id}/unlock", get(posts::get_unlock))
        .route("/api/holdings", get(holdings::get_holdings))
        .route("/api/notifications", get(notifications::list_notifications))
        .route(
            "/api/notifications/ws",
            get(notifications::notifications_websocket),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
