use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use amplifi_backend::{
    error::AppError,
    handlers,
    models::{creator::Creator, holding::Holding, post::Post},
    services::{mock_store::MockStore, store::TokenStore},
    AppState,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

/// App state over the seeded mock store with no settlement delay
#[allow(dead_code)]
pub fn test_state() -> AppState {
    AppState::new(Arc::new(MockStore::seeded()), Duration::ZERO)
}

#[allow(dead_code)]
pub fn test_router() -> (Router, AppState) {
    let state = test_state();
    (handlers::router(state.clone()), state)
}

/// Send a request as `user` (anonymous when None) and decode the JSON body
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

/// Decimals serialize as JSON strings
#[allow(dead_code)]
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        other => Decimal::from_str(&other.to_string()).unwrap(),
    }
}

/// Data source whose every call fails at the boundary
#[allow(dead_code)]
pub struct UnreachableStore;

#[async_trait::async_trait]
impl TokenStore for UnreachableStore {
    fn source_name(&self) -> &'static str {
        "unreachable"
    }

    async fn creators(&self) -> Result<Vec<Creator>, AppError> {
        Err(unreachable_error())
    }

    async fn creator(&self, _id: &str) -> Result<Option<Creator>, AppError> {
        Err(unreachable_error())
    }

    async fn posts(&self, _creator_id: Option<&str>) -> Result<Vec<Post>, AppError> {
        Err(unreachable_error())
    }

    async fn post(&self, _id: &str) -> Result<Option<Post>, AppError> {
        Err(unreachable_error())
    }

    async fn holdings(&self, _user_id: &str) -> Result<Vec<Holding>, AppError> {
        Err(unreachable_error())
    }

    async fn holding(&self, _user_id: &str, _creator_id: &str) -> Result<Option<Holding>, AppError> {
        Err(unreachable_error())
    }

    async fn save_holding(&self, _holding: &Holding) -> Result<(), AppError> {
        Err(unreachable_error())
    }

    async fn delete_holding(&self, _user_id: &str, _creator_id: &str) -> Result<(), AppError> {
        Err(unreachable_error())
    }
}

fn unreachable_error() -> AppError {
    AppError::FetchFailure("connection refused".to_string())
}

/// Router whose data source is down
#[allow(dead_code)]
pub fn unreachable_router() -> Router {
    handlers::router(AppState::new(Arc::new(UnreachableStore), Duration::ZERO))
}
