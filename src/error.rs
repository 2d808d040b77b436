//! Error taxonomy shared by the data sources, the trading simulator and the
//! HTTP handlers.
//!
//! Every variant is a rejected user action: handlers turn it into a JSON
//! error body and nothing here is fatal to the process.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Unparseable, zero or negative trade amount
    #[error("Please enter a valid amount")]
    InvalidAmount,

    /// Sell request larger than the current holding
    #[error("Insufficient balance")]
    InsufficientBalance,

    /// The data boundary was unreachable or answered with an error
    #[error("Failed to fetch data: {0}")]
    FetchFailure(String),

    /// Trade attempted without a connected identity
    #[error("Connect a wallet to trade")]
    NotAuthenticated,

    #[error("{0} not found")]
    NotFound(String),

    /// Another trade for the same (user, creator) pair has not settled yet
    #[error("A trade for this token is already in progress")]
    TradeInProgress,
}

impl AppError {
    /// Stable machine-readable code for clients
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidAmount => "INVALID_AMOUNT",
            AppError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            AppError::FetchFailure(_) => "FETCH_FAILURE",
            AppError::NotAuthenticated => "NOT_AUTHENTICATED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::TradeInProgress => "TRADE_IN_PROGRESS",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidAmount | AppError::InsufficientBalance => StatusCode::BAD_REQUEST,
            AppError::FetchFailure(_) => StatusCode::BAD_GATEWAY,
            AppError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::TradeInProgress => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::FetchFailure(reason) = &self {
            tracing::warn!(reason = %reason, "Data boundary failure");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::FetchFailure(e.to_string())
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        AppError::FetchFailure(format!("Database error: {}", e))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::FetchFailure(format!("Malformed response: {}", e))
    }
}
