//! Caller identity from request headers
//!
//! `x-user-id` names the user. A connected wallet without a user id falls back
//! to the lowercased wallet address as the user id.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, HeaderMap};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const WALLET_ADDRESS_HEADER: &str = "x-wallet-address";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub wallet_address: Option<String>,
}

impl Identity {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let wallet_address = header(WALLET_ADDRESS_HEADER).map(|w| w.to_lowercase());
        let user_id = header(USER_ID_HEADER).or_else(|| wallet_address.clone())?;

        Some(Self {
            user_id,
            wallet_address,
        })
    }
}

/// Identity if the caller sent one. Never rejects; anonymous callers get `None`.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

impl MaybeIdentity {
    pub fn user_id(&self) -> Option<&str> {
        self.0.as_ref().map(|i| i.user_id.as_str())
    }
}

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentity(Identity::from_headers(&parts.headers)))
    }
}
