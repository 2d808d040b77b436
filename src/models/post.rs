use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::creator::CreatorSummary;
use crate::services::unlock::ViewDecision;

/// Canonical post record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub creator_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    pub gated: bool,
    /// Stored threshold; see [`Post::effective_requirement`]
    pub required_tokens: Decimal,
    pub likes_count: u32,
    pub comments_count: u32,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Token balance needed to view this post. Ungated posts need nothing,
    /// whatever the stored threshold says.
    pub fn effective_requirement(&self) -> Decimal {
        if self.gated {
            self.required_tokens.max(Decimal::ZERO)
        } else {
            Decimal::ZERO
        }
    }
}

/// Query parameters for GET /api/posts
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    pub creator_id: Option<String>,
}

/// A post as rendered for one viewer. Obscured posts carry no content or media.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPost {
    pub id: String,
    pub creator: CreatorSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    pub gated: bool,
    pub required_tokens: Decimal,
    pub likes_count: u32,
    pub comments_count: u32,
    pub created_at: DateTime<Utc>,
    pub view: ViewDecision,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub posts: Vec<FeedPost>,
    pub degraded: bool,
}
