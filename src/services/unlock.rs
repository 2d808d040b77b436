//! Token-gated content checks
//!
//! A post is viewable when the viewer's balance covers its effective
//! requirement. When it doesn't, the feed obscures it and an explicit request
//! to view produces an [`UnlockPrompt`] whose only follow-up is a buy intent.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{creator::Creator, post::Post};

pub fn can_view(balance: Decimal, required: Decimal) -> bool {
    balance >= required
}

/// Tokens still missing, never negative
pub fn shortfall(balance: Decimal, required: Decimal) -> Decimal {
    (required - balance).max(Decimal::ZERO)
}

/// How the feed renders a post for one viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ViewDecision {
    Visible,
    Obscured { required: Decimal },
}

impl ViewDecision {
    pub fn is_visible(&self) -> bool {
        matches!(self, ViewDecision::Visible)
    }
}

pub fn decide(post: &Post, balance: Decimal) -> ViewDecision {
    let required = post.effective_requirement();
    if can_view(balance, required) {
        ViewDecision::Visible
    } else {
        ViewDecision::Obscured { required }
    }
}

/// Contents of the "Unlock Content" dialog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockPrompt {
    pub post_id: String,
    pub creator_id: String,
    pub token_symbol: String,
    pub required: Decimal,
    pub balance: Decimal,
    pub shortfall: Decimal,
}

impl UnlockPrompt {
    pub fn message(&self) -> String {
        format!(
            "You need at least {} ${} to view this post. Your current balance is {} ${}.",
            self.required.normalize(),
            self.token_symbol,
            self.balance.normalize(),
            self.token_symbol
        )
    }

    /// e.g. "15 $TILL needed"
    pub fn shortfall_label(&self) -> String {
        format!("{} ${} needed", self.shortfall.normalize(), self.token_symbol)
    }

    /// Hand-off to the buy flow, pre-filled with the missing amount.
    /// Nothing is purchased here.
    pub fn confirm(&self) -> BuyIntent {
        BuyIntent {
            creator_id: self.creator_id.clone(),
            token_symbol: self.token_symbol.clone(),
            suggested_tokens: self.shortfall,
        }
    }
}

/// Pre-filled buy flow target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyIntent {
    pub creator_id: String,
    pub token_symbol: String,
    pub suggested_tokens: Decimal,
}

/// Prompt for a post the viewer can't see yet; None when it is already viewable
pub fn prompt(post: &Post, creator: &Creator, balance: Decimal) -> Option<UnlockPrompt> {
    let required = post.effective_requirement();
    if can_view(balance, required) {
        return None;
    }

    Some(UnlockPrompt {
        post_id: post.id.clone(),
        creator_id: creator.id.clone(),
        token_symbol: creator.token_symbol.clone(),
        required,
        balance,
        shortfall: shortfall(balance, required),
    })
}

/// GET /api/posts/{id}/unlock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockResponse {
    pub post_id: String,
    pub can_view: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<UnlockPrompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortfall_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_intent: Option<BuyIntent>,
}

impl UnlockResponse {
    pub fn new(post_id: &str, prompt: Option<UnlockPrompt>) -> Self {
        Self {
            post_id: post_id.to_string(),
            can_view: prompt.is_none(),
            message: prompt.as_ref().map(UnlockPrompt::message),
            shortfall_label: prompt.as_ref().map(UnlockPrompt::shortfall_label),
            buy_intent: prompt.as_ref().map(UnlockPrompt::confirm),
            prompt,
        }
    }
}
