use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Canonical creator record. Every data source maps its own row shape into this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub id: String,
    pub handle: String,
    pub display_name: String,
    pub token_symbol: String,
    pub token_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub verified: bool,
    pub current_price: Decimal,
    pub price_change_24h: Decimal,
    /// Stored aggregate, never recomputed here
    pub market_cap: Decimal,
    /// Stored aggregate, never recomputed here
    pub holder_count: u64,
    pub post_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_supply: Option<Decimal>,
}

/// Display fields as they arrive from a data source, before fallbacks
#[derive(Debug, Clone, Default)]
pub struct CreatorIdentity {
    pub handle: Option<String>,
    pub display_name: Option<String>,
    pub token_symbol: String,
    pub token_name: String,
}

impl CreatorIdentity {
    /// Handle falls back to the lowercased token symbol, display name to the token name
    pub fn resolve(self) -> (String, String) {
        let handle = self
            .handle
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| self.token_symbol.to_lowercase());
        let display_name = self
            .display_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.token_name.clone());
        (handle, display_name)
    }
}

/// Clamp a stored monetary aggregate to zero, logging the bad row
pub fn non_negative(value: Decimal, field: &str, creator_id: &str) -> Decimal {
    if value.is_sign_negative() && !value.is_zero() {
        tracing::warn!(
            creator_id = %creator_id,
            field = field,
            value = %value,
            "Negative value from data source, clamping to zero"
        );
        Decimal::ZERO
    } else {
        value
    }
}

/// GET /api/creators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorListResponse {
    pub creators: Vec<Creator>,
    pub total_count: usize,
    /// True when the data source failed and the list was replaced by an empty one
    pub degraded: bool,
}

/// Trimmed creator info embedded in feed items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorSummary {
    pub id: String,
    pub handle: String,
    pub display_name: String,
    pub token_symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl From<&Creator> for CreatorSummary {
    fn from(creator: &Creator) -> Self {
        Self {
            id: creator.id.clone(),
            handle: creator.handle.clone(),
            display_name: creator.display_name.clone(),
            token_symbol: creator.token_symbol.clone(),
            avatar_url: creator.avatar_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_identity_fallbacks() {
        let identity = CreatorIdentity {
            handle: None,
            display_name: Some("  ".to_string()),
            token_symbol: "TILL".to_string(),
            token_name: "Till Token".to_string(),
        };
        let (handle, display_name) = identity.resolve();
        assert_eq!(handle, "till");
        assert_eq!(display_name, "Till Token");
    }

    #[test]
    fn test_identity_keeps_profile_fields() {
        let identity = CreatorIdentity {
            handle: Some("cryptosarah".to_string()),
            display_name: Some("Sarah Chen".to_string()),
            token_symbol: "CHEN".to_string(),
            token_name: "Chen".to_string(),
        };
        assert_eq!(
            identity.resolve(),
            ("cryptosarah".to_string(), "Sarah Chen".to_string())
        );
    }

    #[test]
    fn test_non_negative_clamps() {
        assert_eq!(non_negative(dec!(-1.5), "current_price", "1"), Decimal::ZERO);
        assert_eq!(non_negative(dec!(0.34), "current_price", "1"), dec!(0.34));
        assert_eq!(non_negative(Decimal::ZERO, "market_cap", "1"), Decimal::ZERO);
    }
}
