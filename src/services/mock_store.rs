//! In-memory data source backed by demo fixtures
//!
//! The store owns its state: it is seeded once at startup and only reset
//! through [`MockStore::reset`]. Holdings live for the process lifetime.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::AppError;
use crate::models::{creator::Creator, holding::Holding, post::Post};
use crate::services::store::TokenStore;

/// User id that owns the seeded demo holding
pub const DEMO_USER_ID: &str = "demo-user";

struct MockState {
    creators: Vec<Creator>,
    posts: Vec<Post>,
    holdings: HashMap<(String, String), Holding>,
}

impl MockState {
    fn seed(now: DateTime<Utc>) -> Self {
        let holdings = demo_holdings()
            .into_iter()
            .map(|h| ((h.user_id.clone(), h.creator_id.clone()), h))
            .collect();

        Self {
            creators: demo_creators(),
            posts: demo_posts(now),
            holdings,
        }
    }
}

pub struct MockStore {
    state: RwLock<MockState>,
}

impl MockStore {
    /// Store with the demo creators, posts and holdings
    pub fn seeded() -> Self {
        Self {
            state: RwLock::new(MockState::seed(Utc::now())),
        }
    }

    /// Store with caller-provided fixtures and no holdings
    pub fn with_fixtures(creators: Vec<Creator>, posts: Vec<Post>) -> Self {
        Self {
            state: RwLock::new(MockState {
                creators,
                posts,
                holdings: HashMap::new(),
            }),
        }
    }

    /// Restore the demo fixtures, dropping every trade made since startup
    pub fn reset(&self) {
        *self.state.write() = MockState::seed(Utc::now());
        tracing::debug!("Mock store reset to demo fixtures");
    }

    /// One of the demo creators, for building custom fixtures in tests
    pub fn seeded_creator(id: &str) -> Option<Creator> {
        demo_creators().into_iter().find(|c| c.id == id)
    }
}

#[async_trait]
impl TokenStore for MockStore {
    fn source_name(&self) -> &'static str {
        "mock"
    }

    async fn creators(&self) -> Result<Vec<Creator>, AppError> {
        let mut creators = self.state.read().creators.clone();
        creators.sort_by(|a, b| b.market_cap.cmp(&a.market_cap));
        Ok(creators)
    }

    async fn creator(&self, id: &str) -> Result<Option<Creator>, AppError> {
        Ok(self.state.read().creators.iter().find(|c| c.id == id).cloned())
    }

    async fn posts(&self, creator_id: Option<&str>) -> Result<Vec<Post>, AppError> {
        let mut posts: Vec<Post> = self
            .state
            .read()
            .posts
            .iter()
            .filter(|p| creator_id.is_none_or(|id| p.creator_id == id))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn post(&self, id: &str) -> Result<Option<Post>, AppError> {
        Ok(self.state.read().posts.iter().find(|p| p.id == id).cloned())
    }

    async fn holdings(&self, user_id: &str) -> Result<Vec<Holding>, AppError> {
        let mut holdings: Vec<Holding> = self
            .state
            .read()
            .holdings
            .values()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect();
        holdings.sort_by(|a, b| a.creator_id.cmp(&b.creator_id));
        Ok(holdings)
    }

    async fn holding(&self, user_id: &str, creator_id: &str) -> Result<Option<Holding>, AppError> {
        Ok(self
            .state
            .read()
            .holdings
            .get(&(user_id.to_string(), creator_id.to_string()))
            .cloned())
    }

    async fn save_holding(&self, holding: &Holding) -> Result<(), AppError> {
        self.state.write().holdings.insert(
            (holding.user_id.clone(), holding.creator_id.clone()),
            holding.clone(),
        );
        Ok(())
    }

    async fn delete_holding(&self, user_id: &str, creator_id: &str) -> Result<(), AppError> {
        self.state
            .write()
            .holdings
            .remove(&(user_id.to_string(), creator_id.to_string()));
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn creator(
    id: &str,
    name: &str,
    handle: &str,
    bio: &str,
    location: &str,
    symbol: &str,
    price: Decimal,
    change_24h: Decimal,
    market_cap: Decimal,
    holders: u64,
    posts: u64,
) -> Creator {
    Creator {
        id: id.to_string(),
        handle: handle.to_string(),
        display_name: name.to_string(),
        token_symbol: symbol.to_string(),
        token_name: name.to_string(),
        bio: Some(bio.to_string()),
        avatar_url: Some(format!("/assets/creator-{}.jpg", id)),
        banner_url: Some(format!("/assets/banner-{}.jpg", id)),
        location: Some(location.to_string()),
        verified: true,
        current_price: price,
        price_change_24h: change_24h,
        market_cap,
        holder_count: holders,
        post_count: posts,
        total_supply: None,
    }
}

fn demo_creators() -> Vec<Creator> {
    vec![
        creator(
            "1",
            "Darren Till",
            "darrentill",
            "Professional MMA fighter and crypto enthusiast. Join my journey to financial freedom.",
            "Liverpool, UK",
            "TILL",
            dec!(0.34),
            dec!(15.2),
            dec!(450000),
            1245,
            16,
        ),
        creator(
            "2",
            "Sarah Chen",
            "cryptosarah",
            "Crypto analyst & DeFi educator. Teaching you how to navigate Web3.",
            "Singapore",
            "CHEN",
            dec!(1.24),
            dec!(-3.8),
            dec!(890000),
            2103,
            42,
        ),
        creator(
            "3",
            "Alex Morgan",
            "alexcrypto",
            "Day trader & blockchain developer. Sharing alpha and exclusive trading strategies.",
            "Los Angeles, CA",
            "ALEX",
            dec!(0.89),
            dec!(24.5),
            dec!(670000),
            1876,
            28,
        ),
    ]
}

fn post(
    id: &str,
    creator_id: &str,
    content: &str,
    media_url: Option<&str>,
    required: Decimal,
    created_at: DateTime<Utc>,
) -> Post {
    Post {
        id: id.to_string(),
        creator_id: creator_id.to_string(),
        content: content.to_string(),
        media_url: media_url.map(str::to_string),
        gated: required > Decimal::ZERO,
        required_tokens: required,
        likes_count: 0,
        comments_count: 0,
        created_at,
    }
}

fn demo_posts(now: DateTime<Utc>) -> Vec<Post> {
    vec![
        post(
            "1",
            "1",
            "Just wrapped up training! Big announcement coming next week 👀",
            None,
            Decimal::ZERO,
            now - Duration::hours(2),
        ),
        post(
            "2",
            "1",
            "Exclusive: My complete training routine and diet plan 🥊",
            Some("/assets/banner-1.jpg"),
            dec!(15),
            now - Duration::hours(5),
        ),
        post(
            "3",
            "2",
            "Market analysis: Why I'm bullish on this altcoin 📈",
            None,
            dec!(10),
            now - Duration::hours(8),
        ),
        post(
            "4",
            "3",
            "Green day! Up 40% on my trades. Full breakdown for holders.",
            None,
            dec!(20),
            now - Duration::hours(12),
        ),
    ]
}

fn demo_holdings() -> Vec<Holding> {
    vec![Holding {
        user_id: DEMO_USER_ID.to_string(),
        creator_id: "2".to_string(),
        amount: dec!(25),
        purchase_price: dec!(1.24),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_creators_ordered_by_market_cap() {
        let store = MockStore::seeded();
        let creators = store.creators().await.unwrap();
        let symbols: Vec<&str> = creators.iter().map(|c| c.token_symbol.as_str()).collect();
        assert_eq!(symbols, vec!["CHEN", "ALEX", "TILL"]);
    }

    #[tokio::test]
    async fn test_posts_newest_first_and_filtered() {
        let store = MockStore::seeded();

        let all = store.posts(None).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);

        let till = store.posts(Some("1")).await.unwrap();
        assert_eq!(till.len(), 2);
        assert!(till.iter().all(|p| p.creator_id == "1"));
    }

    #[tokio::test]
    async fn test_seeded_demo_holding() {
        let store = MockStore::seeded();
        let holding = store.holding(DEMO_USER_ID, "2").await.unwrap().unwrap();
        assert_eq!(holding.amount, dec!(25));
        assert!(store.holding(DEMO_USER_ID, "1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_existing_pair() {
        let store = MockStore::seeded();
        let mut holding = Holding::empty("bob", "1", dec!(0.34));
        holding.amount = dec!(5);
        store.save_holding(&holding).await.unwrap();
        holding.amount = dec!(8);
        store.save_holding(&holding).await.unwrap();

        let holdings = store.holdings("bob").await.unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].amount, dec!(8));
    }

    #[tokio::test]
    async fn test_reset_drops_trades() {
        let store = MockStore::seeded();
        store.delete_holding(DEMO_USER_ID, "2").await.unwrap();
        store
            .save_holding(&Holding::empty("bob", "3", dec!(0.89)))
            .await
            .unwrap();

        store.reset();

        assert!(store.holding(DEMO_USER_ID, "2").await.unwrap().is_some());
        assert!(store.holdings("bob").await.unwrap().is_empty());
    }
}
