//! Simulated buy/sell settlement
//!
//! A trade attempt moves idle → validating → executing → settled, or stops at
//! rejected. Settlement is a fixed non-blocking delay standing in for a real
//! transaction. Only one trade per (user, creator) pair may be in flight;
//! dropping a trade future before it settles cancels it with no balance
//! change.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::models::creator::Creator;
use crate::models::notification::Notification;
use crate::models::trade::{Settlement, TradeInput, TradePhase, TradeSide};
use crate::services::balance::BalanceBook;
use crate::services::notifications::NotificationHub;
use crate::services::pricing::{self, Quote, CURRENCY_DISPLAY_DP, TOKEN_DISPLAY_DP};
use crate::services::store::TokenStore;

/// Default simulated settlement latency
pub const DEFAULT_SETTLEMENT_DELAY_MS: u64 = 2000;

type PairKey = (String, String);

#[derive(Clone)]
pub struct TradingSimulator {
    store: Arc<dyn TokenStore>,
    balances: BalanceBook,
    notifications: NotificationHub,
    settlement_delay: Duration,
    in_flight: Arc<Mutex<HashSet<PairKey>>>,
}

impl TradingSimulator {
    pub fn new(
        store: Arc<dyn TokenStore>,
        balances: BalanceBook,
        notifications: NotificationHub,
        settlement_delay: Duration,
    ) -> Self {
        Self {
            store,
            balances,
            notifications,
            settlement_delay,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub async fn buy(
        &self,
        user_id: Option<&str>,
        creator_id: &str,
        input: TradeInput,
    ) -> Result<Settlement, AppError> {
        self.execute(TradeSide::Buy, user_id, creator_id, input).await
    }

    pub async fn sell(
        &self,
        user_id: Option<&str>,
        creator_id: &str,
        input: TradeInput,
    ) -> Result<Settlement, AppError> {
        self.execute(TradeSide::Sell, user_id, creator_id, input).await
    }

    /// Convert the input at the creator's current price without trading
    pub async fn quote(&self, creator_id: &str, input: TradeInput) -> Result<Quote, AppError> {
        let creator = self.find_creator(creator_id).await?;
        match input {
            TradeInput::Tokens(raw) => {
                Quote::from_tokens(pricing::parse_amount(&raw)?, creator.current_price)
            }
            TradeInput::Currency(raw) => {
                Quote::from_currency(pricing::parse_amount(&raw)?, creator.current_price)
            }
        }
    }

    /// Whether a trade for this pair is currently between validation and settlement
    pub fn is_in_flight(&self, user_id: &str, creator_id: &str) -> bool {
        self.in_flight
            .lock()
            .contains(&(user_id.to_string(), creator_id.to_string()))
    }

    async fn execute(
        &self,
        side: TradeSide,
        user_id: Option<&str>,
        creator_id: &str,
        input: TradeInput,
    ) -> Result<Settlement, AppError> {
        let mut attempt = TradeAttempt::new(side, creator_id);
        attempt.advance(TradePhase::Validating);

        let validated = self.validate(side, user_id, creator_id, &input).await;
        let ValidatedTrade {
            user_id,
            creator,
            amount,
            currency_amount,
            _guard,
        } = match validated {
            Ok(v) => v,
            Err(e) => return Err(attempt.reject(e)),
        };

        attempt.advance(TradePhase::Executing);
        tokio::time::sleep(self.settlement_delay).await;

        let signed_amount = match side {
            TradeSide::Buy => amount,
            TradeSide::Sell => -amount,
        };
        let new_balance = match self
            .balances
            .apply_trade(user_id, &creator.id, signed_amount, creator.current_price)
            .await
        {
            Ok(balance) => balance,
            Err(e) => return Err(attempt.fail(e)),
        };

        let settlement = Settlement {
            side,
            creator_id: creator.id.clone(),
            token_symbol: creator.token_symbol.clone(),
            amount,
            currency_amount,
            unit_price: creator.current_price,
            new_balance,
            settled_at: Utc::now(),
        };

        attempt.advance(TradePhase::Settled);
        info!(
            side = %side,
            user_id = %user_id,
            creator_id = %creator.id,
            amount = %amount,
            new_balance = %new_balance,
            "Trade settled"
        );

        self.notifications
            .publish(Notification::trade_settled(user_id, &settlement));

        Ok(settlement)
    }

    /// Everything that can reject a trade happens here, before any delay
    async fn validate<'a>(
        &self,
        side: TradeSide,
        user_id: Option<&'a str>,
        creator_id: &str,
        input: &TradeInput,
    ) -> Result<ValidatedTrade<'a>, AppError> {
        let user_id = user_id.ok_or(AppError::NotAuthenticated)?;
        let creator = self.find_creator(creator_id).await?;
        let amount = token_amount(input, creator.current_price)?;
        let currency_amount = pricing::tokens_to_currency(amount, creator.current_price)
            .map(|c| pricing::round_display(c, CURRENCY_DISPLAY_DP))
            .ok_or(AppError::InvalidAmount)?;

        let guard = InFlightGuard::acquire(&self.in_flight, user_id, &creator.id)?;

        let balance = self.balances.get_balance(Some(user_id), &creator.id).await?;
        if side == TradeSide::Buy && balance.checked_add(amount).is_none() {
            debug!(
                user_id = %user_id,
                creator_id = %creator.id,
                requested = %amount,
                balance = %balance,
                "Buy would overflow balance"
            );
            return Err(AppError::InvalidAmount);
        }

        if side == TradeSide::Sell && amount > balance {
            debug!(
                user_id = %user_id,
                creator_id = %creator.id,
                requested = %amount,
                balance = %balance,
                "Sell exceeds balance"
            );
            return Err(AppError::InsufficientBalance);
        }

        Ok(ValidatedTrade {
            user_id,
            creator,
            amount,
            currency_amount,
            _guard: guard,
        })
    }

    async fn find_creator(&self, creator_id: &str) -> Result<Creator, AppError> {
        self.store
            .creator(creator_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Creator".to_string()))
    }
}

/// A trade that passed validation and holds its pair's in-flight slot
struct ValidatedTrade<'a> {
    user_id: &'a str,
    creator: Creator,
    amount: Decimal,
    /// Display-rounded payment amount
    currency_amount: Decimal,
    _guard: InFlightGuard,
}

/// Token amount for a trade. Currency input is converted at the unit price
/// and rounded to display precision, the same value the panel shows.
fn token_amount(input: &TradeInput, unit_price: Decimal) -> Result<Decimal, AppError> {
    let amount = match input {
        TradeInput::Tokens(raw) => pricing::parse_amount(raw)?,
        TradeInput::Currency(raw) => {
            let currency = pricing::parse_amount(raw)?;
            let tokens = pricing::currency_to_tokens(currency, unit_price).ok_or(AppError::InvalidAmount)?;
            pricing::round_display(tokens, TOKEN_DISPLAY_DP)
        }
    };

    if amount <= Decimal::ZERO {
        return Err(AppError::InvalidAmount);
    }
    Ok(amount)
}

/// Phase tracker for one attempt, used for logging transitions
struct TradeAttempt {
    side: TradeSide,
    creator_id: String,
    phase: TradePhase,
}

impl TradeAttempt {
    fn new(side: TradeSide, creator_id: &str) -> Self {
        Self {
            side,
            creator_id: creator_id.to_string(),
            phase: TradePhase::Idle,
        }
    }

    fn advance(&mut self, next: TradePhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid trade transition {} -> {}",
            self.phase,
            next
        );
        debug!(side = %self.side, creator_id = %self.creator_id, "Trade {} -> {}", self.phase, next);
        self.phase = next;
    }

    fn reject(mut self, error: AppError) -> AppError {
        self.advance(TradePhase::Rejected);
        info!(
            side = %self.side,
            creator_id = %self.creator_id,
            reason = error.code(),
            "Trade rejected"
        );
        error
    }

    /// Settlement could not be written after the delay
    fn fail(mut self, error: AppError) -> AppError {
        self.advance(TradePhase::Rejected);
        warn!(
            side = %self.side,
            creator_id = %self.creator_id,
            reason = %error,
            "Trade failed during settlement"
        );
        error
    }
}

impl Drop for TradeAttempt {
    fn drop(&mut self) {
        if !self.phase.is_terminal() {
            info!(
                side = %self.side,
                creator_id = %self.creator_id,
                phase = %self.phase,
                "Trade cancelled before settlement"
            );
        }
    }
}

/// Marks a (user, creator) pair busy until dropped
struct InFlightGuard {
    set: Arc<Mutex<HashSet<PairKey>>>,
    key: PairKey,
}

impl InFlightGuard {
    fn acquire(set: &Arc<Mutex<HashSet<PairKey>>>, user_id: &str, creator_id: &str) -> Result<Self, AppError> {
        let key = (user_id.to_string(), creator_id.to_string());
        if !set.lock().insert(key.clone()) {
            return Err(AppError::TradeInProgress);
        }
        Ok(Self { set: Arc::clone(set), key })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set.lock().remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::post::Post;
    use crate::services::mock_store::{MockStore, DEMO_USER_ID};
    use rust_decimal_macros::dec;
    use std::pin::pin;

    const DELAY: Duration = Duration::from_millis(DEFAULT_SETTLEMENT_DELAY_MS);

    fn simulator_with(store: Arc<MockStore>) -> (TradingSimulator, BalanceBook, NotificationHub) {
        let balances = BalanceBook::new(store.clone());
        let hub = NotificationHub::new();
        let sim = TradingSimulator::new(store, balances.clone(), hub.clone(), DELAY);
        (sim, balances, hub)
    }

    fn simulator() -> (TradingSimulator, BalanceBook, NotificationHub) {
        simulator_with(Arc::new(MockStore::seeded()))
    }

    fn tokens(raw: &str) -> TradeInput {
        TradeInput::Tokens(raw.to_string())
    }

    fn two_dollar_store() -> Arc<MockStore> {
        let mut creator = MockStore::seeded_creator("1").unwrap();
        creator.current_price = dec!(2.00);
        Arc::new(MockStore::with_fixtures(vec![creator], Vec::<Post>::new()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_buy_ten_at_two_dollars() {
        let (sim, balances, hub) = simulator_with(two_dollar_store());

        let settlement = sim.buy(Some("bob"), "1", tokens("10")).await.unwrap();

        assert_eq!(settlement.currency_amount, dec!(20.00));
        assert_eq!(settlement.amount, dec!(10));
        assert_eq!(settlement.new_balance, dec!(10));
        assert_eq!(balances.get_balance(Some("bob"), "1").await.unwrap(), dec!(10));

        let notifications = hub.recent("bob");
        assert_eq!(notifications.len(), 1);
        assert!(notifications[0].message.contains("10 $TILL"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_buy_waits_for_settlement_delay() {
        let (sim, _, _) = simulator();
        let start = tokio::time::Instant::now();
        sim.buy(Some("bob"), "1", tokens("1")).await.unwrap();
        assert!(start.elapsed() >= DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_buy_with_currency_input() {
        let (sim, balances, _) = simulator_with(two_dollar_store());
        let settlement = sim
            .buy(Some("bob"), "1", TradeInput::Currency("5".to_string()))
            .await
            .unwrap();
        assert_eq!(settlement.amount, dec!(2.50));
        assert_eq!(balances.get_balance(Some("bob"), "1").await.unwrap(), dec!(2.5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_buy_never_mutates() {
        let (sim, balances, hub) = simulator();
        for raw in ["0", "-3", "abc", ""] {
            let result = sim.buy(Some(DEMO_USER_ID), "2", tokens(raw)).await;
            assert_eq!(result, Err(AppError::InvalidAmount), "input {:?}", raw);
        }
        assert_eq!(balances.get_balance(Some(DEMO_USER_ID), "2").await.unwrap(), dec!(25));
        assert!(hub.recent(DEMO_USER_ID).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sell_more_than_balance_rejected() {
        let (sim, balances, _) = simulator();
        balances.apply_trade("bob", "1", dec!(3), dec!(0.34)).await.unwrap();

        let result = sim.sell(Some("bob"), "1", tokens("5")).await;

        assert_eq!(result, Err(AppError::InsufficientBalance));
        assert_eq!(balances.get_balance(Some("bob"), "1").await.unwrap(), dec!(3));
        assert!(!sim.is_in_flight("bob", "1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_buy_then_sell_restores_balance() {
        let (sim, balances, _) = simulator();
        sim.buy(Some(DEMO_USER_ID), "2", tokens("4.25")).await.unwrap();
        assert_eq!(balances.get_balance(Some(DEMO_USER_ID), "2").await.unwrap(), dec!(29.25));

        let settlement = sim.sell(Some(DEMO_USER_ID), "2", tokens("4.25")).await.unwrap();
        assert_eq!(settlement.side, TradeSide::Sell);
        assert_eq!(balances.get_balance(Some(DEMO_USER_ID), "2").await.unwrap(), dec!(25));
    }

    #[tokio::test(start_paused = true)]
    async fn test_trade_requires_identity() {
        let (sim, _, _) = simulator();
        assert_eq!(
            sim.buy(None, "1", tokens("1")).await,
            Err(AppError::NotAuthenticated)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_creator() {
        let (sim, _, _) = simulator();
        assert_eq!(
            sim.buy(Some("bob"), "404", tokens("1")).await,
            Err(AppError::NotFound("Creator".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_submit_rejected_while_in_flight() {
        let (sim, balances, _) = simulator();

        let mut first = pin!(sim.buy(Some("bob"), "1", tokens("10")));
        // First poll runs validation and parks on the settlement delay
        assert!(futures_util::poll!(first.as_mut()).is_pending());
        assert!(sim.is_in_flight("bob", "1"));

        let second = sim.buy(Some("bob"), "1", tokens("10")).await;
        assert_eq!(second, Err(AppError::TradeInProgress));

        // Other pairs are unaffected
        sim.buy(Some("bob"), "2", tokens("1")).await.unwrap();

        first.await.unwrap();
        assert_eq!(balances.get_balance(Some("bob"), "1").await.unwrap(), dec!(10));
        assert!(!sim.is_in_flight("bob", "1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_trade_cancels_without_mutation() {
        let (sim, balances, hub) = simulator();

        {
            let mut pending = Box::pin(sim.buy(Some("bob"), "1", tokens("10")));
            assert!(futures_util::poll!(pending.as_mut()).is_pending());
        }

        assert!(!sim.is_in_flight("bob", "1"));
        tokio::time::advance(DELAY * 2).await;
        assert_eq!(balances.get_balance(Some("bob"), "1").await.unwrap(), Decimal::ZERO);
        assert!(hub.recent("bob").is_empty());

        // Pair is free again
        sim.buy(Some("bob"), "1", tokens("1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_quote() {
        let (sim, _, _) = simulator_with(two_dollar_store());
        let quote = sim.quote("1", tokens("10")).await.unwrap();
        assert_eq!(quote.currency_display, dec!(20.00));

        let quote = sim.quote("1", TradeInput::Currency("3".to_string())).await.unwrap();
        assert_eq!(quote.tokens_display, dec!(1.50));

        assert_eq!(sim.quote("1", tokens("0")).await, Err(AppError::InvalidAmount));
    }

    #[tokio::test(start_paused = true)]
    async fn test_buy_overflowing_currency_is_invalid() {
        let (sim, balances, hub) = simulator();

        // 7e28 at 1.24 does not fit in a Decimal
        let result = sim
            .buy(Some(DEMO_USER_ID), "2", tokens("70000000000000000000000000000"))
            .await;

        assert_eq!(result, Err(AppError::InvalidAmount));
        assert_eq!(balances.get_balance(Some(DEMO_USER_ID), "2").await.unwrap(), dec!(25));
        assert!(hub.recent(DEMO_USER_ID).is_empty());
        assert!(!sim.is_in_flight(DEMO_USER_ID, "2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_buy_overflowing_balance_is_invalid() {
        let (sim, balances, _) = simulator();
        let max = Decimal::MAX.to_string();

        let settlement = sim.buy(Some("bob"), "1", tokens(&max)).await.unwrap();
        assert_eq!(settlement.new_balance, Decimal::MAX);
        assert!(settlement.currency_amount > Decimal::ZERO);

        assert_eq!(
            sim.buy(Some("bob"), "1", tokens("1")).await,
            Err(AppError::InvalidAmount)
        );
        assert_eq!(balances.get_balance(Some("bob"), "1").await.unwrap(), Decimal::MAX);

        // Selling still works and the pair recovers
        sim.sell(Some("bob"), "1", tokens(&max)).await.unwrap();
        sim.buy(Some("bob"), "1", tokens("1")).await.unwrap();
        assert_eq!(balances.get_balance(Some("bob"), "1").await.unwrap(), dec!(1));
    }

    /// Reads from the demo fixtures, refuses every write
    struct ReadOnlyStore(MockStore);

    #[async_trait::async_trait]
    impl TokenStore for ReadOnlyStore {
        fn source_name(&self) -> &'static str {
            "read-only"
        }
        async fn creators(&self) -> Result<Vec<Creator>, AppError> {
            self.0.creators().await
        }
        async fn creator(&self, id: &str) -> Result<Option<Creator>, AppError> {
            self.0.creator(id).await
        }
        async fn posts(&self, creator_id: Option<&str>) -> Result<Vec<Post>, AppError> {
            self.0.posts(creator_id).await
        }
        async fn post(&self, id: &str) -> Result<Option<Post>, AppError> {
            self.0.post(id).await
        }
        async fn holdings(&self, user_id: &str) -> Result<Vec<crate::models::holding::Holding>, AppError> {
            self.0.holdings(user_id).await
        }
        async fn holding(
            &self,
            user_id: &str,
            creator_id: &str,
        ) -> Result<Option<crate::models::holding::Holding>, AppError> {
            self.0.holding(user_id, creator_id).await
        }
        async fn save_holding(&self, _holding: &crate::models::holding::Holding) -> Result<(), AppError> {
            Err(AppError::FetchFailure("write refused".to_string()))
        }
        async fn delete_holding(&self, _user_id: &str, _creator_id: &str) -> Result<(), AppError> {
            Err(AppError::FetchFailure("write refused".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_settlement_write_failure_is_reported() {
        let store: Arc<dyn TokenStore> = Arc::new(ReadOnlyStore(MockStore::seeded()));
        let balances = BalanceBook::new(store.clone());
        let hub = NotificationHub::new();
        let sim = TradingSimulator::new(store, balances.clone(), hub.clone(), DELAY);

        let result = sim.buy(Some("bob"), "1", tokens("10")).await;

        assert!(matches!(result, Err(AppError::FetchFailure(_))));
        assert_eq!(balances.get_balance(Some("bob"), "1").await.unwrap(), Decimal::ZERO);
        assert!(hub.recent("bob").is_empty());
        assert!(!sim.is_in_flight("bob", "1"));
    }
}
