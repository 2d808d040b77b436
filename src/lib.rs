// src/lib.rs

use std::sync::Arc;
use std::time::Duration;

use services::{
    balance::BalanceBook, notifications::NotificationHub, store::TokenStore,
    trading::TradingSimulator,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TokenStore>,
    pub balances: BalanceBook,
    pub trading: TradingSimulator,
    pub notifications: NotificationHub,
}

impl AppState {
    pub fn new(store: Arc<dyn TokenStore>, settlement_delay: Duration) -> Self {
        let balances = BalanceBook::new(store.clone());
        let notifications = NotificationHub::new();
        let trading = TradingSimulator::new(
            store.clone(),
            balances.clone(),
            notifications.clone(),
            settlement_delay,
        );

        Self {
            store,
            balances,
            trading,
            notifications,
        }
    }
}

pub mod config;
pub mod error;

pub mod entities {
    pub mod prelude;
    pub mod creators;
    pub mod posts;
    pub mod token_holdings;
}

pub mod services {
    pub mod balance;
    pub mod database;
    pub mod mock_store;
    pub mod notifications;
    pub mod portfolio;
    pub mod postgrest;
    pub mod pricing;
    pub mod store;
    pub mod trading;
    pub mod unlock;
}

pub mod models;
pub mod handlers;
