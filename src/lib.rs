//! Paper Signal - paper-trading broker and ML trading-signal service
//!
//! This library provides an in-memory paper broker that fills orders
//! immediately against a cash/positions ledger, a random-forest signal model
//! that maps predicted labels to BUY/SELL/HOLD, and the axum HTTP layer that
//! exposes both.

pub mod api;
pub mod broker;
pub mod config;
pub mod error;
pub mod model;

// Re-export commonly used types
pub use api::{build_router, run_server, AppState};
pub use broker::BrokerLedger;
pub use config::AppConfig;
pub use model::SignalModel;

#[cfg(test)]
mod config_tests;
