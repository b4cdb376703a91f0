pub mod ledger;
pub mod types;

pub use ledger::BrokerLedger;
pub use types::{Order, OrderRequest, OrderSide, OrderStatus, Portfolio};
