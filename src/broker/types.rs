use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Open,
    Filled,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Open => "OPEN",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// Incoming order as submitted by a client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Ticker symbol, e.g. AAPL
    pub symbol: String,
    pub side: OrderSide,
    /// Number of shares/contracts
    pub quantity: i64,
    /// Limit price; None for market orders
    #[serde(default)]
    pub price: Option<f64>,
}

impl OrderRequest {
    /// Boundary checks the ledger relies on: non-empty symbol, positive quantity,
    /// and a positive finite price when one is given.
    pub fn validate(&self) -> Result<(), String> {
        if self.symbol.trim().is_empty() {
            return Err("symbol must not be empty".to_string());
        }
        if self.quantity <= 0 {
            return Err(format!("quantity must be positive, got {}", self.quantity));
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price <= 0.0 {
                return Err(format!("price must be a positive number, got {}", price));
            }
            if !(price * self.quantity as f64).is_finite() {
                return Err(format!(
                    "order value {} x {} is out of range",
                    self.quantity, price
                ));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: i64,
    pub price: Option<f64>,
    pub status: OrderStatus,
}

impl Order {
    /// Notional cash effect of the order; market orders count as price 0.
    pub fn cost(&self) -> f64 {
        self.price.unwrap_or(0.0) * self.quantity as f64
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Available cash balance
    pub cash: f64,
    /// Map of symbol -> quantity held (negative when short)
    #[serde(default)]
    pub positions: HashMap<String, i64>,
}
