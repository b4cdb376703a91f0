//! Custom error types for the broker, the signal model and configuration
//!
//! Components return these typed errors; the HTTP layer maps them to status codes.

use thiserror::Error;

use crate::broker::types::{OrderSide, OrderStatus};

/// Paper broker errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BrokerError {
    #[error("Order '{order_id}' not found")]
    OrderNotFound { order_id: String },

    #[error("Order '{order_id}' cannot be cancelled (status={status})")]
    NotCancellable {
        order_id: String,
        status: OrderStatus,
    },

    #[error("Order would overflow the {symbol} position ({position} {side:?} {quantity})")]
    PositionOverflow {
        symbol: String,
        position: i64,
        side: OrderSide,
        quantity: i64,
    },

    #[error("Order would push cash out of range (cash {cash}, cost {cost})")]
    CashOverflow { cash: f64, cost: f64 },
}

/// Signal model / classifier errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Model has not been trained yet")]
    NotTrained,

    #[error("features and labels must have the same length ({features} != {labels})")]
    LengthMismatch { features: usize, labels: usize },

    #[error("Cannot train on an empty dataset")]
    EmptyDataset,

    #[error("Feature rows must not be empty")]
    EmptyFeatureRow,

    #[error("Feature row {row} has {found} values, expected {expected}")]
    RaggedFeatures {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Feature row has {found} values, model was trained on {expected}")]
    FeatureWidthMismatch { expected: usize, found: usize },

    #[error("Feature values must be finite numbers")]
    NonFiniteFeature,
}

impl ModelError {
    /// Whether the error comes from the shape/content of caller input rather than model state.
    pub fn is_validation(&self) -> bool {
        !matches!(self, ModelError::NotTrained)
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
