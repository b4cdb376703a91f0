use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// Training labels are 1 = BUY, -1 = SELL, 0 = HOLD. Any other predicted
    /// label is reported as HOLD.
    pub fn from_label(label: i64) -> Self {
        match label {
            1 => Signal::Buy,
            -1 => Signal::Sell,
            _ => Signal::Hold,
        }
    }

    pub fn label(self) -> i64 {
        match self {
            Signal::Buy => 1,
            Signal::Sell => -1,
            Signal::Hold => 0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainRequest {
    /// 2-D array of feature rows (e.g. OHLCV values)
    pub features: Vec<Vec<f64>>,
    /// Target labels: 1=BUY, -1=SELL, 0=HOLD
    pub labels: Vec<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainResponse {
    pub message: String,
    pub samples_trained: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Single feature row, same width as the training rows
    pub features: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub signal: Signal,
    /// Highest class probability, in [0.0, 1.0]
    pub confidence: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraderStatus {
    pub is_trained: bool,
    pub model_type: String,
}
