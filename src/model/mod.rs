pub mod classifier;
pub mod forest;
pub mod trader;
pub mod types;

pub use classifier::{Classifier, FittedClassifier, Prediction};
pub use forest::{ForestParams, RandomForestClassifier};
pub use trader::SignalModel;
pub use types::{PredictRequest, PredictResponse, Signal, TraderStatus, TrainRequest, TrainResponse};

#[cfg(test)]
mod forest_tests;
