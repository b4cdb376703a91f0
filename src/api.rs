use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::broker::{BrokerLedger, Order, OrderRequest, Portfolio};
use crate::config::AppConfig;
use crate::error::{BrokerError, ModelError};
use crate::model::{PredictRequest, PredictResponse, SignalModel, TraderStatus, TrainRequest, TrainResponse};

/// Long-lived services shared by every handler. Built once by the binary.
pub struct AppState {
    pub broker: BrokerLedger,
    pub model: SignalModel,
}

impl AppState {
    pub fn new(broker: BrokerLedger, model: SignalModel) -> Self {
        Self { broker, model }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            BrokerLedger::new(config.broker.initial_cash),
            SignalModel::random_forest(config.model.forest_params()),
        )
    }
}

/// Transport-level error; every variant renders as `{"detail": "..."}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Broker(BrokerError::OrderNotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Broker(BrokerError::NotCancellable { .. }) => StatusCode::CONFLICT,
            ApiError::Broker(BrokerError::PositionOverflow { .. } | BrokerError::CashOverflow { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Model(err) if err.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Model(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match &self {
            ApiError::Internal(msg) => {
                error!("❌ [API] Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/broker/order", post(place_order))
        .route("/broker/order/{order_id}", delete(cancel_order))
        .route("/broker/orders", get(list_orders))
        .route("/broker/portfolio", get(get_portfolio))
        .route("/trader/train", post(train))
        .route("/trader/predict", post(predict))
        .route("/trader/status", get(trader_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(state: Arc<AppState>, addr: &str) -> std::io::Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API Server listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections...");
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

// ============= Broker =============

async fn place_order(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
    let Json(request) = payload?;
    request.validate().map_err(ApiError::Validation)?;

    Ok(Json(state.broker.place_order(request)?))
}

async fn list_orders(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    Json(state.broker.list_orders())
}

async fn get_portfolio(State(state): State<Arc<AppState>>) -> Json<Portfolio> {
    Json(state.broker.get_portfolio())
}

async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(state.broker.cancel_order(&order_id)?))
}

// ============= Trader =============

async fn train(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TrainRequest>, JsonRejection>,
) -> Result<Json<TrainResponse>, ApiError> {
    let Json(request) = payload?;
    if request.features.len() != request.labels.len() {
        warn!(
            "⚠️ [API] Rejected training batch: {} feature rows vs {} labels",
            request.features.len(),
            request.labels.len()
        );
        return Err(ApiError::Validation(
            "features and labels must have the same length".to_string(),
        ));
    }

    // Fitting is CPU-bound; keep it off the async workers.
    let response = tokio::task::spawn_blocking(move || {
        state.model.train(&request.features, &request.labels)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("training task failed: {}", e)))??;

    Ok(Json(response))
}

async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(state.model.predict(&request.features)?))
}

async fn trader_status(State(state): State<Arc<AppState>>) -> Json<TraderStatus> {
    Json(state.model.status())
}
