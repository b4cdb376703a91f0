use paper_signal::{run_server, AppConfig, AppState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load Configuration
    let config = AppConfig::load()?;

    // Setup Logging
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Paper Signal...");
    info!("Loaded Configuration: {:?}", config);

    // Both services live for the whole process and are shared with every handler.
    let app_state = Arc::new(AppState::from_config(&config));
    info!(
        "💼 Paper broker ready (initial cash: {:.2}), model: {}",
        config.broker.initial_cash,
        app_state.model.model_type()
    );

    info!("Initializing API Server...");
    run_server(app_state, &config.server.bind_addr()).await?;

    info!("Server stopped");
    Ok(())
}
