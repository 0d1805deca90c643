//! My Timer - A countdown timer with start/stop/reset controls
//! 
//! This is the main entry point for the my-timer application.

use std::{sync::Arc, time::Duration};
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use my_timer::{
    config::Config,
    state::AppState,
    api::create_router,
    services::{AlertPresenter, JsonFileStore},
    tasks::{display_task, spawn_countdown},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("my_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting my-timer v{}", env!("CARGO_PKG_VERSION"));

    let settings_path = config.settings_path();
    let store = JsonFileStore::open(&settings_path)
        .with_context(|| format!("Failed to open settings at {}", settings_path.display()))?;
    info!("Configuration: host={}, port={}, locale={:?}, settings={}",
          config.host, config.port, config.locale, settings_path.display());

    // The countdown task owns the controller; everything else talks to it through channels
    let alerts = AlertPresenter::new(config.desktop_notify);
    let countdown = spawn_countdown(store, alerts.clone(), config.locale);

    tokio::spawn(display_task(countdown.state_rx.clone(), config.locale));

    let state = Arc::new(AppState::new(
        countdown.commands.clone(),
        countdown.state_rx.clone(),
        alerts,
        config.locale,
        config.port,
        config.host.clone(),
    ));

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start      - Start or resume the countdown");
    info!("  POST /stop       - Pause the countdown");
    info!("  POST /reset      - Stop and rewind the countdown");
    info!("  GET  /settings   - Read the countdown length");
    info!("  PUT  /settings   - Change the countdown length");
    info!("  POST /alert/ack  - Dismiss the completion alert");
    info!("  GET  /status     - Current countdown and alert");
    info!("  GET  /health     - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Tear down the countdown so no tick registration outlives it
    state.shutdown().await;
    if tokio::time::timeout(Duration::from_secs(2), countdown.join).await.is_err() {
        warn!("Countdown task did not stop in time");
    }

    info!("Server shutdown complete");
    Ok(())
}
