//! # biothermald: BioThermal daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (CLI argument, add-on options, env vars, YAML file)
//! - Initialise `tracing` from the configured filter
//! - Load the comfort model (a missing model disables decisions, not the
//!   daemon) and build the HomeAssistant client
//! - Construct application services, injecting adapters via port traits
//! - Start the background poller that keeps the dashboard snapshot fresh
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown on Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use biothermal_adapter_classifier::ComfortModel;
use biothermal_adapter_homeassistant::HomeAssistantClient;
use biothermal_adapter_http_axum::state::AppState;
use biothermal_app::poller::Poller;
use biothermal_app::ports::HomeAssistant;
use biothermal_app::services::dashboard_service::DashboardService;
use biothermal_app::services::thermal_control::ThermalControlService;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("BIOTHERMAL_CONFIG").ok())
        .unwrap_or_else(|| "config.yaml".to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("loading configuration from {config_path}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();
    tracing::info!(path = %config_path, "configuration loaded");

    // Adapters
    let home_assistant = HomeAssistantClient::new(&config.home_assistant())
        .context("building HomeAssistant client")?;
    if let Err(err) = home_assistant.check_api().await {
        // not fatal: the dashboard shows stale data until HomeAssistant answers
        tracing::warn!(error = %err.report(), "HomeAssistant API not reachable");
    }
    // not fatal either: decisions show as unavailable until a usable model ships
    let classifier = Arc::new(ComfortModel::load(&config.classifier.model_path));

    // Services
    let dashboard = Arc::new(DashboardService::new(
        home_assistant.clone(),
        Arc::clone(&classifier),
        config.sensor_settings()?,
        config.thermostat_selection()?,
    ));
    let control = Arc::new(ThermalControlService::new(
        home_assistant,
        classifier,
        config.control_settings(),
    ));
    if !config.control.enabled {
        tracing::info!("thermal control runs in dry-run mode, HVAC commands are only logged");
    }

    // Background
    let poller = Poller::start(Arc::clone(&dashboard), config.refresh_interval());

    // HTTP
    let state = AppState::new(dashboard, control, config.dashboard.refresh_seconds);
    let app = biothermal_adapter_http_axum::router::build(state, &config.server.assets_dir);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!("biothermald listening on http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    poller.abort();
    tracing::info!("biothermald stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
