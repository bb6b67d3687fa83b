//! Soma check-in service.
//!
//! Main entry point. Loads configuration, initializes tracing, and runs
//! the HTTP server until a shutdown signal arrives.

use anyhow::{Context, Result};
use soma_api::{AppState, Config};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config.rust_log);

    info!("Starting Soma check-in service");
    info!(
        host = %config.host,
        port = config.port,
        supabase_url = config.supabase_url.as_deref().unwrap_or("<unset>"),
        service_role_key = %config.service_role_key_masked(),
        "Configuration loaded"
    );

    // The service starts even without the required secrets; the check-in
    // endpoints answer 500 with a diagnostic until they are provided.
    let missing = config.missing_required();
    if !missing.is_empty() {
        warn!(missing = ?missing, "Required configuration absent");
    }

    let addr = config.parse_server_addr()?;
    let state = AppState::new(config)?;

    soma_api::start_server(state, addr).await.context("HTTP server failed")?;

    info!("Soma shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
///
/// `RUST_LOG` takes precedence over the configured filter so deployments
/// can adjust verbosity without touching the config file.
fn init_tracing(configured_filter: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured_filter))
        .or_else(|_| EnvFilter::try_new("info"))
        .expect("default tracing filter is valid");

    let fmt_layer = fmt::layer().with_target(true).with_file(true).with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
