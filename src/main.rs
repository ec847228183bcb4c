mod analyzer;
mod api;
mod config;
mod error;
mod loader;
mod risk;
mod store;
mod summary;
mod types;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::analyzer::VinAnalyzer;
use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::error::Result;
use crate::loader::load_store;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Vehicle store: loaded once, immutable afterwards ---
    let (store, stats) = load_store(&cfg.csv_path)?;
    info!(
        "Store ready: {} vehicles from {} rows (rejected: no_vin={} no_year={} no_make_model={})",
        stats.loaded,
        stats.rows_total,
        stats.rejected_no_vin,
        stats.rejected_no_year,
        stats.rejected_no_make_model,
    );

    // --- Analyzer pipeline ---
    let analyzer = Arc::new(VinAnalyzer::from_config(&cfg, store)?);

    // --- HTTP API server ---
    let app = router(ApiState { analyzer });
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
