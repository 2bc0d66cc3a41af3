//! CodePrep · Dashboard Backend
//!
//! - Axum HTTP API for profile progress, badges and levels
//! - Hosted REST backend as the data store (via environment variables)
//! - In-memory demo catalog when no backend is configured
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                  : u16 (default 3000)
//!   BACKEND_URL           : hosted backend base URL; unset = demo store
//!   BACKEND_API_KEY       : key sent as `apikey` (and default bearer)
//!   DASHBOARD_CONFIG_PATH : path to TOML config (backend, badge policy, level table)
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default), "compact" or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod store;
mod backend;
mod catalog;
mod progress;
mod badges;
mod levels;
mod session;
mod seeds;
mod state;
mod protocol;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared application state (store, badge policy, level table).
  let state = Arc::new(AppState::new().await);

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "dashboard", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "dashboard", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!(target: "dashboard", "Shutdown signal received");
}
