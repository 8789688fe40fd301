//! Algo Trainer · algorithm-practice bot
//!
//! - Sends small algorithm problems; checks numeric answers with exact verifiers
//! - Optional OpenAI judgment of the one-line approach (local fallback otherwise)
//! - Telegram long-polling transport + daily push scheduler
//! - Axum HTTP API for the same flows
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   TELEGRAM_TOKEN      : enables the Telegram transport if present
//!   TELEGRAM_BASE_URL   : default "https://api.telegram.org"
//!   OPENAI_API_KEY      : enables OpenAI approach judgment if present
//!   OPENAI_BASE_URL     : default "https://api.openai.com/v1"
//!   OPENAI_MODEL        : default "gpt-4o-mini"
//!   DAILY_HOUR          : 0-23 (default 9), local time of the daily push
//!   DAILY_MINUTE        : 0-59 (default 0)
//!   TRAINER_CONFIG_PATH : path to TOML config (prompts + optional problem bank)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod verify;
mod answer;
mod grading;
mod config;
mod seeds;
mod catalog;
mod state;
mod protocol;
mod logic;
mod openai;
mod telegram;
mod scheduler;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::routes::build_router;
use crate::state::AppState;
use crate::telegram::Telegram;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared application state (catalog, sessions, OpenAI client, prompts, schedule).
  let state = Arc::new(AppState::new());
  if state.catalog.is_empty() {
    warn!(target: "algo_trainer", "Problem catalog is empty; nothing will be sent");
  }

  let tg_client = Telegram::from_env();
  match &tg_client {
    Some(tg) => {
      tokio::spawn(telegram::run_polling(state.clone(), tg.clone()));
    }
    None => info!(target: "algo_trainer", "Telegram disabled (no TELEGRAM_TOKEN). HTTP API only."),
  }

  tokio::spawn(scheduler::run_daily(state.clone(), tg_client));

  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "algo_trainer", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "algo_trainer", error = %e, "Failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  info!(target: "algo_trainer", "Shutdown requested");
}
