//! This file defines the calculator binary entry point.

use calculator::app;
use calculator::app_state::AppState;
use calculator::cli;
use calculator::metrics;
use calculator::server;
use calculator::tracing;

use std::{process::exit, sync::Arc};

/// Application entry point
#[tokio::main]
async fn main() {
    let args = cli::parse();
    tracing::init_tracing(&args);
    ::tracing::debug!("{:?}", args);
    metrics::register_metrics();
    let state = match AppState::from_args(&args) {
        Ok(state) => state,
        Err(error) => {
            ::tracing::error!("failed to open history store: {}", error);
            exit(1)
        }
    };
    let service = app::service(Arc::new(state));
    server::serve(&args, service).await;
    tracing::shutdown_tracing();
}
