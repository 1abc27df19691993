// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::download_report::download_report_handler;
use super::pages::{about_handler, index_handler};
use super::predict::predict_handler;
use crate::config::ServerConfig;
use crate::report::ReportAssembler;
use crate::vision::DetectorService;

/// Largest accepted request body (uploads and report payloads)
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Shared, read-only state for every request
#[derive(Debug, Clone)]
pub struct AppState {
    pub detector: DetectorService,
    pub assembler: ReportAssembler,
}

impl AppState {
    pub fn new(detector: DetectorService, assembler: ReportAssembler) -> Self {
        Self {
            detector,
            assembler,
        }
    }

    /// State without a detection model, staging in the system temp dir
    pub fn new_for_test() -> Self {
        Self::new(
            DetectorService::unavailable("no model loaded in test state"),
            ReportAssembler::default(),
        )
    }
}

/// Build the application router
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        // Pages
        .route("/", get(index_handler))
        .route("/tentang", get(about_handler))
        // Detection endpoint
        .route("/predict", post(predict_handler))
        // Report endpoint
        .route("/download_report", post(download_report_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind and serve until Ctrl+C or SIGTERM
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr = config.bind_addr()?;
    let app = create_app(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
