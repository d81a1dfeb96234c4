// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::handlers::health_handler;
use super::recognize::recognize_handler;
use super::staging::UploadStaging;
use crate::config::ServiceConfig;
use crate::vision::EngineAccessor;

/// Shared state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<EngineAccessor>,
    pub staging: Arc<UploadStaging>,
}

impl AppState {
    pub fn new(engine: Arc<EngineAccessor>, staging: UploadStaging) -> Self {
        Self {
            engine,
            staging: Arc::new(staging),
        }
    }
}

pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/recognize", post(recognize_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `router` on an already-bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")
}

/// Bind the configured address and serve until Ctrl-C
pub async fn start_server(config: &ServiceConfig, state: AppState) -> Result<()> {
    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("OCR service listening on {}", listener.local_addr()?);

    let router = create_router(state, config.max_upload_bytes);
    serve(listener, router, shutdown_signal()).await?;

    tracing::info!("OCR service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
