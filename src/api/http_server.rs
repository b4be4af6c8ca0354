// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::classify::classify_handler;
use super::depth::depth_handler;
use crate::config::ServerConfig;
use crate::vision::{VisionModelInfo, VisionModelManager, DEFAULT_TOP_K, LAND_COVER_LABELS};
use crate::vision::image_utils::MAX_IMAGE_SIZE;

/// Headroom over `max_upload_bytes` for multipart boundaries and part headers
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub vision_model_manager: Arc<VisionModelManager>,
    /// Number of predictions /classify returns
    pub top_k: usize,
    /// Largest accepted image, in bytes
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(manager: VisionModelManager, config: &ServerConfig) -> Self {
        Self {
            vision_model_manager: Arc::new(manager),
            top_k: config.effective_top_k(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// State with no models loaded
    pub fn new_for_test() -> Self {
        Self::with_manager(VisionModelManager::default())
    }

    /// State around an existing manager, with default limits
    pub fn with_manager(manager: VisionModelManager) -> Self {
        Self {
            vision_model_manager: Arc::new(manager),
            top_k: DEFAULT_TOP_K,
            max_upload_bytes: MAX_IMAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub labels: Vec<String>,
    pub models: Vec<VisionModelInfo>,
}

/// Build the router for the service
pub fn create_app(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/health", get(health_handler))
        .route("/classify", post(classify_handler))
        .route("/depth", post(depth_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Load the models, bind, and serve until Ctrl-C
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let manager = VisionModelManager::new(config.vision_model_config()).await?;
    let state = AppState::new(manager, &config);

    let listener = TcpListener::bind(config.listen_addr).await?;
    serve(listener, state).await
}

/// Serve on an already-bound listener until Ctrl-C
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let addr = listener.local_addr()?;
    let app = create_app(state);

    info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let manager = &state.vision_model_manager;
    let status = if manager.has_classifier() && manager.has_depth() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: crate::version::VERSION_NUMBER.to_string(),
        labels: LAND_COVER_LABELS.iter().map(|l| l.to_string()).collect(),
        models: manager.list_models(),
    })
}
