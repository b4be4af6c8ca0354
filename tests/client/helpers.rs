// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Local stand-ins for the tile server and the AtlasSynth service
#![allow(dead_code)]

use atlassynth::{
    api::{create_app, AppState},
    raster::DepthMap,
    vision::{
        classifier::rank_labels, encode_png, DepthEstimator, LabelScore, VisionModelManager,
        ZeroShotClassifier, LAND_COVER_LABELS,
    },
};
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use image::{DynamicImage, RgbImage};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral local port
pub async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A 256x256 PNG of random pixels, far above the minimum tile size
pub fn random_png_tile() -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(42);
    let img = RgbImage::from_fn(256, 256, |_, _| image::Rgb(rng.gen::<[u8; 3]>()));
    encode_png(&DynamicImage::ImageRgb8(img)).unwrap()
}

async fn good_tile(headers: HeaderMap) -> impl IntoResponse {
    let agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !agent.starts_with("AtlasSynth/") {
        return (StatusCode::FORBIDDEN, "missing user agent").into_response();
    }
    ([(header::CONTENT_TYPE, "image/png")], random_png_tile()).into_response()
}

async fn html_page() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/html")],
        format!("<html>{}</html>", "blocked ".repeat(600)),
    )
}

async fn tiny_png() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], vec![0x89u8; 200])
}

async fn server_error() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "tile renderer down")
}

/// Tile server stand-in
///
/// - `/good/..` a valid PNG tile (requires an AtlasSynth User-Agent)
/// - `/html/..` an HTML error page with status 200
/// - `/tiny/..` a PNG content type with a 200-byte body
/// - `/error/..` status 500
pub fn tile_server() -> Router {
    Router::new()
        .route("/good/*path", get(good_tile))
        .route("/html/*path", get(html_page))
        .route("/tiny/*path", get(tiny_png))
        .route("/error/*path", get(server_error))
}

pub async fn spawn_tile_server() -> String {
    let addr = spawn(tile_server()).await;
    format!("http://{}", addr)
}

pub struct FixedClassifier(Vec<String>);

impl FixedClassifier {
    pub fn new() -> Self {
        Self(LAND_COVER_LABELS.iter().map(|l| l.to_string()).collect())
    }
}

impl ZeroShotClassifier for FixedClassifier {
    fn name(&self) -> &str {
        "fixed"
    }

    fn labels(&self) -> &[String] {
        &self.0
    }

    fn classify(&self, _image: &DynamicImage, top_k: usize) -> anyhow::Result<Vec<LabelScore>> {
        let similarities = [0.22, 0.20, 0.10, 0.25, 0.12, 0.05, 0.08];
        Ok(rank_labels(&similarities, &self.0, top_k))
    }
}

pub struct HalfDepth;

impl DepthEstimator for HalfDepth {
    fn name(&self) -> &str {
        "half"
    }

    fn estimate(&self, image: &DynamicImage) -> anyhow::Result<DepthMap> {
        Ok(DepthMap::filled(image.width(), image.height(), 127.0)?)
    }
}

/// Run the real router with in-memory models; `None` leaves a model unloaded
pub async fn spawn_service(
    classifier: Option<Arc<dyn ZeroShotClassifier>>,
    depth: Option<Arc<dyn DepthEstimator>>,
) -> String {
    let state = AppState::with_manager(VisionModelManager::from_models(classifier, depth));
    let addr = spawn(create_app(state)).await;
    format!("http://{}", addr)
}

pub async fn spawn_full_service() -> String {
    spawn_service(
        Some(Arc::new(FixedClassifier::new())),
        Some(Arc::new(HalfDepth)),
    )
    .await
}
