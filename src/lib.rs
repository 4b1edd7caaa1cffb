//! # Pixkit - Image Tool Service
//!
//! Clients upload an image, pick one transform (crop, flip, thumbnail or
//! background removal) and download the result. Every file lives in a single
//! shared Storage Area and every transform writes a new file.
//!
//! ## Modules
//!
//! - [`handlers`] - HTTP request handlers for the tool endpoints
//! - [`middleware`] - Panic recovery
//! - [`models`] - Configuration, shared state and geometry types
//! - [`services`] - Storage, transform adapters, segmentation and cleanup
//! - [`utils`] - Naming rules, validation, image codecs and constants

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::handlers::*;
use crate::middleware::handle_panic;
use crate::models::{AppConfig, AppState};
use crate::services::{
    background::{BackgroundRemover, BorderKeyRemover, RembgHttpRemover},
    storage::{LocalStorage, StorageError},
};

/// Creates an Axum router with the segmentation backend chosen from configuration.
///
/// This is a convenience function that calls [`app_with_remover`] with no custom remover.
#[inline]
pub async fn app(config: AppConfig) -> Result<Router, StorageError> {
    app_with_remover(config, None).await
}

/// Creates an Axum router over a local Storage Area.
///
/// # Arguments
///
/// * `config` - Startup configuration
/// * `remover` - Optional custom segmentation backend. If None, `REMBG_API_URL`
///   selects [`RembgHttpRemover`], otherwise [`BorderKeyRemover`] is used
pub async fn app_with_remover(
    config: AppConfig,
    remover: Option<Arc<dyn BackgroundRemover>>,
) -> Result<Router, StorageError> {
    let state = build_state(config, remover).await?;
    Ok(router(state))
}

/// Opens the Storage Area and assembles the shared state.
pub async fn build_state(
    config: AppConfig,
    remover: Option<Arc<dyn BackgroundRemover>>,
) -> Result<Arc<AppState>, StorageError> {
    let remover: Arc<dyn BackgroundRemover> = if let Some(remover) = remover {
        remover
    } else if let Some(api_url) = &config.rembg_api_url {
        info!("Removing backgrounds with [RembgHttpRemover]");
        Arc::new(RembgHttpRemover::new(api_url.clone()))
    } else {
        info!("Removing backgrounds with [BorderKeyRemover (in-process)]");
        Arc::new(BorderKeyRemover::default())
    };

    let storage = LocalStorage::new(&config.upload_dir).await?;
    info!(upload_dir = %storage.root().display(), "Storage Area ready");

    Ok(Arc::new(AppState::new(config, Arc::new(storage), remover)))
}

/// Creates the router with all application routes and layers.
pub fn router(state: Arc<AppState>) -> Router {
    let page_routes = Router::new()
        .route("/cropupload", get(crop_upload_page))
        .route("/crop", get(crop_page))
        .route("/upload", get(upload_page))
        .route("/flip", get(flip_page))
        .route("/thumbnailupload", get(thumbnail_upload_page))
        .route("/thumbnail", get(thumbnail_page))
        .route("/backgroundupload", get(background_upload_page))
        .route("/backgroundtool", get(background_tool_page));

    let tool_routes = Router::new()
        .route("/upload_image_for_crop", post(upload_image_for_crop))
        .route("/upload_image", post(upload_image))
        .route("/upload_image_for_background", post(upload_image_for_background))
        .route("/process_crop", post(process_crop))
        .route("/flip_image", post(flip_image))
        .route("/generate_thumbnail", post(generate_thumbnail))
        .route("/remove_background", post(remove_background));

    let file_routes = Router::new()
        .route("/image/{filename}", get(serve_image))
        .route("/download_cropped/{filename}", get(download_cropped))
        .route("/download_flipped/{filename}", get(download_flipped))
        .route("/download_thumbnail/{filename}", get(download_thumbnail))
        .route(
            "/download_background_removed/{filename}",
            get(download_background_removed),
        );

    let max_request_bytes = state.config.max_request_bytes;

    Router::new()
        .route("/health", get(health_check))
        .merge(page_routes)
        .merge(tool_routes)
        .merge(file_routes)
        .fallback(endpoint_not_found)
        .layer(DefaultBodyLimit::max(max_request_bytes))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
