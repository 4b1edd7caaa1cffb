//! # Tool Page Handlers
//!
//! Serves the static HTML page of each tool from the configured template
//! directory. Opening an upload-landing page first runs the Cleanup Sweep.
//!
//! A missing page file is answered with a `404` JSON message naming the file,
//! so the API stays usable without the front-end assets.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tokio::fs;
use tower_http::services::ServeFile;
use tracing::{debug, error, instrument, warn};

use crate::{models::AppState, services::cleanup::sweep};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolPage {
    CropUpload,
    Crop,
    Upload,
    Flip,
    ThumbnailUpload,
    Thumbnail,
    BackgroundUpload,
    BackgroundTool,
}

impl ToolPage {
    pub fn template(self) -> &'static str {
        match self {
            ToolPage::CropUpload => "cropupload.html",
            ToolPage::Crop => "crop.html",
            ToolPage::Upload => "upload.html",
            ToolPage::Flip => "flip.html",
            ToolPage::ThumbnailUpload => "thumbnailupload.html",
            ToolPage::Thumbnail => "thumbnail.html",
            ToolPage::BackgroundUpload => "backgroundupload.html",
            ToolPage::BackgroundTool => "backgroundtool.html",
        }
    }

    fn title(self) -> &'static str {
        match self {
            ToolPage::CropUpload => "Crop Upload page",
            ToolPage::Crop => "Crop page",
            ToolPage::Upload | ToolPage::ThumbnailUpload => "Upload page",
            ToolPage::Flip => "Flip page",
            ToolPage::Thumbnail => "Thumbnail page",
            ToolPage::BackgroundUpload => "Background upload page",
            ToolPage::BackgroundTool => "Background tool page",
        }
    }

    /// Upload-landing pages reset the Storage Area.
    pub fn sweeps_storage(self) -> bool {
        matches!(
            self,
            ToolPage::CropUpload
                | ToolPage::Upload
                | ToolPage::ThumbnailUpload
                | ToolPage::BackgroundUpload
        )
    }
}

#[instrument(skip(state, req))]
async fn render_page(state: Arc<AppState>, page: ToolPage, req: Request<Body>) -> Response {
    if page.sweeps_storage() {
        sweep(state.storage.as_ref()).await;
    }

    let path = state.config.template_dir.join(page.template());
    if !fs::try_exists(&path).await.unwrap_or(false) {
        warn!(path = %path.display(), "Template not found");
        let message = format!("{} - {} template not found", page.title(), page.template());
        return (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response();
    }

    let mut service = ServeFile::new(&path);
    match service.try_call(req).await {
        Ok(res) => {
            debug!(status = %res.status(), "Page served");
            res.into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to serve page");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
    }
}

/// GET /cropupload
pub async fn crop_upload_page(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    render_page(state, ToolPage::CropUpload, req).await
}

/// GET /crop
pub async fn crop_page(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    render_page(state, ToolPage::Crop, req).await
}

/// GET /upload
pub async fn upload_page(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    render_page(state, ToolPage::Upload, req).await
}

/// GET /flip
pub async fn flip_page(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    render_page(state, ToolPage::Flip, req).await
}

/// GET /thumbnailupload
pub async fn thumbnail_upload_page(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
) -> Response {
    render_page(state, ToolPage::ThumbnailUpload, req).await
}

/// GET /thumbnail
pub async fn thumbnail_page(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    render_page(state, ToolPage::Thumbnail, req).await
}

/// GET /backgroundupload
pub async fn background_upload_page(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
) -> Response {
    render_page(state, ToolPage::BackgroundUpload, req).await
}

/// GET /backgroundtool
pub async fn background_tool_page(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
) -> Response {
    render_page(state, ToolPage::BackgroundTool, req).await
}
