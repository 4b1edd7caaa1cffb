use std::sync::Arc;

use tracing::{debug, info};

use crate::models::AppConfig;
use crate::services::{background::BackgroundRemover, storage::Storage, transform::ImageTransformer};

/// Application state shared across requests. Needs to be thread-safe.
pub struct AppState {
    /// Configuration read once at startup.
    pub config: AppConfig,
    /// The Storage Area holding every uploaded and derived file.
    pub storage: Arc<dyn Storage>,
    /// The four transform adapters, bound to the same storage.
    pub transformer: ImageTransformer,
}

impl AppState {
    /// Creates a new application state with the provided services.
    ///
    /// # Arguments
    ///
    /// * `config` - Startup configuration
    /// * `storage` - Backend for the Storage Area
    /// * `remover` - Segmentation backend used by the background-removal adapter
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn Storage>,
        remover: Arc<dyn BackgroundRemover>,
    ) -> Self {
        info!("Initializing application state");
        debug!(
            max_request_bytes = config.max_request_bytes,
            max_tool_upload_bytes = config.max_tool_upload_bytes,
            "Configured upload ceilings"
        );

        let transformer = ImageTransformer::new(Arc::clone(&storage), remover);

        Self {
            config,
            storage,
            transformer,
        }
    }
}
