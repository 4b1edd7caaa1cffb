//! # Service Configuration
//!
//! [`AppConfig`] is read once at startup and shared read-only through
//! [`AppState`](crate::models::AppState). Nothing mutates it afterwards.
//!
//! # Environment Variables
//!
//! - `APP_ENV` - "production" switches logs to Bunyan JSON
//! - `BIND_ADDR` - Listen address (default `0.0.0.0:5000`)
//! - `UPLOAD_DIR` - Storage Area directory (default `static/uploads`)
//! - `TEMPLATE_DIR` - Directory holding the tool pages (default `templates`)
//! - `MAX_REQUEST_BYTES` - Whole-request ceiling (default 16 MiB)
//! - `MAX_TOOL_UPLOAD_BYTES` - Per-file ceiling on crop/background uploads (default 10 MiB)
//! - `REMBG_API_URL` - rembg-compatible endpoint; when unset segmentation runs in-process

use std::env;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::utils::constant::{DEFAULT_MAX_REQUEST_BYTES, DEFAULT_MAX_TOOL_UPLOAD_BYTES};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("env variable `{var}` must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub bind_addr: String,
    pub upload_dir: PathBuf,
    pub template_dir: PathBuf,
    pub max_request_bytes: usize,
    pub max_tool_upload_bytes: usize,
    pub rembg_api_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            bind_addr: "0.0.0.0:5000".to_string(),
            upload_dir: PathBuf::from("static/uploads"),
            template_dir: PathBuf::from("templates"),
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            max_tool_upload_bytes: DEFAULT_MAX_TOOL_UPLOAD_BYTES,
            rembg_api_url: None,
        }
    }
}

impl AppConfig {
    /// Builds the configuration from the process environment, falling back to
    /// [`AppConfig::default`] for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let environment = match env::var("APP_ENV") {
            Ok(value) if value.eq_ignore_ascii_case("production") => Environment::Production,
            _ => Environment::Development,
        };

        let config = Self {
            environment,
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            template_dir: env::var("TEMPLATE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.template_dir),
            max_request_bytes: byte_limit("MAX_REQUEST_BYTES", defaults.max_request_bytes)?,
            max_tool_upload_bytes: byte_limit(
                "MAX_TOOL_UPLOAD_BYTES",
                defaults.max_tool_upload_bytes,
            )?,
            rembg_api_url: env::var("REMBG_API_URL").ok().filter(|url| !url.is_empty()),
        };

        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// A development configuration rooted at the given Storage Area.
    pub fn with_upload_dir(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            ..Self::default()
        }
    }
}

fn byte_limit(var: &'static str, default: usize) -> Result<usize, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|limit| *limit > 0)
            .ok_or(ConfigError::InvalidNumber { var, value }),
        Err(_) => Ok(default),
    }
}
