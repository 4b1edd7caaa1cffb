//! # HTTP Request Handlers
//!
//! This module contains all HTTP request handlers for the service.
//! Each handler is responsible for processing specific HTTP requests and returning
//! appropriate responses.
//!
//! ## Available Handlers
//!
//! - **Pages** (`pages`) - Tool pages, with the Cleanup Sweep on upload-landing pages
//! - **Upload** (`upload`) - Multipart uploads into the Storage Area
//! - **Crop / Flip / Thumbnail / Background** - One transform per request
//! - **Files** (`files`) - Inline serving and attachment downloads
//! - **Health Check** (`health_check`) - Application health monitoring

mod background;
mod crop;
mod extract;
mod fallback;
mod files;
mod flip;
mod health_check;
mod pages;
mod thumbnail;
mod upload;

pub use background::*;
pub use crop::*;
pub use fallback::*;
pub use files::*;
pub use flip::*;
pub use health_check::*;
pub use pages::*;
pub use thumbnail::*;
pub use upload::*;
