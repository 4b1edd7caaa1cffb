//! # Services
//!
//! The pipeline components behind the HTTP handlers.
//!
//! ## Available Services
//!
//! - **Storage** (`storage`) - Storage Area interface and local directory backend
//! - **Transform** (`transform`) - Crop, flip, thumbnail and background-removal adapters
//! - **Background** (`background`) - Segmentation backends for background removal
//! - **Cleanup** (`cleanup`) - Storage Area sweep

pub mod background;
pub mod cleanup;
pub mod storage;
pub mod transform;
