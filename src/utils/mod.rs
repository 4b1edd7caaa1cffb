//! # Utility Modules
//!
//! Pure helpers shared by the handlers and services.
//!
//! ## Available Utilities
//!
//! - **Constants** (`constant`) - Fixed upload and encoding policy
//! - **Naming** (`naming`) - Storage and download name rules
//! - **Validators** (`validator`) - Upload extension and size checks
//! - **Imaging** (`imaging`) - Decode, flatten and encode helpers

pub mod constant;
pub mod imaging;
pub mod naming;
pub mod validator;
