mod config;
mod geometry;
mod state;

pub use config::{AppConfig, ConfigError, Environment};
pub use geometry::{CropArea, Dimensions, Flips};
pub use state::AppState;
