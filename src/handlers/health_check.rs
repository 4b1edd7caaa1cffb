//! # Health Check Handler
//!
//! Simple health check endpoint for monitoring application availability.
//! This endpoint can be used by load balancers, monitoring systems, or
//! deployment tools to verify that the application is running.

use axum::Json;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::utils::constant::SERVICE_NAME;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// Health check endpoint that always reports healthy.
///
/// It performs no storage checks or complex validation.
#[instrument]
pub async fn health_check() -> Json<HealthResponse> {
    debug!("Health check endpoint accessed");
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
    })
}
