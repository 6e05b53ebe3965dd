use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::server::PrbacServer;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub name: String,
    pub timestamp: String,
    pub version: String,
    /// Catalog entries loaded at startup
    pub catalog_permissions: usize,
}

/// Liveness only; the relationship backend is not contacted.
pub async fn health_check(State(server): State<PrbacServer>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        name: server.config.name.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        catalog_permissions: server.engine.catalog().len(),
    })
}
