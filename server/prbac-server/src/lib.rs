//! PRBAC server - RBAC v1 permission API over a Zanzibar relationship store
//!
//! This library provides the HTTP surface of the bridge: principal access
//! resolution, role creation and introspection, and group membership and
//! role binding edits. Operations of the RBAC v1 API without an algorithm
//! answer `501 Not Implemented`.

pub mod error;
pub mod handlers;
pub mod macros;
pub mod middleware;
pub mod routes;
pub mod server;

// Re-export commonly used types
pub use error::*;
pub use server::{PrbacServer, ServerConfig};

use axum::{middleware::from_fn, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main application router with all routes and middleware
pub fn create_app(server: PrbacServer) -> Router {
    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::create_cors_layer())
                .layer(from_fn(middleware::request_timing_middleware)),
        )
        .with_state(server)
}
