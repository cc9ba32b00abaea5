use axum::{routing::get, Router};

use crate::features::health::handlers;

/// Health check route (no state, no auth)
pub fn routes() -> Router {
    Router::new().route("/health", get(handlers::get_health))
}
