use axum::Router;
use std::sync::Arc;

use crate::core::config::AppConfig;
use crate::features::files::{routes as files_routes, FileService};
use crate::features::health::routes as health_routes;

/// API routes (health + files), mounted at the root and, when configured,
/// additionally under the path base.
pub fn build_api(file_service: Arc<FileService>, config: &AppConfig) -> Router {
    let api = Router::new()
        .merge(health_routes::routes())
        .merge(files_routes::routes(file_service, config.max_upload_size));

    match config.path_base.as_deref() {
        Some(base) => Router::new().nest(base, api.clone()).merge(api),
        None => api,
    }
}
