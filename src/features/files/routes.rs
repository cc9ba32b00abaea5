use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::dtos::FILES_PATH;
use crate::features::files::handlers::{
    delete_file, get_file, list_files, rename_file, upload_file,
};
use crate::features::files::services::FileService;

/// Create routes for the files feature
///
/// `max_upload_size` caps the whole upload request body.
pub fn routes(file_service: Arc<FileService>, max_upload_size: usize) -> Router {
    Router::new()
        .route(
            FILES_PATH,
            post(upload_file)
                .layer(DefaultBodyLimit::max(max_upload_size))
                .get(list_files),
        )
        .route(
            &format!("{}/{{id}}", FILES_PATH),
            get(get_file).put(rename_file).delete(delete_file),
        )
        .with_state(file_service)
}
