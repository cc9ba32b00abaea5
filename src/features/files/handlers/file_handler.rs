use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, OriginalUri, Path, State,
    },
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppQuery;
use crate::features::files::dtos::{
    content_disposition, file_location, FileSummaryDto, RenameFileQuery, UploadFileDto,
    UPLOAD_FIELD,
};
use crate::features::files::services::FileService;

/// Prefix the router was mounted under (e.g. "/v1"), empty at the root
fn mount_prefix(original: &Uri, uri: &Uri) -> String {
    original
        .path()
        .strip_suffix(uri.path())
        .unwrap_or_default()
        .to_string()
}

fn multipart_error(e: MultipartError) -> AppError {
    debug!("Failed to read multipart data: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(format!("Failed to read multipart data: {}", e.body_text()))
    }
}

/// Download a file
///
/// Returns the raw file content with its video content type and filename.
#[utoipa::path(
    get,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File id")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 404, description = "File not found")
    )
)]
pub async fn get_file(
    State(service): State<Arc<FileService>>,
    Path(id): Path<String>,
) -> Result<Response> {
    info!("GET: /files/{{id}} endpoint called.");

    let file = service.get_file(&id).await?;
    let disposition = content_disposition(&file.name);
    let data = file.data.unwrap_or_default();

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

/// List files
///
/// Returns metadata for every stored file. Payloads are never included.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "List of files", body = Vec<FileSummaryDto>),
        (status = 404, description = "Store not initialized")
    )
)]
pub async fn list_files(
    State(service): State<Arc<FileService>>,
) -> Result<Json<Vec<FileSummaryDto>>> {
    info!("GET: /files endpoint called.");

    let files = service.list_files().await?;
    Ok(Json(files))
}

/// Upload a file
///
/// Accepts multipart/form-data with a `data` field holding an .mp4, .mpeg or
/// .mpg file.
#[utoipa::path(
    post,
    path = "/files",
    tag = "files",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "Video upload form",
    ),
    responses(
        (status = 201, description = "File uploaded", headers(("Location" = String, description = "URL of the new file"))),
        (status = 400, description = "No file was uploaded"),
        (status = 409, description = "A file with this name already exists"),
        (status = 413, description = "File too large"),
        (status = 415, description = "Unsupported file extension"),
        (status = 503, description = "Store not initialized")
    )
)]
pub async fn upload_file(
    State(service): State<Arc<FileService>>,
    OriginalUri(original_uri): OriginalUri,
    uri: Uri,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse> {
    info!("POST: /files endpoint called.");

    let mut multipart = multipart.map_err(|e| {
        debug!("Rejected multipart request: {}", e);
        AppError::BadRequest(e.body_text())
    })?;

    let mut file_name = String::new();
    let mut file_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name != UPLOAD_FIELD {
            debug!("Ignoring unknown field: {}", field_name);
            continue;
        }

        file_name = field.file_name().unwrap_or("").to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        file_data = Some(data.to_vec());
    }

    let file = service.create_file(&file_name, file_data).await?;
    let location = file_location(&mount_prefix(&original_uri, &uri), &file.id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)]))
}

/// Rename a file
#[utoipa::path(
    put,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File id"),
        RenameFileQuery
    ),
    responses(
        (status = 201, description = "File renamed", headers(("Location" = String, description = "URL of the file"))),
        (status = 400, description = "Missing or empty newName"),
        (status = 404, description = "File not found"),
        (status = 409, description = "A file with this name already exists")
    )
)]
pub async fn rename_file(
    State(service): State<Arc<FileService>>,
    OriginalUri(original_uri): OriginalUri,
    uri: Uri,
    Path(id): Path<String>,
    AppQuery(query): AppQuery<RenameFileQuery>,
) -> Result<impl IntoResponse> {
    info!("PUT: /files/{{id}} endpoint called.");

    query
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let id = service.rename_file(&id, &query.new_name).await?;
    let location = file_location(&mount_prefix(&original_uri, &uri), &id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)]))
}

/// Delete a file
#[utoipa::path(
    delete,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File id")
    ),
    responses(
        (status = 204, description = "File deleted"),
        (status = 404, description = "File not found")
    )
)]
pub async fn delete_file(
    State(service): State<Arc<FileService>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    info!("DELETE: /files/{{id}} endpoint called.");

    service.delete_file(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::files::routes;
    use crate::shared::test_helpers::{count_files, create_test_pool};
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use sqlx::SqlitePool;

    const MAX_UPLOAD: usize = 64 * 1024;

    async fn setup() -> (TestServer, SqlitePool) {
        let pool = create_test_pool().await;
        let service = Arc::new(FileService::new(pool.clone()));
        let server = TestServer::new(routes(service, MAX_UPLOAD)).unwrap();
        (server, pool)
    }

    fn upload_form(file_name: &str, data: Vec<u8>) -> MultipartForm {
        MultipartForm::new().add_part(
            "data",
            Part::bytes(data)
                .file_name(file_name)
                .mime_type("application/octet-stream"),
        )
    }

    fn location_id(response: &axum_test::TestResponse) -> String {
        let location = response.header(header::LOCATION);
        location
            .to_str()
            .unwrap()
            .strip_prefix("/files/")
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_upload_returns_location() {
        let (server, _pool) = setup().await;

        let response = server
            .post("/files")
            .multipart(upload_form("sample.mp4", vec![7u8; 1024]))
            .await;

        response.assert_status(StatusCode::CREATED);
        let id = location_id(&response);
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert!(response.as_bytes().is_empty());
    }

    #[tokio::test]
    async fn test_upload_unsupported_extension_is_415() {
        let (server, pool) = setup().await;

        for name in ["notes.txt", "movie.avi"] {
            let response = server
                .post("/files")
                .multipart(upload_form(name, vec![1u8; 16]))
                .await;
            response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
        }

        assert_eq!(count_files(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_upload_empty_payload_is_400() {
        let (server, pool) = setup().await;

        let response = server
            .post("/files")
            .multipart(upload_form("sample.mp4", Vec::new()))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "No file was uploaded.");

        assert_eq!(count_files(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_upload_without_data_field_is_400() {
        let (server, _pool) = setup().await;

        let form = MultipartForm::new().add_text("other", "value");
        let response = server.post("/files").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_duplicate_name_is_409() {
        let (server, _pool) = setup().await;

        server
            .post("/files")
            .multipart(upload_form("sample.mp4", vec![1u8; 8]))
            .await
            .assert_status(StatusCode::CREATED);

        server
            .post("/files")
            .multipart(upload_form("sample.mp4", vec![2u8; 8]))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_413() {
        let (server, pool) = setup().await;

        let response = server
            .post("/files")
            .multipart(upload_form("big.mp4", vec![0u8; MAX_UPLOAD * 2]))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(count_files(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_upload_unexpected_store_failure_is_500() {
        let (server, pool) = setup().await;
        sqlx::query(
            r#"
            CREATE TRIGGER reject_inserts BEFORE INSERT ON uploaded_files
            BEGIN
                SELECT RAISE(ABORT, 'CHECK constraint failed: size');
            END
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let response = server
            .post("/files")
            .multipart(upload_form("sample.mp4", vec![1u8; 8]))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["data"].is_null());
        assert!(body.get("meta").is_none());
        assert_eq!(body["message"], "Database error occurred");
        assert_eq!(count_files(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_upload_with_unavailable_store_is_503() {
        let service = Arc::new(FileService::unavailable());
        let server = TestServer::new(routes(service, MAX_UPLOAD)).unwrap();

        let response = server
            .post("/files")
            .multipart(upload_form("sample.mp4", vec![1u8; 8]))
            .await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_reads_with_unavailable_store_are_404() {
        let service = Arc::new(FileService::unavailable());
        let server = TestServer::new(routes(service, MAX_UPLOAD)).unwrap();

        server.get("/files").await.assert_status_not_found();
        server.get("/files/abc").await.assert_status_not_found();
        server
            .put("/files/abc")
            .add_query_param("newName", "x.mp4")
            .await
            .assert_status_not_found();
        server.delete("/files/abc").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_rename_requires_new_name() {
        let (server, _pool) = setup().await;

        let response = server
            .post("/files")
            .multipart(upload_form("sample.mp4", vec![1u8; 8]))
            .await;
        let id = location_id(&response);

        server
            .put(&format!("/files/{}", id))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .put(&format!("/files/{}", id))
            .add_query_param("newName", "")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rename_unknown_id_is_404() {
        let (server, _pool) = setup().await;

        server
            .put("/files/unknown")
            .add_query_param("newName", "renamed.mp4")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_sample_upload_lifecycle() {
        let (server, _pool) = setup().await;
        let payload: Vec<u8> = (0..1024).map(|i| (i % 251) as u8).collect();

        // upload
        let response = server
            .post("/files")
            .multipart(upload_form("sample.mp4", payload.clone()))
            .await;
        response.assert_status(StatusCode::CREATED);
        let id = location_id(&response);

        // list
        let response = server.get("/files").await;
        response.assert_status_ok();
        let files: serde_json::Value = response.json();
        let files = files.as_array().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0]["id"], id.as_str());
        assert_eq!(files[0]["name"], "sample.mp4");
        assert_eq!(files[0]["size"], 1024);
        assert!(files[0].get("created_at").is_some());
        assert!(files[0].get("data").is_none());
        assert!(files[0].get("content_type").is_none());

        // download
        let response = server.get(&format!("/files/{}", id)).await;
        response.assert_status_ok();
        assert_eq!(response.header(header::CONTENT_TYPE), "video/mp4");
        assert_eq!(
            response.header(header::CONTENT_DISPOSITION),
            "attachment; filename=\"sample.mp4\""
        );
        assert_eq!(response.as_bytes().as_ref(), payload.as_slice());

        // rename
        let response = server
            .put(&format!("/files/{}", id))
            .add_query_param("newName", "renamed.mp4")
            .await;
        response.assert_status(StatusCode::CREATED);
        assert_eq!(location_id(&response), id);

        let response = server.get(&format!("/files/{}", id)).await;
        response.assert_status_ok();
        assert_eq!(
            response.header(header::CONTENT_DISPOSITION),
            "attachment; filename=\"renamed.mp4\""
        );
        assert_eq!(response.as_bytes().as_ref(), payload.as_slice());

        // delete, twice
        server
            .delete(&format!("/files/{}", id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .delete(&format!("/files/{}", id))
            .await
            .assert_status_not_found();

        server
            .get(&format!("/files/{}", id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_mpg_upload_is_served_as_mpeg() {
        let (server, _pool) = setup().await;

        let response = server
            .post("/files")
            .multipart(upload_form("clip.mpg", vec![9u8; 32]))
            .await;
        let id = location_id(&response);

        let response = server.get(&format!("/files/{}", id)).await;
        response.assert_status_ok();
        assert_eq!(response.header(header::CONTENT_TYPE), "video/mpeg");
    }
}
