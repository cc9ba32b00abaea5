use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::files::models::UploadedFileSummary;

/// Base path of the files resource
pub const FILES_PATH: &str = "/files";

/// Multipart field carrying the uploaded video
pub const UPLOAD_FIELD: &str = "data";

/// Video container formats accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFormat {
    Mp4,
    Mpeg,
}

impl VideoFormat {
    /// Resolve the format from the filename suffix (text after the last '.').
    ///
    /// Matching is case-sensitive and `mpg` is treated as `mpeg`.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, extension) = file_name.rsplit_once('.')?;
        match extension {
            "mp4" => Some(Self::Mp4),
            "mpeg" | "mpg" => Some(Self::Mpeg),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mpeg => "mpeg",
        }
    }

    pub fn content_type(&self) -> String {
        format!("video/{}", self.extension())
    }
}

/// Upload request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The video to upload (.mp4, .mpeg or .mpg)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub data: String,
}

/// List entry for a stored file. Never carries the payload or content type.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileSummaryDto {
    /// Unique identifier for the file
    pub id: String,
    /// Filename as uploaded or last renamed
    pub name: String,
    /// Size of the stored payload in bytes
    pub size: i64,
    /// Timestamp when the file was uploaded
    pub created_at: DateTime<Utc>,
}

impl From<UploadedFileSummary> for FileSummaryDto {
    fn from(file: UploadedFileSummary) -> Self {
        Self {
            id: file.id,
            name: file.name,
            size: file.size,
            created_at: file.created_at,
        }
    }
}

/// Query params for renaming a file
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RenameFileQuery {
    /// New filename
    #[serde(rename = "newName")]
    #[validate(length(min = 1, message = "newName must not be empty"))]
    pub new_name: String,
}

/// Location of a single file resource, relative to the API base
pub fn file_location(base: &str, id: &str) -> String {
    format!("{}{}/{}", base, FILES_PATH, id)
}

/// Build a `Content-Disposition` value that is always a valid header
pub fn content_disposition(file_name: &str) -> String {
    let escaped: String = file_name
        .chars()
        .filter(|c| !c.is_control())
        .flat_map(|c| match c {
            '"' | '\\' => vec!['\\', c],
            _ => vec![c],
        })
        .collect();

    format!("attachment; filename=\"{}\"", escaped)
}
