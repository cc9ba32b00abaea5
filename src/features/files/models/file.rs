use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for uploaded files
#[derive(Debug, Clone, FromRow)]
pub struct UploadedFile {
    pub id: String,
    pub name: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub content_type: String,
    /// Absent when the row was stored without a payload
    pub data: Option<Vec<u8>>,
}

/// Row projection used by the list query (no payload, no content type)
#[derive(Debug, FromRow)]
pub struct UploadedFileSummary {
    pub id: String,
    pub name: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
}
