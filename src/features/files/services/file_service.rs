use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::{FileSummaryDto, VideoFormat};
use crate::features::files::models::{UploadedFile, UploadedFileSummary};

const STORE_NOT_INITIALIZED: &str = "Database is not initialized.";

/// Service for stored video files
pub struct FileService {
    pool: Option<SqlitePool>,
}

impl FileService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool: Some(pool) }
    }

    /// A service with no backing store. Every operation takes its
    /// "store unavailable" path.
    #[cfg(test)]
    pub fn unavailable() -> Self {
        Self { pool: None }
    }

    /// Pool for read/update/delete paths, which report a missing store as NotFound
    fn pool_or_not_found(&self) -> Result<&SqlitePool> {
        self.pool.as_ref().ok_or_else(|| {
            warn!("{}", STORE_NOT_INITIALIZED);
            AppError::NotFound(STORE_NOT_INITIALIZED.to_string())
        })
    }

    /// Get a file with its payload
    pub async fn get_file(&self, id: &str) -> Result<UploadedFile> {
        let pool = self.pool_or_not_found()?;

        info!("Getting file with id: {}", id);

        let file = sqlx::query_as::<_, UploadedFile>(
            r#"
            SELECT id, name, size, created_at, content_type, data
            FROM uploaded_files
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        match file {
            Some(file) if file.data.is_some() => Ok(file),
            Some(_) => {
                debug!("File {} has no stored payload", id);
                Err(AppError::NotFound("File not found".to_string()))
            }
            None => Err(AppError::NotFound("File not found".to_string())),
        }
    }

    /// List all files without their payloads
    pub async fn list_files(&self) -> Result<Vec<FileSummaryDto>> {
        let pool = self.pool_or_not_found()?;

        let files = sqlx::query_as::<_, UploadedFileSummary>(
            r#"
            SELECT id, name, size, created_at
            FROM uploaded_files
            "#,
        )
        .fetch_all(pool)
        .await?;

        debug!("Listed {} files", files.len());

        Ok(files.into_iter().map(FileSummaryDto::from).collect())
    }

    /// Validate and store an uploaded file
    ///
    /// # Arguments
    /// * `file_name` - The filename sent with the upload
    /// * `data` - The file content, `None` when the upload carried no file
    ///
    /// # Returns
    /// The stored record
    pub async fn create_file(
        &self,
        file_name: &str,
        data: Option<Vec<u8>>,
    ) -> Result<UploadedFile> {
        let Some(pool) = self.pool.as_ref() else {
            warn!("{}", STORE_NOT_INITIALIZED);
            return Err(AppError::ServiceUnavailable(
                STORE_NOT_INITIALIZED.to_string(),
            ));
        };

        let data = match data {
            Some(data) if !data.is_empty() => data,
            _ => return Err(AppError::BadRequest("No file was uploaded.".to_string())),
        };

        let format = VideoFormat::from_file_name(file_name).ok_or_else(|| {
            AppError::UnsupportedMediaType(format!(
                "File '{}' is not supported. Allowed extensions: mp4, mpeg, mpg",
                file_name
            ))
        })?;

        let file = UploadedFile {
            id: Uuid::new_v4().to_string(),
            name: file_name.to_string(),
            size: data.len() as i64,
            created_at: Utc::now(),
            content_type: format.content_type(),
            data: Some(data),
        };

        info!("Saving file to database.");

        let inserted = sqlx::query(
            r#"
            INSERT INTO uploaded_files (id, name, size, created_at, content_type, data)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&file.id)
        .bind(&file.name)
        .bind(file.size)
        .bind(file.created_at)
        .bind(&file.content_type)
        .bind(&file.data)
        .execute(pool)
        .await;

        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) => {
                if self.exists_by_name(pool, &file.name).await? {
                    info!("File name already taken: {}", file.name);
                    return Err(AppError::Conflict(format!(
                        "A file named '{}' already exists",
                        file.name
                    )));
                }
                return Err(sqlx::Error::Database(db_err).into());
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            "File saved: id={}, name={}, content_type={}, size={}",
            file.id, file.name, file.content_type, file.size
        );

        Ok(file)
    }

    /// Rename a file, returning its id
    pub async fn rename_file(&self, id: &str, new_name: &str) -> Result<String> {
        let pool = self.pool_or_not_found()?;

        if !self.exists_by_id(pool, id).await? {
            return Err(AppError::NotFound("File not found".to_string()));
        }

        let updated = sqlx::query(
            r#"
            UPDATE uploaded_files
            SET name = ?
            WHERE id = ?
            "#,
        )
        .bind(new_name)
        .bind(id)
        .execute(pool)
        .await;

        match updated {
            Ok(result) if result.rows_affected() > 0 => {}
            Ok(_) => {
                // Row went away between the existence check and the update
                if !self.exists_by_id(pool, id).await? {
                    return Err(AppError::NotFound("File not found".to_string()));
                }
                return Err(AppError::Internal(format!(
                    "Rename of file {} affected no rows",
                    id
                )));
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(AppError::Conflict(format!(
                    "A file named '{}' already exists",
                    new_name
                )));
            }
            Err(e) => return Err(e.into()),
        }

        info!("File renamed: id={}, name={}", id, new_name);

        Ok(id.to_string())
    }

    /// Permanently delete a file
    pub async fn delete_file(&self, id: &str) -> Result<()> {
        let pool = self.pool_or_not_found()?;

        let result = sqlx::query("DELETE FROM uploaded_files WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("File not found".to_string()));
        }

        info!("File deleted: id={}", id);

        Ok(())
    }

    async fn exists_by_name(&self, pool: &SqlitePool, name: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM uploaded_files WHERE name = ?)",
        )
        .bind(name)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    async fn exists_by_id(&self, pool: &SqlitePool, id: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM uploaded_files WHERE id = ?)",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }
}
