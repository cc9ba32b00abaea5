#[cfg(test)]
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

#[cfg(test)]
use std::str::FromStr;

/// In-memory SQLite pool with the schema applied.
///
/// Every connection to `:memory:` is its own database, so the pool is pinned
/// to one connection that is never recycled.
#[cfg(test)]
pub async fn create_test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();

    crate::core::database::run_migrations(&pool).await.unwrap();
    pool
}

/// Row count of the files table, for asserting nothing was persisted
#[cfg(test)]
pub async fn count_files(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM uploaded_files")
        .fetch_one(pool)
        .await
        .unwrap()
}
