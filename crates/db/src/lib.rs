//! Database access layer: pool management, entity models, and repositories.

pub mod models;
pub mod repositories;

/// Shared connection pool handle used throughout the platform.
pub type DbPool = sqlx::PgPool;

/// Connect to PostgreSQL using the given connection string.
pub async fn connect(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Cheap liveness probe for the database connection.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
