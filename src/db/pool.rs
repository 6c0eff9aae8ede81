use sqlx::{mysql::MySqlPoolOptions, postgres::PgPoolOptions, MySqlPool, PgPool};
use std::time::Duration;

/// Create a PostgreSQL connection pool
pub async fn create_pg_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    tracing::info!("Creating PostgreSQL connection pool...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await?;

    tracing::info!("Database connection pool created successfully");

    Ok(pool)
}

/// Create a MySQL connection pool
pub async fn create_mysql_pool(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    tracing::info!("Creating MySQL connection pool...");

    let pool = MySqlPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await?;

    tracing::info!("Database connection pool created successfully");

    Ok(pool)
}
