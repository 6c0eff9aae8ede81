//! The injected data-store handle.
//!
//! One pool for whichever dialect the deployment selected, constructed at
//! startup and carried in [`crate::AppState`]. Handlers call the operations
//! here with raw client-supplied names; identifiers are sanitized at this
//! boundary before any SQL is generated.

use serde_json::{Map, Value};
use sqlx::{MySqlPool, PgPool, Row};

use super::dialect::Dialect;
use super::pool::{create_mysql_pool, create_pg_pool};
use super::rows::{mysql_row_to_json, pg_row_to_json};
use crate::config::Config;
use crate::error::Result;
use crate::schema::values::{coerce_cell, SqlValue};
use crate::schema::{infer_schema, sanitize_identifier, TableSchema};

/// Outcome of a save: the sanitized table name and how many rows were
/// actually inserted (duplicates suppressed by the UNIQUE constraint
/// contribute zero).
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub table: String,
    pub inserted: u64,
}

/// Handle to the configured relational store.
#[derive(Clone)]
pub enum Store {
    Postgres(PgPool),
    MySql(MySqlPool),
}

impl Store {
    /// Connect a pool for the dialect named in the configuration.
    pub async fn connect(config: &Config) -> std::result::Result<Self, sqlx::Error> {
        match config.dialect {
            Dialect::Postgres => Ok(Store::Postgres(
                create_pg_pool(&config.database_url()).await?,
            )),
            Dialect::MySql => Ok(Store::MySql(
                create_mysql_pool(&config.database_url()).await?,
            )),
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Store::Postgres(_) => Dialect::Postgres,
            Store::MySql(_) => Dialect::MySql,
        }
    }

    /// Provision the table if absent and insert the batch.
    ///
    /// The schema is inferred from this batch alone and the table created
    /// with `IF NOT EXISTS` semantics; a pre-existing table keeps whatever
    /// shape it already has. Rows go in one at a time inside a single
    /// transaction with one commit at the end, so a failing cell aborts the
    /// whole batch.
    pub async fn save_rows(
        &self,
        table_name: &str,
        rows: &[Map<String, Value>],
    ) -> Result<SaveOutcome> {
        let schema = infer_schema(table_name, rows)?;
        let dialect = self.dialect();
        let create_sql = dialect.build_create_table(&schema);
        let insert_sql = dialect.build_insert_ignore(&schema);
        tracing::debug!("Provisioning: {}", create_sql);

        let inserted = match self {
            Store::Postgres(pool) => {
                sqlx::query(&create_sql).execute(pool).await?;
                let mut tx = pool.begin().await?;
                let mut inserted = 0u64;
                for row in rows {
                    let mut query = sqlx::query(&insert_sql);
                    for cell in coerce_row(&schema, row)? {
                        query = match cell {
                            SqlValue::Bool(v) => query.bind(v),
                            SqlValue::Number(v) => query.bind(v),
                            SqlValue::Timestamp(v) => query.bind(v),
                            SqlValue::Text(v) => query.bind(v),
                        };
                    }
                    inserted += query.execute(&mut *tx).await?.rows_affected();
                }
                tx.commit().await?;
                inserted
            }
            Store::MySql(pool) => {
                sqlx::query(&create_sql).execute(pool).await?;
                let mut tx = pool.begin().await?;
                let mut inserted = 0u64;
                for row in rows {
                    let mut query = sqlx::query(&insert_sql);
                    for cell in coerce_row(&schema, row)? {
                        query = match cell {
                            SqlValue::Bool(v) => query.bind(v),
                            SqlValue::Number(v) => query.bind(v),
                            SqlValue::Timestamp(v) => query.bind(v),
                            SqlValue::Text(v) => query.bind(v),
                        };
                    }
                    inserted += query.execute(&mut *tx).await?.rows_affected();
                }
                tx.commit().await?;
                inserted
            }
        };

        Ok(SaveOutcome {
            table: schema.table,
            inserted,
        })
    }

    /// `SELECT *` over a previously provisioned table.
    pub async fn load_rows(&self, table_name: &str) -> Result<Vec<Map<String, Value>>> {
        let table = sanitize_identifier(table_name);
        let sql = format!("SELECT * FROM {table}");
        self.fetch_json(&sql).await
    }

    /// Per-month arithmetic mean of `value_column`, keyed by the calendar
    /// month of `date_column`. Rows where either column is NULL are excluded
    /// on both sides of the average.
    pub async fn monthly_averages(
        &self,
        table_name: &str,
        date_column: &str,
        value_column: &str,
    ) -> Result<Vec<Map<String, Value>>> {
        let sql = self.dialect().build_monthly_average(
            &sanitize_identifier(table_name),
            &sanitize_identifier(date_column),
            &sanitize_identifier(value_column),
        );
        self.fetch_json(&sql).await
    }

    /// Names of the user tables in the active schema/database.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let sql = self.dialect().list_tables_sql();
        let names = match self {
            Store::Postgres(pool) => sqlx::query(sql)
                .fetch_all(pool)
                .await?
                .iter()
                .map(|row| row.try_get("table_name"))
                .collect::<std::result::Result<Vec<String>, sqlx::Error>>()?,
            Store::MySql(pool) => sqlx::query(sql)
                .fetch_all(pool)
                .await?
                .iter()
                .map(|row| row.try_get("table_name"))
                .collect::<std::result::Result<Vec<String>, sqlx::Error>>()?,
        };
        Ok(names)
    }

    /// Drop the table if it exists. Returns the sanitized name that was
    /// dropped.
    pub async fn drop_table(&self, table_name: &str) -> Result<String> {
        let table = sanitize_identifier(table_name);
        let sql = self.dialect().build_drop_table(&table);
        match self {
            Store::Postgres(pool) => {
                sqlx::query(&sql).execute(pool).await?;
            }
            Store::MySql(pool) => {
                sqlx::query(&sql).execute(pool).await?;
            }
        }
        tracing::info!("Dropped table {}", table);
        Ok(table)
    }

    /// Trivial connectivity probe for the health endpoint.
    pub async fn ping(&self) -> Result<()> {
        match self {
            Store::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
            Store::MySql(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
        }
        Ok(())
    }

    async fn fetch_json(&self, sql: &str) -> Result<Vec<Map<String, Value>>> {
        match self {
            Store::Postgres(pool) => {
                let rows = sqlx::query(sql).fetch_all(pool).await?;
                rows.iter()
                    .map(|row| pg_row_to_json(row).map_err(Into::into))
                    .collect()
            }
            Store::MySql(pool) => {
                let rows = sqlx::query(sql).fetch_all(pool).await?;
                rows.iter()
                    .map(|row| mysql_row_to_json(row).map_err(Into::into))
                    .collect()
            }
        }
    }
}

/// Coerce one row object into bind-ready cells, in column order.
fn coerce_row(schema: &TableSchema, row: &Map<String, Value>) -> Result<Vec<SqlValue>> {
    schema
        .columns
        .iter()
        .map(|column| coerce_cell(&column.name, column.kind, row.get(&column.source)))
        .collect()
}
