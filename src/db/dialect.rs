//! Per-product SQL generation.
//!
//! Everything that differs between the supported database products lives
//! behind this one type: identity-column syntax, concrete column types,
//! duplicate-suppressing inserts, month truncation, and catalog queries.
//! The rest of the crate never branches on the product.

use crate::schema::{ColumnKind, TableSchema};

/// The relational product behind the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    MySql,
}

impl Dialect {
    /// Dialect name as reported by `/api/health`.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgresql",
            Dialect::MySql => "mysql",
        }
    }

    /// Clause for the auto-increment `id` primary key.
    pub fn identity_column(&self) -> &'static str {
        match self {
            Dialect::Postgres => "SERIAL PRIMARY KEY",
            Dialect::MySql => "INT AUTO_INCREMENT PRIMARY KEY",
        }
    }

    /// Concrete SQL type for an inferred column kind.
    ///
    /// MySQL's text kind is VARCHAR(255) rather than TEXT: the provisioned
    /// tables put a UNIQUE constraint across all data columns, and MySQL
    /// refuses TEXT in an index without an explicit key length.
    pub fn column_type(&self, kind: ColumnKind) -> &'static str {
        match (self, kind) {
            (_, ColumnKind::Boolean) => "BOOLEAN",
            (Dialect::Postgres, ColumnKind::Numeric) => "NUMERIC",
            (Dialect::MySql, ColumnKind::Numeric) => "DECIMAL(10,2)",
            (Dialect::Postgres, ColumnKind::Timestamp) => "TIMESTAMP",
            (Dialect::MySql, ColumnKind::Timestamp) => "DATETIME",
            (Dialect::Postgres, ColumnKind::Text) => "TEXT",
            (Dialect::MySql, ColumnKind::Text) => "VARCHAR(255)",
        }
    }

    /// Positional bind parameter for the 1-based `index`.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::MySql => "?".to_string(),
        }
    }

    /// `CREATE TABLE IF NOT EXISTS` with the identity column and a UNIQUE
    /// constraint spanning every data column. Running it against an existing
    /// table is a no-op; the requested shape is never diffed against what is
    /// already there.
    pub fn build_create_table(&self, schema: &TableSchema) -> String {
        let columns: Vec<String> = schema
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, self.column_type(c.kind)))
            .collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} (id {}, {}, UNIQUE ({}))",
            schema.table,
            self.identity_column(),
            columns.join(", "),
            schema.column_names().join(", "),
        )
    }

    /// Parameterized insert that silently skips rows the full-row UNIQUE
    /// constraint already holds.
    pub fn build_insert_ignore(&self, schema: &TableSchema) -> String {
        let names = schema.column_names().join(", ");
        let placeholders: Vec<String> = (1..=schema.columns.len())
            .map(|i| self.placeholder(i))
            .collect();
        let placeholders = placeholders.join(", ");
        match self {
            Dialect::Postgres => format!(
                "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT DO NOTHING",
                schema.table, names, placeholders
            ),
            Dialect::MySql => format!(
                "INSERT IGNORE INTO {} ({}) VALUES ({})",
                schema.table, names, placeholders
            ),
        }
    }

    /// Group rows by calendar month of `date_column` and average
    /// `value_column`, skipping rows where either is NULL. Ordered by month
    /// ascending.
    pub fn build_monthly_average(
        &self,
        table: &str,
        date_column: &str,
        value_column: &str,
    ) -> String {
        let month_expr = match self {
            Dialect::Postgres => format!("DATE_TRUNC('month', {date_column})"),
            Dialect::MySql => format!("DATE_FORMAT({date_column}, '%Y-%m-01')"),
        };
        format!(
            "SELECT {month_expr} AS month, AVG({value_column}) AS avg_value \
             FROM {table} \
             WHERE {value_column} IS NOT NULL AND {date_column} IS NOT NULL \
             GROUP BY month ORDER BY month"
        )
    }

    /// Enumerate user tables in the active schema/database, sorted by name.
    pub fn list_tables_sql(&self) -> &'static str {
        match self {
            Dialect::Postgres => {
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
                 ORDER BY table_name"
            }
            Dialect::MySql => {
                "SELECT TABLE_NAME AS table_name FROM information_schema.tables \
                 WHERE TABLE_SCHEMA = DATABASE() ORDER BY TABLE_NAME"
            }
        }
    }

    /// `DROP TABLE IF EXISTS`; dropping an absent table is a no-op.
    pub fn build_drop_table(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {table}")
    }
}
