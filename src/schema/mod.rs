pub mod infer;
pub mod sanitize;
pub mod values;

pub use infer::{collect_headers, infer_schema};
pub use sanitize::sanitize_identifier;

/// SQL type family chosen for a column, decided once from the first batch of
/// rows and never revised afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Boolean,
    Numeric,
    Timestamp,
    Text,
}

impl ColumnKind {
    /// Lower-case kind name for log and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Boolean => "boolean",
            ColumnKind::Numeric => "numeric",
            ColumnKind::Timestamp => "timestamp",
            ColumnKind::Text => "text",
        }
    }
}

/// A column about to be provisioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Sanitized identifier used in generated SQL.
    pub name: String,
    /// Header as it appeared in the upload, used to look cells up in each
    /// row object.
    pub source: String,
    pub kind: ColumnKind,
}

/// Typed descriptor for a table derived from one batch of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Sanitized table identifier.
    pub table: String,
    pub columns: Vec<Column>,
}

impl TableSchema {
    /// Sanitized column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}
