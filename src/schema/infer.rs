//! Batch-level column type inference.
//!
//! A column's SQL type is decided once, from the whole batch: every
//! non-empty cell is classified, and the column takes the shared kind only
//! when all cells agree. Any disagreement collapses the column to TEXT, as
//! does a column with no non-empty cells. Individual numeric-looking cells
//! inside a mixed column never override that default.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::{sanitize_identifier, Column, ColumnKind, TableSchema};
use crate::constants::ERR_TABLE_NAME_REQUIRED;
use crate::error::{AppError, Result};

/// Union of row keys in first-seen order. `serde_json` preserves object
/// insertion order here, so uploaded column order carries through to the
/// generated DDL.
pub fn collect_headers(rows: &[Map<String, Value>]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }
    headers
}

/// Derive a [`TableSchema`] from one batch of rows.
///
/// Headers that sanitize to the same identifier are merged; the
/// last-applied header wins, mirroring how the generated column list always
/// behaved. Fails if the table name or any header sanitizes to nothing.
pub fn infer_schema(table_name: &str, rows: &[Map<String, Value>]) -> Result<TableSchema> {
    let table = sanitize_identifier(table_name);
    if table.is_empty() {
        return Err(AppError::InvalidInput(ERR_TABLE_NAME_REQUIRED.to_string()));
    }

    let headers = collect_headers(rows);
    let mut columns: Vec<Column> = Vec::new();
    for header in &headers {
        let name = sanitize_identifier(header);
        if name.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Column name {header:?} is empty after sanitization"
            )));
        }
        let kind = infer_column_kind(rows.iter().filter_map(|row| row.get(header)));
        match columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => {
                existing.source = header.clone();
                existing.kind = kind;
            }
            None => columns.push(Column {
                name,
                source: header.clone(),
                kind,
            }),
        }
    }

    if columns.is_empty() {
        return Err(AppError::InvalidInput(
            "No columns found in data".to_string(),
        ));
    }

    Ok(TableSchema { table, columns })
}

/// Join the kinds observed across a column's cells. Empty cells carry no
/// signal; an empty column defaults to TEXT.
fn infer_column_kind<'a>(values: impl Iterator<Item = &'a Value>) -> ColumnKind {
    let mut kind: Option<ColumnKind> = None;
    for value in values {
        if let Some(observed) = classify_cell(value) {
            kind = Some(match kind {
                None => observed,
                Some(prev) if prev == observed => prev,
                Some(_) => ColumnKind::Text,
            });
        }
    }
    kind.unwrap_or(ColumnKind::Text)
}

/// Kind observed for a single cell, or `None` for null/empty cells.
fn classify_cell(value: &Value) -> Option<ColumnKind> {
    match value {
        Value::Null => None,
        Value::Bool(_) => Some(ColumnKind::Boolean),
        Value::Number(_) => Some(ColumnKind::Numeric),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else if parse_iso_datetime(s).is_some() {
                Some(ColumnKind::Timestamp)
            } else if s.parse::<Decimal>().is_ok() {
                Some(ColumnKind::Numeric)
            } else {
                Some(ColumnKind::Text)
            }
        }
        // Nested structures are stored as their JSON text.
        Value::Array(_) | Value::Object(_) => Some(ColumnKind::Text),
    }
}

/// Parse the ISO-8601 shapes uploads actually contain: date-only,
/// date-and-time, and RFC 3339 with an offset (normalized to UTC).
pub(crate) fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = s.parse::<NaiveDateTime>() {
        return Some(dt);
    }
    if let Ok(date) = s.parse::<NaiveDate>() {
        return Some(date.and_time(NaiveTime::MIN));
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows_from(values: Value) -> Vec<Map<String, Value>> {
        values
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_numeric_strings_infer_numeric() {
        let rows = rows_from(json!([{"Price": "10"}, {"Price": "20.5"}]));
        let schema = infer_schema("Prices 2024", &rows).unwrap();
        assert_eq!(schema.table, "prices_2024");
        assert_eq!(schema.columns[0].name, "price");
        assert_eq!(schema.columns[0].kind, ColumnKind::Numeric);
    }

    #[test]
    fn test_date_strings_infer_timestamp() {
        let rows = rows_from(json!([
            {"Date": "2024-01-15"},
            {"Date": "2024-02-20T10:30:00"},
        ]));
        let schema = infer_schema("t", &rows).unwrap();
        assert_eq!(schema.columns[0].kind, ColumnKind::Timestamp);
    }

    #[test]
    fn test_booleans_infer_boolean() {
        let rows = rows_from(json!([{"active": true}, {"active": false}]));
        let schema = infer_schema("t", &rows).unwrap();
        assert_eq!(schema.columns[0].kind, ColumnKind::Boolean);
    }

    #[test]
    fn test_mixed_column_collapses_to_text() {
        let rows = rows_from(json!([{"v": "10"}, {"v": "n/a"}]));
        let schema = infer_schema("t", &rows).unwrap();
        assert_eq!(schema.columns[0].kind, ColumnKind::Text);

        // A single off-kind cell reverts the whole column, regardless of how
        // many numeric cells surround it.
        let rows = rows_from(json!([{"v": 1}, {"v": 2}, {"v": "x"}, {"v": 3}]));
        let schema = infer_schema("t", &rows).unwrap();
        assert_eq!(schema.columns[0].kind, ColumnKind::Text);
    }

    #[test]
    fn test_empty_cells_carry_no_signal() {
        let rows = rows_from(json!([{"v": ""}, {"v": "10"}, {"v": null}]));
        let schema = infer_schema("t", &rows).unwrap();
        assert_eq!(schema.columns[0].kind, ColumnKind::Numeric);
    }

    #[test]
    fn test_all_empty_column_defaults_to_text() {
        let rows = rows_from(json!([{"v": ""}, {"v": null}]));
        let schema = infer_schema("t", &rows).unwrap();
        assert_eq!(schema.columns[0].kind, ColumnKind::Text);
    }

    #[test]
    fn test_header_order_preserved() {
        let rows = rows_from(json!([
            {"Zeta": 1, "Alpha": 2},
            {"Zeta": 3, "Alpha": 4, "Mid": 5},
        ]));
        let schema = infer_schema("t", &rows).unwrap();
        assert_eq!(schema.column_names(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_colliding_headers_last_applied_wins() {
        let rows = rows_from(json!([{"my col": "text value", "my-col": 7}]));
        let schema = infer_schema("t", &rows).unwrap();
        assert_eq!(schema.columns.len(), 1);
        assert_eq!(schema.columns[0].name, "my_col");
        assert_eq!(schema.columns[0].source, "my-col");
        assert_eq!(schema.columns[0].kind, ColumnKind::Numeric);
    }

    #[test]
    fn test_empty_table_name_rejected() {
        let rows = rows_from(json!([{"a": 1}]));
        assert!(infer_schema("", &rows).is_err());
    }

    #[test]
    fn test_no_columns_rejected() {
        let rows = rows_from(json!([{}]));
        assert!(infer_schema("t", &rows).is_err());
    }

    #[test]
    fn test_parse_iso_datetime_shapes() {
        assert!(parse_iso_datetime("2024-01-15").is_some());
        assert!(parse_iso_datetime("2024-01-15T10:30:00").is_some());
        assert!(parse_iso_datetime("2024-01-15T10:30:00+02:00").is_some());
        assert!(parse_iso_datetime("15/01/2024").is_none());
        assert!(parse_iso_datetime("not a date").is_none());
        assert!(parse_iso_datetime("10").is_none());
    }
}
