//! Bind-time coercion of row cells to their column's inferred type.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde_json::Value;

use super::infer::parse_iso_datetime;
use super::ColumnKind;
use crate::error::{AppError, Result};

/// A cell coerced to its column's SQL type, ready to bind as a query
/// parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Bool(Option<bool>),
    Number(Option<Decimal>),
    Timestamp(Option<NaiveDateTime>),
    Text(Option<String>),
}

/// Coerce one cell to the column's inferred kind.
///
/// Missing cells and JSON nulls bind as NULL. An empty string in a NUMERIC
/// or TIMESTAMP column also binds as NULL — empty numeric input is absent,
/// not zero. A non-empty value that cannot be represented in the column's
/// kind fails the whole save, which is also how a batch shaped differently
/// from an already-provisioned table surfaces.
pub fn coerce_cell(column: &str, kind: ColumnKind, cell: Option<&Value>) -> Result<SqlValue> {
    match kind {
        ColumnKind::Boolean => match cell {
            None | Some(Value::Null) => Ok(SqlValue::Bool(None)),
            Some(Value::Bool(b)) => Ok(SqlValue::Bool(Some(*b))),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(SqlValue::Bool(None)),
            Some(other) => Err(bad_cell(column, kind, other)),
        },
        ColumnKind::Numeric => match cell {
            None | Some(Value::Null) => Ok(SqlValue::Number(None)),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(SqlValue::Number(None)),
            Some(value @ Value::String(s)) => parse_decimal(s.trim())
                .map(|d| SqlValue::Number(Some(d)))
                .ok_or_else(|| bad_cell(column, kind, value)),
            Some(value @ Value::Number(n)) => parse_decimal(&n.to_string())
                .map(|d| SqlValue::Number(Some(d)))
                .ok_or_else(|| bad_cell(column, kind, value)),
            Some(other) => Err(bad_cell(column, kind, other)),
        },
        ColumnKind::Timestamp => match cell {
            None | Some(Value::Null) => Ok(SqlValue::Timestamp(None)),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(SqlValue::Timestamp(None)),
            Some(value @ Value::String(s)) => parse_iso_datetime(s.trim())
                .map(|dt| SqlValue::Timestamp(Some(dt)))
                .ok_or_else(|| bad_cell(column, kind, value)),
            Some(other) => Err(bad_cell(column, kind, other)),
        },
        ColumnKind::Text => match cell {
            None | Some(Value::Null) => Ok(SqlValue::Text(None)),
            Some(Value::String(s)) => Ok(SqlValue::Text(Some(s.clone()))),
            Some(other) => Ok(SqlValue::Text(Some(other.to_string()))),
        },
    }
}

/// Decimal parse that also accepts scientific notation, which JSON floats
/// sometimes serialize to.
fn parse_decimal(s: &str) -> Option<Decimal> {
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

fn bad_cell(column: &str, kind: ColumnKind, value: &Value) -> AppError {
    AppError::BadCell {
        column: column.to_string(),
        kind: kind.as_str(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_numeric_cell_binds_null() {
        let cell = json!("");
        assert_eq!(
            coerce_cell("price", ColumnKind::Numeric, Some(&cell)).unwrap(),
            SqlValue::Number(None)
        );
        assert_eq!(
            coerce_cell("price", ColumnKind::Numeric, None).unwrap(),
            SqlValue::Number(None)
        );
        assert_eq!(
            coerce_cell("price", ColumnKind::Numeric, Some(&Value::Null)).unwrap(),
            SqlValue::Number(None)
        );
    }

    #[test]
    fn test_numeric_strings_parse() {
        let cell = json!("10");
        assert_eq!(
            coerce_cell("price", ColumnKind::Numeric, Some(&cell)).unwrap(),
            SqlValue::Number(Some(Decimal::new(10, 0)))
        );
        let cell = json!(" 20.5 ");
        assert_eq!(
            coerce_cell("price", ColumnKind::Numeric, Some(&cell)).unwrap(),
            SqlValue::Number(Some(Decimal::new(205, 1)))
        );
    }

    #[test]
    fn test_json_numbers_parse() {
        let cell = json!(42);
        assert_eq!(
            coerce_cell("n", ColumnKind::Numeric, Some(&cell)).unwrap(),
            SqlValue::Number(Some(Decimal::new(42, 0)))
        );
        let cell = json!(1.25);
        assert_eq!(
            coerce_cell("n", ColumnKind::Numeric, Some(&cell)).unwrap(),
            SqlValue::Number(Some(Decimal::new(125, 2)))
        );
    }

    #[test]
    fn test_unparseable_numeric_fails() {
        let cell = json!("n/a");
        assert!(coerce_cell("price", ColumnKind::Numeric, Some(&cell)).is_err());
    }

    #[test]
    fn test_timestamp_coercion() {
        let cell = json!("2024-01-15");
        match coerce_cell("date", ColumnKind::Timestamp, Some(&cell)).unwrap() {
            SqlValue::Timestamp(Some(dt)) => {
                assert_eq!(dt.to_string(), "2024-01-15 00:00:00");
            }
            other => panic!("unexpected {other:?}"),
        }

        let empty = json!("");
        assert_eq!(
            coerce_cell("date", ColumnKind::Timestamp, Some(&empty)).unwrap(),
            SqlValue::Timestamp(None)
        );

        let bad = json!("yesterday");
        assert!(coerce_cell("date", ColumnKind::Timestamp, Some(&bad)).is_err());
    }

    #[test]
    fn test_text_stringifies_non_strings() {
        let cell = json!("plain");
        assert_eq!(
            coerce_cell("c", ColumnKind::Text, Some(&cell)).unwrap(),
            SqlValue::Text(Some("plain".to_string()))
        );
        let cell = json!(7);
        assert_eq!(
            coerce_cell("c", ColumnKind::Text, Some(&cell)).unwrap(),
            SqlValue::Text(Some("7".to_string()))
        );
        let cell = json!(["a", "b"]);
        assert_eq!(
            coerce_cell("c", ColumnKind::Text, Some(&cell)).unwrap(),
            SqlValue::Text(Some("[\"a\",\"b\"]".to_string()))
        );
        // Empty text stays an empty string, unlike empty numeric input.
        let cell = json!("");
        assert_eq!(
            coerce_cell("c", ColumnKind::Text, Some(&cell)).unwrap(),
            SqlValue::Text(Some(String::new()))
        );
    }

    #[test]
    fn test_boolean_coercion() {
        let cell = json!(true);
        assert_eq!(
            coerce_cell("b", ColumnKind::Boolean, Some(&cell)).unwrap(),
            SqlValue::Bool(Some(true))
        );
        assert_eq!(
            coerce_cell("b", ColumnKind::Boolean, None).unwrap(),
            SqlValue::Bool(None)
        );
        let cell = json!("yes");
        assert!(coerce_cell("b", ColumnKind::Boolean, Some(&cell)).is_err());
    }
}
