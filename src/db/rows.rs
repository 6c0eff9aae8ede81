//! Decoding of dynamically-shaped result rows into JSON objects.
//!
//! Provisioned tables have no compile-time schema, so every column is
//! decoded by its reported database type and re-encoded as a JSON scalar.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};
use sqlx::mysql::MySqlRow;
use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo};

fn float_value(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

fn decimal_value(d: Decimal) -> Value {
    d.to_f64().map(float_value).unwrap_or(Value::Null)
}

fn datetime_value(dt: NaiveDateTime) -> Value {
    Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string())
}

/// Decode one PostgreSQL row into a JSON object keyed by column name.
pub fn pg_row_to_json(row: &PgRow) -> Result<Map<String, Value>, sqlx::Error> {
    let mut object = Map::new();
    for (i, column) in row.columns().iter().enumerate() {
        let value = match column.type_info().name() {
            "BOOL" => row
                .try_get::<Option<bool>, _>(i)?
                .map(Value::Bool)
                .unwrap_or(Value::Null),
            "INT2" => row
                .try_get::<Option<i16>, _>(i)?
                .map(|v| Value::Number(v.into()))
                .unwrap_or(Value::Null),
            "INT4" => row
                .try_get::<Option<i32>, _>(i)?
                .map(|v| Value::Number(v.into()))
                .unwrap_or(Value::Null),
            "INT8" => row
                .try_get::<Option<i64>, _>(i)?
                .map(|v| Value::Number(v.into()))
                .unwrap_or(Value::Null),
            "FLOAT4" => row
                .try_get::<Option<f32>, _>(i)?
                .map(|v| float_value(v as f64))
                .unwrap_or(Value::Null),
            "FLOAT8" => row
                .try_get::<Option<f64>, _>(i)?
                .map(float_value)
                .unwrap_or(Value::Null),
            "NUMERIC" => row
                .try_get::<Option<Decimal>, _>(i)?
                .map(decimal_value)
                .unwrap_or(Value::Null),
            "TIMESTAMP" => row
                .try_get::<Option<NaiveDateTime>, _>(i)?
                .map(datetime_value)
                .unwrap_or(Value::Null),
            "TIMESTAMPTZ" => row
                .try_get::<Option<DateTime<Utc>>, _>(i)?
                .map(|v| Value::String(v.to_rfc3339()))
                .unwrap_or(Value::Null),
            "DATE" => row
                .try_get::<Option<NaiveDate>, _>(i)?
                .map(|v| Value::String(v.format("%Y-%m-%d").to_string()))
                .unwrap_or(Value::Null),
            _ => row
                .try_get::<Option<String>, _>(i)?
                .map(Value::String)
                .unwrap_or(Value::Null),
        };
        object.insert(column.name().to_string(), value);
    }
    Ok(object)
}

/// Decode one MySQL row into a JSON object keyed by column name.
pub fn mysql_row_to_json(row: &MySqlRow) -> Result<Map<String, Value>, sqlx::Error> {
    let mut object = Map::new();
    for (i, column) in row.columns().iter().enumerate() {
        let value = match column.type_info().name() {
            "BOOLEAN" => row
                .try_get::<Option<bool>, _>(i)?
                .map(Value::Bool)
                .unwrap_or(Value::Null),
            "TINYINT" => row
                .try_get::<Option<i8>, _>(i)?
                .map(|v| Value::Number(v.into()))
                .unwrap_or(Value::Null),
            "SMALLINT" => row
                .try_get::<Option<i16>, _>(i)?
                .map(|v| Value::Number(v.into()))
                .unwrap_or(Value::Null),
            "MEDIUMINT" | "INT" => row
                .try_get::<Option<i32>, _>(i)?
                .map(|v| Value::Number(v.into()))
                .unwrap_or(Value::Null),
            "BIGINT" => row
                .try_get::<Option<i64>, _>(i)?
                .map(|v| Value::Number(v.into()))
                .unwrap_or(Value::Null),
            "FLOAT" => row
                .try_get::<Option<f32>, _>(i)?
                .map(|v| float_value(v as f64))
                .unwrap_or(Value::Null),
            "DOUBLE" => row
                .try_get::<Option<f64>, _>(i)?
                .map(float_value)
                .unwrap_or(Value::Null),
            "DECIMAL" => row
                .try_get::<Option<Decimal>, _>(i)?
                .map(decimal_value)
                .unwrap_or(Value::Null),
            "DATETIME" | "TIMESTAMP" => row
                .try_get::<Option<NaiveDateTime>, _>(i)?
                .map(datetime_value)
                .unwrap_or(Value::Null),
            "DATE" => row
                .try_get::<Option<NaiveDate>, _>(i)?
                .map(|v| Value::String(v.format("%Y-%m-%d").to_string()))
                .unwrap_or(Value::Null),
            _ => row
                .try_get::<Option<String>, _>(i)?
                .map(Value::String)
                .unwrap_or(Value::Null),
        };
        object.insert(column.name().to_string(), value);
    }
    Ok(object)
}
