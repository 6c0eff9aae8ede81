use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::ERR_AVERAGES_PARAMS_REQUIRED;
use crate::error::{AppError, Result};
use crate::schema::sanitize_identifier;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MonthlyAveragesParams {
    #[serde(rename = "tableName")]
    pub table_name: Option<String>,
    #[serde(rename = "dateColumn")]
    pub date_column: Option<String>,
    #[serde(rename = "valueColumn")]
    pub value_column: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MonthlyAveragesResponse {
    pub message: String,
    #[serde(rename = "tableName")]
    pub table_name: String,
    pub data: Vec<Map<String, Value>>,
}

/// Average a value column per calendar month of a date column.
///
/// Read-only. Rows with a NULL date or NULL value are excluded entirely, so
/// they affect neither the numerator nor the denominator of the mean. Fails
/// with the raw store error when either column is missing or not aggregable.
pub async fn monthly_averages(
    State(state): State<AppState>,
    Query(params): Query<MonthlyAveragesParams>,
) -> Result<Json<MonthlyAveragesResponse>> {
    let table_name = params.table_name.unwrap_or_default();
    let date_column = params.date_column.unwrap_or_default();
    let value_column = params.value_column.unwrap_or_default();
    if table_name.is_empty() || date_column.is_empty() || value_column.is_empty() {
        return Err(AppError::InvalidInput(
            ERR_AVERAGES_PARAMS_REQUIRED.to_string(),
        ));
    }

    let data = state
        .store
        .monthly_averages(&table_name, &date_column, &value_column)
        .await?;

    Ok(Json(MonthlyAveragesResponse {
        message: "Monthly averages loaded successfully".to_string(),
        table_name: sanitize_identifier(&table_name),
        data,
    }))
}
