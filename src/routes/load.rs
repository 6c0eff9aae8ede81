use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::ERR_TABLE_NAME_REQUIRED;
use crate::error::{AppError, Result};
use crate::schema::sanitize_identifier;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoadDataParams {
    #[serde(rename = "tableName")]
    pub table_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoadDataResponse {
    pub message: String,
    #[serde(rename = "tableName")]
    pub table_name: String,
    pub data: Vec<Map<String, Value>>,
}

/// Return every row of a previously provisioned table.
pub async fn load_data(
    State(state): State<AppState>,
    Query(params): Query<LoadDataParams>,
) -> Result<Json<LoadDataResponse>> {
    let table_name = params.table_name.unwrap_or_default();
    if table_name.is_empty() {
        return Err(AppError::InvalidInput(ERR_TABLE_NAME_REQUIRED.to_string()));
    }

    let data = state.store.load_rows(&table_name).await?;

    Ok(Json(LoadDataResponse {
        message: "Data loaded successfully".to_string(),
        table_name: sanitize_identifier(&table_name),
        data,
    }))
}
