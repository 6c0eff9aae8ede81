use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::ERR_INVALID_DATA;
use crate::error::{AppError, Result};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveDataRequest {
    #[serde(rename = "tableName")]
    pub table_name: Option<String>,
    pub data: Option<Vec<Map<String, Value>>>,
}

#[derive(Debug, Serialize)]
pub struct SaveDataResponse {
    pub message: String,
    #[serde(rename = "tableName")]
    pub table_name: String,
    #[serde(rename = "recordCount")]
    pub record_count: u64,
}

/// Persist a batch of rows, provisioning the target table on first use.
///
/// The schema is inferred from this batch alone; once a table exists, later
/// saves must match its shape or fail at insert time. Rows already present
/// (same values across every data column) are skipped and do not count
/// toward `recordCount`.
pub async fn save_data(
    State(state): State<AppState>,
    Json(payload): Json<SaveDataRequest>,
) -> Result<Json<SaveDataResponse>> {
    let table_name = payload.table_name.unwrap_or_default();
    let rows = payload.data.unwrap_or_default();
    if table_name.is_empty() || rows.is_empty() {
        return Err(AppError::InvalidInput(ERR_INVALID_DATA.to_string()));
    }

    let submitted = rows.len();
    let outcome = state.store.save_rows(&table_name, &rows).await?;

    tracing::info!(
        "Saved {} new rows into {} ({} submitted)",
        outcome.inserted,
        outcome.table,
        submitted
    );

    Ok(Json(SaveDataResponse {
        message: "Data saved successfully (duplicates ignored)".to_string(),
        table_name: outcome.table,
        record_count: outcome.inserted,
    }))
}
