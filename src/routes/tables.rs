use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::constants::ERR_TABLE_NAME_REQUIRED;
use crate::error::{AppError, Result};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ListTablesResponse {
    pub message: String,
    pub tables: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteTableRequest {
    #[serde(rename = "tableName")]
    pub table_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteTableResponse {
    pub message: String,
    #[serde(rename = "tableName")]
    pub table_name: String,
}

/// Enumerate the user tables in the active schema/database.
pub async fn list_tables(State(state): State<AppState>) -> Result<Json<ListTablesResponse>> {
    let tables = state.store.list_tables().await?;

    Ok(Json(ListTablesResponse {
        message: "Tables listed successfully".to_string(),
        tables,
    }))
}

/// Drop a provisioned table. Dropping a table that does not exist succeeds;
/// this is the only way schema ever leaves the system.
pub async fn delete_table(
    State(state): State<AppState>,
    Json(payload): Json<DeleteTableRequest>,
) -> Result<Json<DeleteTableResponse>> {
    let table_name = payload.table_name.unwrap_or_default();
    if table_name.is_empty() {
        return Err(AppError::InvalidInput(ERR_TABLE_NAME_REQUIRED.to_string()));
    }

    let table = state.store.drop_table(&table_name).await?;

    Ok(Json(DeleteTableResponse {
        message: "Table deleted successfully".to_string(),
        table_name: table,
    }))
}
