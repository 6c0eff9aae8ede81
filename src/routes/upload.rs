use axum::extract::Multipart;
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::{ERR_NO_FILE_PART, ERR_NO_SELECTED_FILE};
use crate::error::{AppError, Result};
use crate::sheet::{allowed_file, parse_sheet};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub headers: Vec<String>,
    pub data: Vec<Map<String, Value>>,
    pub filename: String,
}

/// Parse an uploaded spreadsheet and echo its contents as JSON.
///
/// The whole file is read into memory and parsing never touches the store;
/// the front-end reviews the parsed rows before posting them to
/// `/api/save-data`.
pub async fn upload_excel(mut multipart: Multipart) -> Result<Json<UploadResponse>> {
    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            file = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let (filename, bytes) = file.ok_or_else(|| AppError::InvalidInput(ERR_NO_FILE_PART.to_string()))?;

    // Keep only the base name; browsers occasionally send a full path.
    let filename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .to_string();
    if filename.is_empty() {
        return Err(AppError::InvalidInput(ERR_NO_SELECTED_FILE.to_string()));
    }
    if !allowed_file(&filename) {
        return Err(AppError::UnsupportedFileType);
    }

    let sheet = parse_sheet(&filename, &bytes)?;

    tracing::info!(
        "Parsed upload {}: {} columns, {} rows",
        filename,
        sheet.headers.len(),
        sheet.rows.len()
    );

    Ok(Json(UploadResponse {
        headers: sheet.headers,
        data: sheet.rows,
        filename,
    }))
}
