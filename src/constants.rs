/// Maximum upload size in bytes (25MB)
/// Uploads are parsed fully in memory; this cap bounds per-request memory.
pub const MAX_UPLOAD_SIZE_BYTES: usize = 26_214_400;

/// File extensions accepted by the upload endpoint
pub const ALLOWED_EXTENSIONS: &[&str] = &["csv", "xls", "xlsx"];

// =============================================================================
// Error Messages
// =============================================================================

/// Error message when a save request is missing its table name or rows
pub const ERR_INVALID_DATA: &str = "Invalid data provided";

/// Error message when a request omits the table name
pub const ERR_TABLE_NAME_REQUIRED: &str = "Table name is required";

/// Error message when an aggregate request omits a parameter
pub const ERR_AVERAGES_PARAMS_REQUIRED: &str =
    "tableName, dateColumn, and valueColumn are required";

/// Error message when a multipart upload has no `file` field
pub const ERR_NO_FILE_PART: &str = "No file part";

/// Error message when the uploaded file has no name
pub const ERR_NO_SELECTED_FILE: &str = "No selected file";
