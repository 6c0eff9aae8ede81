//! Upload parsing: turns an uploaded CSV or Excel payload into headers and
//! row objects ready for review and a later save.
//!
//! Cell typing mirrors what the front-end expects from uploads: integers and
//! floats become JSON numbers, booleans stay booleans, dates become ISO-8601
//! strings, and empty or missing cells become empty strings.

use std::io::Cursor;

use calamine::{Data, DataType, Range, Reader, Xls, Xlsx};
use csv::ReaderBuilder;
use serde_json::{Map, Number, Value};

use crate::constants::ALLOWED_EXTENSIONS;
use crate::error::{AppError, Result};

/// A parsed upload: headers in sheet order plus one JSON object per row.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

/// Lower-cased extension of an uploaded filename, if it has one.
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Whether the upload endpoint accepts this filename.
pub fn allowed_file(filename: &str) -> bool {
    file_extension(filename)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Parse an upload by extension. An `xls` payload the Excel reader rejects
/// is retried as CSV; exported reports are often mislabeled that way.
pub fn parse_sheet(filename: &str, bytes: &[u8]) -> Result<ParsedSheet> {
    let ext = file_extension(filename).ok_or(AppError::UnsupportedFileType)?;
    match ext.as_str() {
        "csv" => parse_csv(bytes),
        "xlsx" => parse_xlsx(bytes),
        "xls" => parse_xls(bytes).or_else(|_| parse_csv(bytes)),
        _ => Err(AppError::UnsupportedFileType),
    }
}

fn parse_csv(bytes: &[u8]) -> Result<ParsedSheet> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::FileParse(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AppError::FileParse(e.to_string()))?;
        let mut row = Map::new();
        for (i, header) in headers.iter().enumerate() {
            // Short records pad out with empty cells.
            let cell = record.get(i).unwrap_or("");
            row.insert(header.clone(), csv_cell_value(cell));
        }
        rows.push(row);
    }

    Ok(ParsedSheet { headers, rows })
}

fn parse_xlsx(bytes: &[u8]) -> Result<ParsedSheet> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| AppError::FileParse(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::FileParse("workbook has no worksheets".to_string()))?
        .map_err(|e| AppError::FileParse(e.to_string()))?;
    Ok(range_to_sheet(&range))
}

fn parse_xls(bytes: &[u8]) -> Result<ParsedSheet> {
    let mut workbook: Xls<_> =
        Xls::new(Cursor::new(bytes.to_vec())).map_err(|e| AppError::FileParse(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::FileParse("workbook has no worksheets".to_string()))?
        .map_err(|e| AppError::FileParse(e.to_string()))?;
    Ok(range_to_sheet(&range))
}

fn range_to_sheet(range: &Range<Data>) -> ParsedSheet {
    let mut rows_iter = range.rows();

    let headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let title = cell
                    .as_string()
                    .unwrap_or_else(|| cell.to_string())
                    .trim()
                    .to_string();
                if title.is_empty() {
                    format!("column_{}", i + 1)
                } else {
                    title
                }
            })
            .collect(),
        None => {
            return ParsedSheet {
                headers: Vec::new(),
                rows: Vec::new(),
            }
        }
    };

    let mut rows = Vec::new();
    for row in rows_iter {
        let mut object = Map::new();
        for (i, header) in headers.iter().enumerate() {
            let value = row
                .get(i)
                .map(excel_cell_value)
                .unwrap_or_else(|| Value::String(String::new()));
            object.insert(header.clone(), value);
        }
        rows.push(object);
    }

    ParsedSheet { headers, rows }
}

fn csv_cell_value(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::String(String::new());
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if let Some(n) = Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(cell.to_string())
}

fn excel_cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::String(String::new()),
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::Number((*i).into()),
        Data::Float(f) => {
            // Whole floats come back as integers, the way spreadsheet tools
            // show them.
            if f.fract() == 0.0 && f.is_finite() && f.abs() < i64::MAX as f64 {
                Value::Number((*f as i64).into())
            } else {
                Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null)
            }
        }
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => cell
            .as_datetime()
            .map(|d| Value::String(d.format("%Y-%m-%dT%H:%M:%S").to_string()))
            .unwrap_or_else(|| Value::String(dt.as_f64().to_string())),
        Data::DateTimeIso(s) => Value::String(s.clone()),
        Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(e) => Value::String(format!("{e:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("data.csv"));
        assert!(allowed_file("report.XLSX"));
        assert!(allowed_file("legacy.xls"));
        assert!(!allowed_file("notes.txt"));
        assert!(!allowed_file("archive.csv.zip"));
        assert!(!allowed_file("no_extension"));
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("a.b.CSV"), Some("csv".to_string()));
        assert_eq!(file_extension("plain"), None);
    }

    #[test]
    fn test_parse_csv_headers_and_rows() {
        let body = b"A,B\n1,x\n2,y\n";
        let sheet = parse_sheet("data.csv", body).unwrap();
        assert_eq!(sheet.headers, vec!["A", "B"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0]["A"], json!(1));
        assert_eq!(sheet.rows[0]["B"], json!("x"));
        assert_eq!(sheet.rows[1]["A"], json!(2));
    }

    #[test]
    fn test_parse_csv_empty_cells_become_empty_strings() {
        let body = b"A,B\n1,\n,y\n";
        let sheet = parse_sheet("data.csv", body).unwrap();
        assert_eq!(sheet.rows[0]["B"], json!(""));
        assert_eq!(sheet.rows[1]["A"], json!(""));
    }

    #[test]
    fn test_parse_csv_short_rows_are_padded() {
        let body = b"A,B,C\n1,2\n";
        let sheet = parse_sheet("data.csv", body).unwrap();
        assert_eq!(sheet.rows[0]["C"], json!(""));
    }

    #[test]
    fn test_csv_numeric_coercion() {
        assert_eq!(csv_cell_value("10"), json!(10));
        assert_eq!(csv_cell_value("10.5"), json!(10.5));
        assert_eq!(csv_cell_value("2024-01-15"), json!("2024-01-15"));
        assert_eq!(csv_cell_value("abc"), json!("abc"));
        assert_eq!(csv_cell_value(""), json!(""));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        assert!(matches!(
            parse_sheet("data.parquet", b""),
            Err(AppError::UnsupportedFileType)
        ));
    }

    #[test]
    fn test_mislabeled_xls_falls_back_to_csv() {
        let body = b"A,B\n1,x\n";
        let sheet = parse_sheet("export.xls", body).unwrap();
        assert_eq!(sheet.headers, vec!["A", "B"]);
        assert_eq!(sheet.rows.len(), 1);
    }

    #[test]
    fn test_excel_cell_values() {
        assert_eq!(excel_cell_value(&Data::Empty), json!(""));
        assert_eq!(excel_cell_value(&Data::Float(3.0)), json!(3));
        assert_eq!(excel_cell_value(&Data::Float(3.5)), json!(3.5));
        assert_eq!(excel_cell_value(&Data::Bool(true)), json!(true));
        assert_eq!(
            excel_cell_value(&Data::String("x".to_string())),
            json!("x")
        );
    }
}
