//! Measurement table ingest.
//!
//! Turns an exported measurement table (CSV, or a JSON array of objects) into
//! `MeasurementRecord`s. This is the only place the `"True"`/`"False"` strings
//! are looked at; everything downstream works with parsed booleans.
//!
//! Rows without a `Filename` value are skipped and reported, so one bad row
//! does not hide the rest of the session.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use serde::Serialize;
use tracing::debug;

use crate::domain::MeasurementRecord;
use crate::error::AppError;

pub const COL_FILENAME: &str = "Filename";
pub const COL_USED: &str = "Used";
pub const COL_PROCESS_WITH_THEIA: &str = "Process_With_Theia";
pub const COL_THEIA_C3D_FILE: &str = "Theia_c3d_file";

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    /// 1-based line for CSV, 1-based element index for JSON.
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed records + row errors.
#[derive(Debug, Clone, Default)]
pub struct IngestedMeasurements {
    pub records: Vec<MeasurementRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load a measurement table, choosing the format from the file extension.
pub fn load_measurements(path: &Path) -> Result<IngestedMeasurements, AppError> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let file = File::open(path).map_err(|e| {
        AppError::input(format!("Failed to open measurement table '{}': {e}", path.display()))
    })?;

    let ingested = if is_json {
        read_json(file)?
    } else {
        read_csv(file)?
    };

    debug!(
        path = %path.display(),
        rows_read = ingested.rows_read,
        records = ingested.records.len(),
        row_errors = ingested.row_errors.len(),
        "loaded measurement table"
    );
    Ok(ingested)
}

/// Read CSV measurements from any reader.
pub fn read_csv<R: std::io::Read>(reader: R) -> Result<IngestedMeasurements, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read measurement table headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    if !header_map.contains_key(COL_FILENAME) {
        return Err(AppError::input(format!(
            "Missing required column: `{COL_FILENAME}`"
        )));
    }

    let mut out = IngestedMeasurements::default();
    for (idx, result) in reader.records().enumerate() {
        // Header occupies line 1.
        let line = idx + 2;
        out.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                out.row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let field = |name: &str| get_optional(&record, &header_map, name);
        match field(COL_FILENAME) {
            Some(filename) => out.records.push(MeasurementRecord::from_raw(
                filename,
                field(COL_USED),
                field(COL_PROCESS_WITH_THEIA),
                field(COL_THEIA_C3D_FILE),
            )),
            None => out.row_errors.push(RowError {
                line,
                message: format!("Missing required value: `{COL_FILENAME}`"),
            }),
        }
    }

    Ok(out)
}

/// Read a JSON array of measurement objects from any reader.
///
/// Values may be strings, booleans or numbers; non-strings are rendered the way
/// a spreadsheet export would write them (`true` becomes `"True"`).
pub fn read_json<R: std::io::Read>(reader: R) -> Result<IngestedMeasurements, AppError> {
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_reader(reader)
        .map_err(|e| AppError::input(format!("Invalid measurement JSON: {e}")))?;

    let mut out = IngestedMeasurements::default();
    for (idx, row) in rows.iter().enumerate() {
        out.rows_read += 1;
        let field = |name: &str| row.get(name).and_then(json_scalar);

        match field(COL_FILENAME).filter(|s| !s.is_empty()) {
            Some(filename) => out.records.push(MeasurementRecord::from_raw(
                filename,
                field(COL_USED).as_deref(),
                field(COL_PROCESS_WITH_THEIA).as_deref(),
                field(COL_THEIA_C3D_FILE).as_deref(),
            )),
            None => out.row_errors.push(RowError {
                line: idx + 1,
                message: format!("Missing required value: `{COL_FILENAME}`"),
            }),
        }
    }

    Ok(out)
}

fn json_scalar(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Bool(true) => Some("True".to_string()),
        serde_json::Value::Bool(false) => Some("False".to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel prefixes UTF-8 exports with a BOM on the first header.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_become_records() {
        let csv = "\u{feff}Filename,Used,Process_With_Theia,Theia_c3d_file\n\
                   C:\\data\\subj01.trc,True,True,0\n\
                   C:\\data\\subj02.trc,False,,1\n";
        let data = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(data.rows_read, 2);
        assert!(data.row_errors.is_empty());
        assert_eq!(data.records[0].trial_name(), "subj01");
        assert!(data.records[0].is_selected());
        assert!(!data.records[1].used);
        assert!(data.records[1].process_with_theia);
        assert_eq!(data.records[1].theia_c3d_file, "1");
    }

    #[test]
    fn csv_without_theia_columns_defaults_to_eligible() {
        let csv = "Filename,Used\nsubj01.trc,True\n";
        let data = read_csv(csv.as_bytes()).unwrap();
        let r = &data.records[0];
        assert!(r.is_selected());
        assert_eq!(r.theia_c3d_file, "");
    }

    #[test]
    fn csv_row_without_filename_is_reported() {
        let csv = "Filename,Used\n,True\nsubj02.trc,True\n";
        let data = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(data.records.len(), 1);
        assert_eq!(data.row_errors.len(), 1);
        assert_eq!(data.row_errors[0].line, 2);
    }

    #[test]
    fn csv_without_filename_column_is_fatal() {
        let err = read_csv("Used\nTrue\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
    }

    #[test]
    fn json_accepts_strings_bools_and_numbers() {
        let json = r#"[
            {"Filename": "subj01.trc", "Used": true, "Process_With_Theia": "True", "Theia_c3d_file": 2},
            {"Filename": "subj02.trc", "Used": "True", "Process_With_Theia": false},
            {"Used": "True"}
        ]"#;
        let data = read_json(json.as_bytes()).unwrap();
        assert_eq!(data.records.len(), 2);
        assert!(data.records[0].is_selected());
        assert_eq!(data.records[0].theia_c3d_file, "2");
        assert!(!data.records[1].is_selected());
        assert_eq!(data.row_errors[0].line, 3);
    }
}
