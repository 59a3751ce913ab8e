//! Export a sync run report to JSON.
//!
//! The report lists every trial's action so a session can be audited after the
//! fact, alongside the counts printed on the terminal.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::AppError;
use crate::report::SyncReport;

#[derive(Serialize)]
struct ReportFile<'a> {
    tool: &'static str,
    generated_at: DateTime<Local>,
    working_dir: &'a Path,
    #[serde(flatten)]
    report: &'a SyncReport,
}

/// Write a sync report JSON file.
pub fn write_report_json(path: &Path, working_dir: &Path, report: &SyncReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create report JSON '{}': {e}", path.display())))?;

    let doc = ReportFile {
        tool: "theia-prep",
        generated_at: Local::now(),
        working_dir,
        report,
    };

    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::input(format!("Failed to write report JSON: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_json_has_counts_and_timestamp() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("report.json");
        let report = SyncReport::new(Vec::new(), Vec::new(), true);

        write_report_json(&path, tmp.path(), &report).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["tool"], "theia-prep");
        assert_eq!(value["dry_run"], true);
        assert_eq!(value["copied"], 0);
        assert!(value["generated_at"].is_string());
    }
}
