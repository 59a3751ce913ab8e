//! The `sync` workflow shared by the CLI and tests:
//! measurement table -> per-trial plan -> apply (or describe) -> report.

use std::io::Write;

use crate::domain::SyncConfig;
use crate::error::AppError;
use crate::io::ingest::load_measurements;
use crate::report::SyncReport;
use crate::sync::{TheiaLayout, synchronize};

/// Run the synchronizer for one configuration, writing notices to `out`.
pub fn run_sync<W: Write>(config: &SyncConfig, out: &mut W) -> Result<SyncReport, AppError> {
    if !config.working_dir.is_dir() {
        return Err(AppError::input(format!(
            "Working directory '{}' does not exist",
            config.working_dir.display()
        )));
    }

    let ingest = load_measurements(&config.measurements)?;
    let layout = TheiaLayout::new(&config.working_dir);

    let outcomes = synchronize(&ingest.records, &layout, config.dry_run, out)?;
    let report = SyncReport::new(outcomes, ingest.row_errors, config.dry_run);

    if let Some(path) = &config.report {
        crate::io::export::write_report_json(path, &config.working_dir, &report)?;
    }

    Ok(report)
}
