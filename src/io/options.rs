//! Read, validate and write Theia option files.
//!
//! The options are a declarative record for the external Theia run; this tool
//! only checks that the values are legal and prints the effective set.

use std::fs::File;
use std::path::Path;

use tracing::warn;

use crate::domain::TheiaOptions;
use crate::error::AppError;

/// Read an options JSON file. Missing fields take their defaults.
pub fn read_options_json(path: &Path) -> Result<TheiaOptions, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open options JSON '{}': {e}", path.display())))?;
    let options: TheiaOptions =
        serde_json::from_reader(file).map_err(|e| AppError::input(format!("Invalid options JSON: {e}")))?;
    Ok(options)
}

/// Write the effective options as pretty JSON.
pub fn write_options_json<W: std::io::Write>(writer: W, options: &TheiaOptions) -> Result<(), AppError> {
    serde_json::to_writer_pretty(writer, options)
        .map_err(|e| AppError::input(format!("Failed to write options JSON: {e}")))
}

/// Check value ranges. Returns the warnings for legal-but-risky settings.
pub fn validate_options(options: &TheiaOptions) -> Result<Vec<String>, AppError> {
    let cutoff = options.filter_cutoff_frequency;
    if !cutoff.is_finite() || cutoff <= 0.0 {
        return Err(AppError::input(format!(
            "`filter-cutoff-frequency` must be a positive number of Hz, got {cutoff}"
        )));
    }

    let people = options.max_tracked_people;
    if people != -1 && people < 1 {
        return Err(AppError::input(format!(
            "`max-tracked-people` must be -1 (everyone) or at least 1, got {people}"
        )));
    }

    let mut warnings = Vec::new();
    if !options.export_format.is_v3d_compatible() {
        let msg = format!(
            "export format {} changes the Theia skeleton convention; the V3D analysis requires C3D",
            options.export_format.theia_name()
        );
        warn!("{msg}");
        warnings.push(msg);
    }
    Ok(warnings)
}
