//! `TheiaFormatData` directory conventions.
//!
//! Theia writes one directory per trial:
//!
//! `<working_dir>/TheiaFormatData/<trial>/pose_filt_<n>.c3d`
//!
//! and the downstream analysis always reads
//!
//! `<working_dir>/TheiaFormatData/<trial>/pose_subject.c3d`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::MeasurementRecord;
use crate::error::AppError;

pub const DATA_DIR: &str = "TheiaFormatData";
pub const CANDIDATE_PREFIX: &str = "pose_filt_";
pub const C3D_EXT: &str = ".c3d";
pub const CANONICAL_FILE: &str = "pose_subject.c3d";

/// Root of the Theia output tree inside a working directory.
#[derive(Debug, Clone)]
pub struct TheiaLayout {
    root: PathBuf,
}

impl TheiaLayout {
    pub fn new(working_dir: &Path) -> Self {
        Self {
            root: working_dir.join(DATA_DIR),
        }
    }

    pub fn trial(&self, record: &MeasurementRecord) -> TrialPaths {
        let dir = self.root.join(record.trial_name());
        TrialPaths {
            source: dir.join(candidate_file_name(&record.theia_c3d_file)),
            destination: dir.join(CANONICAL_FILE),
            dir,
        }
    }
}

/// Paths for a single trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialPaths {
    pub dir: PathBuf,
    /// Designated candidate, `pose_filt_<Theia_c3d_file>.c3d`.
    pub source: PathBuf,
    /// Canonical `pose_subject.c3d`.
    pub destination: PathBuf,
}

pub fn candidate_file_name(suffix: &str) -> String {
    format!("{CANDIDATE_PREFIX}{suffix}{C3D_EXT}")
}

/// Suffix of a `pose_filt_<suffix>.c3d` file name, if it matches the pattern.
pub fn candidate_suffix(file_name: &str) -> Option<&str> {
    file_name
        .strip_prefix(CANDIDATE_PREFIX)?
        .strip_suffix(C3D_EXT)
}

/// A candidate file found in a trial directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub suffix: String,
    pub path: PathBuf,
}

/// List the candidate pool of a trial directory, sorted by suffix descending.
///
/// A missing directory yields an empty pool. The listing is diagnostic only and
/// plays no part in choosing the file that gets copied.
pub fn list_candidates(dir: &Path) -> Result<Vec<Candidate>, AppError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(AppError::filesystem(format!(
                "Failed to list trial directory '{}': {e}",
                dir.display()
            )));
        }
    };

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            AppError::filesystem(format!("Failed to list trial directory '{}': {e}", dir.display()))
        })?;
        let name = entry.file_name();
        let Some(suffix) = name.to_str().and_then(candidate_suffix) else {
            continue;
        };
        out.push(Candidate {
            suffix: suffix.to_string(),
            path: entry.path(),
        });
    }

    out.sort_by(|a, b| b.suffix.cmp(&a.suffix));
    Ok(out)
}
