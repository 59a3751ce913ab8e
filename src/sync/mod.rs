//! Trial selection and `pose_subject.c3d` synchronization.
//!
//! For every measurement the canonical file is made to match the selection:
//! a selected trial gets its designated `pose_filt_<n>.c3d` copied over
//! `pose_subject.c3d`; an unselected trial loses any stale `pose_subject.c3d`
//! so the analysis cannot pick it up again.
//!
//! Planning and applying are separate so a dry run sees exactly what a real
//! run would do. Records are processed in order and a filesystem failure stops
//! the run; earlier records stay as they were written.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::domain::MeasurementRecord;
use crate::error::AppError;

pub mod layout;

pub use layout::{Candidate, TheiaLayout, TrialPaths, list_candidates};

/// What synchronizing one record does to the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum SyncAction {
    /// Selected, source present: overwrite the canonical file.
    Copy { from: PathBuf, to: PathBuf },
    /// Not selected, stale canonical file present: delete it.
    Remove { path: PathBuf },
    /// Selected, but the designated source does not exist.
    SkipMissingSource { path: PathBuf },
    /// Not selected and nothing to delete.
    Nothing,
}

/// Decide the action for one record by inspecting the filesystem.
pub fn plan_record(record: &MeasurementRecord, layout: &TheiaLayout) -> SyncAction {
    let paths = layout.trial(record);

    if record.is_selected() {
        if paths.source.exists() {
            SyncAction::Copy {
                from: paths.source,
                to: paths.destination,
            }
        } else {
            SyncAction::SkipMissingSource { path: paths.source }
        }
    } else if paths.destination.exists() {
        SyncAction::Remove {
            path: paths.destination,
        }
    } else {
        SyncAction::Nothing
    }
}

/// Perform a planned action and write its `!` notices to `out`.
pub fn apply_action<W: Write>(action: &SyncAction, out: &mut W) -> Result<(), AppError> {
    match action {
        SyncAction::Copy { from, to } => {
            fs::copy(from, to).map_err(|e| {
                AppError::filesystem(format!(
                    "Failed to copy '{}' to '{}': {e}",
                    from.display(),
                    to.display()
                ))
            })?;
            notice(out, format_args!("! Renaming {}", from.display()))?;
            notice(out, format_args!("! To {}", to.display()))?;
        }
        SyncAction::Remove { path } => {
            fs::remove_file(path)
                .map_err(|e| AppError::filesystem(format!("Failed to remove '{}': {e}", path.display())))?;
            notice(out, format_args!("! Removing {}", path.display()))?;
        }
        SyncAction::SkipMissingSource { .. } | SyncAction::Nothing => {}
    }
    Ok(())
}

/// Write the notice a dry run prints in place of applying `action`.
pub fn describe_action<W: Write>(action: &SyncAction, out: &mut W) -> Result<(), AppError> {
    match action {
        SyncAction::Copy { from, to } => {
            notice(out, format_args!("! [dry-run] Renaming {}", from.display()))?;
            notice(out, format_args!("! [dry-run] To {}", to.display()))?;
        }
        SyncAction::Remove { path } => {
            notice(out, format_args!("! [dry-run] Removing {}", path.display()))?;
        }
        SyncAction::SkipMissingSource { .. } | SyncAction::Nothing => {}
    }
    Ok(())
}

/// Result of synchronizing one record.
#[derive(Debug, Clone, Serialize)]
pub struct RecordOutcome {
    pub trial: String,
    #[serde(flatten)]
    pub action: SyncAction,
}

/// Synchronize every record in order.
///
/// With `dry_run` the actions are only described. The first filesystem failure
/// is returned; records before it have already been applied.
pub fn synchronize<W: Write>(
    records: &[MeasurementRecord],
    layout: &TheiaLayout,
    dry_run: bool,
    out: &mut W,
) -> Result<Vec<RecordOutcome>, AppError> {
    let mut outcomes = Vec::with_capacity(records.len());

    for record in records {
        let action = plan_record(record, layout);
        debug!(
            trial = record.trial_name(),
            selected = record.is_selected(),
            ?action,
            "planned"
        );

        if dry_run {
            describe_action(&action, out)?;
        } else {
            apply_action(&action, out)?;
        }

        outcomes.push(RecordOutcome {
            trial: record.trial_name().to_string(),
            action,
        });
    }

    Ok(outcomes)
}

fn notice<W: Write>(out: &mut W, args: std::fmt::Arguments<'_>) -> Result<(), AppError> {
    writeln!(out, "{args}").map_err(|e| AppError::filesystem(format!("Failed to write notice: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn record(used: &str, theia: &str, file: &str) -> MeasurementRecord {
        MeasurementRecord::from_raw(r"C:\data\subj01.trc", Some(used), Some(theia), Some(file))
    }

    fn trial_dir(root: &Path) -> PathBuf {
        let dir = root.join("TheiaFormatData").join("subj01");
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn plan_copies_selected_trial_with_source() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = trial_dir(tmp.path());
        fs::write(dir.join("pose_filt_0.c3d"), b"pose").unwrap();

        let layout = TheiaLayout::new(tmp.path());
        let action = plan_record(&record("True", "True", "0"), &layout);
        assert_eq!(
            action,
            SyncAction::Copy {
                from: dir.join("pose_filt_0.c3d"),
                to: dir.join("pose_subject.c3d"),
            }
        );
    }

    #[test]
    fn plan_skips_missing_source() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = trial_dir(tmp.path());
        let layout = TheiaLayout::new(tmp.path());
        let action = plan_record(&record("True", "True", "5"), &layout);
        assert_eq!(
            action,
            SyncAction::SkipMissingSource {
                path: dir.join("pose_filt_5.c3d")
            }
        );
    }

    #[test]
    fn plan_ignores_candidate_order() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = trial_dir(tmp.path());
        for n in ["0", "1", "2"] {
            fs::write(dir.join(format!("pose_filt_{n}.c3d")), n).unwrap();
        }
        let layout = TheiaLayout::new(tmp.path());
        let SyncAction::Copy { from, .. } = plan_record(&record("True", "True", "1"), &layout) else {
            panic!("expected a copy");
        };
        assert_eq!(from, dir.join("pose_filt_1.c3d"));
    }

    #[test]
    fn apply_copy_writes_notices() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = trial_dir(tmp.path());
        fs::write(dir.join("pose_filt_0.c3d"), b"fresh").unwrap();
        fs::write(dir.join("pose_subject.c3d"), b"stale").unwrap();

        let layout = TheiaLayout::new(tmp.path());
        let mut out = Vec::new();
        let outcomes = synchronize(&[record("True", "True", "0")], &layout, false, &mut out).unwrap();

        assert_eq!(fs::read(dir.join("pose_subject.c3d")).unwrap(), b"fresh");
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("! Renaming ") && lines[0].ends_with("pose_filt_0.c3d"));
        assert!(lines[1].starts_with("! To ") && lines[1].ends_with("pose_subject.c3d"));
        assert_eq!(outcomes[0].trial, "subj01");
    }

    #[test]
    fn dry_run_leaves_files_untouched() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = trial_dir(tmp.path());
        fs::write(dir.join("pose_subject.c3d"), b"stale").unwrap();

        let layout = TheiaLayout::new(tmp.path());
        let mut out = Vec::new();
        let outcomes = synchronize(&[record("False", "True", "0")], &layout, true, &mut out).unwrap();

        assert!(dir.join("pose_subject.c3d").exists());
        assert!(matches!(outcomes[0].action, SyncAction::Remove { .. }));
        assert!(String::from_utf8(out).unwrap().starts_with("! [dry-run] Removing "));
    }

    #[test]
    fn copy_failure_stops_after_earlier_records() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = trial_dir(tmp.path());
        fs::write(dir.join("pose_subject.c3d"), b"stale").unwrap();

        // Source is a directory, so the copy fails.
        let bad_dir = tmp.path().join("TheiaFormatData").join("subj02");
        fs::create_dir_all(bad_dir.join("pose_filt_0.c3d")).unwrap();

        let records = [
            record("False", "True", "0"),
            MeasurementRecord::from_raw("subj02.trc", Some("True"), None, Some("0")),
        ];
        let layout = TheiaLayout::new(tmp.path());
        let err = synchronize(&records, &layout, false, &mut Vec::new()).unwrap_err();

        assert_eq!(err.exit_code(), crate::error::EXIT_FILESYSTEM);
        assert!(!dir.join("pose_subject.c3d").exists());
    }
}
