//! Run summaries for `sync` and `candidates`.

use serde::Serialize;

use crate::io::ingest::RowError;
use crate::sync::{Candidate, RecordOutcome, SyncAction};

/// Counts of what a sync run did, plus the rows ingest had to skip.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub dry_run: bool,
    pub copied: usize,
    pub removed: usize,
    pub missing_source: usize,
    pub unchanged: usize,
    pub row_errors: Vec<RowError>,
    pub outcomes: Vec<RecordOutcome>,
}

impl SyncReport {
    pub fn new(outcomes: Vec<RecordOutcome>, row_errors: Vec<RowError>, dry_run: bool) -> Self {
        let mut report = SyncReport {
            dry_run,
            row_errors,
            ..SyncReport::default()
        };
        for outcome in &outcomes {
            match outcome.action {
                SyncAction::Copy { .. } => report.copied += 1,
                SyncAction::Remove { .. } => report.removed += 1,
                SyncAction::SkipMissingSource { .. } => report.missing_source += 1,
                SyncAction::Nothing => report.unchanged += 1,
            }
        }
        report.outcomes = outcomes;
        report
    }
}

/// One-screen summary printed after the notices.
pub fn format_sync_summary(report: &SyncReport) -> String {
    let mut out = String::new();
    let verb = if report.dry_run { "Planned" } else { "Synchronized" };
    out.push_str(&format!(
        "{verb} {} trial(s): {} copied, {} removed, {} without source, {} unchanged",
        report.outcomes.len(),
        report.copied,
        report.removed,
        report.missing_source,
        report.unchanged
    ));

    if !report.row_errors.is_empty() {
        out.push_str(&format!("\nSkipped {} row(s):", report.row_errors.len()));
        for err in &report.row_errors {
            out.push_str(&format!("\n  line {}: {}", err.line, err.message));
        }
    }
    out
}

/// Candidate pool of one trial, as printed by `theia-prep candidates`.
#[derive(Debug, Clone)]
pub struct CandidateListing {
    pub trial: String,
    pub designated: String,
    pub candidates: Vec<Candidate>,
}

pub fn format_candidates(listings: &[CandidateListing]) -> String {
    let mut out = String::new();
    for listing in listings {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("{} (designated: {})", listing.trial, listing.designated));
        if listing.candidates.is_empty() {
            out.push_str("\n  (no candidates)");
        }
        for c in &listing.candidates {
            let mark = if c.suffix == listing.designated { '*' } else { ' ' };
            out.push_str(&format!("\n {mark} {}", c.path.display()));
        }
    }
    out
}
