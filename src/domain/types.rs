//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - built once at the input boundary (measurement table, options file)
//! - passed explicitly into the synchronizer
//! - written back out as JSON for inspection

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One row of the measurement table, with flags already parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeasurementRecord {
    /// Path-like identifier of the subject/session; only its stem is used.
    pub filename: String,
    /// `Used == "True"`.
    pub used: bool,
    /// `Process_With_Theia != "False"` (an absent value counts as eligible).
    pub process_with_theia: bool,
    /// Suffix substituted into `pose_filt_<suffix>.c3d`, kept verbatim.
    pub theia_c3d_file: String,
}

impl MeasurementRecord {
    /// Build a record from the raw strings found in the measurement table.
    pub fn from_raw(
        filename: impl Into<String>,
        used: Option<&str>,
        process_with_theia: Option<&str>,
        theia_c3d_file: Option<&str>,
    ) -> Self {
        Self {
            filename: filename.into(),
            used: used == Some("True"),
            process_with_theia: process_with_theia != Some("False"),
            theia_c3d_file: theia_c3d_file.unwrap_or_default().to_string(),
        }
    }

    /// A record is selected when it is both used and eligible for Theia processing.
    pub fn is_selected(&self) -> bool {
        self.used && self.process_with_theia
    }

    /// Name of the trial directory under `TheiaFormatData`.
    pub fn trial_name(&self) -> &str {
        filename_stem(&self.filename)
    }
}

/// Last path component with its final extension removed. Trailing separators are ignored.
///
/// Both `/` and `\` count as separators because measurement tables are usually
/// written on Windows and read anywhere.
pub fn filename_stem(path: &str) -> &str {
    let path = path.trim_end_matches(['/', '\\']);
    let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match base.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => base,
    }
}

/// Lowpass filter applied by Theia to the tracked poses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    #[default]
    Spline,
    #[serde(alias = "moving_average")]
    MovingAverage,
}

/// Export convention for Theia output files.
///
/// Every variant still writes C3D files, but the FBX conventions change the
/// skeleton model, which breaks the downstream V3D analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExportFormat {
    #[default]
    #[serde(rename = "C3D")]
    C3d,
    #[serde(rename = "FBXTHEIA3D", alias = "FBXTHEAI3D")]
    FbxTheia3d,
    #[serde(rename = "FBXMAYAYUP")]
    FbxMayaYUp,
    #[serde(rename = "FBXMAYAZUP")]
    FbxMayaZUp,
    #[serde(rename = "FBXMAX")]
    FbxMax,
    #[serde(rename = "FBXMOTIONBUILDER")]
    FbxMotionBuilder,
    #[serde(rename = "FBXOPENGL")]
    FbxOpenGl,
    #[serde(rename = "FBXDIRECTX")]
    FbxDirectX,
    #[serde(rename = "FBXLIGHTWAVE")]
    FbxLightwave,
    #[serde(rename = "FBXCUSTOM")]
    FbxCustom,
}

impl ExportFormat {
    pub fn is_v3d_compatible(self) -> bool {
        self == ExportFormat::C3d
    }

    /// Name Theia uses for this format.
    pub fn theia_name(self) -> &'static str {
        match self {
            ExportFormat::C3d => "C3D",
            ExportFormat::FbxTheia3d => "FBXTHEIA3D",
            ExportFormat::FbxMayaYUp => "FBXMAYAYUP",
            ExportFormat::FbxMayaZUp => "FBXMAYAZUP",
            ExportFormat::FbxMax => "FBXMAX",
            ExportFormat::FbxMotionBuilder => "FBXMOTIONBUILDER",
            ExportFormat::FbxOpenGl => "FBXOPENGL",
            ExportFormat::FbxDirectX => "FBXDIRECTX",
            ExportFormat::FbxLightwave => "FBXLIGHTWAVE",
            ExportFormat::FbxCustom => "FBXCUSTOM",
        }
    }
}

/// Processing options handed to Theia. Not consumed by the synchronizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct TheiaOptions {
    /// Save the Theia workspace after processing.
    pub save_workspace: bool,
    pub filter_type: FilterType,
    /// Lowpass cut-off frequency in Hz.
    pub filter_cutoff_frequency: f64,
    /// Enable the internal/external rotation degree of freedom of the knee.
    pub enable_knee_rotation: bool,
    /// Maximum number of tracked people; `-1` tracks everyone.
    pub max_tracked_people: i32,
    /// Better tracking of people not standing up, at a processing-time cost.
    pub track_rotated_people: bool,
    pub export_format: ExportFormat,
}

impl Default for TheiaOptions {
    fn default() -> Self {
        Self {
            save_workspace: false,
            filter_type: FilterType::Spline,
            filter_cutoff_frequency: 8.0,
            enable_knee_rotation: true,
            max_tracked_people: -1,
            track_rotated_people: false,
            export_format: ExportFormat::C3d,
        }
    }
}

/// Run configuration for `theia-prep sync`.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base directory containing `TheiaFormatData/`.
    pub working_dir: PathBuf,
    /// Measurement table (CSV or JSON).
    pub measurements: PathBuf,
    /// Plan only; leave the filesystem untouched.
    pub dry_run: bool,
    /// Optional JSON run report.
    pub report: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_handles_windows_and_unix_paths() {
        assert_eq!(filename_stem(r"C:\data\subj01.trc"), "subj01");
        assert_eq!(filename_stem("/data/subj02.trc"), "subj02");
        assert_eq!(filename_stem("subj03"), "subj03");
        assert_eq!(filename_stem("walk.fast.trc"), "walk.fast");
    }

    #[test]
    fn stem_ignores_trailing_separators() {
        assert_eq!(filename_stem(r"C:\data\subj01\"), "subj01");
        assert_eq!(filename_stem("/data/subj02.trc/"), "subj02");
    }

    #[test]
    fn flags_parse_exact_strings() {
        let r = MeasurementRecord::from_raw("a.trc", Some("True"), None, Some("0"));
        assert!(r.used && r.process_with_theia && r.is_selected());

        let r = MeasurementRecord::from_raw("a.trc", Some("true"), Some("True"), Some("0"));
        assert!(!r.used, "only the literal `True` marks a trial as used");

        let r = MeasurementRecord::from_raw("a.trc", Some("True"), Some("False"), None);
        assert!(!r.is_selected());
        assert_eq!(r.theia_c3d_file, "");
    }

    #[test]
    fn options_defaults_fill_missing_fields() {
        let opts: TheiaOptions = serde_json::from_str(r#"{"filter-type":"moving-average"}"#).unwrap();
        assert_eq!(opts.filter_type, FilterType::MovingAverage);
        assert_eq!(opts.max_tracked_people, -1);
        assert_eq!(opts.export_format, ExportFormat::C3d);
    }

    #[test]
    fn export_format_uses_theia_names() {
        let f: ExportFormat = serde_json::from_str(r#""FBXMAYAZUP""#).unwrap();
        assert_eq!(f, ExportFormat::FbxMayaZUp);
        assert!(!f.is_v3d_compatible());
        assert_eq!(serde_json::to_string(&ExportFormat::C3d).unwrap(), r#""C3D""#);
    }

    #[test]
    fn theia_name_matches_serialized_name() {
        for f in [ExportFormat::C3d, ExportFormat::FbxTheia3d, ExportFormat::FbxMotionBuilder, ExportFormat::FbxCustom] {
            assert_eq!(serde_json::to_string(&f).unwrap(), format!("\"{}\"", f.theia_name()));
        }
    }

    #[test]
    fn unknown_option_is_rejected() {
        let err = serde_json::from_str::<TheiaOptions>(r#"{"filter-cutoff":8}"#);
        assert!(err.is_err());
    }
}
