//! Command-line parsing for `theia-prep`.
//!
//! Argument parsing and command dispatch are kept apart from the
//! synchronization code so the library can be driven without a terminal.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "theia-prep", version, about = "Prepare Theia pose files for V3D analysis")]
pub struct Cli {
    /// Enable debug-level logging (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Copy each selected trial's pose file to `pose_subject.c3d` and remove it for unselected trials.
    Sync(SyncArgs),
    /// List the `pose_filt_*.c3d` candidates of each trial (read-only).
    Candidates(TableArgs),
    /// Show or check Theia processing options.
    #[command(subcommand)]
    Options(OptionsCommand),
}

/// Where the measurements and Theia output live.
#[derive(Debug, Args, Clone)]
pub struct TableArgs {
    /// Working directory containing `TheiaFormatData/` (defaults to `THEIA_WORKING_DIR`).
    #[arg(short = 'w', long, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Measurement table (CSV, or JSON array of objects).
    #[arg(short = 'm', long, value_name = "FILE")]
    pub measurements: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct SyncArgs {
    #[command(flatten)]
    pub table: TableArgs,

    /// Print the planned actions without touching any file.
    #[arg(long)]
    pub dry_run: bool,

    /// Write a JSON report of the run.
    #[arg(long, value_name = "JSON")]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum OptionsCommand {
    /// Print the effective options as JSON (defaults when no file is given).
    Show {
        #[arg(long, value_name = "JSON")]
        file: Option<PathBuf>,
    },
    /// Validate an options file.
    Check {
        #[arg(value_name = "JSON")]
        file: PathBuf,
    },
}
