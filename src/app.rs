//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - resolves the working directory (`--working-dir` or `THEIA_WORKING_DIR`)
//! - dispatches to sync, candidate listing, or option handling

use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, OptionsCommand, SyncArgs, TableArgs};
use crate::domain::{SyncConfig, TheiaOptions};
use crate::error::AppError;
use crate::report::CandidateListing;
use crate::sync::{TheiaLayout, list_candidates};

pub mod pipeline;

pub const WORKING_DIR_ENV: &str = "THEIA_WORKING_DIR";

/// Entry point for the `theia-prep` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Sync(args) => handle_sync(args),
        Command::Candidates(args) => handle_candidates(args),
        Command::Options(cmd) => handle_options(cmd),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    // `try_init` so a second call (tests, embedding) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .try_init();
}

fn handle_sync(args: SyncArgs) -> Result<(), AppError> {
    let config = sync_config_from_args(&args)?;
    info!(
        working_dir = %config.working_dir.display(),
        measurements = %config.measurements.display(),
        dry_run = config.dry_run,
        "synchronizing trials"
    );

    let mut stdout = std::io::stdout().lock();
    let report = pipeline::run_sync(&config, &mut stdout)?;
    drop(stdout);

    println!("{}", crate::report::format_sync_summary(&report));
    Ok(())
}

fn handle_candidates(args: TableArgs) -> Result<(), AppError> {
    let working_dir = resolve_working_dir(args.working_dir.clone())?;
    let ingest = crate::io::ingest::load_measurements(&args.measurements)?;
    let layout = TheiaLayout::new(&working_dir);

    let mut listings = Vec::with_capacity(ingest.records.len());
    for record in &ingest.records {
        let paths = layout.trial(record);
        let candidates = list_candidates(&paths.dir)?;
        debug!(trial = record.trial_name(), count = candidates.len(), "candidate pool");
        listings.push(CandidateListing {
            trial: record.trial_name().to_string(),
            designated: record.theia_c3d_file.clone(),
            candidates,
        });
    }

    println!("{}", crate::report::format_candidates(&listings));
    Ok(())
}

fn handle_options(cmd: OptionsCommand) -> Result<(), AppError> {
    match cmd {
        OptionsCommand::Show { file } => {
            let options = match &file {
                Some(path) => crate::io::options::read_options_json(path)?,
                None => TheiaOptions::default(),
            };
            crate::io::options::validate_options(&options)?;
            crate::io::options::write_options_json(std::io::stdout().lock(), &options)?;
            println!();
        }
        OptionsCommand::Check { file } => {
            let options = crate::io::options::read_options_json(&file)?;
            let warnings = crate::io::options::validate_options(&options)?;
            if warnings.is_empty() {
                println!("{}: ok", file.display());
            } else {
                println!("{}: ok with {} warning(s)", file.display(), warnings.len());
            }
        }
    }
    Ok(())
}

pub fn sync_config_from_args(args: &SyncArgs) -> Result<SyncConfig, AppError> {
    Ok(SyncConfig {
        working_dir: resolve_working_dir(args.table.working_dir.clone())?,
        measurements: args.table.measurements.clone(),
        dry_run: args.dry_run,
        report: args.report.clone(),
    })
}

/// The explicit flag wins; otherwise `THEIA_WORKING_DIR` from the environment or `.env`.
fn resolve_working_dir(flag: Option<PathBuf>) -> Result<PathBuf, AppError> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    dotenvy::dotenv().ok();
    std::env::var_os(WORKING_DIR_ENV)
        .map(PathBuf::from)
        .ok_or_else(|| {
            AppError::input(format!(
                "No working directory: pass --working-dir or set {WORKING_DIR_ENV} (.env)."
            ))
        })
}
