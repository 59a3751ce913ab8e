//! `theia-prep` library crate.
//!
//! Prepares per-trial input files for the Theia markerless motion-capture
//! pipeline. The binary (`theia-prep`) is a thin wrapper around this library so that:
//!
//! - the synchronizer is testable against a temporary directory
//! - the option record can be reused by other front-ends

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod sync;
