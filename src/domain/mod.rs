//! Domain types used throughout the tool.
//!
//! This module defines:
//!
//! - parsed measurement rows (`MeasurementRecord`)
//! - the Theia option record (`TheiaOptions`, `FilterType`, `ExportFormat`)
//! - run configuration (`SyncConfig`)

pub mod types;

pub use types::*;
