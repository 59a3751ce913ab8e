//! Input/output helpers.
//!
//! - measurement table ingest (`ingest`)
//! - Theia options JSON (`options`)
//! - run report JSON (`export`)

pub mod export;
pub mod ingest;
pub mod options;

pub use export::*;
pub use ingest::*;
pub use options::*;
