//! Voice-memo ingestion.
//!
//! `registry` owns the upload-directory state transitions, `pipeline`
//! drives the periodic scan → transcribe → extract → schedule → archive
//! cycle over it.

pub mod pipeline;
pub mod registry;

pub use pipeline::{CycleReport, IngestionScheduler};
pub use registry::{FileRegistry, RegistryError};
