//! agendavoz - voice memos in, calendar events out
//!
//! A periodic ingestion pipeline for Portuguese voice memos: audio files
//! land in an upload directory, are transcribed through a speech-to-text
//! collaborator, a date/time is extracted from the transcript, and a
//! calendar event is created before the file is archived.
//!
//! # Architecture
//!
//! - Files move one way through the upload directory: pending in the root,
//!   archived under `processed/`, dead-lettered under `failed/`
//! - A file is archived only after its calendar event exists
//!   (at-least-once event creation, de-duplicated by a content-hash key)
//! - One timer drives one cycle at a time; a slow cycle delays the next
//!   tick instead of racing it
//!
//! # Modules
//!
//! - `adapters`: collaborator boundaries (speech-to-text, calendar)
//! - `ingest`: upload-directory registry and the periodic pipeline
//! - `extract`: pure Portuguese date/time extraction
//! - `web`: the `POST /upload_audio` boundary
//! - `domain`: data structures (AudioFile, ExtractedSchedule, EventRequest)
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Upload endpoint + pipeline, every 5 minutes
//! agendavoz run
//!
//! # One cycle over the upload directory
//! agendavoz scan
//!
//! # Try the extractor
//! agendavoz extract "Reunião 10 de maio de 2025 às 09:00"
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod extract;
pub mod ingest;
pub mod web;

// Re-export main types at crate root for convenience
pub use adapters::{Calendar, CalendarError, Transcriber, TranscribeError};
pub use config::AppConfig;
pub use domain::{AudioFile, AudioStatus, EventRequest, ExtractedSchedule};
pub use ingest::{CycleReport, FileRegistry, IngestionScheduler, RegistryError};
