//! Domain types for the ingestion pipeline.
//!
//! This module contains the core data structures:
//! - AudioFile: an uploaded recording and its lifecycle state
//! - ExtractedSchedule: the date/time pulled out of a transcript
//! - EventRequest: what we ask the calendar collaborator to create

use std::path::PathBuf;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an ingested audio file.
///
/// The move from `Pending` to `Processed` is one-way and happens only after
/// a calendar event was successfully created for the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioStatus {
    Pending,
    Processed,
}

impl std::fmt::Display for AudioStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioStatus::Pending => write!(f, "pending"),
            AudioStatus::Processed => write!(f, "processed"),
        }
    }
}

/// An audio file discovered in the upload directory.
///
/// Byte content is read lazily at transcription time, not held here.
#[derive(Debug, Clone)]
pub struct AudioFile {
    /// Full path to the file
    pub path: PathBuf,

    /// File name only
    pub file_name: String,

    /// File size in bytes
    pub size: u64,

    /// Current lifecycle state
    pub status: AudioStatus,
}

impl AudioFile {
    pub fn pending(path: PathBuf, size: u64) -> Self {
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Self {
            path,
            file_name,
            size,
            status: AudioStatus::Pending,
        }
    }
}

/// A calendar slot extracted from a transcript.
///
/// Derived deterministically from the transcript text; the end is always
/// one hour after the start. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedSchedule {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ExtractedSchedule {
    /// Build a schedule from its start instant (fixed one-hour duration).
    pub fn from_start(start: NaiveDateTime) -> Self {
        Self {
            start,
            end: start + Duration::hours(1),
        }
    }
}

/// Request sent to the calendar collaborator. The created event is owned by
/// the collaborator; only its opaque id comes back, and the pipeline keeps
/// no further reference to it beyond logging.
#[derive(Debug, Clone)]
pub struct EventRequest {
    pub summary: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,

    /// Stable per-audio-file key (content hash). Forwarded to the provider
    /// so a retried schedule de-duplicates instead of creating a twin event.
    pub idempotency_key: String,
}
