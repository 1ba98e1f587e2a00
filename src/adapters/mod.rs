//! Adapter interfaces for external collaborators.
//!
//! The pipeline only knows the call contracts of the speech-to-text and
//! calendar providers; their internals stay behind these traits so tests
//! can substitute stubs through the constructor.

pub mod calendar;
pub mod speech;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::EventRequest;

// Re-export the REST adapters
pub use calendar::CalendarApiClient;
pub use speech::SpeechApiClient;

/// Errors from the transcription collaborator.
#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("transcription request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transcription provider rejected the request: {0}")]
    Provider(String),

    #[error("malformed transcription response: {0}")]
    MalformedResponse(String),

    #[error("transcription call timed out after {0} seconds")]
    Timeout(u64),
}

/// Errors from the calendar collaborator.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("calendar request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("calendar provider rejected the event ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("event instant {0} does not exist in the local timezone")]
    InvalidLocalTime(chrono::NaiveDateTime),

    #[error("calendar call timed out after {0} seconds")]
    Timeout(u64),
}

/// Speech-to-text collaborator boundary.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Transcribe raw audio bytes into the best-guess text.
    async fn transcribe(&self, audio: &[u8]) -> Result<String, TranscribeError>;
}

/// Calendar collaborator boundary.
#[async_trait]
pub trait Calendar: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Create an event and return the provider's opaque event id.
    async fn create_event(&self, request: &EventRequest) -> Result<String, CalendarError>;
}
