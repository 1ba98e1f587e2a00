//! Periodic ingestion pipeline.
//!
//! One cycle: list pending files, then per file transcribe → extract →
//! schedule → archive. Files are processed sequentially; one file's failure
//! never aborts the rest of the cycle. Failed files stay pending and are
//! retried on the next tick, up to a per-file bound after which they are
//! dead-lettered into the registry's `failed/` location.
//!
//! The scheduler runs at most one cycle at a time: `run_cycle` takes
//! `&mut self` and the timer loop owns the scheduler, so a cycle that
//! outlives the interval delays the next tick instead of racing it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::sync::oneshot;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::registry::{FileRegistry, RegistryError};
use crate::adapters::{Calendar, CalendarError, Transcriber, TranscribeError};
use crate::domain::{AudioFile, EventRequest};
use crate::extract;

/// Drives the scan → transcribe → extract → schedule → archive cycle.
///
/// Collaborators are injected as trait objects so tests can substitute
/// stubs directly.
pub struct IngestionScheduler {
    registry: FileRegistry,
    transcriber: Arc<dyn Transcriber>,
    calendar: Arc<dyn Calendar>,

    /// Upper bound on each collaborator call
    call_timeout: Duration,

    /// Failed cycles per file before dead-lettering
    max_attempts: u32,

    /// Failure count per pending file name
    attempts: HashMap<String, u32>,
}

/// Counters for one pipeline cycle
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub scheduled: usize,
    pub transcription_failures: usize,
    pub extraction_misses: usize,
    pub calendar_failures: usize,
    pub archive_failures: usize,
    pub unreadable: usize,
    pub quarantined: usize,
}

impl CycleReport {
    /// Files touched this cycle
    pub fn attempted(&self) -> usize {
        self.scheduled
            + self.transcription_failures
            + self.extraction_misses
            + self.calendar_failures
            + self.unreadable
    }
}

/// Outcome of processing one file, up to (not including) archiving
enum FileOutcome {
    Scheduled { event_id: String },
    Unreadable(std::io::Error),
    TranscriptionFailed(TranscribeError),
    NoSchedule,
    CalendarFailed(CalendarError),
}

impl IngestionScheduler {
    pub fn new(
        registry: FileRegistry,
        transcriber: Arc<dyn Transcriber>,
        calendar: Arc<dyn Calendar>,
        call_timeout: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            registry,
            transcriber,
            calendar,
            call_timeout,
            max_attempts,
            attempts: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    /// Run cycles on a fixed interval until the shutdown signal fires.
    pub async fn run(&mut self, interval: Duration, mut shutdown: oneshot::Receiver<()>) {
        let mut ticker = time::interval(interval);
        // A cycle longer than the interval delays the next tick instead of
        // letting two runs race on the same listing.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(every_secs = interval.as_secs(), "ingestion scheduler started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.run_cycle().await {
                        Ok(report) if report.attempted() > 0 => {
                            info!(
                                scheduled = report.scheduled,
                                retried_next_cycle = report.attempted() - report.scheduled,
                                quarantined = report.quarantined,
                                "cycle finished"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!(error = %e, "cycle failed, retrying at next tick");
                        }
                    }
                }
                _ = &mut shutdown => {
                    info!("ingestion scheduler stopping");
                    break;
                }
            }
        }
    }

    /// Execute one full cycle.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, RegistryError> {
        // Re-ensure the directory layout; a transient bootstrap failure is
        // recovered by the next tick.
        self.registry.bootstrap().await?;

        let pending = self.registry.list_pending().await?;
        let mut report = CycleReport::default();

        if pending.is_empty() {
            debug!("no pending files");
            return Ok(report);
        }

        info!(files = pending.len(), "cycle started");

        for file in &pending {
            match self.process_file(file).await {
                FileOutcome::Scheduled { event_id } => {
                    info!(file = %file.file_name, event = %event_id, "event scheduled");
                    report.scheduled += 1;
                    self.attempts.remove(&file.file_name);

                    if let Err(e) = self.registry.archive(file).await {
                        // The event already exists; the file staying pending
                        // risks a duplicate on the next cycle, bounded by the
                        // idempotency key the provider saw.
                        error!(
                            file = %file.file_name,
                            event = %event_id,
                            error = %e,
                            "archive failed after successful schedule"
                        );
                        report.archive_failures += 1;
                        self.note_failure(file, &mut report).await;
                    }
                }
                FileOutcome::Unreadable(e) => {
                    warn!(file = %file.file_name, error = %e, "could not read audio, skipping");
                    report.unreadable += 1;
                    self.note_failure(file, &mut report).await;
                }
                FileOutcome::TranscriptionFailed(e) => {
                    warn!(file = %file.file_name, error = %e, "transcription failed, skipping");
                    report.transcription_failures += 1;
                    self.note_failure(file, &mut report).await;
                }
                FileOutcome::NoSchedule => {
                    warn!(file = %file.file_name, "no date/time recognized in transcript");
                    report.extraction_misses += 1;
                    self.note_failure(file, &mut report).await;
                }
                FileOutcome::CalendarFailed(e) => {
                    warn!(file = %file.file_name, error = %e, "calendar rejected event, skipping");
                    report.calendar_failures += 1;
                    self.note_failure(file, &mut report).await;
                }
            }
        }

        Ok(report)
    }

    /// Transcribe, extract and schedule one file. Archiving is the caller's
    /// step so its failure can be surfaced separately.
    async fn process_file(&self, file: &AudioFile) -> FileOutcome {
        let audio = match tokio::fs::read(&file.path).await {
            Ok(bytes) => bytes,
            Err(e) => return FileOutcome::Unreadable(e),
        };

        let idempotency_key = content_key(&audio);

        let transcript =
            match time::timeout(self.call_timeout, self.transcriber.transcribe(&audio)).await {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => return FileOutcome::TranscriptionFailed(e),
                Err(_) => {
                    return FileOutcome::TranscriptionFailed(TranscribeError::Timeout(
                        self.call_timeout.as_secs(),
                    ))
                }
            };

        debug!(file = %file.file_name, transcript = %transcript, "transcribed");

        let schedule = match extract::extract(&transcript) {
            Some(s) => s,
            None => return FileOutcome::NoSchedule,
        };

        let request = EventRequest {
            summary: format!("Agendamento - {}", file.file_name),
            description: format!("Transcrição: {}", transcript),
            start: schedule.start,
            end: schedule.end,
            idempotency_key,
        };

        match time::timeout(self.call_timeout, self.calendar.create_event(&request)).await {
            Ok(Ok(event_id)) => FileOutcome::Scheduled { event_id },
            Ok(Err(e)) => FileOutcome::CalendarFailed(e),
            Err(_) => FileOutcome::CalendarFailed(CalendarError::Timeout(
                self.call_timeout.as_secs(),
            )),
        }
    }

    /// Count a failed cycle for a file and dead-letter it once the budget
    /// is spent.
    async fn note_failure(&mut self, file: &AudioFile, report: &mut CycleReport) {
        let attempts = self.attempts.entry(file.file_name.clone()).or_insert(0);
        *attempts += 1;

        if *attempts >= self.max_attempts {
            match self.registry.quarantine(file).await {
                Ok(()) => {
                    error!(
                        file = %file.file_name,
                        attempts = *attempts,
                        "retry budget exhausted, moved to failed/"
                    );
                    report.quarantined += 1;
                    self.attempts.remove(&file.file_name);
                }
                Err(e) => {
                    warn!(file = %file.file_name, error = %e, "could not quarantine file");
                }
            }
        }
    }
}

/// Stable per-content key: SHA-256 of the audio bytes, first 12 hex chars.
pub fn content_key(audio: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(audio);
    hex::encode(hasher.finalize())[..12].to_string()
}
