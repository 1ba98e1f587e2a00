//! Upload-directory registry for pending audio files.
//!
//! The directory layout is the registry's only state: pending files sit in
//! the upload root, archived files under `processed/`, dead-lettered files
//! under `failed/`. Uploads write into the root concurrently; the pipeline
//! is the sole reader/mover.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;

use crate::domain::AudioFile;

/// Subdirectory for files that produced a calendar event.
pub const PROCESSED_DIR: &str = "processed";

/// Subdirectory for files that exhausted their retry budget.
pub const FAILED_DIR: &str = "failed";

/// Errors that can occur with the registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("could not create directory {path}: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Registry over one upload directory.
pub struct FileRegistry {
    upload_dir: PathBuf,
    extensions: Vec<String>,
}

impl FileRegistry {
    pub fn new(upload_dir: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            extensions,
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.upload_dir.join(PROCESSED_DIR)
    }

    pub fn failed_dir(&self) -> PathBuf {
        self.upload_dir.join(FAILED_DIR)
    }

    /// Create the upload root and its sublocations if absent.
    ///
    /// Called once at startup; safe to call again (a transient failure is
    /// retried at the next cycle).
    pub async fn bootstrap(&self) -> Result<(), RegistryError> {
        for dir in [
            self.upload_dir.clone(),
            self.processed_dir(),
            self.failed_dir(),
        ] {
            fs::create_dir_all(&dir)
                .await
                .map_err(|source| RegistryError::Directory { path: dir.clone(), source })?;
        }
        Ok(())
    }

    /// Snapshot of pending files: regular files in the upload root whose
    /// name ends in a recognized audio extension, case-insensitively.
    ///
    /// Archived files live in subdirectories and are never listed. Files
    /// created mid-scan may or may not appear; there is no consistency
    /// guarantee across concurrent uploaders.
    pub async fn list_pending(&self) -> Result<Vec<AudioFile>, RegistryError> {
        let mut pending = Vec::new();

        let mut entries = fs::read_dir(&self.upload_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            if !self.is_audio_file(&path) {
                continue;
            }

            let metadata = match fs::metadata(&path).await {
                Ok(m) => m,
                Err(_) => continue,
            };

            if !metadata.is_file() {
                continue;
            }

            pending.push(AudioFile::pending(path, metadata.len()));
        }

        // Stable processing order within a cycle
        pending.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        Ok(pending)
    }

    /// Move a file into `processed/`. Idempotent: if the file is already
    /// archived (source gone, destination present) this is a no-op success.
    pub async fn archive(&self, file: &AudioFile) -> Result<(), RegistryError> {
        self.relocate(file, &self.processed_dir()).await
    }

    /// Dead-letter a file into `failed/` once its retry budget is spent.
    pub async fn quarantine(&self, file: &AudioFile) -> Result<(), RegistryError> {
        self.relocate(file, &self.failed_dir()).await
    }

    async fn relocate(&self, file: &AudioFile, dest_dir: &Path) -> Result<(), RegistryError> {
        let dest = dest_dir.join(&file.file_name);

        if fs::try_exists(&dest).await? && !fs::try_exists(&file.path).await? {
            tracing::debug!(file = %file.file_name, "already moved, nothing to do");
            return Ok(());
        }

        fs::rename(&file.path, &dest).await?;
        Ok(())
    }

    /// Check if a path carries one of the recognized audio extensions.
    fn is_audio_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn registry_in(temp: &TempDir) -> FileRegistry {
        let registry = FileRegistry::new(temp.path(), vec!["wav".to_string()]);
        registry.bootstrap().await.unwrap();
        registry
    }

    #[tokio::test]
    async fn bootstrap_creates_sublocations() {
        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp).await;

        assert!(registry.processed_dir().is_dir());
        assert!(registry.failed_dir().is_dir());

        // Repeat bootstrap is harmless
        registry.bootstrap().await.unwrap();
    }

    #[tokio::test]
    async fn list_pending_filters_by_extension_case_insensitively() {
        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp).await;

        tokio::fs::write(temp.path().join("a.wav"), b"riff").await.unwrap();
        tokio::fs::write(temp.path().join("b.WAV"), b"riff").await.unwrap();
        tokio::fs::write(temp.path().join("notes.txt"), b"text").await.unwrap();
        tokio::fs::write(temp.path().join("noext"), b"??").await.unwrap();

        let pending = registry.list_pending().await.unwrap();
        let names: Vec<&str> = pending.iter().map(|f| f.file_name.as_str()).collect();

        assert_eq!(names, vec!["a.wav", "b.WAV"]);
    }

    #[tokio::test]
    async fn archived_files_disappear_from_listing() {
        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp).await;

        tokio::fs::write(temp.path().join("memo.wav"), b"riff").await.unwrap();

        let pending = registry.list_pending().await.unwrap();
        assert_eq!(pending.len(), 1);

        registry.archive(&pending[0]).await.unwrap();

        assert!(registry.list_pending().await.unwrap().is_empty());
        assert!(registry.processed_dir().join("memo.wav").is_file());
    }

    #[tokio::test]
    async fn archive_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp).await;

        tokio::fs::write(temp.path().join("memo.wav"), b"riff").await.unwrap();
        let file = registry.list_pending().await.unwrap().remove(0);

        registry.archive(&file).await.unwrap();
        // Second archive of the same file is a no-op, not data loss
        registry.archive(&file).await.unwrap();

        assert!(registry.processed_dir().join("memo.wav").is_file());
    }

    #[tokio::test]
    async fn quarantine_moves_into_failed() {
        let temp = TempDir::new().unwrap();
        let registry = registry_in(&temp).await;

        tokio::fs::write(temp.path().join("memo.wav"), b"riff").await.unwrap();
        let file = registry.list_pending().await.unwrap().remove(0);

        registry.quarantine(&file).await.unwrap();

        assert!(registry.list_pending().await.unwrap().is_empty());
        assert!(registry.failed_dir().join("memo.wav").is_file());
    }
}
