//! Configuration for the ingestion pipeline.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (AGENDAVOZ_UPLOAD_DIR, AGENDAVOZ_INTERVAL_SECS,
//!    AGENDAVOZ_SPEECH_API_KEY, AGENDAVOZ_CALENDAR_TOKEN)
//! 2. Config file (agendavoz.yaml)
//! 3. Defaults
//!
//! Config file discovery searches the current directory and its parents.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default scheduling interval between pipeline cycles.
pub const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub upload_dir: Option<String>,
    pub interval_secs: Option<u64>,
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    pub call_timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub listen_addr: Option<SocketAddr>,
    #[serde(default)]
    pub speech: Option<SpeechFileConfig>,
    #[serde(default)]
    pub calendar: Option<CalendarFileConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeechFileConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub language: Option<String>,
    pub sample_rate_hz: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarFileConfig {
    pub endpoint: Option<String>,
    pub calendar_id: Option<String>,
    pub token: Option<String>,
}

/// Speech collaborator settings
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub endpoint: String,
    pub api_key: String,
    pub language: String,
    pub sample_rate_hz: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://speech.googleapis.com".to_string(),
            api_key: String::new(),
            language: "pt-BR".to_string(),
            sample_rate_hz: 16_000,
        }
    }
}

/// Calendar collaborator settings
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    pub endpoint: String,
    pub calendar_id: String,
    pub token: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.googleapis.com/calendar/v3".to_string(),
            calendar_id: "primary".to_string(),
            token: String::new(),
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Upload root holding pending audio files
    pub upload_dir: PathBuf,

    /// Seconds between pipeline cycles
    pub interval_secs: u64,

    /// Recognized audio extensions
    pub extensions: Vec<String>,

    /// Per-collaborator-call timeout in seconds
    pub call_timeout_secs: u64,

    /// Failed cycles per file before it is dead-lettered
    pub max_attempts: u32,

    /// Upload endpoint bind address
    pub listen_addr: SocketAddr,

    pub speech: SpeechConfig,
    pub calendar: CalendarConfig,

    /// Path to the config file, if one was found
    pub config_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("audio-uploads"),
            interval_secs: DEFAULT_INTERVAL_SECS,
            extensions: vec!["wav".to_string()],
            call_timeout_secs: 30,
            max_attempts: 5,
            listen_addr: "127.0.0.1:8080".parse().expect("valid default address"),
            speech: SpeechConfig::default(),
            calendar: CalendarConfig::default(),
            config_file: None,
        }
    }
}

impl AppConfig {
    /// Load configuration: explicit file if given, discovered file otherwise,
    /// then environment overrides on top.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file_path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let mut config = match &file_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                let parsed: ConfigFile = serde_yaml::from_str(&raw)
                    .with_context(|| format!("invalid config file {}", path.display()))?;
                Self::from_file(parsed)
            }
            None => Self::default(),
        };
        config.config_file = file_path;

        config.apply_env();
        Ok(config)
    }

    fn from_file(file: ConfigFile) -> Self {
        let defaults = Self::default();
        let speech_file = file.speech.unwrap_or_default();
        let calendar_file = file.calendar.unwrap_or_default();

        Self {
            upload_dir: file
                .upload_dir
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            interval_secs: file.interval_secs.unwrap_or(defaults.interval_secs),
            extensions: file.extensions.unwrap_or(defaults.extensions),
            call_timeout_secs: file
                .call_timeout_secs
                .unwrap_or(defaults.call_timeout_secs),
            max_attempts: file.max_attempts.unwrap_or(defaults.max_attempts),
            listen_addr: file.listen_addr.unwrap_or(defaults.listen_addr),
            speech: SpeechConfig {
                endpoint: speech_file.endpoint.unwrap_or(defaults.speech.endpoint),
                api_key: speech_file.api_key.unwrap_or(defaults.speech.api_key),
                language: speech_file.language.unwrap_or(defaults.speech.language),
                sample_rate_hz: speech_file
                    .sample_rate_hz
                    .unwrap_or(defaults.speech.sample_rate_hz),
            },
            calendar: CalendarConfig {
                endpoint: calendar_file
                    .endpoint
                    .unwrap_or(defaults.calendar.endpoint),
                calendar_id: calendar_file
                    .calendar_id
                    .unwrap_or(defaults.calendar.calendar_id),
                token: calendar_file.token.unwrap_or(defaults.calendar.token),
            },
            config_file: None,
        }
    }

    fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var("AGENDAVOZ_UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(dir);
        }
        if let Some(secs) = std::env::var("AGENDAVOZ_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.interval_secs = secs;
        }
        if let Ok(key) = std::env::var("AGENDAVOZ_SPEECH_API_KEY") {
            self.speech.api_key = key;
        }
        if let Ok(token) = std::env::var("AGENDAVOZ_CALENDAR_TOKEN") {
            self.calendar.token = token;
        }
    }
}

/// Find agendavoz.yaml by searching the current directory and parents.
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let candidate = current.join("agendavoz.yaml");
        if candidate.exists() {
            return Some(candidate);
        }

        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let config = AppConfig::default();
        assert_eq!(config.interval_secs, 300);
        assert_eq!(config.extensions, vec!["wav".to_string()]);
        assert_eq!(config.upload_dir, PathBuf::from("audio-uploads"));
        assert_eq!(config.speech.language, "pt-BR");
        assert_eq!(config.speech.sample_rate_hz, 16_000);
        assert_eq!(config.calendar.calendar_id, "primary");
    }

    #[test]
    fn file_values_override_defaults() {
        let parsed: ConfigFile = serde_yaml::from_str(
            r#"
upload_dir: /srv/voz
interval_secs: 60
extensions: [wav, flac]
speech:
  language: pt-PT
calendar:
  calendar_id: team
"#,
        )
        .unwrap();

        let config = AppConfig::from_file(parsed);
        assert_eq!(config.upload_dir, PathBuf::from("/srv/voz"));
        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.extensions, vec!["wav".to_string(), "flac".to_string()]);
        assert_eq!(config.speech.language, "pt-PT");
        // Untouched sections keep their defaults
        assert_eq!(config.speech.sample_rate_hz, 16_000);
        assert_eq!(config.calendar.calendar_id, "team");
        assert_eq!(config.max_attempts, 5);
    }
}
