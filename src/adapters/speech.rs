//! REST adapter for the speech-to-text collaborator.
//!
//! Speaks the Google-style `speech:recognize` contract: one JSON request
//! carrying LINEAR16/16 kHz/pt-BR recognition settings and the base64
//! audio payload, one JSON response with ranked alternatives per segment.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use super::{Transcriber, TranscribeError};
use crate::config::SpeechConfig;

/// Speech-to-text REST client
pub struct SpeechApiClient {
    endpoint: String,
    api_key: String,
    language: String,
    sample_rate_hz: u32,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    audio: RecognitionAudio,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    encoding: &'a str,
    sample_rate_hertz: u32,
    language_code: &'a str,
}

#[derive(Debug, Serialize)]
struct RecognitionAudio {
    /// Base64-encoded PCM16 content
    content: String,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Debug, Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
}

impl SpeechApiClient {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            sample_rate_hz: config.sample_rate_hz,
            client: reqwest::Client::new(),
        }
    }

    fn recognize_url(&self) -> String {
        format!("{}/v1/speech:recognize?key={}", self.endpoint, self.api_key)
    }

    /// Concatenate the top alternative of each segment, in provider order.
    fn collect_transcript(response: RecognizeResponse) -> Result<String, TranscribeError> {
        let mut transcript = String::new();
        for result in &response.results {
            match result.alternatives.first() {
                Some(alt) => transcript.push_str(&alt.transcript),
                None => {
                    return Err(TranscribeError::MalformedResponse(
                        "result segment with no alternatives".to_string(),
                    ))
                }
            }
        }
        Ok(transcript)
    }
}

#[async_trait]
impl Transcriber for SpeechApiClient {
    fn name(&self) -> &str {
        "speech-api"
    }

    async fn transcribe(&self, audio: &[u8]) -> Result<String, TranscribeError> {
        let request = RecognizeRequest {
            config: RecognitionConfig {
                encoding: "LINEAR16",
                sample_rate_hertz: self.sample_rate_hz,
                language_code: &self.language,
            },
            audio: RecognitionAudio {
                content: BASE64.encode(audio),
            },
        };

        let response = self
            .client
            .post(self.recognize_url())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscribeError::Provider(format!(
                "status {}: {}",
                status, body
            )));
        }

        let parsed: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| TranscribeError::MalformedResponse(e.to_string()))?;

        Self::collect_transcript(parsed)
    }
}
