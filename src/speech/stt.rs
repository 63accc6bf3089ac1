//! Speech-to-text through a remote transcription service
//!
//! A phrase is captured from the microphone, encoded as WAV and posted as a
//! multipart form (`file`, `language`) to an OpenAI/Whisper-compatible
//! transcription endpoint that answers `{"text": ...}`.

use crate::audio::{capture_phrase, encode_wav, PhraseSettings};
use crate::utils::runtime::BlockingRuntime;
use crate::{MurmurError, Result};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for speech capture and recognition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Transcription endpoint URL
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Seconds to wait for speech to begin
    pub start_timeout_secs: f32,
    /// Maximum phrase length in seconds
    pub phrase_limit_secs: f32,
    /// Ambient noise calibration in seconds
    pub calibration_secs: f32,
    /// Silence in seconds that ends a phrase
    pub pause_secs: f32,
    /// Speech threshold relative to ambient energy
    pub energy_ratio: f32,
    /// Minimum speech threshold
    pub min_energy: f32,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        let phrase = PhraseSettings::default();
        Self {
            endpoint: "http://localhost:8080/v1/audio/transcriptions".to_string(),
            timeout_secs: 30,
            start_timeout_secs: phrase.start_timeout_secs,
            phrase_limit_secs: phrase.phrase_limit_secs,
            calibration_secs: phrase.calibration_secs,
            pause_secs: phrase.pause_secs,
            energy_ratio: phrase.energy_ratio,
            min_energy: phrase.min_energy,
        }
    }
}

impl RecognitionConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn phrase_settings(&self) -> PhraseSettings {
        PhraseSettings {
            calibration_secs: self.calibration_secs,
            start_timeout_secs: self.start_timeout_secs,
            pause_secs: self.pause_secs,
            phrase_limit_secs: self.phrase_limit_secs,
            energy_ratio: self.energy_ratio,
            min_energy: self.min_energy,
        }
    }
}

/// Turns one spoken phrase into text
pub trait SpeechRecognizer: Send + Sync {
    /// Listen for a phrase in `locale` (e.g. `de-DE`) and transcribe it
    fn recognize(&self, locale: &str) -> Result<String>;
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

/// HTTP client for the transcription service
pub struct RecognitionClient {
    endpoint: String,
    client: reqwest::Client,
    runtime: BlockingRuntime,
}

impl RecognitionClient {
    pub fn new(config: &RecognitionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| MurmurError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
            runtime: BlockingRuntime::new()?,
        })
    }

    /// Transcribe an encoded WAV file
    ///
    /// # Errors
    /// - `RecognitionServiceError` on network failure, timeout, non-2xx or an unreadable reply
    /// - `UnintelligibleSpeechError` when the service found no words
    pub fn transcribe(&self, wav: Vec<u8>, locale: &str) -> Result<String> {
        debug!("Uploading {} bytes of audio ({})", wav.len(), locale);
        let reply = self.runtime.block_on(self.post(wav, locale))?;

        let text = reply.text.trim();
        if text.is_empty() {
            return Err(MurmurError::UnintelligibleSpeechError(
                "service returned no text".into(),
            ));
        }
        info!("Transcribed: {}", text);
        Ok(text.to_string())
    }

    async fn post(&self, wav: Vec<u8>, locale: &str) -> Result<TranscriptionResponse> {
        let file = Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| MurmurError::RecognitionServiceError(e.to_string()))?;
        let form = Form::new()
            .part("file", file)
            .text("language", locale.to_string());

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| MurmurError::RecognitionServiceError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MurmurError::RecognitionServiceError(format!(
                "service answered {}",
                status
            )));
        }

        response
            .json::<TranscriptionResponse>()
            .await
            .map_err(|e| MurmurError::RecognitionServiceError(format!("bad reply: {}", e)))
    }
}

/// Default microphone plus the transcription service
pub struct MicrophoneRecognizer {
    settings: PhraseSettings,
    client: RecognitionClient,
}

impl MicrophoneRecognizer {
    pub fn new(config: &RecognitionConfig) -> Result<Self> {
        Ok(Self {
            settings: config.phrase_settings(),
            client: RecognitionClient::new(config)?,
        })
    }
}

impl SpeechRecognizer for MicrophoneRecognizer {
    fn recognize(&self, locale: &str) -> Result<String> {
        let phrase = capture_phrase(&self.settings)?;
        let wav = encode_wav(&phrase.samples, phrase.sample_rate)?;
        self.client.transcribe(wav, locale)
    }
}
