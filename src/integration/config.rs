//! Application configuration
//!
//! Loaded once at startup from a TOML file. Every field has a default, so a
//! missing file or a partial one is fine.

use crate::llm::config::InferenceConfig;
use crate::speech::stt::RecognitionConfig;
use crate::speech::tts::SpeechConfig;
use crate::speech::voices::VoiceConfig;
use crate::{MurmurError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "MURMUR_CONFIG";

/// Presentation settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// How long "Cancelled" stays on the status line before "Ready"
    pub cancel_idle_delay_ms: u64,
    /// Log file written next to the console log
    pub log_file: Option<PathBuf>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            cancel_idle_delay_ms: 1500,
            log_file: dirs::data_dir().map(|dir| dir.join("murmur").join("murmur.log")),
        }
    }
}

impl UiConfig {
    pub fn cancel_idle_delay(&self) -> Duration {
        Duration::from_millis(self.cancel_idle_delay_ms)
    }
}

/// Configuration for the whole application
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub inference: InferenceConfig,
    pub recognition: RecognitionConfig,
    pub speech: SpeechConfig,
    pub voices: VoiceConfig,
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load from `$MURMUR_CONFIG`, else the user config dir, else defaults
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::from_file(PathBuf::from(path));
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(path),
            _ => {
                debug!("No config file found, using defaults");
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// `<config dir>/murmur/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("murmur").join("config.toml"))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            MurmurError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&contents)
            .map_err(|e| MurmurError::ConfigError(format!("{}: {}", path.display(), e)))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| MurmurError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the inference configuration
    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }

    /// Set the recognition configuration
    pub fn with_recognition(mut self, recognition: RecognitionConfig) -> Self {
        self.recognition = recognition;
        self
    }

    /// Set the speech configuration
    pub fn with_speech(mut self, speech: SpeechConfig) -> Self {
        self.speech = speech;
        self
    }

    /// Set the voice table
    pub fn with_voices(mut self, voices: VoiceConfig) -> Self {
        self.voices = voices;
        self
    }

    /// Set the delay between "Cancelled" and "Ready"
    pub fn with_cancel_idle_delay(mut self, delay: Duration) -> Self {
        self.ui.cancel_idle_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(MurmurError::ConfigError(msg.to_string()));

        if self.inference.endpoint.trim().is_empty() {
            return fail("inference.endpoint must not be empty");
        }
        if self.inference.model.trim().is_empty() {
            return fail("inference.model must not be empty");
        }
        if self.inference.timeout_secs == 0 {
            return fail("inference.timeout_secs must be positive");
        }
        if self.recognition.endpoint.trim().is_empty() {
            return fail("recognition.endpoint must not be empty");
        }
        if self.recognition.timeout_secs == 0 {
            return fail("recognition.timeout_secs must be positive");
        }
        if self.recognition.start_timeout_secs <= 0.0 || self.recognition.phrase_limit_secs <= 0.0
        {
            return fail("recognition timeouts must be positive");
        }
        if self.speech.slow_rate == 0 || self.speech.fast_rate == 0 {
            return fail("speech rates must be positive");
        }
        if self.speech.command.trim().is_empty() {
            return fail("speech.command must not be empty");
        }
        if self.voices.profiles.is_empty() {
            return fail("voices.profiles must not be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.inference.model, "llama3.2:1b");
        assert_eq!(config.speech.rate_for(true), 180);
        assert_eq!(config.voices.default_language, "de");
        assert_eq!(config.ui.cancel_idle_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [inference]
            model = "qwen2.5:0.5b"

            [voices.profiles.es]
            voice = "Monica"
            locale = "es-ES"
            "#,
        )
        .unwrap();

        assert_eq!(config.inference.model, "qwen2.5:0.5b");
        assert_eq!(config.inference.endpoint, "http://localhost:11434/api/generate");
        assert_eq!(config.voices.profiles["es"].voice, "Monica");
        assert_eq!(config.voices.profiles.len(), 1);
        assert_eq!(config.recognition.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = AppConfig::from_toml_str("[speech]\nslow_rate = 0\n").unwrap_err();
        assert!(matches!(err, MurmurError::ConfigError(_)));

        let err = AppConfig::from_toml_str("[inference]\nmodel = \"\"\n").unwrap_err();
        assert!(matches!(err, MurmurError::ConfigError(_)));
    }

    #[test]
    fn test_syntax_error() {
        let err = AppConfig::from_toml_str("[inference\nmodel = 1").unwrap_err();
        assert!(matches!(err, MurmurError::ConfigError(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ui]\ncancel_idle_delay_ms = 250").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.ui.cancel_idle_delay_ms, 250);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, MurmurError::ConfigError(_)));
    }

    #[test]
    fn test_builder() {
        let config = AppConfig::default()
            .with_inference(InferenceConfig::new("phi3"))
            .with_cancel_idle_delay(Duration::from_millis(10));
        assert_eq!(config.inference.model, "phi3");
        assert_eq!(config.ui.cancel_idle_delay_ms, 10);
    }
}
