//! Language code to voice/locale mapping

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// The OS voice and recognition locale used for one language
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// Voice name as understood by the speech command
    pub voice: String,
    /// Locale sent to the recognition service, e.g. `de-DE`
    pub locale: String,
}

impl VoiceProfile {
    pub fn new(voice: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            voice: voice.into(),
            locale: locale.into(),
        }
    }
}

/// Voice table as read from the `[voices]` config section
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Language preselected in the UI
    pub default_language: String,
    /// Profile for codes missing from `profiles`
    pub default_voice: VoiceProfile,
    pub profiles: BTreeMap<String, VoiceProfile>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        let profiles = [
            ("en", "Karen", "en-US"),
            ("it", "Alice", "it-IT"),
            ("sv", "Alva", "sv-SE"),
            ("fr", "Amelie", "fr-FR"),
            ("de", "Anna", "de-DE"),
            ("ar", "Majed", "ar-SA"),
        ]
        .into_iter()
        .map(|(code, voice, locale)| (code.to_string(), VoiceProfile::new(voice, locale)))
        .collect();

        Self {
            default_language: "de".to_string(),
            default_voice: VoiceProfile::new("Karen", "en-US"),
            profiles,
        }
    }
}

/// Read-only lookup built once at startup
#[derive(Clone, Debug)]
pub struct VoiceTable {
    default_language: String,
    fallback: VoiceProfile,
    profiles: BTreeMap<String, VoiceProfile>,
}

impl VoiceTable {
    pub fn from_config(config: &VoiceConfig) -> Self {
        Self {
            default_language: config.default_language.clone(),
            fallback: config.default_voice.clone(),
            profiles: config.profiles.clone(),
        }
    }

    /// Profile for `language_code`, or the default profile when unmapped
    pub fn resolve(&self, language_code: &str) -> &VoiceProfile {
        match self.profiles.get(language_code) {
            Some(profile) => profile,
            None => {
                debug!("No voice for '{}', using default", language_code);
                &self.fallback
            }
        }
    }

    /// Configured language codes in sorted order
    pub fn languages(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }
}

impl Default for VoiceTable {
    fn default() -> Self {
        Self::from_config(&VoiceConfig::default())
    }
}
