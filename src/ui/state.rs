//! Display state for the chat window
//!
//! Plain data with no egui types, so the turn controller can drive it in
//! tests exactly as it does on screen.

use crate::integration::Presenter;
use crate::messages::{Speaker, Status, TranscriptEntry};
use crate::speech::VoiceTable;

#[derive(Debug, Clone)]
pub struct ChatView {
    pub transcript: Vec<TranscriptEntry>,
    pub status: Status,
    pub inputs_enabled: bool,
    /// Selected language code
    pub language: String,
    /// Codes offered in the language selector
    pub languages: Vec<String>,
    /// Contents of the text entry
    pub input_text: String,
}

impl ChatView {
    pub fn new(languages: Vec<String>, language: impl Into<String>) -> Self {
        Self {
            transcript: Vec::new(),
            status: Status::Idle,
            inputs_enabled: true,
            language: language.into(),
            languages,
            input_text: String::new(),
        }
    }

    pub fn from_voices(voices: &VoiceTable) -> Self {
        Self::new(voices.languages(), voices.default_language())
    }

    /// Transcript as (speaker, text) pairs
    pub fn entries(&self) -> Vec<(Speaker, &str)> {
        self.transcript
            .iter()
            .map(|entry| (entry.speaker, entry.text.as_str()))
            .collect()
    }
}

impl Default for ChatView {
    fn default() -> Self {
        Self::from_voices(&VoiceTable::default())
    }
}

impl Presenter for ChatView {
    fn append_transcript(&mut self, entry: TranscriptEntry) {
        self.transcript.push(entry);
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    fn set_inputs_enabled(&mut self, enabled: bool) {
        self.inputs_enabled = enabled;
    }

    fn language(&self) -> String {
        self.language.clone()
    }
}
