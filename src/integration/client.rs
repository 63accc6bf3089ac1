//! Facade over inference, recognition and speech synthesis

use crate::integration::config::AppConfig;
use crate::llm::{OllamaClient, ResponseGenerator};
use crate::speech::{
    select_synthesizer, MicrophoneRecognizer, SpeechConfig, SpeechRecognizer, SpeechSynthesizer,
    VoiceTable,
};
use crate::Result;
use std::sync::Arc;
use tracing::debug;

/// Stateless access to the model, the microphone and the speech command
///
/// Cheap to clone; the worker and the controller each hold one.
#[derive(Clone)]
pub struct InferenceClient {
    generator: Arc<dyn ResponseGenerator>,
    recognizer: Arc<dyn SpeechRecognizer>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    voices: Arc<VoiceTable>,
    speech: SpeechConfig,
}

impl InferenceClient {
    pub fn new(
        generator: Arc<dyn ResponseGenerator>,
        recognizer: Arc<dyn SpeechRecognizer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            generator,
            recognizer,
            synthesizer,
            voices: Arc::new(VoiceTable::default()),
            speech: SpeechConfig::default(),
        }
    }

    /// Use a different voice table
    pub fn with_voices(mut self, voices: VoiceTable) -> Self {
        self.voices = Arc::new(voices);
        self
    }

    /// Use different speech rates
    pub fn with_speech_config(mut self, speech: SpeechConfig) -> Self {
        self.speech = speech;
        self
    }

    /// Build the production client: HTTP inference, microphone recognition
    /// and the platform synthesizer
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let generator = Arc::new(OllamaClient::new(config.inference.clone())?);
        let recognizer = Arc::new(MicrophoneRecognizer::new(&config.recognition)?);
        let synthesizer = select_synthesizer(&config.speech);

        Ok(Self::new(generator, recognizer, synthesizer)
            .with_voices(VoiceTable::from_config(&config.voices))
            .with_speech_config(config.speech.clone()))
    }

    /// Send `prompt` to the model and return its reply
    ///
    /// # Errors
    /// `ConnectionError` or `MalformedResponseError`
    pub fn generate_response(&self, prompt: &str) -> Result<String> {
        self.generator.generate(prompt)
    }

    /// Speak `text` in the voice for `language_code`, blocking until done
    ///
    /// # Errors
    /// `UnsupportedPlatformError` or `SpeechSynthesisError`
    pub fn speak(&self, text: &str, language_code: &str, slow: bool) -> Result<()> {
        self.speak_since(self.speech_interruptions(), text, language_code, slow)
    }

    /// Like [`speak`](Self::speak), but silent when [`interrupt_speech`]
    /// ran after `since` was read from [`speech_interruptions`]
    ///
    /// [`interrupt_speech`]: Self::interrupt_speech
    /// [`speech_interruptions`]: Self::speech_interruptions
    pub fn speak_since(
        &self,
        since: u64,
        text: &str,
        language_code: &str,
        slow: bool,
    ) -> Result<()> {
        let profile = self.voices.resolve(language_code);
        let rate = self.speech.rate_for(slow);
        debug!(
            "Speaking via {} with {} at {} wpm",
            self.synthesizer.name(),
            profile.voice,
            rate
        );
        self.synthesizer.say_since(since, &profile.voice, rate, text)
    }

    /// Interrupt counter of the synthesizer, for [`speak_since`](Self::speak_since)
    pub fn speech_interruptions(&self) -> u64 {
        self.synthesizer.interruptions()
    }

    /// Capture one phrase and return its transcript
    ///
    /// # Errors
    /// `NoMicrophoneError`, `UnintelligibleSpeechError` or `RecognitionServiceError`
    pub fn listen(&self, language_code: &str) -> Result<String> {
        let profile = self.voices.resolve(language_code);
        debug!("Listening for {} ({})", language_code, profile.locale);
        self.recognizer.recognize(&profile.locale)
    }

    /// Stop any utterance in progress
    pub fn interrupt_speech(&self) {
        self.synthesizer.interrupt();
    }

    pub fn voices(&self) -> &VoiceTable {
        &self.voices
    }
}
