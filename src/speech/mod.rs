//! Speech in and out
//!
//! - Speech-to-text through a remote transcription service
//! - Text-to-speech through the OS speech command
//! - The language to voice/locale table both sides share

pub mod stt;
pub mod tts;
pub mod voices;

pub use stt::{MicrophoneRecognizer, RecognitionClient, RecognitionConfig, SpeechRecognizer};
pub use tts::{
    select_synthesizer, SaySynthesizer, SilentSynthesizer, SpeechConfig, SpeechSynthesizer,
};
pub use voices::{VoiceConfig, VoiceProfile, VoiceTable};
