//! Microphone capture, phrase detection and WAV encoding

pub mod buffer;
pub mod input;
pub mod phrase;
pub mod wav;

pub use buffer::AudioRingBuffer;
pub use input::{capture_phrase, CapturedPhrase};
pub use phrase::{PhraseDetector, PhraseProgress, PhraseSettings};
pub use wav::encode_wav;
