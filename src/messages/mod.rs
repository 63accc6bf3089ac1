pub mod types;

pub use types::{Speaker, Status, StatusTone, TranscriptEntry};
