//! What the turn controller needs from a display

use crate::messages::{Status, TranscriptEntry};

/// Presentation surface driven by [`TurnController`](crate::integration::TurnController)
///
/// Called on the presentation thread only.
pub trait Presenter {
    fn append_transcript(&mut self, entry: TranscriptEntry);

    fn set_status(&mut self, status: Status);

    /// Enable or disable the send/speak controls
    fn set_inputs_enabled(&mut self, enabled: bool);

    /// Currently selected language code
    fn language(&self) -> String;
}
