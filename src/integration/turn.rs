//! One user-initiated request and its lifecycle

use std::fmt;

/// Monotonic identifier of a turn, starting at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TurnId(pub(crate) u64);

impl TurnId {
    pub fn get(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        TurnId(self.0 + 1)
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How the prompt was entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Text,
    Voice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    Pending,
    Transcribing,
    Inferring,
    Speaking,
    Done,
    Cancelled,
    Failed,
}

impl TurnStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TurnStatus::Done | TurnStatus::Cancelled | TurnStatus::Failed
        )
    }
}

impl fmt::Display for TurnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TurnStatus::Pending => "pending",
            TurnStatus::Transcribing => "transcribing",
            TurnStatus::Inferring => "inferring",
            TurnStatus::Speaking => "speaking",
            TurnStatus::Done => "done",
            TurnStatus::Cancelled => "cancelled",
            TurnStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Terminal result handed back to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Done,
    Cancelled,
    Failed,
}

impl From<TurnOutcome> for TurnStatus {
    fn from(outcome: TurnOutcome) -> Self {
        match outcome {
            TurnOutcome::Done => TurnStatus::Done,
            TurnOutcome::Cancelled => TurnStatus::Cancelled,
            TurnOutcome::Failed => TurnStatus::Failed,
        }
    }
}

/// A single request/response cycle, owned by the worker once dispatched
#[derive(Debug, Clone)]
pub struct Turn {
    pub id: TurnId,
    pub input_mode: InputMode,
    pub language_code: String,
    /// Known up front for text turns, after transcription for voice turns
    pub prompt_text: Option<String>,
    pub reply_text: Option<String>,
    status: TurnStatus,
}

impl Turn {
    pub fn text(id: TurnId, prompt: impl Into<String>, language_code: impl Into<String>) -> Self {
        Self {
            id,
            input_mode: InputMode::Text,
            language_code: language_code.into(),
            prompt_text: Some(prompt.into()),
            reply_text: None,
            status: TurnStatus::Pending,
        }
    }

    pub fn voice(id: TurnId, language_code: impl Into<String>) -> Self {
        Self {
            id,
            input_mode: InputMode::Voice,
            language_code: language_code.into(),
            prompt_text: None,
            reply_text: None,
            status: TurnStatus::Pending,
        }
    }

    pub fn status(&self) -> TurnStatus {
        self.status
    }

    /// Move to a non-terminal phase; ignored once the turn has ended
    pub fn advance(&mut self, status: TurnStatus) {
        debug_assert!(!status.is_terminal());
        if !self.status.is_terminal() {
            self.status = status;
        }
    }

    /// End the turn; only the first call has any effect
    pub fn finish(&mut self, outcome: TurnOutcome) -> TurnOutcome {
        if !self.status.is_terminal() {
            self.status = outcome.into();
        }
        match self.status {
            TurnStatus::Cancelled => TurnOutcome::Cancelled,
            TurnStatus::Failed => TurnOutcome::Failed,
            _ => TurnOutcome::Done,
        }
    }
}
