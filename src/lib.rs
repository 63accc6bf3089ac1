pub mod audio;
pub mod integration;
pub mod llm;
pub mod messages;
pub mod speech;
pub mod ui;
pub mod utils;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MurmurError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Malformed response: {0}")]
    MalformedResponseError(String),

    #[error("No microphone: {0}")]
    NoMicrophoneError(String),

    #[error("Unintelligible speech: {0}")]
    UnintelligibleSpeechError(String),

    #[error("Recognition service error: {0}")]
    RecognitionServiceError(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatformError(String),

    #[error("Speech synthesis error: {0}")]
    SpeechSynthesisError(String),

    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Display error: {0}")]
    DisplayError(String),
}

impl From<std::io::Error> for MurmurError {
    fn from(e: std::io::Error) -> Self {
        MurmurError::IOError(e.to_string())
    }
}

impl MurmurError {
    /// Check if this error is recoverable
    ///
    /// Everything a turn can raise is recoverable at the turn boundary; only
    /// startup and environment failures end the process.
    pub fn is_recoverable(&self) -> bool {
        match self {
            MurmurError::ConnectionError(_) => true,
            MurmurError::MalformedResponseError(_) => true,
            MurmurError::NoMicrophoneError(_) => true,
            MurmurError::UnintelligibleSpeechError(_) => true,
            MurmurError::RecognitionServiceError(_) => true,
            MurmurError::UnsupportedPlatformError(_) => true,
            MurmurError::SpeechSynthesisError(_) => true,
            MurmurError::AudioDeviceError(_) => true,
            MurmurError::ConfigError(_) => false,
            MurmurError::IOError(_) => false,
            MurmurError::ChannelError(_) => false,
            MurmurError::DisplayError(_) => false,
        }
    }

    /// Get a user-friendly description
    pub fn user_message(&self) -> String {
        match self {
            MurmurError::ConnectionError(_) => {
                "Could not reach the inference server.".to_string()
            }
            MurmurError::MalformedResponseError(_) => {
                "The inference server sent an invalid reply.".to_string()
            }
            MurmurError::NoMicrophoneError(_) => {
                "No microphone found. Make sure one is connected.".to_string()
            }
            MurmurError::UnintelligibleSpeechError(_) => {
                "I could not understand that.".to_string()
            }
            MurmurError::RecognitionServiceError(_) => {
                "Could not reach the speech recognition service.".to_string()
            }
            MurmurError::UnsupportedPlatformError(_) => {
                "Spoken replies are not available on this system.".to_string()
            }
            MurmurError::SpeechSynthesisError(_) => {
                "The reply could not be spoken.".to_string()
            }
            MurmurError::AudioDeviceError(_) => {
                "Audio device error. Please check your microphone.".to_string()
            }
            MurmurError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            MurmurError::IOError(_) => "File system error occurred.".to_string(),
            MurmurError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            MurmurError::DisplayError(_) => "The window could not be opened.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MurmurError>;
