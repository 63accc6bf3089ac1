//! Language-model inference over the local HTTP server

pub mod config;
pub mod inference;

pub use config::InferenceConfig;
pub use inference::{OllamaClient, ResponseGenerator, EMPTY_REPLY_PLACEHOLDER};
