//! Turn orchestration between the presentation loop and the backends
//!
//! - [`InferenceClient`]: facade over inference, recognition and speech
//! - [`TurnController`]: starts, cancels and retires turns on the presentation thread
//! - [`TurnWorker`]: runs turns on a background thread and reports [`TurnEvent`]s

pub mod client;
pub mod config;
pub mod controller;
pub mod flag;
pub mod presenter;
pub mod turn;
pub mod worker;

pub use client::InferenceClient;
pub use config::{AppConfig, UiConfig};
pub use controller::{TurnController, DEFAULT_IDLE_DELAY};
pub use flag::ProcessingFlag;
pub use presenter::Presenter;
pub use turn::{InputMode, Turn, TurnId, TurnOutcome, TurnStatus};
pub use worker::{TurnEvent, TurnJob, TurnWorker};
