//! Desktop chat window built with egui/eframe

mod app;
mod components;
pub mod dialog;
mod state;
mod theme;

pub use app::MurmurApp;
pub use dialog::show_fatal_error;
pub use state::ChatView;
pub use theme::Theme;

use crate::integration::{AppConfig, InferenceClient, TurnController};
use crate::{MurmurError, Result};
use tracing::info;

/// Open the chat window and block until it is closed
pub fn run(config: &AppConfig) -> Result<()> {
    let client = InferenceClient::from_config(config)?;
    let view = ChatView::from_voices(client.voices());
    let controller =
        TurnController::new(client, view)?.with_idle_delay(config.ui.cancel_idle_delay());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_min_inner_size([480.0, 360.0])
            .with_title("Murmur"),
        ..Default::default()
    };

    info!("Opening window");
    eframe::run_native(
        "Murmur",
        options,
        Box::new(move |cc| Ok(Box::new(MurmurApp::new(cc, controller)))),
    )
    .map_err(|e| MurmurError::DisplayError(e.to_string()))
}
