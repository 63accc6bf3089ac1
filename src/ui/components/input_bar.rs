//! Text entry with Send, Speak and Stop

use crate::ui::state::ChatView;
use crate::ui::theme::Theme;
use egui::{self, Key, RichText, Vec2};

/// What the user asked for this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Send,
    Speak,
    Stop,
}

pub struct InputBar<'a> {
    view: &'a mut ChatView,
    theme: &'a Theme,
    processing: bool,
}

impl<'a> InputBar<'a> {
    pub fn new(view: &'a mut ChatView, theme: &'a Theme, processing: bool) -> Self {
        Self {
            view,
            theme,
            processing,
        }
    }

    pub fn show(self, ui: &mut egui::Ui) -> Option<InputAction> {
        let enabled = self.view.inputs_enabled;
        let mut action = None;

        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing_sm)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let buttons_width = 3.0 * 76.0;
                    let text_edit = egui::TextEdit::singleline(&mut self.view.input_text)
                        .hint_text("Type a message...")
                        .desired_width((ui.available_width() - buttons_width).max(120.0));
                    let response = ui.add_enabled(enabled, text_edit);

                    let submitted =
                        response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
                    if submitted && enabled {
                        action = Some(InputAction::Send);
                        response.request_focus();
                    }

                    let send = egui::Button::new("Send")
                        .min_size(Vec2::new(68.0, 28.0))
                        .rounding(self.theme.button_rounding);
                    if ui.add_enabled(enabled, send).clicked() {
                        action = Some(InputAction::Send);
                    }

                    let speak = egui::Button::new("Speak")
                        .min_size(Vec2::new(68.0, 28.0))
                        .rounding(self.theme.button_rounding);
                    if ui.add_enabled(enabled, speak).clicked() {
                        action = Some(InputAction::Speak);
                    }

                    let stop = egui::Button::new(RichText::new("Stop").color(self.theme.error))
                        .min_size(Vec2::new(68.0, 28.0))
                        .rounding(self.theme.button_rounding);
                    if ui.add_enabled(self.processing, stop).clicked() {
                        action = Some(InputAction::Stop);
                    }
                });
            });

        action
    }
}
