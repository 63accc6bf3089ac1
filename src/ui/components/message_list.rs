//! Scrollback of transcript bubbles

use crate::messages::{Speaker, TranscriptEntry};
use crate::ui::state::ChatView;
use crate::ui::theme::Theme;
use egui::{self, Align, Color32, RichText};

pub struct MessageList<'a> {
    view: &'a ChatView,
    theme: &'a Theme,
}

impl<'a> MessageList<'a> {
    pub fn new(view: &'a ChatView, theme: &'a Theme) -> Self {
        Self { view, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.add_space(self.theme.spacing_sm);

                if self.view.transcript.is_empty() {
                    self.show_empty_state(ui);
                }

                for entry in &self.view.transcript {
                    self.show_entry(ui, entry);
                    ui.add_space(self.theme.spacing_sm);
                }
            });
    }

    fn show_empty_state(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(120.0);
            ui.label(
                RichText::new("Type a message or press Speak to start.")
                    .color(self.theme.text_muted),
            );
        });
    }

    fn show_entry(&self, ui: &mut egui::Ui, entry: &TranscriptEntry) {
        let (align, label, fill, text) = match entry.speaker {
            Speaker::User => (
                Align::RIGHT,
                "You",
                self.theme.user_bubble,
                RichText::new(&entry.text).color(Color32::WHITE),
            ),
            Speaker::Bot => (
                Align::LEFT,
                "Bot",
                self.theme.bot_bubble,
                RichText::new(&entry.text).color(self.theme.text_primary),
            ),
            Speaker::Error => (
                Align::LEFT,
                "Error",
                self.theme.bg_secondary,
                RichText::new(&entry.text).color(self.theme.error).italics(),
            ),
        };

        ui.with_layout(egui::Layout::top_down(align), |ui| {
            ui.label(
                RichText::new(label)
                    .size(12.0)
                    .color(self.theme.text_muted),
            );

            let max_width = ui.available_width() * 0.75;
            egui::Frame::none()
                .fill(fill)
                .rounding(self.theme.bubble_rounding)
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.set_max_width(max_width);
                    ui.label(text);
                });

            ui.label(
                RichText::new(entry.timestamp.format("%H:%M").to_string())
                    .size(10.0)
                    .color(self.theme.text_muted),
            );
        });
    }
}
