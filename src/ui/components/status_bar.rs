//! Color-coded status line

use crate::ui::state::ChatView;
use crate::ui::theme::Theme;
use egui::{self, RichText, Vec2};

pub struct StatusBar<'a> {
    view: &'a ChatView,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(view: &'a ChatView, theme: &'a Theme) -> Self {
        Self { view, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let status = self.view.status;
        let color = self.theme.tone_color(status.tone());

        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(Vec2::splat(10.0), egui::Sense::hover());
            ui.painter().circle_filled(rect.center(), 5.0, color);
            ui.label(RichText::new(status.label()).size(12.0).color(color));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    RichText::new(format!("Language: {}", self.view.language))
                        .size(12.0)
                        .color(self.theme.text_muted),
                );
            });
        })
        .response
    }
}
