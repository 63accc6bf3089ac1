//! eframe application wiring the chat view to the turn controller

use crate::integration::TurnController;
use crate::ui::components::{InputAction, InputBar, MessageList, StatusBar};
use crate::ui::state::ChatView;
use crate::ui::theme::Theme;
use egui::{self, CentralPanel, RichText, TopBottomPanel};
use std::time::Duration;
use tracing::debug;

/// Worker events are picked up at least this often
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct MurmurApp {
    controller: TurnController<ChatView>,
    theme: Theme,
}

impl MurmurApp {
    pub fn new(cc: &eframe::CreationContext<'_>, controller: TurnController<ChatView>) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);

        Self { controller, theme }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        let theme = &self.theme;
        let view = self.controller.presenter_mut();

        TopBottomPanel::top("header")
            .frame(egui::Frame::none().fill(theme.bg_secondary).inner_margin(10.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Murmur")
                            .size(20.0)
                            .strong()
                            .color(theme.text_primary),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let languages = view.languages.clone();
                        egui::ComboBox::from_id_salt("language")
                            .selected_text(view.language.as_str())
                            .show_ui(ui, |ui| {
                                for code in languages {
                                    let label = code.clone();
                                    ui.selectable_value(&mut view.language, code, label);
                                }
                            });
                        ui.label(RichText::new("Language").color(theme.text_muted));
                    });
                });
            });
    }

    fn handle(&mut self, action: InputAction) {
        debug!("Input action: {:?}", action);
        match action {
            InputAction::Send => {
                let text = self.controller.presenter().input_text.clone();
                if self.controller.submit_text(&text).is_some() {
                    self.controller.presenter_mut().input_text.clear();
                }
            }
            InputAction::Speak => {
                self.controller.submit_voice();
            }
            InputAction::Stop => self.controller.cancel(),
        }
    }
}

impl eframe::App for MurmurApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.poll();
        let processing = self.controller.is_processing();

        self.show_header(ctx);

        TopBottomPanel::bottom("status")
            .frame(egui::Frame::none().fill(self.theme.bg_secondary).inner_margin(6.0))
            .show(ctx, |ui| {
                StatusBar::new(self.controller.presenter(), &self.theme).show(ui);
            });

        let mut action = None;
        TopBottomPanel::bottom("input")
            .frame(egui::Frame::none().inner_margin(8.0))
            .show(ctx, |ui| {
                action = InputBar::new(self.controller.presenter_mut(), &self.theme, processing)
                    .show(ui);
            });

        CentralPanel::default().show(ctx, |ui| {
            MessageList::new(self.controller.presenter(), &self.theme).show(ui);
        });

        if let Some(action) = action {
            self.handle(action);
        }

        ctx.request_repaint_after(POLL_INTERVAL);
    }
}
