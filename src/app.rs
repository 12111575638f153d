use eframe::egui::{self, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot, report};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

/// One render pass per frame: every view below is recomputed from `state`.
#[derive(Default)]
pub struct PandaEdaApp {
    pub state: AppState,
}

impl eframe::App for PandaEdaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        panels::handle_dropped_files(ctx, &mut self.state);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: plot settings ----
        egui::SidePanel::left("plot_settings")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: report + plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    ui.heading(egui::RichText::new("📊 Data Visualization App").size(26.0));
                    ui.label(
                        "Upload a file and explore the data with interactive visualization. \
                         Basic exploratory data analysis plus scatter, line, bar, histogram \
                         and box plots.",
                    );
                    ui.separator();

                    if self.state.dataset.is_none() {
                        if let Some(msg) = &self.state.status_message {
                            ui.label(egui::RichText::new(msg).color(egui::Color32::RED));
                        } else {
                            ui.label("👆 Please upload a CSV or Excel file to get started (File → Open… or drop it here).");
                        }
                        return;
                    }

                    report::report(ui, &mut self.state);
                    ui.add_space(12.0);
                    plot::figure_view(ui, &mut self.state);
                });
        });
    }
}
