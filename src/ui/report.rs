use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::inspect::ColumnLookup;
use crate::data::model::Dataset;
use crate::data::summary::Summary;
use crate::state::AppState;

/// Rows shown in the data preview.
const PREVIEW_ROWS: usize = 5;

const ROW_HEIGHT: f32 = 20.0;

// ---------------------------------------------------------------------------
// Central report: preview, summary, column search, shape
// ---------------------------------------------------------------------------

/// Render the EDA sections above the plot.
pub fn report(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };

    ui.heading("🧾 Data Preview");
    preview_table(ui, dataset);
    ui.add_space(12.0);

    ui.horizontal(|ui: &mut Ui| {
        ui.heading("📊 Data Summary");
        if let Some(summary) = &state.summary {
            if ui.small_button("Copy as JSON").clicked() {
                match summary.to_json() {
                    Ok(json) => ui.ctx().copy_text(json),
                    Err(e) => log::error!("Failed to serialise summary: {e}"),
                }
            }
        }
    });
    if let Some(summary) = &state.summary {
        summary_table(ui, summary);
    }
    ui.add_space(12.0);

    let (rows, cols) = dataset.shape();

    column_search(ui, state);
    ui.add_space(12.0);

    ui.heading("📐 DataFrame Shape");
    ui.label(format!("Rows: {rows}"));
    ui.label(format!("Columns: {cols}"));
}

fn preview_table(ui: &mut Ui, dataset: &Dataset) {
    let head = dataset.head(PREVIEW_ROWS);
    let names = dataset.column_names();

    egui::ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .id_salt("preview_table")
                .striped(true)
                .vscroll(false)
                .column(Column::auto().at_least(32.0))
                .columns(Column::auto().at_least(60.0), names.len())
                .header(ROW_HEIGHT, |mut header| {
                    header.col(|_ui| {});
                    for name in &names {
                        header.col(|ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|mut body| {
                    for (i, row) in head.iter().enumerate() {
                        body.row(ROW_HEIGHT, |mut table_row| {
                            table_row.col(|ui| {
                                ui.weak(i.to_string());
                            });
                            for cell in row {
                                table_row.col(|ui| {
                                    if cell.is_missing() {
                                        ui.weak(cell.to_string());
                                    } else {
                                        ui.label(cell.to_string());
                                    }
                                });
                            }
                        });
                    }
                });
        });
}

fn summary_table(ui: &mut Ui, summary: &Summary) {
    egui::ScrollArea::horizontal()
        .id_salt("summary_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .id_salt("summary_table")
                .striped(true)
                .vscroll(false)
                .column(Column::auto().at_least(48.0))
                .columns(Column::auto().at_least(80.0), summary.columns.len())
                .header(ROW_HEIGHT, |mut header| {
                    header.col(|_ui| {});
                    for column in &summary.columns {
                        header.col(|ui| {
                            ui.strong(&column.name);
                        });
                    }
                })
                .body(|mut body| {
                    for label in &summary.labels {
                        body.row(ROW_HEIGHT, |mut row| {
                            row.col(|ui| {
                                ui.strong(*label);
                            });
                            for column in &summary.columns {
                                row.col(|ui| {
                                    ui.label(column.get(label).to_string());
                                });
                            }
                        });
                    }
                });
        });
}

fn column_search(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔍 Column Information");
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Search column name");
        ui.text_edit_singleline(&mut state.search_column);
    });

    match state.column_lookup() {
        ColumnLookup::Idle => {}
        ColumnLookup::Found(info) => {
            ui.label(RichText::new(format!("Column: {}", info.name)).strong());
            ui.label(format!("Length: {}", info.length));
            ui.label(format!("Missing Values: {}", info.missing));
            ui.label(format!("Unique Values: {}", info.unique));
        }
        ColumnLookup::NotFound(_) => {
            ui.label(RichText::new("⚠ Column not found.").color(Color32::from_rgb(200, 150, 0)));
        }
    }
}
