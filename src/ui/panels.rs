use eframe::egui::{self, Color32, RichText, Ui};

use crate::chart::PlotKind;
use crate::data::loader::{SUPPORTED_EXTENSIONS, is_supported, load_bytes, load_file};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – plot settings
// ---------------------------------------------------------------------------

/// Render the sidebar with the X / Y / plot-type selectors.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("⚙ Plot Settings");
    ui.separator();

    let (Some(dataset), Some(selection)) = (&state.dataset, &state.selection) else {
        ui.label("No dataset loaded.");
        return;
    };

    let columns = dataset.column_names();
    let mut x = selection.x.clone();
    let mut y = selection.y.clone();
    let mut kind = selection.kind;

    ui.strong("Select X-axis column");
    column_combo(ui, "x_column", &columns, &mut x);
    ui.add_space(6.0);

    ui.strong("Select Y-axis column");
    ui.add_enabled_ui(kind.uses_y(), |ui: &mut Ui| {
        column_combo(ui, "y_column", &columns, &mut y);
    });
    if !kind.uses_y() {
        ui.small("Histograms only use the X column.");
    }
    ui.add_space(6.0);

    ui.strong("Select Plot Type");
    egui::ComboBox::from_id_salt("plot_type")
        .selected_text(kind.label())
        .show_ui(ui, |ui: &mut Ui| {
            for option in PlotKind::ALL {
                ui.selectable_value(&mut kind, option, option.label());
            }
        });

    if x != selection.x {
        state.set_x_column(x);
    }
    if let Some(sel) = &state.selection {
        if y != sel.y {
            state.set_y_column(y);
        }
    }
    if let Some(sel) = &state.selection {
        if kind != sel.kind {
            state.set_plot_kind(kind);
        }
    }
}

fn column_combo(ui: &mut Ui, id: &str, columns: &[String], current: &mut String) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.as_str())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for col in columns {
                ui.selectable_value(current, col.clone(), col);
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(name) = &state.file_name {
            ui.label(format!("📁 {name}"));
        }

        if let Some(ds) = &state.dataset {
            ui.separator();
            let (rows, cols) = ds.shape();
            ui.label(format!("{rows} rows × {cols} columns"));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File loading
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Choose a CSV or Excel file")
        .add_filter("Supported files", &SUPPORTED_EXTENSIONS)
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .pick_file();

    if let Some(path) = file {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        state.apply_load(&name, load_file(&path));
    }
}

/// Load the first file dropped onto the window, if any.  Only the file
/// types the open dialog offers are accepted.
pub fn handle_dropped_files(ctx: &egui::Context, state: &mut AppState) {
    let Some(file) = ctx.input(|i| i.raw.dropped_files.first().cloned()) else {
        return;
    };

    let name = file
        .path
        .as_deref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.name.clone());
    if !is_supported(&name) {
        state.reject_file(&name);
        return;
    }

    if let Some(path) = &file.path {
        state.apply_load(&name, load_file(path));
    } else if let Some(bytes) = &file.bytes {
        state.apply_load(&name, load_bytes(&name, bytes));
    }
}
