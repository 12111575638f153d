use anyhow::Result;

use crate::chart::{ChartError, Figure, PlotKind, PlotSelection};
use crate::data::inspect::{ColumnLookup, inspect_column};
use crate::data::model::Dataset;
use crate::data::summary::{Summary, describe};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Session state, independent of rendering.  Everything shown on screen is
/// derived from `dataset` and the widget selections held here.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until the user opens a file).
    pub dataset: Option<Dataset>,

    /// Name of the file the dataset came from.
    pub file_name: Option<String>,

    /// Descriptive statistics of `dataset` (cached; the dataset never changes).
    pub summary: Option<Summary>,

    /// Sidebar axis / plot-type selection.
    pub selection: Option<PlotSelection>,

    /// Contents of the column search box.
    pub search_column: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Figure for the selection it was built from.  Rebuilt only when the
    /// selection or the dataset changes.
    figure_cache: Option<(PlotSelection, Result<Figure, ChartError>)>,
}

impl AppState {
    /// Apply the outcome of loading `name`.  A failure drops whatever was
    /// loaded before.
    pub fn apply_load(&mut self, name: &str, result: Result<Dataset>) {
        match result {
            Ok(dataset) => {
                log::info!(
                    "Loaded '{name}': {} rows, columns {:?}",
                    dataset.len(),
                    dataset.column_names()
                );
                self.set_dataset(name, dataset);
            }
            Err(e) => {
                log::error!("Failed to load '{name}': {e:#}");
                self.dataset = None;
                self.summary = None;
                self.selection = None;
                self.figure_cache = None;
                self.file_name = Some(name.to_string());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and reset the plot selection.
    pub fn set_dataset(&mut self, name: &str, dataset: Dataset) {
        self.summary = Some(describe(&dataset));
        self.selection = PlotSelection::initial(&dataset);
        self.figure_cache = None;
        self.dataset = Some(dataset);
        self.file_name = Some(name.to_string());
        self.status_message = None;
    }

    /// Result of the current column search.
    pub fn column_lookup(&self) -> ColumnLookup {
        match &self.dataset {
            Some(ds) => inspect_column(ds, &self.search_column),
            None => ColumnLookup::Idle,
        }
    }

    /// Refuse a file whose type the loader does not offer.  The current
    /// dataset stays loaded.
    pub fn reject_file(&mut self, name: &str) {
        log::warn!("Ignoring '{name}': only .csv and .xlsx files are supported");
        self.status_message = Some(format!(
            "Unsupported file '{name}': choose a .csv or .xlsx file"
        ));
    }

    /// Figure for the current selection, built on first use and reused
    /// until the selection changes.
    pub fn figure(&mut self) -> Option<&Result<Figure, ChartError>> {
        let ds = self.dataset.as_ref()?;
        let selection = self.selection.as_ref()?;
        let fresh = matches!(&self.figure_cache, Some((built_for, _)) if built_for == selection);
        if !fresh {
            log::debug!("Building {} for x={} y={}", selection.kind, selection.x, selection.y);
            self.figure_cache = Some((selection.clone(), Figure::build(ds, selection)));
        }
        self.figure_cache.as_ref().map(|(_, figure)| figure)
    }

    pub fn set_x_column(&mut self, column: String) {
        if let Some(sel) = &mut self.selection {
            log::debug!("X column -> {column}");
            sel.x = column;
        }
    }

    pub fn set_y_column(&mut self, column: String) {
        if let Some(sel) = &mut self.selection {
            log::debug!("Y column -> {column}");
            sel.y = column;
        }
    }

    pub fn set_plot_kind(&mut self, kind: PlotKind) {
        if let Some(sel) = &mut self.selection {
            log::debug!("Plot type -> {kind}");
            sel.kind = kind;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::inspect::ColumnInspection;
    use crate::data::loader::load_bytes;

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.apply_load("t.csv", load_bytes("t.csv", b"a,b\n1,x\n2,y\n3,z\n"));
        state
    }

    #[test]
    fn successful_load_fills_derived_state() {
        let state = loaded();
        assert_eq!(state.dataset.as_ref().map(Dataset::shape), Some((3, 2)));
        assert_eq!(state.summary.as_ref().map(|s| s.columns.len()), Some(2));
        assert_eq!(state.selection.as_ref().map(|s| s.x.as_str()), Some("a"));
        assert!(state.status_message.is_none());
    }

    #[test]
    fn failed_load_clears_previous_dataset() {
        let mut state = loaded();
        state.apply_load("broken.xlsx", load_bytes("broken.xlsx", b"not a workbook"));
        assert!(state.dataset.is_none());
        assert!(state.summary.is_none());
        assert!(state.figure().is_none());
        assert!(state.status_message.as_deref().unwrap().starts_with("Error:"));
    }

    #[test]
    fn search_box_drives_column_lookup() {
        let mut state = loaded();
        assert_eq!(state.column_lookup(), ColumnLookup::Idle);

        state.search_column = "a".into();
        assert_eq!(
            state.column_lookup(),
            ColumnLookup::Found(ColumnInspection {
                name: "a".into(),
                length: 3,
                missing: 0,
                unique: 3,
            })
        );

        state.search_column = "c".into();
        assert_eq!(state.column_lookup(), ColumnLookup::NotFound("c".into()));
    }

    #[test]
    fn figure_follows_selection() {
        let mut state = loaded();
        state.set_x_column("a".into());
        state.set_y_column("b".into());
        state.set_plot_kind(PlotKind::Line);
        assert!(matches!(state.figure(), Some(Err(ChartError::NotNumeric { .. }))));

        state.set_plot_kind(PlotKind::Histogram);
        let figure = state.figure().unwrap().as_ref().unwrap();
        assert_eq!(figure.x_label, "a");
    }

    #[test]
    fn figure_is_reused_until_selection_changes() {
        let mut state = loaded();
        assert!(state.figure_cache.is_none());

        let first = state.figure().unwrap().as_ref().unwrap().clone();
        assert_eq!(first.kind, PlotKind::Scatter);
        let cached = state.figure_cache.as_ref().map(|(sel, _)| sel.clone());
        assert_eq!(cached.as_ref(), state.selection.as_ref());

        // Reading again keeps the same entry.
        state.figure();
        assert_eq!(state.figure_cache.as_ref().map(|(sel, _)| sel.clone()), cached);

        state.set_plot_kind(PlotKind::Histogram);
        let rebuilt = state.figure().unwrap().as_ref().unwrap();
        assert_eq!(rebuilt.kind, PlotKind::Histogram);
        assert_eq!(
            state.figure_cache.as_ref().map(|(sel, _)| sel.kind),
            Some(PlotKind::Histogram)
        );
    }

    #[test]
    fn new_dataset_drops_cached_figure() {
        let mut state = loaded();
        state.figure();
        assert!(state.figure_cache.is_some());

        state.apply_load("u.csv", load_bytes("u.csv", b"q\n1\n"));
        assert!(state.figure_cache.is_none());
        let figure = state.figure().unwrap().as_ref().unwrap();
        assert_eq!(figure.x_label, "q");

        state.apply_load("broken.xlsx", load_bytes("broken.xlsx", b"junk"));
        assert!(state.figure_cache.is_none());
    }

    #[test]
    fn rejected_file_keeps_dataset() {
        let mut state = loaded();
        state.reject_file("notes.txt");
        assert_eq!(state.dataset.as_ref().map(Dataset::shape), Some((3, 2)));
        assert!(state.status_message.as_deref().unwrap().contains("notes.txt"));
    }

    #[test]
    fn new_dataset_resets_selection() {
        let mut state = loaded();
        state.set_plot_kind(PlotKind::Box);
        state.apply_load("u.csv", load_bytes("u.csv", b"q\n1\n"));
        let sel = state.selection.unwrap();
        assert_eq!((sel.x.as_str(), sel.kind), ("q", PlotKind::Scatter));
    }
}
