use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints, PlotUi,
    Points,
};

use crate::chart::{BarSpec, BoxSpec, Figure, Layer, PlotKind, PlotSelection};
use crate::color::{ColorMap, OVERLAY_COLOR, SERIES_COLOR};
use crate::state::AppState;

const PLOT_HEIGHT: f32 = 480.0;

// ---------------------------------------------------------------------------
// Data visualisation (bottom of the central panel)
// ---------------------------------------------------------------------------

/// Draw the figure for the current selection, building it first when the
/// selection changed since the last frame.
pub fn figure_view(ui: &mut Ui, state: &mut AppState) {
    let Some(selection) = state.selection.clone() else {
        return;
    };

    ui.heading("📈 Data Visualization");
    match state.figure() {
        None => {}
        Some(Ok(figure)) => draw_figure(ui, figure, &selection),
        Some(Err(e)) => {
            ui.label(RichText::new(format!("Error: {e}")).color(Color32::RED));
        }
    }
}

fn draw_figure(ui: &mut Ui, figure: &Figure, selection: &PlotSelection) {
    ui.label(RichText::new(&figure.title).strong());

    // Keyed on the selection so zoom / bounds never carry over between plots.
    let mut plot = Plot::new(("figure", selection))
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_label(figure.x_label.as_str())
        .y_axis_label(figure.y_label.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if let Some(labels) = figure.x_categories.clone() {
        plot = plot.x_axis_formatter(category_formatter(labels));
    }
    if let Some(labels) = figure.y_categories.clone() {
        plot = plot.y_axis_formatter(category_formatter(labels));
    }

    plot.show(ui, |plot_ui| {
        for layer in &figure.layers {
            draw_layer(plot_ui, figure.kind, layer);
        }
    });
}

/// Show category names at integer positions, nothing in between.
fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

fn draw_layer(plot_ui: &mut PlotUi, kind: PlotKind, layer: &Layer) {
    match layer {
        Layer::Points { name, points } => {
            plot_ui.points(
                Points::new(PlotPoints::from(points.clone()))
                    .name(name)
                    .color(SERIES_COLOR)
                    .radius(3.0),
            );
        }
        Layer::Line { name, points } => {
            let color = if kind == PlotKind::Histogram { OVERLAY_COLOR } else { SERIES_COLOR };
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name(name)
                    .color(color)
                    .width(2.0),
            );
        }
        Layer::Bars { name, bars, horizontal } => {
            // Grouped bars get one colour per category, histogram bins share one.
            let colors = (kind == PlotKind::Bar)
                .then(|| ColorMap::new(bars.iter().map(|b| b.label.as_str())));
            let bars = bars
                .iter()
                .map(|b| bar(b, colors.as_ref().map_or(SERIES_COLOR, |c| c.color_for(&b.label))))
                .collect();
            let mut chart = BarChart::new(bars).name(name).color(SERIES_COLOR);
            if *horizontal {
                chart = chart.horizontal();
            }
            plot_ui.bar_chart(chart);
        }
        Layer::Boxes { name, boxes, horizontal } => {
            let colors = ColorMap::new(boxes.iter().map(|b| b.label.as_str()));
            let elems = boxes
                .iter()
                .map(|b| box_elem(b, colors.color_for(&b.label)))
                .collect();
            let mut plot = BoxPlot::new(elems).name(name);
            if *horizontal {
                plot = plot.horizontal();
            }
            plot_ui.box_plot(plot);

            let outliers: Vec<[f64; 2]> = boxes
                .iter()
                .flat_map(|b| b.stats.outliers.iter().map(move |v| (b.position, *v)))
                .map(|(pos, v)| if *horizontal { [v, pos] } else { [pos, v] })
                .collect();
            if !outliers.is_empty() {
                plot_ui.points(
                    Points::new(PlotPoints::from(outliers))
                        .name("outliers")
                        .color(Color32::GRAY)
                        .radius(2.5),
                );
            }
        }
    }
}

fn bar(spec: &BarSpec, color: Color32) -> Bar {
    Bar::new(spec.position, spec.value)
        .width(spec.width)
        .name(&spec.label)
        .fill(color)
}

fn box_elem(spec: &BoxSpec, color: Color32) -> BoxElem {
    let s = &spec.stats;
    BoxElem::new(
        spec.position,
        BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
    )
    .name(&spec.label)
    .box_width(0.8)
    .fill(color.linear_multiply(0.5))
    .stroke(Stroke::new(1.5, color))
}
