//! Plot dispatch: turns a dataset plus the sidebar selection into a
//! renderer-independent [`Figure`].
//!
//! A figure is built from scratch for one selection and owns everything it
//! draws, so nothing from a previous plot type can leak into the next one.

pub mod axis;
pub mod geometry;

use std::fmt;

use thiserror::Error;

use crate::data::model::{Column, ColumnKind, Dataset};
use crate::data::stats;

/// Width of a bar or box, in category units.
const GROUP_WIDTH: f64 = 0.8;

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlotKind {
    Scatter,
    Line,
    Bar,
    Histogram,
    Box,
}

impl PlotKind {
    pub const ALL: [PlotKind; 5] = [
        PlotKind::Scatter,
        PlotKind::Line,
        PlotKind::Bar,
        PlotKind::Histogram,
        PlotKind::Box,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PlotKind::Scatter => "Scatter Plot",
            PlotKind::Line => "Line Plot",
            PlotKind::Bar => "Bar Plot",
            PlotKind::Histogram => "Histogram",
            PlotKind::Box => "Box Plot",
        }
    }

    /// Whether the Y column takes part in the plot.
    pub fn uses_y(self) -> bool {
        self != PlotKind::Histogram
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// X column, Y column and plot type chosen in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlotSelection {
    pub x: String,
    pub y: String,
    pub kind: PlotKind,
}

impl PlotSelection {
    /// First column on both axes, scatter plot.  `None` for a dataset
    /// without columns.
    pub fn initial(dataset: &Dataset) -> Option<Self> {
        let first = dataset.columns().first()?.name.clone();
        Some(PlotSelection {
            x: first.clone(),
            y: first,
            kind: PlotKind::Scatter,
        })
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum ChartError {
    #[error("Column '{0}' not found")]
    UnknownColumn(String),

    #[error("{plot} needs a numeric column, but '{column}' has dtype {kind}")]
    NotNumeric {
        plot: PlotKind,
        column: String,
        kind: ColumnKind,
    },

    #[error("{plot} needs at least one numeric axis, but '{x}' and '{y}' are both categorical")]
    NoNumericAxis { plot: PlotKind, x: String, y: String },

    #[error("Nothing to plot: no rows with values for the selected columns")]
    NoData,
}

// ---------------------------------------------------------------------------
// Figure model
// ---------------------------------------------------------------------------

/// One bar; `position` is on the categorical (or binned) axis.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSpec {
    pub position: f64,
    pub value: f64,
    pub width: f64,
    pub label: String,
}

/// One box of a box plot.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSpec {
    pub position: f64,
    pub label: String,
    pub stats: geometry::BoxStats,
}

/// A drawable element of a figure.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Points { name: String, points: Vec<[f64; 2]> },
    Line { name: String, points: Vec<[f64; 2]> },
    Bars { name: String, bars: Vec<BarSpec>, horizontal: bool },
    Boxes { name: String, boxes: Vec<BoxSpec>, horizontal: bool },
}

/// Everything needed to draw one plot.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub kind: PlotKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Tick labels when the x axis is categorical.
    pub x_categories: Option<Vec<String>>,
    /// Tick labels when the y axis is categorical.
    pub y_categories: Option<Vec<String>>,
    pub layers: Vec<Layer>,
}

impl Figure {
    /// Route the selection to its renderer.
    pub fn build(dataset: &Dataset, selection: &PlotSelection) -> Result<Figure, ChartError> {
        let x = lookup(dataset, &selection.x)?;
        if !selection.kind.uses_y() {
            return histogram(x);
        }
        let y = lookup(dataset, &selection.y)?;
        match selection.kind {
            PlotKind::Scatter => scatter(x, y),
            PlotKind::Line => line(x, y),
            PlotKind::Bar => bar(x, y),
            PlotKind::Box => box_plot(x, y),
            PlotKind::Histogram => histogram(x),
        }
    }

    fn new(kind: PlotKind, x_label: &str, y_label: &str) -> Self {
        Figure {
            kind,
            title: kind.label().to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            x_categories: None,
            y_categories: None,
            layers: Vec::new(),
        }
    }
}

fn lookup<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a Column, ChartError> {
    dataset
        .column(name)
        .ok_or_else(|| ChartError::UnknownColumn(name.to_string()))
}

fn require_numeric(plot: PlotKind, column: &Column) -> Result<(), ChartError> {
    if column.kind.is_numeric() {
        Ok(())
    } else {
        Err(ChartError::NotNumeric {
            plot,
            column: column.name.clone(),
            kind: column.kind,
        })
    }
}

/// Rows where both axes have a position.
fn paired_points(x: &axis::EncodedAxis, y: &axis::EncodedAxis) -> Vec<[f64; 2]> {
    x.positions
        .iter()
        .zip(&y.positions)
        .filter_map(|(x, y)| Some([(*x)?, (*y)?]))
        .collect()
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

fn scatter(x: &Column, y: &Column) -> Result<Figure, ChartError> {
    let (ex, ey) = (axis::encode(x), axis::encode(y));
    let points = paired_points(&ex, &ey);
    if points.is_empty() {
        return Err(ChartError::NoData);
    }

    let mut figure = Figure::new(PlotKind::Scatter, &x.name, &y.name);
    figure.x_categories = ex.categories;
    figure.y_categories = ey.categories;
    figure.layers.push(Layer::Points { name: y.name.clone(), points });
    Ok(figure)
}

/// Mean of Y for every distinct X, in X order.
fn line(x: &Column, y: &Column) -> Result<Figure, ChartError> {
    require_numeric(PlotKind::Line, y)?;
    let (ex, ey) = (axis::encode(x), axis::encode(y));
    let mut pairs = paired_points(&ex, &ey);
    if pairs.is_empty() {
        return Err(ChartError::NoData);
    }
    pairs.sort_by(|a, b| a[0].total_cmp(&b[0]));

    let mut points: Vec<[f64; 2]> = Vec::new();
    let mut group: Vec<f64> = Vec::new();
    let mut current = pairs[0][0];
    for [px, py] in pairs {
        if px.total_cmp(&current).is_ne() {
            points.extend(stats::mean(&group).map(|m| [current, m]));
            group.clear();
            current = px;
        }
        group.push(py);
    }
    points.extend(stats::mean(&group).map(|m| [current, m]));

    let mut figure = Figure::new(PlotKind::Line, &x.name, &y.name);
    figure.x_categories = ex.categories;
    figure.layers.push(Layer::Line { name: y.name.clone(), points });
    Ok(figure)
}

/// Pick the grouping column and the value column.  Vertical when Y is
/// numeric, horizontal when only X is.
fn orient<'a>(
    plot: PlotKind,
    x: &'a Column,
    y: &'a Column,
) -> Result<(&'a Column, &'a Column, bool), ChartError> {
    if y.kind.is_numeric() {
        Ok((x, y, false))
    } else if x.kind.is_numeric() {
        Ok((y, x, true))
    } else {
        Err(ChartError::NoNumericAxis {
            plot,
            x: x.name.clone(),
            y: y.name.clone(),
        })
    }
}

/// Attach category labels to whichever axis carries the groups.
fn set_group_axis(figure: &mut Figure, labels: Vec<String>, horizontal: bool) {
    if horizontal {
        figure.y_categories = Some(labels);
    } else {
        figure.x_categories = Some(labels);
    }
}

/// Mean of the numeric axis per category of the other one.
fn bar(x: &Column, y: &Column) -> Result<Figure, ChartError> {
    let (groups, values, horizontal) = orient(PlotKind::Bar, x, y)?;
    let (labels, buckets) = axis::grouped(groups, values);

    let bars: Vec<BarSpec> = labels
        .iter()
        .zip(&buckets)
        .enumerate()
        .filter_map(|(i, (label, bucket))| {
            Some(BarSpec {
                position: i as f64,
                value: stats::mean(bucket)?,
                width: GROUP_WIDTH,
                label: label.clone(),
            })
        })
        .collect();
    if bars.is_empty() {
        return Err(ChartError::NoData);
    }

    let mut figure = Figure::new(PlotKind::Bar, &x.name, &y.name);
    set_group_axis(&mut figure, labels, horizontal);
    figure.layers.push(Layer::Bars { name: values.name.clone(), bars, horizontal });
    Ok(figure)
}

/// Single-variable plot over X: 30 bins plus a density curve for numeric
/// columns, one bar per category otherwise.
fn histogram(x: &Column) -> Result<Figure, ChartError> {
    let mut figure = Figure::new(PlotKind::Histogram, &x.name, "Count");

    if !x.kind.is_numeric() {
        let (codes, labels) = axis::categories(x, false);
        let mut counts = vec![0usize; labels.len()];
        for code in codes.into_iter().flatten() {
            counts[code] += 1;
        }
        if counts.is_empty() {
            return Err(ChartError::NoData);
        }
        let bars = labels
            .iter()
            .zip(counts)
            .enumerate()
            .map(|(i, (label, count))| BarSpec {
                position: i as f64,
                value: count as f64,
                width: GROUP_WIDTH,
                label: label.clone(),
            })
            .collect();
        figure.x_categories = Some(labels);
        figure.layers.push(Layer::Bars { name: x.name.clone(), bars, horizontal: false });
        return Ok(figure);
    }

    let values = x.numeric_values();
    let bins = geometry::histogram(&values, geometry::HISTOGRAM_BINS).ok_or(ChartError::NoData)?;
    let bars = bins
        .counts
        .iter()
        .enumerate()
        .map(|(i, count)| {
            let center = bins.center(i);
            BarSpec {
                position: center,
                value: *count as f64,
                width: bins.width,
                label: format!(
                    "{:.3} to {:.3}",
                    center - bins.width / 2.0,
                    center + bins.width / 2.0
                ),
            }
        })
        .collect();
    figure.layers.push(Layer::Bars { name: x.name.clone(), bars, horizontal: false });

    // Density scaled to counts so it overlays the bars.
    let scale = values.len() as f64 * bins.width;
    if let Some(curve) = geometry::kde(&values, geometry::KDE_GRID_POINTS, scale) {
        figure.layers.push(Layer::Line { name: "KDE".to_string(), points: curve });
    }
    Ok(figure)
}

fn box_plot(x: &Column, y: &Column) -> Result<Figure, ChartError> {
    let (groups, values, horizontal) = orient(PlotKind::Box, x, y)?;
    let (labels, buckets) = axis::grouped(groups, values);

    let boxes: Vec<BoxSpec> = labels
        .iter()
        .zip(&buckets)
        .enumerate()
        .filter_map(|(i, (label, bucket))| {
            Some(BoxSpec {
                position: i as f64,
                label: label.clone(),
                stats: geometry::box_stats(bucket)?,
            })
        })
        .collect();
    if boxes.is_empty() {
        return Err(ChartError::NoData);
    }

    let mut figure = Figure::new(PlotKind::Box, &x.name, &y.name);
    set_group_axis(&mut figure, labels, horizontal);
    figure.layers.push(Layer::Boxes { name: values.name.clone(), boxes, horizontal });
    Ok(figure)
}
