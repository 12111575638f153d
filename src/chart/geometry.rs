use crate::data::stats;

/// Fixed bin count for histograms.
pub const HISTOGRAM_BINS: usize = 30;
/// Number of points the density curve is evaluated at.
pub const KDE_GRID_POINTS: usize = 200;

/// Equal-width histogram bins.
#[derive(Debug, Clone, PartialEq)]
pub struct Bins {
    pub start: f64,
    pub width: f64,
    pub counts: Vec<usize>,
}

impl Bins {
    /// Centre of bin `i`.
    pub fn center(&self, i: usize) -> f64 {
        self.start + (i as f64 + 0.5) * self.width
    }
}

/// Split `values` into `n` equal-width bins over `[min, max]`; the last bin
/// is closed.  A constant sample is spread over `[v - 0.5, v + 0.5]`.
pub fn histogram(values: &[f64], n: usize) -> Option<Bins> {
    let sorted = stats::sorted(values);
    let (mut lo, mut hi) = (*sorted.first()?, *sorted.last()?);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / n as f64;
    let mut counts = vec![0; n];
    for v in values {
        let idx = (((v - lo) / width).floor() as usize).min(n - 1);
        counts[idx] += 1;
    }
    Some(Bins { start: lo, width, counts })
}

/// Gaussian kernel density estimate with Scott's bandwidth, evaluated on a
/// regular grid spanning the data and scaled by `scale`.
///
/// Returns `None` when the sample has no spread.
pub fn kde(values: &[f64], grid_points: usize, scale: f64) -> Option<Vec<[f64; 2]>> {
    let sd = stats::std_dev(values)?;
    if sd <= 0.0 || grid_points < 2 {
        return None;
    }
    let n = values.len() as f64;
    let bandwidth = sd * n.powf(-0.2);
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    let sorted = stats::sorted(values);
    let (lo, hi) = (sorted[0], sorted[sorted.len() - 1]);
    let step = (hi - lo) / (grid_points - 1) as f64;

    let curve = (0..grid_points)
        .map(|i| {
            let x = lo + i as f64 * step;
            let density: f64 = values
                .iter()
                .map(|xi| (-0.5 * ((x - xi) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            [x, density * scale]
        })
        .collect();
    Some(curve)
}

/// Box-and-whisker statistics of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Quartiles with whiskers at the furthest points within 1.5 IQR.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    let sorted = stats::sorted(values);
    let q1 = stats::quantile_sorted(&sorted, 0.25)?;
    let median = stats::quantile_sorted(&sorted, 0.5)?;
    let q3 = stats::quantile_sorted(&sorted, 0.75)?;
    let reach = 1.5 * (q3 - q1);
    let (lo_fence, hi_fence) = (q1 - reach, q3 + reach);

    let inside = || sorted.iter().copied().filter(|v| *v >= lo_fence && *v <= hi_fence);
    let lower_whisker = inside().next().unwrap_or(q1);
    let upper_whisker = inside().last().unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < lo_fence || *v > hi_fence)
        .collect();

    Some(BoxStats { lower_whisker, q1, median, q3, upper_whisker, outliers })
}
