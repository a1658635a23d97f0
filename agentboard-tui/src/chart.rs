//! Chart model: everything the chart panel draws, precomputed for one
//! `(scale, width)` pair.
//!
//! A model is never patched. Toggling the scale or settling on a new width
//! drops the old model and builds a fresh one.
//!
//! Coordinates are stored relative to the lower value bound so that `0.0`
//! is the bottom edge of the plot. Bar datasets draw from zero, which makes
//! the area fill land on the floor of the chart.

use ratatui::layout::Rect;
use ratatui::style::Color;

use agentboard_core::config::{ChartConfig, DashboardConfig, ScaleMode};
use agentboard_core::merge::MergedSeries;
use agentboard_runner::DashboardData;

use crate::theme;

/// Dash pattern for the benchmark: points on, points off.
const DASH_ON: usize = 5;
const DASH_OFF: usize = 5;

/// Braille gives two dots per cell horizontally.
const DOTS_PER_COLUMN: usize = 2;

/// Fill bars every this many densified points.
const FILL_STRIDE: usize = 2;

/// Brightness of the area fill relative to the line.
pub const FILL_DIM: f32 = 0.3;

const Y_TICKS: usize = 5;

/// Approximate width of one x label plus spacing.
const X_LABEL_WIDTH: u16 = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStyle {
    pub agent: String,
    pub display_name: String,
    pub color: Color,
    /// Configured brand color; tints the legend icon, never the line.
    pub brand: Option<Color>,
    pub is_benchmark: bool,
    /// Icon glyph when the icon loaded.
    pub glyph: Option<String>,
}

impl SeriesStyle {
    /// Styles in merged column order. Agents cycle through the palette by
    /// agent index; the benchmark takes its brand color.
    pub fn for_data(data: &DashboardData) -> Vec<SeriesStyle> {
        let glyph = |agent: &str| data.icon(agent).map(|i| i.glyph.clone());
        Self::for_columns(&data.merged, &data.config, glyph)
    }

    pub fn for_columns(
        merged: &MergedSeries,
        config: &DashboardConfig,
        glyph: impl Fn(&str) -> Option<String>,
    ) -> Vec<SeriesStyle> {
        let mut agent_index = 0;
        merged
            .agents
            .iter()
            .zip(&merged.display_names)
            .map(|(agent, display_name)| {
                let is_benchmark = config.is_benchmark(agent);
                let brand = config.color(agent).and_then(theme::hex_color);
                let color = if is_benchmark {
                    brand.unwrap_or(theme::BENCHMARK_FALLBACK)
                } else {
                    let c = theme::palette_color(agent_index);
                    agent_index += 1;
                    c
                };
                SeriesStyle {
                    agent: agent.clone(),
                    display_name: display_name.clone(),
                    color,
                    brand,
                    is_benchmark,
                    glyph: glyph(agent),
                }
            })
            .collect()
    }
}

/// Plot-ready polyline for one contiguous run of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub style: usize,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub style: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YTick {
    pub y: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    pub scale: ScaleMode,
    pub width: u16,
    /// Solid lines (agents).
    pub lines: Vec<Trace>,
    /// Dash segments (benchmark), drawn as scatter.
    pub dashes: Vec<Trace>,
    /// Area fill bars (agents only).
    pub fills: Vec<Trace>,
    pub badges: Vec<Badge>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// Merged-axis indices to label.
    pub x_ticks: Vec<usize>,
    pub y_ticks: Vec<YTick>,
    /// Lower bound in transformed units; add it back to get axis values.
    base: f64,
    len: usize,
}

impl ChartModel {
    pub fn build(
        merged: &MergedSeries,
        styles: &[SeriesStyle],
        config: &ChartConfig,
        scale: ScaleMode,
        width: u16,
    ) -> Self {
        let len = merged.len();
        let transform = |v: f64| to_axis(v, scale);

        let (lo, hi) = value_bounds(merged, scale);
        let base = lo;
        let x_bounds = if len > 1 {
            [0.0, (len - 1) as f64]
        } else {
            [-0.5, 0.5]
        };

        let samples = samples_per_segment(len, width);
        let mut lines = Vec::new();
        let mut dashes = Vec::new();
        let mut fills = Vec::new();
        let mut badges = Vec::new();

        for (col, style) in styles.iter().enumerate().take(merged.agent_count()) {
            let Some(values) = merged.values.get(col) else {
                continue;
            };
            for run in contiguous_runs(values, scale) {
                let knots: Vec<(f64, f64)> = run
                    .iter()
                    .map(|&(i, v)| (i as f64, transform(v) - base))
                    .collect();
                let dense = monotone_densify(&knots, samples, config.tension);
                if style.is_benchmark {
                    dashes.extend(dash(&dense).map(|points| Trace { style: col, points }));
                } else {
                    fills.push(Trace {
                        style: col,
                        points: dense.iter().step_by(FILL_STRIDE).copied().collect(),
                    });
                    lines.push(Trace {
                        style: col,
                        points: dense,
                    });
                }
            }
            if let Some((i, v)) = merged.last_real(col) {
                if scale == ScaleMode::Linear || v > 0.0 {
                    badges.push(Badge {
                        style: col,
                        x: i as f64,
                        y: transform(v) - base,
                    });
                }
            }
        }

        let y_bounds = [0.0, hi - lo];
        let y_ticks = (0..Y_TICKS)
            .map(|k| {
                let y = (hi - lo) * k as f64 / (Y_TICKS - 1) as f64;
                YTick {
                    y,
                    value: from_axis(y + base, scale),
                }
            })
            .collect();

        Self {
            scale,
            width,
            lines,
            dashes,
            fills,
            badges,
            x_bounds,
            y_bounds,
            x_ticks: x_ticks(len, config.max_ticks, width),
            y_ticks,
            base,
            len,
        }
    }

    /// Number of merged timestamps this model covers.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Plot y for an untransformed value, or `None` when the value cannot
    /// be shown on this scale.
    pub fn plot_y(&self, value: f64) -> Option<f64> {
        if self.scale == ScaleMode::Log && value <= 0.0 {
            return None;
        }
        Some(to_axis(value, self.scale) - self.base)
    }
}

fn to_axis(value: f64, scale: ScaleMode) -> f64 {
    match scale {
        ScaleMode::Linear => value,
        ScaleMode::Log => value.log10(),
    }
}

fn from_axis(y: f64, scale: ScaleMode) -> f64 {
    match scale {
        ScaleMode::Linear => y,
        ScaleMode::Log => 10f64.powf(y),
    }
}

/// Padded (low, high) in transformed units. Flat or empty data still gets
/// a non-degenerate band.
fn value_bounds(merged: &MergedSeries, scale: ScaleMode) -> (f64, f64) {
    let visible = merged
        .values
        .iter()
        .flatten()
        .flatten()
        .copied()
        .filter(|v| v.is_finite() && (scale == ScaleMode::Linear || *v > 0.0))
        .map(|v| to_axis(v, scale));
    let (lo, hi) = visible.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    let pad = if span > 0.0 {
        span * 0.05
    } else if lo != 0.0 {
        lo.abs() * 0.05
    } else {
        1.0
    };
    (lo - pad, hi + pad)
}

/// Maximal runs of plottable points as `(axis index, raw value)`.
/// A missing value, or a non-positive one on a log axis, ends a run.
pub fn contiguous_runs(values: &[Option<f64>], scale: ScaleMode) -> Vec<Vec<(usize, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(v) if v.is_finite() && (scale == ScaleMode::Linear || *v > 0.0) => {
                current.push((i, *v));
            }
            _ => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Interpolated points between knots so the braille line has no gaps.
fn samples_per_segment(len: usize, width: u16) -> usize {
    if len < 2 {
        return 1;
    }
    let dots = width as usize * DOTS_PER_COLUMN;
    (dots / (len - 1)).clamp(1, 64)
}

/// Monotone cubic (Fritsch–Carlson) interpolation through `knots`, with
/// `samples` points per segment. `tension` scales the tangents (a scaled
/// Fritsch–Carlson tangent stays monotone); zero gives straight segments.
pub fn monotone_densify(knots: &[(f64, f64)], samples: usize, tension: f64) -> Vec<(f64, f64)> {
    if knots.len() < 2 || samples <= 1 {
        return knots.to_vec();
    }
    let strength = (tension * 2.0).clamp(0.0, 1.0);
    if strength == 0.0 {
        return linear_densify(knots, samples);
    }
    let tangents: Vec<f64> = fritsch_carlson_tangents(knots)
        .into_iter()
        .map(|m| m * strength)
        .collect();

    let mut out = Vec::with_capacity((knots.len() - 1) * samples + 1);
    for k in 0..knots.len() - 1 {
        let (x0, y0) = knots[k];
        let (x1, y1) = knots[k + 1];
        let h = x1 - x0;
        for s in 0..samples {
            let t = s as f64 / samples as f64;
            let (t2, t3) = (t * t, t * t * t);
            let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
            let h10 = t3 - 2.0 * t2 + t;
            let h01 = -2.0 * t3 + 3.0 * t2;
            let h11 = t3 - t2;
            let y = h00 * y0 + h10 * h * tangents[k] + h01 * y1 + h11 * h * tangents[k + 1];
            out.push((x0 + t * h, y));
        }
    }
    if let Some(last) = knots.last() {
        out.push(*last);
    }
    out
}

fn linear_densify(knots: &[(f64, f64)], samples: usize) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity((knots.len() - 1) * samples + 1);
    for w in knots.windows(2) {
        let ((x0, y0), (x1, y1)) = (w[0], w[1]);
        for s in 0..samples {
            let t = s as f64 / samples as f64;
            out.push((x0 + t * (x1 - x0), y0 + t * (y1 - y0)));
        }
    }
    if let Some(last) = knots.last() {
        out.push(*last);
    }
    out
}

fn fritsch_carlson_tangents(knots: &[(f64, f64)]) -> Vec<f64> {
    let n = knots.len();
    let secants: Vec<f64> = knots
        .windows(2)
        .map(|w| (w[1].1 - w[0].1) / (w[1].0 - w[0].0))
        .collect();

    let mut m = vec![0.0; n];
    m[0] = secants[0];
    m[n - 1] = secants[n - 2];
    for i in 1..n - 1 {
        let (a, b) = (secants[i - 1], secants[i]);
        m[i] = if a * b <= 0.0 { 0.0 } else { (a + b) / 2.0 };
    }

    for (i, &d) in secants.iter().enumerate() {
        if d == 0.0 {
            m[i] = 0.0;
            m[i + 1] = 0.0;
            continue;
        }
        let a = m[i] / d;
        let b = m[i + 1] / d;
        let r = a * a + b * b;
        if r > 9.0 {
            let t = 3.0 / r.sqrt();
            m[i] = t * a * d;
            m[i + 1] = t * b * d;
        }
    }
    m
}

/// Split a polyline into on/off dash segments.
fn dash(points: &[(f64, f64)]) -> impl Iterator<Item = Vec<(f64, f64)>> + '_ {
    points
        .chunks(DASH_ON + DASH_OFF)
        .map(|chunk| chunk.iter().take(DASH_ON).copied().collect())
}

/// Evenly spaced label positions, bounded by `max_ticks` and by how many
/// labels fit across `width`.
pub fn x_ticks(len: usize, max_ticks: usize, width: u16) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let fit = (width / X_LABEL_WIDTH).max(1) as usize;
    let n = max_ticks.min(fit).min(len).max(1);
    if n == 1 {
        return vec![0];
    }
    let mut ticks: Vec<usize> = (0..n)
        .map(|k| ((k * (len - 1)) as f64 / (n - 1) as f64).round() as usize)
        .collect();
    ticks.dedup();
    ticks
}

/// Where the plot landed on screen, for mapping between cells and data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartGeometry {
    pub area: Rect,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub len: usize,
}

impl ChartGeometry {
    pub fn new(area: Rect, model: &ChartModel) -> Self {
        Self {
            area,
            x_bounds: model.x_bounds,
            y_bounds: model.y_bounds,
            len: model.len(),
        }
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.area.x
            && column < self.area.right()
            && row >= self.area.y
            && row < self.area.bottom()
    }

    /// Nearest merged index under a terminal column.
    pub fn column_to_index(&self, column: u16) -> Option<usize> {
        if self.len == 0 || self.area.width == 0 {
            return None;
        }
        if column < self.area.x || column >= self.area.right() {
            return None;
        }
        let span = (self.area.width.saturating_sub(1)).max(1) as f64;
        let frac = (column - self.area.x) as f64 / span;
        let x = self.x_bounds[0] + frac * (self.x_bounds[1] - self.x_bounds[0]);
        Some((x.round().max(0.0) as usize).min(self.len - 1))
    }

    /// Terminal cell for a plot coordinate, if it falls inside the plot.
    pub fn to_cell(&self, x: f64, y: f64) -> Option<(u16, u16)> {
        if self.area.width == 0 || self.area.height == 0 {
            return None;
        }
        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        let fx = (x - x0) / (x1 - x0);
        let fy = (y - y0) / (y1 - y0);
        if !(0.0..=1.0).contains(&fx) || !(0.0..=1.0).contains(&fy) {
            return None;
        }
        let col = self.area.x + (fx * (self.area.width - 1) as f64).round() as u16;
        let row = self.area.bottom() - 1 - (fy * (self.area.height - 1) as f64).round() as u16;
        Some((col, row))
    }
}
