//! Hover tooltip: ranked values at one merged timestamp, and where to put
//! the box on screen.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use agentboard_core::config::DateFormats;
use agentboard_core::format::{format_currency, format_timestamp};
use agentboard_core::merge::MergedSeries;

use crate::chart::SeriesStyle;
use crate::theme;

/// Distance from the anchor cell to the tooltip box.
const OFFSET_X: i32 = 2;
const OFFSET_Y: i32 = 1;
/// Minimum gap between the box and the viewport edge.
const MARGIN: i32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipEntry {
    pub rank: usize,
    /// Column in the merged series (and index into the styles).
    pub column: usize,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub index: usize,
    pub title: String,
    pub entries: Vec<TooltipEntry>,
}

impl Tooltip {
    /// Every agent with a value at `index`, highest first. Agents without a
    /// value there are left out. `None` past the end of the axis.
    pub fn at(merged: &MergedSeries, index: usize, formats: &DateFormats) -> Option<Self> {
        let timestamp = merged.axis.get(index)?;
        let mut values: Vec<(usize, f64)> = (0..merged.agent_count())
            .filter_map(|col| merged.value(col, index).map(|v| (col, v)))
            .collect();
        values.sort_by(|a, b| b.1.total_cmp(&a.1));

        Some(Self {
            index,
            title: format_timestamp(timestamp, formats),
            entries: values
                .into_iter()
                .enumerate()
                .map(|(i, (column, value))| TooltipEntry {
                    rank: i + 1,
                    column,
                    value,
                })
                .collect(),
        })
    }

    pub fn lines(&self, styles: &[SeriesStyle]) -> Vec<Line<'static>> {
        self.entries
            .iter()
            .map(|e| {
                let style = styles.get(e.column);
                let color = style.map_or(theme::TEXT_PRIMARY, |s| s.color);
                let name = style.map_or_else(String::new, |s| s.display_name.clone());
                let glyph = style.and_then(|s| s.glyph.clone()).unwrap_or_else(|| " ".into());
                Line::from(vec![
                    Span::styled(format!("#{} ", e.rank), theme::muted()),
                    Span::styled(format!("{glyph} "), Style::default().fg(color)),
                    Span::styled(name, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                    Span::raw("  "),
                    Span::styled(format_currency(e.value), theme::text()),
                ])
            })
            .collect()
    }

    /// Outer size including the border.
    pub fn size(&self, styles: &[SeriesStyle]) -> (u16, u16) {
        let body = self
            .lines(styles)
            .iter()
            .map(|l| l.width())
            .max()
            .unwrap_or(0);
        let title = self.title.chars().count() + 2;
        let width = body.max(title) + 2;
        let height = self.entries.len().max(1) + 2;
        (width.min(u16::MAX as usize) as u16, height.min(u16::MAX as usize) as u16)
    }
}

/// Box position for a tooltip of `size` anchored at `anchor`.
///
/// The box sits to the right of and above the anchor. It flips to the left
/// side when it would cross the right edge. When it fits on neither side it
/// moves below the anchor row (or above it, if below has no room) so the
/// cursor stays visible. It is then clamped inside the viewport with a
/// one-cell margin on every side. A box larger than the viewport is shrunk
/// to fit.
pub fn place_tooltip(anchor: (u16, u16), size: (u16, u16), viewport: Rect) -> Rect {
    let vx0 = viewport.x as i32 + MARGIN;
    let vy0 = viewport.y as i32 + MARGIN;
    let vx1 = viewport.right() as i32 - MARGIN;
    let vy1 = viewport.bottom() as i32 - MARGIN;

    let w = (size.0 as i32).min((vx1 - vx0).max(0));
    let h = (size.1 as i32).min((vy1 - vy0).max(0));
    let (ax, ay) = (anchor.0 as i32, anchor.1 as i32);

    let right = ax + OFFSET_X;
    let left = ax - OFFSET_X - w;
    let (x, y) = if right + w <= vx1 {
        (right, ay - OFFSET_Y - h + 1)
    } else if left >= vx0 {
        (left, ay - OFFSET_Y - h + 1)
    } else if ay + 1 + h <= vy1 {
        (right, ay + 1)
    } else {
        (right, ay - h)
    };

    let x = x.clamp(vx0, (vx1 - w).max(vx0));
    let y = y.clamp(vy0, (vy1 - h).max(vy0));
    Rect::new(x as u16, y as u16, w as u16, h as u16)
}
