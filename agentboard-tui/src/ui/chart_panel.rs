//! Panel 1: asset evolution chart with hover tooltip.
//!
//! The plot itself is a label-less ratatui `Chart`; axis labels, the
//! cursor, badges and the tooltip are drawn straight into the buffer so
//! they line up with [`ChartGeometry`].

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph};
use ratatui::Frame;

use agentboard_core::format::{format_currency, format_timestamp};
use agentboard_runner::DashboardData;

use crate::app::App;
use crate::chart::{ChartGeometry, ChartModel, SeriesStyle, FILL_DIM};
use crate::theme;
use crate::tooltip::place_tooltip;

const CURSOR: &str = "│";
const BADGE: &str = "●";

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    app.chart_geometry.set(None);
    match (&app.data, &app.chart) {
        (Some(data), Some(model)) if !model.is_empty() => render_chart(f, area, app, data, model),
        (Some(_), _) => render_message(f, area, "No history to chart yet."),
        (None, _) if app.loading.is_some() => {}
        (None, _) => render_message(f, area, "No data loaded. Press r to load."),
    }
}

fn render_message(f: &mut Frame, area: Rect, message: &str) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme::muted())),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn render_chart(f: &mut Frame, area: Rect, app: &App, data: &DashboardData, model: &ChartModel) {
    let y_labels: Vec<String> = model.y_ticks.iter().map(|t| format_currency(t.value)).collect();
    let gutter = y_labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 1;
    if area.width <= gutter + 2 || area.height < 3 {
        return;
    }
    let plot = Rect::new(area.x + gutter, area.y, area.width - gutter, area.height - 1);

    f.render_widget(build_chart(model, &app.styles), plot);

    let geometry = ChartGeometry::new(plot, model);
    app.chart_geometry.set(Some(geometry));

    let buf = f.buffer_mut();
    for (tick, label) in model.y_ticks.iter().zip(&y_labels) {
        if let Some((_, row)) = geometry.to_cell(model.x_bounds[0], tick.y) {
            let pad = gutter.saturating_sub(label.chars().count() as u16 + 1);
            buf.set_string(area.x + pad, row, label, theme::muted());
        }
    }

    let formats = data.config.ui().date_formats;
    let label_row = plot.bottom();
    let mut next_free = plot.x;
    for &index in &model.x_ticks {
        let (Some(ts), Some((col, _))) = (data.merged.axis.get(index), geometry.to_cell(index as f64, 0.0)) else {
            continue;
        };
        let label = format_timestamp(ts, &formats);
        let width = label.chars().count() as u16;
        let start = col.saturating_sub(width / 2).max(plot.x).min(area.right().saturating_sub(width));
        if start < next_free {
            continue;
        }
        buf.set_string(start, label_row, &label, theme::muted());
        next_free = start + width + 1;
    }

    if let Some(index) = app.cursor {
        if let Some((col, _)) = geometry.to_cell(index as f64, 0.0) {
            for row in plot.y..plot.bottom() {
                if let Some(cell) = buf.cell_mut((col, row)) {
                    if cell.symbol() == " " {
                        cell.set_symbol(CURSOR).set_style(theme::muted());
                    }
                }
            }
        }
    }

    for badge in &model.badges {
        let Some(style) = app.styles.get(badge.style) else {
            continue;
        };
        if let Some((col, row)) = geometry.to_cell(badge.x, badge.y) {
            let text = match &style.glyph {
                Some(glyph) => format!("{BADGE}{glyph}"),
                None => BADGE.to_string(),
            };
            let room = (plot.right() - col) as usize;
            buf.set_stringn(col, row, text, room, Style::default().fg(style.color));
        }
    }

    render_tooltip(f, area, app, model, geometry);
}

fn build_chart<'a>(model: &'a ChartModel, styles: &[SeriesStyle]) -> Chart<'a> {
    let color = |i: usize| styles.get(i).map_or(theme::TEXT_PRIMARY, |s| s.color);

    let fills = model.fills.iter().map(|t| {
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Bar)
            .style(Style::default().fg(theme::dim(color(t.style), FILL_DIM)))
            .data(&t.points)
    });
    let lines = model.lines.iter().map(|t| {
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(color(t.style)))
            .data(&t.points)
    });
    let dashes = model.dashes.iter().map(|t| {
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(color(t.style)))
            .data(&t.points)
    });

    // Fill first so lines draw over it.
    Chart::new(fills.chain(lines).chain(dashes).collect())
        .x_axis(Axis::default().bounds(model.x_bounds))
        .y_axis(Axis::default().bounds(model.y_bounds))
}

fn render_tooltip(f: &mut Frame, viewport: Rect, app: &App, model: &ChartModel, geometry: ChartGeometry) {
    let Some(tooltip) = app.tooltip() else {
        return;
    };
    let Some(top) = tooltip.entries.first() else {
        return;
    };
    let anchor_y = model.plot_y(top.value).unwrap_or(model.y_bounds[1]);
    let Some(anchor) = geometry.to_cell(tooltip.index as f64, anchor_y.clamp(model.y_bounds[0], model.y_bounds[1])) else {
        return;
    };

    let size = tooltip.size(&app.styles);
    let rect = place_tooltip(anchor, size, viewport);
    if rect.width < 3 || rect.height < 3 {
        return;
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(format!(" {} ", tooltip.title))
        .title_style(theme::accent_bold());
    f.render_widget(Clear, rect);
    f.render_widget(Paragraph::new(tooltip.lines(&app.styles)).block(block), rect);
}
