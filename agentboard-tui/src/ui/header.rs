//! Stat cards and series legend.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use agentboard_core::format::{format_date, format_percent};

use crate::app::App;
use crate::theme;

/// Three rows of cards plus one legend row.
pub const HEIGHT: u16 = 4;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(area);

    render_cards(f, rows[0], app);
    f.render_widget(Paragraph::new(legend(app)), rows[1]);
}

fn render_cards(f: &mut Frame, area: Rect, app: &App) {
    let stats = app.data.as_ref().map(|d| &d.stats);

    let agents = stats.map_or("-".to_string(), |s| s.agent_count.to_string());
    let range = stats
        .and_then(|s| s.date_range.as_ref())
        .map_or("-".to_string(), |(a, b)| {
            format!("{} to {}", format_date(a), format_date(b))
        });
    let best = stats.and_then(|s| s.best_performer.as_ref());
    let best_name = best.map_or("-".to_string(), |b| b.display_name.clone());
    let (best_return, best_style) = best.map_or(("-".to_string(), theme::muted()), |b| {
        (format_percent(b.return_percent), theme::pnl(b.return_percent))
    });

    let cards = [
        ("Agents", agents, theme::accent_bold()),
        ("Period", range, theme::text()),
        ("Best Performer", best_name, theme::accent_bold()),
        ("Best Return", best_return, best_style.add_modifier(Modifier::BOLD)),
    ];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(15),
            Constraint::Percentage(35),
            Constraint::Percentage(30),
            Constraint::Percentage(20),
        ])
        .split(area);

    for ((label, value, style), col) in cards.into_iter().zip(columns.iter()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme::muted())
            .title(format!(" {label} "))
            .title_style(theme::muted());
        f.render_widget(Paragraph::new(Span::styled(value, style)).block(block), *col);
    }
}

fn legend(app: &App) -> Line<'static> {
    let Some(data) = &app.data else {
        return Line::from(Span::styled(" Waiting for data...", theme::muted()));
    };
    let mut spans = vec![Span::raw(" ")];
    for style in &app.styles {
        let swatch = if style.is_benchmark { "╍╍" } else { "━━" };
        let ret = data.series.get(&style.agent).map(|s| s.return_percent);
        if let Some(glyph) = &style.glyph {
            let icon = match style.brand {
                Some(brand) => Style::default().fg(theme::BACKGROUND).bg(brand),
                None => Style::default().fg(style.color),
            };
            spans.push(Span::styled(glyph.clone(), icon));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(swatch, Style::default().fg(style.color)));
        spans.push(Span::styled(format!(" {} ", style.display_name), theme::text()));
        if let Some(ret) = ret {
            spans.push(Span::styled(format_percent(ret), theme::pnl(ret)));
        }
        spans.push(Span::raw("   "));
    }
    Line::from(spans)
}
