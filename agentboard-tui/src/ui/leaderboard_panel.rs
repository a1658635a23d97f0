//! Panel 2: final values ranked, benchmark included.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};
use ratatui::Frame;

use agentboard_core::format::{format_currency, format_percent};

use crate::app::App;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(data) = &app.data else {
        f.render_widget(
            Paragraph::new(Span::styled("No data loaded.", theme::muted())),
            area,
        );
        return;
    };

    let header = Row::new(["#", "Agent", "Final Value", "Gain", "Gain %", "Return %"])
        .style(theme::accent_bold())
        .bottom_margin(1);

    let rows = data
        .leaderboard
        .iter()
        .skip(app.leaderboard_scroll)
        .map(|entry| {
            let color = app
                .styles
                .iter()
                .find(|s| s.agent == entry.agent)
                .map_or(theme::TEXT_PRIMARY, |s| s.color);
            let glyph = data
                .icon(&entry.agent)
                .map(|i| format!("{} ", i.glyph))
                .unwrap_or_default();
            let mut name = vec![
                Span::styled(glyph, Style::default().fg(color)),
                Span::styled(
                    entry.display_name.clone(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            ];
            if entry.is_benchmark {
                name.push(Span::styled(" (benchmark)", theme::muted()));
            }
            let rank_style = if entry.rank == 1 {
                theme::warning().add_modifier(Modifier::BOLD)
            } else {
                theme::muted()
            };
            Row::new(vec![
                Cell::from(Span::styled(format!("{}", entry.rank), rank_style)),
                Cell::from(Line::from(name)),
                Cell::from(format_currency(entry.final_value)).style(theme::text()),
                Cell::from(format_currency(entry.gain)).style(theme::pnl(entry.gain)),
                Cell::from(format_percent(entry.gain_percent)).style(theme::pnl(entry.gain_percent)),
                Cell::from(format_percent(entry.return_percent)).style(theme::pnl(entry.return_percent)),
            ])
        });

    let widths = [
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Length(14),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(10),
    ];
    f.render_widget(Table::new(rows, widths).header(header).column_spacing(2), area);
}
