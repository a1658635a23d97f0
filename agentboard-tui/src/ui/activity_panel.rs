//! Panel 3: most recent trades across all agents.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use agentboard_core::domain::TradeAction;
use agentboard_core::format::format_activity_time;

use crate::app::App;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let trades = app.recent_trades();
    if trades.is_empty() {
        let message = if app.data.is_some() {
            "No trades recorded."
        } else {
            "No data loaded."
        };
        f.render_widget(Paragraph::new(Span::styled(message, theme::muted())), area);
        return;
    }

    let items: Vec<ListItem> = trades
        .iter()
        .map(|t| {
            let (name, color, glyph) = match &app.data {
                Some(data) => (
                    data.config.display_name(&t.agent).to_string(),
                    app.styles
                        .iter()
                        .find(|s| s.agent == t.agent)
                        .map_or(theme::TEXT_PRIMARY, |s| s.color),
                    data.icon(&t.agent).map(|i| i.glyph.clone()),
                ),
                None => (t.agent.clone(), theme::TEXT_PRIMARY, None),
            };
            let action_style = match t.action {
                TradeAction::Buy => theme::positive(),
                TradeAction::Sell => theme::negative(),
            }
            .add_modifier(Modifier::BOLD);

            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<14}", format_activity_time(&t.date)), theme::muted()),
                Span::styled(
                    format!("{} ", glyph.unwrap_or_else(|| " ".into())),
                    Style::default().fg(color),
                ),
                Span::styled(format!("{name:<20}"), Style::default().fg(color)),
                Span::styled(format!("{:<5}", t.action.label()), action_style),
                Span::styled(format!("{} {}", t.amount, t.symbol), theme::text()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(theme::accent_bold().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.activity_selected));
    f.render_stateful_widget(list, area, &mut state);
}
