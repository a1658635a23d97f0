//! Bottom status bar: panel hints, current scale, last status message.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let mut spans: Vec<Span> = vec![
        Span::styled(
            " 1:Chart 2:Leaderboard 3:Activity 4:Help",
            theme::muted(),
        ),
        Span::raw(" | "),
        Span::styled(format!("[s] {}", app.scale.label()), theme::accent()),
        Span::raw(" | "),
    ];

    if let Some(progress) = app.loading {
        spans.push(Span::styled(
            format!("loading {}/{} ", progress.done, progress.total),
            theme::neutral(),
        ));
    }

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
