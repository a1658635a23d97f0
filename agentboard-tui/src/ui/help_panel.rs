//! Panel 4: keyboard shortcuts.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global");
    key(&mut lines, "1-4", "Switch to panel by number");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "s", "Toggle linear / log scale");
    key(&mut lines, "x", "Export asset evolution as CSV");
    key(&mut lines, "r", "Reload data");
    key(&mut lines, "g / Home", "Back to top");
    key(&mut lines, "e", "Error history");
    key(&mut lines, "q", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, "Asset Evolution [1]");
    key(&mut lines, "h / l, Left / Right", "Move the tooltip cursor");
    key(&mut lines, "H / L", "Move by ten timestamps");
    key(&mut lines, "End", "Jump to the latest timestamp");
    key(&mut lines, "mouse", "Hover to move the cursor");
    lines.push(Line::from(""));

    section(&mut lines, "Leaderboard [2]");
    key(&mut lines, "j / k", "Scroll");
    lines.push(Line::from(""));

    section(&mut lines, "Recent Activity [3]");
    key(&mut lines, "j / k", "Select trade");
    key(&mut lines, "Enter", "Show the agent's reasoning for the trade");
    lines.push(Line::from(""));

    section(&mut lines, "Chart legend");
    key(&mut lines, "━━", "Agent (area filled)");
    key(&mut lines, "╍╍", "Benchmark (dashed)");
    key(&mut lines, "●", "Latest value, with the agent's icon");

    let para = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.help_scroll, 0));
    f.render_widget(para, area);
}

fn section(lines: &mut Vec<Line>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key(lines: &mut Vec<Line>, keys: &str, description: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {keys:<22}"), theme::warning()),
        Span::styled(description.to_string(), theme::text_secondary()),
    ]));
}
