//! Top-level layout: stat header, one active panel, status bar.

pub mod activity_panel;
pub mod chart_panel;
pub mod header;
pub mod help_panel;
pub mod leaderboard_panel;
pub mod overlays;
pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::app::{App, Overlay, Panel};
use crate::theme;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header::HEIGHT),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    header::render(f, chunks[0], app);
    draw_panel(f, chunks[1], app);
    status_bar::render(f, chunks[2], app);

    if app.loading.is_some() && app.data.is_none() {
        overlays::render_loading(f, chunks[1], app);
    }
    match &app.overlay {
        Overlay::Alert(message) => overlays::render_alert(f, chunks[1], message),
        Overlay::ErrorHistory => overlays::render_error_history(f, chunks[1], app),
        Overlay::Reasoning { title, text, scroll } => {
            overlays::render_reasoning(f, chunks[1], title, text, *scroll)
        }
        Overlay::None => {}
    }
}

fn draw_panel(f: &mut Frame, area: Rect, app: &App) {
    let panel = app.active_panel;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" {} [{}] ", panel.label(), panel.index() + 1))
        .title_style(theme::panel_title(true));

    let inner = block.inner(area);
    f.render_widget(block, area);

    if panel != Panel::Chart {
        app.chart_geometry.set(None);
    }
    match panel {
        Panel::Chart => chart_panel::render(f, inner, app),
        Panel::Leaderboard => leaderboard_panel::render(f, inner, app),
        Panel::Activity => activity_panel::render(f, inner, app),
        Panel::Help => help_panel::render(f, inner, app),
    }
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
