//! Input dispatch: overlays first, then global keys, then the active panel.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, Overlay, Panel};

pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    match &app.overlay {
        Overlay::Alert(_) => {
            handle_alert_overlay(app, key);
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::Reasoning { .. } => {
            handle_reasoning_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        KeyCode::Char(c @ '1'..='4') => {
            if let Some(panel) = c.to_digit(10).and_then(|d| Panel::from_index(d as usize - 1)) {
                app.active_panel = panel;
            }
            return;
        }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel = app.active_panel.prev();
            } else {
                app.active_panel = app.active_panel.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        KeyCode::Char('s') => {
            app.toggle_scale();
            return;
        }
        KeyCode::Char('x') => {
            app.export();
            return;
        }
        KeyCode::Char('r') => {
            app.request_load();
            return;
        }
        KeyCode::Char('e') => {
            app.error_scroll = 0;
            app.overlay = Overlay::ErrorHistory;
            return;
        }
        KeyCode::Char('g') | KeyCode::Home => {
            app.scroll_to_top();
            return;
        }
        _ => {}
    }

    match app.active_panel {
        Panel::Chart => handle_chart_key(app, key),
        Panel::Activity => handle_activity_key(app, key),
        Panel::Leaderboard | Panel::Help => handle_scroll_key(app, key),
    }
}

pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.overlay != Overlay::None {
        return;
    }
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) if app.active_panel == Panel::Chart => {
            app.hover(mouse.column, mouse.row);
        }
        MouseEventKind::ScrollDown => app.scroll_down(),
        MouseEventKind::ScrollUp => app.scroll_up(),
        _ => {}
    }
}

fn handle_chart_key(app: &mut App, key: KeyEvent) {
    let step = if key.modifiers.contains(KeyModifiers::SHIFT) { 10 } else { 1 };
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => app.move_cursor(-step),
        KeyCode::Right | KeyCode::Char('l') => app.move_cursor(step),
        KeyCode::Char('H') => app.move_cursor(-10),
        KeyCode::Char('L') => app.move_cursor(10),
        KeyCode::End => app.move_cursor(isize::MAX / 2),
        _ => {}
    }
}

fn handle_activity_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.open_reasoning(),
        _ => handle_scroll_key(app, key),
    }
}

fn handle_scroll_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
        _ => {}
    }
}

fn handle_alert_overlay(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.running = false,
        KeyCode::Char('r') => {
            app.overlay = Overlay::None;
            app.request_load();
        }
        KeyCode::Char('e') => app.overlay = Overlay::ErrorHistory,
        _ => {}
    }
}

fn handle_error_overlay(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = if app.data.is_none() && app.loading.is_none() {
                // Nothing behind the history to return to.
                app.error_history
                    .front()
                    .map(|e| Overlay::Alert(e.message.clone()))
                    .unwrap_or(Overlay::None)
            } else {
                Overlay::None
            };
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_reasoning_overlay(app: &mut App, key: KeyEvent) {
    let Overlay::Reasoning { scroll, .. } = &mut app.overlay else {
        return;
    };
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => app.overlay = Overlay::None,
        KeyCode::Char('j') | KeyCode::Down => *scroll = scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => *scroll = scroll.saturating_sub(1),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseButton};
    use ratatui::layout::Rect;

    use crate::app::tests::{sample_data, test_app};
    use crate::chart::ChartGeometry;
    use crate::worker::WorkerCommand;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn release_events_are_ignored() {
        let (mut app, _rx) = test_app();
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        key.state = KeyEventState::NONE;
        handle_key(&mut app, key);
        assert!(app.running);
    }

    #[test]
    fn number_keys_switch_panels() {
        let (mut app, _rx) = test_app();
        handle_key(&mut app, press(KeyCode::Char('3')));
        assert_eq!(app.active_panel, Panel::Activity);
        handle_key(&mut app, press(KeyCode::BackTab));
        assert_eq!(app.active_panel, Panel::Leaderboard);
        handle_key(&mut app, press(KeyCode::Char('g')));
        assert_eq!(app.active_panel, Panel::Chart);
    }

    #[test]
    fn scale_toggle_rebuilds_chart() {
        let (mut app, _rx) = test_app();
        app.apply_loaded(sample_data());
        let before = app.chart.clone().unwrap();
        handle_key(&mut app, press(KeyCode::Char('s')));
        let after = app.chart.as_ref().unwrap();
        assert_ne!(before.scale, after.scale);
        assert_ne!(before.y_bounds, after.y_bounds);
    }

    #[test]
    fn chart_keys_move_cursor() {
        let (mut app, _rx) = test_app();
        app.apply_loaded(sample_data());
        handle_key(&mut app, press(KeyCode::Char('h')));
        assert_eq!(app.cursor, Some(1));
        handle_key(&mut app, press(KeyCode::Left));
        handle_key(&mut app, press(KeyCode::Left));
        assert_eq!(app.cursor, Some(0));
        handle_key(&mut app, press(KeyCode::End));
        assert_eq!(app.cursor, Some(2));
    }

    #[test]
    fn mouse_motion_over_chart_moves_cursor() {
        let (mut app, _rx) = test_app();
        app.apply_loaded(sample_data());
        let model = app.chart.clone().unwrap();
        app.chart_geometry
            .set(Some(ChartGeometry::new(Rect::new(10, 2, 41, 10), &model)));

        let at = |column, kind| MouseEvent {
            kind,
            column,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(&mut app, at(10, MouseEventKind::Moved));
        assert_eq!(app.cursor, Some(0));
        handle_mouse(&mut app, at(30, MouseEventKind::Drag(MouseButton::Left)));
        assert_eq!(app.cursor, Some(1));
        // Outside the plot: unchanged.
        handle_mouse(&mut app, at(60, MouseEventKind::Moved));
        assert_eq!(app.cursor, Some(1));
    }

    #[test]
    fn enter_on_trade_opens_reasoning() {
        let (mut app, rx) = test_app();
        app.apply_loaded(sample_data());
        handle_key(&mut app, press(KeyCode::Char('3')));
        handle_key(&mut app, press(KeyCode::Enter));
        assert!(matches!(app.overlay, Overlay::Reasoning { .. }));
        assert!(matches!(rx.try_recv(), Ok(WorkerCommand::Reasoning { .. })));

        handle_key(&mut app, press(KeyCode::Char('j')));
        assert!(matches!(app.overlay, Overlay::Reasoning { scroll: 1, .. }));
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn alert_blocks_everything_but_quit_and_retry() {
        let (mut app, rx) = test_app();
        app.overlay = Overlay::Alert("bad config".into());
        handle_key(&mut app, press(KeyCode::Char('2')));
        assert_eq!(app.active_panel, Panel::Chart);

        handle_key(&mut app, press(KeyCode::Char('r')));
        assert!(matches!(rx.try_recv(), Ok(WorkerCommand::Load)));
        assert!(app.loading.is_some());

        app.overlay = Overlay::Alert("bad config".into());
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(!app.running);
    }
}
