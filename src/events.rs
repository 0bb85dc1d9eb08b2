use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, InputMode, View};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // If a text prompt is active, route everything to it
    if app.input_mode.is_some() {
        handle_text_input(app, key);
        return;
    }

    // If the report detail overlay is shown, handle overlay-specific keys
    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => app.go_back(),
            // Scroll the execution log while the overlay is open
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::PageUp => app.select_prev_n(10),
            KeyCode::PageDown => app.select_next_n(10),
            // Report actions also work from inside the overlay
            KeyCode::Char('w') => app.download_selected_pdf(),
            KeyCode::Char('s') => start_share(app),
            KeyCode::Char('d') => app.delete_selected_report(),
            _ => {}
        }
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),

        // Direct view access
        KeyCode::Char('1') => app.set_view(View::Dashboard),
        KeyCode::Char('2') => app.set_view(View::Reports),
        KeyCode::Char('3') => app.set_view(View::Sources),
        KeyCode::Char('4') => app.set_view(View::Schedules),
        KeyCode::Char('5') => app.set_view(View::Settings),

        // Navigation (up/down for items, left/right for tabs)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Open the selected report
        KeyCode::Enter => handle_enter(app),
        KeyCode::Esc => app.go_back(),

        // Trigger a generation run from anywhere
        KeyCode::Char('g') => app.generate_report(),

        // Per-view actions
        KeyCode::Char('a') => handle_add(app),
        KeyCode::Char('d') => handle_delete(app),
        KeyCode::Char('w') => {
            if matches!(app.current_view, View::Dashboard | View::Reports) {
                app.download_selected_pdf();
            }
        }
        KeyCode::Char('s') => {
            if matches!(app.current_view, View::Dashboard | View::Reports) {
                start_share(app);
            }
        }
        KeyCode::Char('m') => {
            if app.current_view == View::Settings {
                app.sync_local_models();
            }
        }

        // Manual refresh
        KeyCode::Char('r') => {
            app.load_initial();
            app.set_status_message("Refreshed".to_string());
        }

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

fn handle_enter(app: &mut App) {
    match app.current_view {
        View::Dashboard | View::Reports => app.enter_detail(),
        View::Settings => {
            if app.setup_required() {
                // Retry the initial configuration fetch
                app.reload_settings();
                return;
            }
            if let Some(key) = app.setting_keys.get(app.selected_setting).cloned() {
                app.start_input(InputMode::EditSetting { key });
            }
        }
        _ => {}
    }
}

fn handle_add(app: &mut App) {
    match app.current_view {
        View::Sources => app.start_input(InputMode::AddSourceUrl),
        View::Schedules => app.start_input(InputMode::AddScheduleTime),
        _ => {}
    }
}

fn handle_delete(app: &mut App) {
    match app.current_view {
        View::Dashboard | View::Reports => app.delete_selected_report(),
        View::Sources => app.delete_selected_source(),
        View::Schedules => app.delete_selected_schedule(),
        _ => {}
    }
}

fn start_share(app: &mut App) {
    if let Some(report) = app.selected_report() {
        let report_id = report.id;
        app.start_input(InputMode::ShareEmail { report_id });
    }
}

fn handle_text_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => app.input_pop(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.cancel_input(),
        KeyCode::Char(c) => app.input_push(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_input_routing() {
        let code = KeyCode::Char('x');
        // KeyEvent construction is enough to exercise the matcher shape
        let key = KeyEvent::from(code);
        assert_eq!(key.code, KeyCode::Char('x'));
        assert!(!key.modifiers.contains(KeyModifiers::CONTROL));
    }
}
