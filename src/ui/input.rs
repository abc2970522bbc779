//! Keyboard input handling.
//!
//! Keys map onto [`UiAction`]s for everything that changes view state; grid
//! navigation and browser opening are handled here directly.

use crate::app::{App, UiAction};
use crate::feed::{Category, Timeframe};
use crate::util::validate_url_for_open;
use crossterm::event::{KeyCode, KeyModifiers};

use super::Action;

/// Category hotkeys, in nav-bar order.
pub(super) const CATEGORY_KEYS: [(char, Category); 6] = [
    ('t', Category::Top),
    ('H', Category::Hot),
    ('n', Category::New),
    ('r', Category::Rising),
    ('c', Category::Controversial),
    ('f', Category::None),
];

/// Timeframe hotkeys, in nav-bar order.
pub(super) const TIMEFRAME_KEYS: [(char, Timeframe); 6] = [
    ('1', Timeframe::Hour),
    ('2', Timeframe::Day),
    ('3', Timeframe::Week),
    ('4', Timeframe::Month),
    ('5', Timeframe::Year),
    ('6', Timeframe::All),
];

pub(super) fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    if app.show_help {
        if matches!(code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
            app.show_help = false;
        }
        return Action::Continue;
    }

    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if let KeyCode::Char(ch) = code {
        if let Some(action) = action_for_char(ch) {
            app.dispatch(action);
            return Action::Continue;
        }
    }

    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('?') => app.show_help = true,

        KeyCode::Left | KeyCode::Char('h') => app.move_cursor(-1, 0),
        KeyCode::Right | KeyCode::Char('l') => app.move_cursor(1, 0),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(0, 1),

        KeyCode::Char(']') => {
            app.cycle_flair(true);
        }
        KeyCode::Char('[') => {
            app.cycle_flair(false);
        }
        KeyCode::Char('0') => {
            app.dispatch(UiAction::FlairSelected(String::new()));
        }

        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(id) = app.cursor_video().map(|v| v.id) {
                app.dispatch(UiAction::VideoClicked(id));
            }
        }
        KeyCode::Esc => {
            if let Some(expanded) = app.expanded_index() {
                app.dispatch(UiAction::VideoClicked(expanded));
            } else if !app.selection().selected_flair.is_empty() {
                app.dispatch(UiAction::FlairSelected(String::new()));
            }
        }
        KeyCode::Char('o') => open_cursor_video(app),
        _ => {}
    }
    Action::Continue
}

/// Category and timeframe hotkeys.
fn action_for_char(ch: char) -> Option<UiAction> {
    CATEGORY_KEYS
        .iter()
        .find(|(key, _)| *key == ch)
        .map(|(_, category)| UiAction::CategorySelected(*category))
        .or_else(|| {
            TIMEFRAME_KEYS
                .iter()
                .find(|(key, _)| *key == ch)
                .map(|(_, timeframe)| UiAction::TimeframeSelected(*timeframe))
        })
}

fn open_cursor_video(app: &mut App) {
    let Some(video) = app.cursor_video() else {
        return;
    };
    let Some(url) = video.direct_url.clone() else {
        app.set_status("Video has no direct URL");
        return;
    };

    if let Err(e) = validate_url_for_open(&url) {
        app.set_status(e.to_string());
    } else if let Err(e) = open::that(&url) {
        app.set_status(format!("Failed to open browser: {}", e));
    } else {
        app.set_status(format!("Opening {}...", url));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_keys() {
        assert_eq!(
            action_for_char('H'),
            Some(UiAction::CategorySelected(Category::Hot))
        );
        assert_eq!(
            action_for_char('f'),
            Some(UiAction::CategorySelected(Category::None))
        );
    }

    #[test]
    fn test_timeframe_keys() {
        assert_eq!(
            action_for_char('3'),
            Some(UiAction::TimeframeSelected(Timeframe::Week))
        );
        assert_eq!(
            action_for_char('6'),
            Some(UiAction::TimeframeSelected(Timeframe::All))
        );
    }

    #[test]
    fn test_navigation_keys_are_not_actions() {
        for ch in ['h', 'j', 'k', 'l', 'q', 'o', '0', '[', ']'] {
            assert_eq!(action_for_char(ch), None, "key {ch}");
        }
    }
}
