//! Render dispatch for the TUI.

use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    widgets::Paragraph,
    Frame,
};

use super::{grid, help, nav, player, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 14;

const NAV_HEIGHT: u16 = 5;
const PLAYER_HEIGHT: u16 = 5;

pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let state = app.render_state();
    let expanded = state
        .expanded_index
        .and_then(|id| app.visible_videos().into_iter().find(|v| v.id == id));

    let mut constraints = vec![Constraint::Length(NAV_HEIGHT), Constraint::Min(0)];
    if expanded.is_some() {
        constraints.push(Constraint::Length(PLAYER_HEIGHT));
    }
    constraints.push(Constraint::Length(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    nav::render(f, &state, app.subreddit(), chunks[0]);
    grid::render(f, &state, app.cursor, chunks[1]);
    if let Some(video) = expanded {
        player::render(f, &video.title, app.playback(video.id).as_ref(), chunks[2]);
    }
    status::render(f, app, chunks[chunks.len() - 1]);

    if app.show_help {
        help::render(f);
    }
}
