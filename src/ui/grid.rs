use crate::app::{Cell, RenderState, ROW_WIDTH};
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Terminal rows per grid row (border + title + flair + border).
const CELL_HEIGHT: u16 = 4;

/// First grid row to draw so that `cursor_row` stays on screen.
fn first_visible_row(cursor_row: usize, visible_rows: usize) -> usize {
    if visible_rows == 0 {
        return 0;
    }
    cursor_row.saturating_sub(visible_rows - 1)
}

/// Render the video grid, scrolled to keep the cursor visible.
pub fn render(f: &mut Frame, state: &RenderState, cursor: usize, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    if state.video_rows.is_empty() {
        let text = if state.loading {
            "Loading..."
        } else {
            "No videos"
        };
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
        return;
    }

    let visible_rows = (area.height / CELL_HEIGHT).max(1) as usize;
    let first = first_visible_row(cursor / ROW_WIDTH, visible_rows);

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CELL_HEIGHT); visible_rows])
        .split(area);

    for (offset, row) in state
        .video_rows
        .iter()
        .skip(first)
        .take(visible_rows)
        .enumerate()
    {
        let col_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, ROW_WIDTH as u32); ROW_WIDTH])
            .split(row_areas[offset]);

        for (col, cell) in row.iter().enumerate() {
            let position = (first + offset) * ROW_WIDTH + col;
            render_cell(f, cell, position == cursor, state.expanded_index, col_areas[col]);
        }
    }
}

fn render_cell(
    f: &mut Frame,
    cell: &Cell,
    is_cursor: bool,
    expanded: Option<usize>,
    area: Rect,
) {
    let Cell::Video(video) = cell else {
        // Placeholders keep the column layout; nothing to draw
        return;
    };

    let inner_width = area.width.saturating_sub(2) as usize;
    let title = strip_control_chars(&video.title);
    let is_expanded = expanded == Some(video.id);

    let border_style = if is_expanded {
        Style::default().fg(Color::Green)
    } else if is_cursor {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let title_style = if is_cursor {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let marker = if is_expanded { "▶ " } else { "" };
    let lines = vec![
        Line::from(Span::styled(
            truncate_to_width(&format!("{}{}", marker, title), inner_width).into_owned(),
            title_style,
        )),
        Line::from(Span::styled(
            truncate_to_width(&video.flair, inner_width).into_owned(),
            Style::default().fg(Color::Yellow),
        )),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    f.render_widget(paragraph, area);
}
