//! Help overlay: keybinding table.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Row, Table},
    Frame,
};

const BINDINGS: [(&str, &str); 13] = [
    ("h j k l / arrows", "Move cursor"),
    ("Enter / Space", "Expand or collapse video"),
    ("o", "Open direct URL in browser"),
    ("t", "Top"),
    ("H", "Hot"),
    ("n", "New"),
    ("r", "Rising"),
    ("c", "Controversial"),
    ("f", "Front page"),
    ("1-6", "Top of hour / day / week / month / year / all"),
    ("[ ]", "Previous / next flair"),
    ("0 / Esc", "Clear flair (Esc collapses first)"),
    ("q", "Quit"),
];

/// Render the help overlay on top of the current view.
pub fn render(f: &mut Frame) {
    let overlay = centered_rect(70, 70, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let rows: Vec<Row> = BINDINGS
        .iter()
        .map(|(key, action)| Row::new(vec![format!("  {}", key), action.to_string()]))
        .collect();

    let table = Table::new(rows, [Constraint::Length(20), Constraint::Min(20)])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help (? to close) "),
        )
        .header(
            Row::new(vec!["Key", "Action"])
                .style(
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::UNDERLINED),
                )
                .bottom_margin(1),
        );

    f.render_widget(table, overlay);
}

/// Create a centered rectangle with the given percentage of the parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
