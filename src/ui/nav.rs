use crate::app::RenderState;
use crate::feed::Category;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::input::{CATEGORY_KEYS, TIMEFRAME_KEYS};

fn active_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

fn link(label: String, active: bool, enabled: bool) -> Span<'static> {
    let style = if active {
        active_style()
    } else if enabled {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Span::styled(label, style)
}

/// Category, timeframe and flair links, with the current selection highlighted.
pub fn render(f: &mut Frame, state: &RenderState, subreddit: &str, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }
    let selection = &state.selection;

    let mut categories = vec![Span::raw("Sort: ")];
    for (key, category) in CATEGORY_KEYS {
        categories.push(link(
            format!(" {} [{}] ", category.label(), key),
            selection.category == category,
            true,
        ));
    }

    let on_top = selection.category == Category::Top;
    let mut timeframes = vec![Span::raw("Time: ")];
    for (key, timeframe) in TIMEFRAME_KEYS {
        timeframes.push(link(
            format!(" {} [{}] ", timeframe.label(), key),
            on_top && selection.timeframe == Some(timeframe),
            on_top,
        ));
    }

    let mut flair = vec![Span::raw("Flair: ")];
    flair.push(link(
        " All [0] ".to_string(),
        selection.selected_flair.is_empty(),
        true,
    ));
    for option in &state.flair_options {
        flair.push(link(
            format!(" {} ", option),
            *option == selection.selected_flair,
            true,
        ));
    }
    if !state.flair_options.is_empty() {
        flair.push(Span::styled(
            "  ([ / ] to cycle)",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let title = format!(" r/{} ", subreddit);
    let paragraph = Paragraph::new(vec![
        Line::from(categories),
        Line::from(timeframes),
        Line::from(flair),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title),
    );
    f.render_widget(paragraph, area);
}
