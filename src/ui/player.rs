use crate::app::Playback;
use crate::util::strip_control_chars;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Panel showing the playable media of the expanded cell.
pub fn render(f: &mut Frame, title: &str, playback: Option<&Playback>, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let (label, body) = match playback {
        Some(Playback::Embed(html)) => ("Embed", strip_control_chars(html).into_owned()),
        Some(Playback::Direct(url)) => ("Direct", url.clone()),
        None => ("None", "No playable media for this video".to_string()),
    };

    let paragraph = Paragraph::new(vec![
        Line::styled(
            format!("{} ([o] opens direct URL, Esc collapses)", label),
            Style::default().fg(Color::DarkGray),
        ),
        Line::raw(body),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(format!(" {} ", strip_control_chars(title))),
    );
    f.render_widget(paragraph, area);
}
