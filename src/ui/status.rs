use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Keybinding hints shown when there is nothing else to report.
const KEY_HINTS: &str =
    "[hjkl]move [Enter]play [o]pen [t/H/n/r/c/f]sort [1-6]time [ and ]flair [?]help [q]uit";

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(&**msg)
    } else if app.is_loading() {
        Cow::Owned(format!("Loading {}...", app.selection().cache_key()))
    } else {
        Cow::Borrowed(KEY_HINTS)
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}
