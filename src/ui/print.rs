//! Plain-text rendering of the grid, for `--print` and pipes.

use crate::app::{Cell, RenderState};
use crate::util::{display_width, strip_control_chars, truncate_to_width};
use std::fmt::Write;

const COLUMN_GAP: &str = " | ";

fn pad(s: &str, width: usize) -> String {
    let mut out = truncate_to_width(s, width).into_owned();
    let used = display_width(&out);
    out.extend(std::iter::repeat(' ').take(width.saturating_sub(used)));
    out
}

/// Format the current view as text, `width` columns wide.
///
/// Each grid row becomes two lines: titles, then flair. Placeholders print
/// as blank cells so columns line up.
pub fn format_grid(state: &RenderState, subreddit: &str, width: usize) -> String {
    let mut out = String::new();
    let selection = &state.selection;
    let flair = if selection.selected_flair.is_empty() {
        "all"
    } else {
        selection.selected_flair.as_str()
    };
    let _ = writeln!(
        out,
        "r/{} [{}] flair: {}",
        subreddit,
        selection.cache_key(),
        flair
    );

    if state.video_rows.is_empty() {
        out.push_str(if state.loading {
            "Loading...\n"
        } else {
            "No videos\n"
        });
        return out;
    }

    for row in &state.video_rows {
        let columns = row.len().max(1);
        let gaps = COLUMN_GAP.len() * (columns - 1);
        let cell_width = (width.saturating_sub(gaps) / columns).max(4);

        let mut titles = Vec::with_capacity(columns);
        let mut flairs = Vec::with_capacity(columns);
        for cell in row {
            match cell {
                Cell::Video(video) => {
                    let title = format!("{}. {}", video.id + 1, strip_control_chars(&video.title));
                    titles.push(pad(&title, cell_width));
                    flairs.push(pad(&video.flair, cell_width));
                }
                Cell::Placeholder => {
                    titles.push(pad("", cell_width));
                    flairs.push(pad("", cell_width));
                }
            }
        }
        let _ = writeln!(out, "{}", titles.join(COLUMN_GAP).trim_end());
        let _ = writeln!(out, "{}", flairs.join(COLUMN_GAP).trim_end());
    }
    out
}
