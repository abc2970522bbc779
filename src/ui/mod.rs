//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Fetch completion handling
//! - `render` - Layout and render dispatch
//! - `nav` - Category / timeframe / flair links
//! - `grid` - Video grid
//! - `player` - Expanded video panel
//! - `status` - Status bar
//! - `help` - Keybinding overlay
//! - `print` - Plain-text grid for non-interactive output

mod events;
mod grid;
mod help;
mod input;
mod loop_runner;
mod nav;
mod player;
mod print;
mod render;
mod status;

pub use loop_runner::{run, Action};
pub use print::format_grid;
