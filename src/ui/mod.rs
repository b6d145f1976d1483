//! Terminal front end: arguments, listings, key bindings and status lines

mod cli;
mod keys;
mod progress;
mod terminal;

pub use cli::{format_clock, format_segment_row, unit_heading, Args, Cli, Command, UnitArgs};
pub use keys::{guide_action, play_action, GuideAction, PlayAction, SEEK_STEP_SECS, VOLUME_STEP};
pub use progress::{CountdownDisplay, PlaybackDisplay};
pub use terminal::{KeyReader, RawModeGuard};
