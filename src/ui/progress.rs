//! Status lines drawn with indicatif.

use crate::audio::PlaybackProgressInfo;
use crate::ui::cli::format_clock;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const BAR_TEMPLATE: &str = "{prefix:>12.bold} [{bar:32.cyan/blue}] {msg}";

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

/// Progress of the clip the playlist is sounding. Length and position are in milliseconds.
pub struct PlaybackDisplay {
    bar: ProgressBar,
}

impl PlaybackDisplay {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(bar_style());
        bar.set_prefix("idle");
        Self { bar }
    }

    pub fn set_now_playing(&self, label: &str) {
        self.bar.set_prefix(label.to_string());
        self.bar.set_length(0);
        self.bar.set_position(0);
        self.bar.set_message(String::new());
    }

    pub fn update_progress(&self, progress: PlaybackProgressInfo) {
        let current_ms = (progress.current_seconds.max(0.0) * 1000.0) as u64;
        match progress.total_seconds {
            Some(total) => {
                self.bar.set_length((total.max(0.0) * 1000.0) as u64);
                self.bar.set_message(format!("{} / {}", format_clock(progress.current_seconds), format_clock(total)));
            }
            None => self.bar.set_message(format_clock(progress.current_seconds)),
        }
        self.bar.set_position(current_ms);
    }

    /// Prints a line above the bar.
    pub fn note(&self, message: &str) {
        self.bar.println(message);
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Default for PlaybackDisplay {
    fn default() -> Self {
        Self::new()
    }
}

/// Countdown of the current guided step, drawn as elapsed over duration.
pub struct CountdownDisplay {
    bar: ProgressBar,
}

impl CountdownDisplay {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(bar_style());
        Self { bar }
    }

    pub fn set_step(&self, title: &str, duration: Duration) {
        self.bar.set_prefix(title.to_string());
        self.bar.set_length(duration.as_secs());
        self.bar.set_position(0);
    }

    pub fn update(&self, remaining: Duration, in_transition: bool, paused: bool) {
        let length = self.bar.length().unwrap_or(0);
        self.bar.set_position(length.saturating_sub(remaining.as_secs()));
        let message = if paused {
            "paused".to_string()
        } else if in_transition {
            "next step...".to_string()
        } else {
            format!("{} left", format_clock(remaining.as_secs_f64()))
        };
        self.bar.set_message(message);
    }

    pub fn note(&self, message: &str) {
        self.bar.println(message);
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Default for CountdownDisplay {
    fn default() -> Self {
        Self::new()
    }
}
