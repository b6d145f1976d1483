//! Command-line interface implementation

use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;

use crate::config::Settings;
use crate::content::{DevotionalUnit, Language, ResolveError};
use crate::player::InterludeMode;
use crate::segments::Segment;
use crate::steps::GuideStep;

/// Command-line arguments for lectio-player
#[derive(Parser, Debug)]
#[command(author, version, about = "Guided Lectio Divina player for the terminal", long_about = None)]
pub struct Args {
    /// Supabase project URL
    #[arg(short = 'u', long, env = "LECTIO_SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Supabase anon key
    #[arg(short = 'k', long, env = "LECTIO_ANON_KEY", hide_env_values = true)]
    pub anon_key: Option<String>,

    /// Access token of a signed-in user
    #[arg(long, env = "LECTIO_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Content language (en, es, pt, it, fr)
    #[arg(short, long, env = "LECTIO_LANGUAGE")]
    pub language: Option<Language>,

    /// ALSA device to use
    #[arg(short = 'd', long, env = "LECTIO_ALSA_DEVICE")]
    pub alsa_device: Option<String>,

    /// Config file path
    #[arg(short, long, env = "LECTIO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Which decade to open
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct UnitArgs {
    /// Mystery category: joyful, luminous, sorrowful or glorious
    pub category: String,

    /// Decade number within the category (1-5)
    pub ordinal: u32,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the segments of a decade
    Show {
        #[command(flatten)]
        unit: UnitArgs,
    },
    /// Play the audio of a decade with keyboard controls
    Play {
        #[command(flatten)]
        unit: UnitArgs,

        /// Filler between segments: none, short or long
        #[arg(short, long)]
        interlude: Option<InterludeMode>,

        /// Segment to start from (1-based)
        #[arg(long, default_value_t = 1)]
        from: usize,
    },
    /// Walk through the steps on a timer
    Guide {
        #[command(flatten)]
        unit: UnitArgs,

        /// Looping background track URL
        #[arg(short, long)]
        background: Option<String>,
    },
}

impl Command {
    pub fn unit(&self) -> &UnitArgs {
        match self {
            Command::Show { unit } | Command::Play { unit, .. } | Command::Guide { unit, .. } => unit,
        }
    }
}

impl Args {
    /// Lays command-line and environment values over the loaded settings.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(url) = &self.supabase_url {
            settings.supabase_url = url.clone();
        }
        if self.anon_key.is_some() {
            settings.anon_key = self.anon_key.clone();
        }
        if self.access_token.is_some() {
            settings.access_token = self.access_token.clone();
        }
        if let Some(language) = self.language {
            settings.language = language;
        }
        if let Some(device) = &self.alsa_device {
            settings.alsa_device = device.clone();
        }
        match &self.command {
            Command::Play { interlude: Some(mode), .. } => settings.interlude_mode = *mode,
            Command::Guide { background: Some(url), .. } => settings.background_audio = Some(url.clone()),
            _ => {}
        }
    }
}

/// CLI user interface for interacting with the application
pub struct Cli {
    pub args: Args,
}

impl Cli {
    /// Create a new CLI instance
    pub fn new() -> Self {
        Cli { args: Args::parse() }
    }

    /// Display the segment list of a unit
    pub fn display_segments(&self, unit: &DevotionalUnit, segments: &[Segment]) {
        println!("\n{}", unit_heading(unit));
        println!("{:<4} {:<22} {:<28} {}", "#", "Segment", "Subtitle", "Audio");
        println!("{}", "-".repeat(64));
        for (index, segment) in segments.iter().enumerate() {
            println!("{}", format_segment_row(index, segment));
        }
        println!();
    }

    /// Display the full text of every segment
    pub fn display_segment_texts(&self, segments: &[Segment]) {
        for segment in segments {
            println!("== {} ({}) ==", segment.title, segment.subtitle);
            let text = segment.plain_text();
            if text.is_empty() {
                println!("(no text)\n");
            } else {
                println!("{}\n", text);
            }
        }
    }

    /// Display the step outline of the guided mode
    pub fn display_guide_outline(&self, unit: &DevotionalUnit, steps: &[GuideStep]) {
        println!("\n{}", unit_heading(unit));
        for (index, step) in steps.iter().enumerate() {
            println!("{}. {} - {}", index + 1, step.title, step.subtitle);
        }
        println!();
    }

    pub fn display_play_controls(&self) {
        println!("Controls: [space] pause/resume  [n]ext  [p]revious  [1-8] jump  [←/→] seek 10s");
        println!("          [m] interlude mode  [s]top  [q]uit\n");
    }

    pub fn display_guide_controls(&self) {
        println!("Controls: [space] pause/resume  [n]ext  [p]revious  [r]estart  [+/-] volume  [m]ute  [q]uit\n");
    }

    pub fn display_not_found(&self, unit: &UnitArgs) {
        println!("No published decade {} in the {} mysteries for this language.", unit.ordinal, unit.category);
    }

    /// Display resolver errors, with a retry hint for transient ones
    pub fn display_resolve_error(&self, error: &ResolveError) {
        self.display_error(error);
        if error.is_retryable() {
            eprintln!("This looks temporary; try again in a moment.");
        }
    }

    /// Display error messages
    pub fn display_error(&self, error: &dyn Error) {
        eprintln!("Error: {}", error);
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

pub fn unit_heading(unit: &DevotionalUnit) -> String {
    match unit.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => format!("{} {} - {}", capitalize(&unit.category), unit.number, title),
        None => format!("{} {}", capitalize(&unit.category), unit.number),
    }
}

pub fn format_segment_row(index: usize, segment: &Segment) -> String {
    let subtitle = if segment.subtitle.chars().count() > 26 {
        format!("{}...", segment.subtitle.chars().take(23).collect::<String>())
    } else {
        segment.subtitle.clone()
    };
    let audio = if segment.has_audio() { "yes" } else { "-" };
    format!("{:<4} {:<22} {:<28} {}", index + 1, segment.title, subtitle, audio)
}

/// `m:ss` for a position in seconds.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 { seconds as u64 } else { 0 };
    format!("{}:{:02}", total / 60, total % 60)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
