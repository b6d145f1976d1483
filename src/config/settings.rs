//! Application settings and configuration management

use crate::content::Language;
use crate::player::InterludeMode;
use crate::steps::StepDurations;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Application settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Base URL of the Supabase project serving the `decades` table
    pub supabase_url: String,
    /// Public anon key sent as `apikey` on every request
    #[serde(default)]
    pub anon_key: Option<String>,
    /// Access token of a signed-in user, if any
    #[serde(default)]
    pub access_token: Option<String>,
    /// Language used to resolve content and segment labels
    #[serde(default)]
    pub language: Language,
    /// Filler insertion between segment clips
    #[serde(default)]
    pub interlude_mode: InterludeMode,
    /// ALSA device to use for audio playback
    #[serde(default = "default_alsa_device")]
    pub alsa_device: String,
    /// Public storage bucket holding the filler clips
    #[serde(default = "default_audio_bucket")]
    pub audio_bucket: String,
    /// Countdown per step of the guided (timer) mode
    #[serde(default)]
    pub step_durations: StepDurations,
    /// Pause between two steps of the guided mode
    #[serde(default = "default_transition_delay_ms")]
    pub transition_delay_ms: u64,
    /// Looping background track for the guided mode
    #[serde(default)]
    pub background_audio: Option<String>,
}

fn default_alsa_device() -> String {
    "default".to_string()
}

fn default_audio_bucket() -> String {
    "audio".to_string()
}

fn default_transition_delay_ms() -> u64 {
    1500
}

/// Error types for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    IoError(io::Error),
    ParseError(String),
    ValidationError(String),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "I/O error: {}", e),
            ConfigError::ParseError(s) => write!(f, "Parse error: {}", s),
            ConfigError::ValidationError(s) => write!(f, "Validation error: {}", s),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            supabase_url: "http://localhost:54321".to_string(),
            anon_key: None,
            access_token: None,
            language: Language::default(),
            interlude_mode: InterludeMode::default(),
            alsa_device: default_alsa_device(),
            audio_bucket: default_audio_bucket(),
            step_durations: StepDurations::default(),
            transition_delay_ms: default_transition_delay_ms(),
            background_audio: None,
        }
    }
}

impl Settings {
    /// Load settings from a file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(&self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("lectio").join("config.json")
    }

    pub fn transition_delay(&self) -> Duration {
        Duration::from_millis(self.transition_delay_ms)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.supabase_url.is_empty() {
            return Err(ConfigError::ValidationError("Supabase URL cannot be empty".to_string()));
        }

        let parsed = Url::parse(&self.supabase_url)
            .map_err(|e| ConfigError::ValidationError(format!("Supabase URL is not valid: {}", e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::ValidationError(format!(
                "Supabase URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        if self.anon_key.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::ValidationError(
                "An anon key must be provided".to_string(),
            ));
        }

        if self.audio_bucket.trim().is_empty() {
            return Err(ConfigError::ValidationError("Audio bucket cannot be empty".to_string()));
        }

        if let Some(track) = &self.background_audio {
            Url::parse(track).map_err(|e| {
                ConfigError::ValidationError(format!("Background audio URL is not valid: {}", e))
            })?;
        }

        Ok(())
    }
}
