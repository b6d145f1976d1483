//! Integration tests for configuration management
//!
//! These tests verify that the configuration system works correctly
//! across module boundaries.

use lectio_player::config::Settings;
use lectio_player::content::Language;
use lectio_player::player::{FillerClips, InterludeMode};
use lectio_player::steps::StepDurations;
use std::error::Error;
use std::time::Duration;
use tempfile::tempdir;

#[cfg(test)]
mod config_integration_tests {
    use super::*;
    use crate::test_utils::constants::{TEST_ANON_KEY, TEST_SUPABASE_URL};

    /// Test complete configuration workflow
    #[test]
    fn test_config_lifecycle() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let config_path = dir.path().join("lectio").join("config.json");

        let mut settings = Settings::default();
        settings.supabase_url = TEST_SUPABASE_URL.to_string();
        settings.anon_key = Some(TEST_ANON_KEY.to_string());
        settings.language = Language::Italian;
        settings.interlude_mode = InterludeMode::Long;
        settings.alsa_device = "test-audio-device".to_string();
        settings.step_durations.contemplatio_secs = 600;

        settings.validate()?;
        settings.save(&config_path)?;

        let loaded = Settings::load(&config_path)?;
        assert_eq!(loaded.supabase_url, TEST_SUPABASE_URL);
        assert_eq!(loaded.anon_key.as_deref(), Some(TEST_ANON_KEY));
        assert_eq!(loaded.language, Language::Italian);
        assert_eq!(loaded.interlude_mode, InterludeMode::Long);
        assert_eq!(loaded.alsa_device, "test-audio-device");
        assert_eq!(loaded.step_durations.contemplatio_secs, 600);
        assert_eq!(loaded.step_durations.lectio_secs, StepDurations::default().lectio_secs);

        let mut updated = loaded;
        updated.interlude_mode = InterludeMode::None;
        updated.save(&config_path)?;
        assert_eq!(Settings::load(&config_path)?.interlude_mode, InterludeMode::None);

        Ok(())
    }

    /// A hand-written file may omit everything except the project URL
    #[test]
    fn test_sparse_config_file_gets_defaults() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config.json");
        std::fs::write(
            &config_path,
            r#"{ "supabase_url": "https://proj.supabase.test", "interlude_mode": "none", "step_durations": { "actio_secs": 30 } }"#,
        )?;

        let settings = Settings::load(&config_path)?;
        assert_eq!(settings.interlude_mode, InterludeMode::None);
        assert_eq!(settings.language, Language::English);
        assert_eq!(settings.audio_bucket, "audio");
        assert_eq!(settings.transition_delay(), Duration::from_millis(1500));
        assert_eq!(settings.step_durations.actio_secs, 30);
        assert_eq!(settings.step_durations.meditatio_secs, 300);

        let fillers = FillerClips::from_storage(&settings.supabase_url, &settings.audio_bucket);
        assert!(fillers.short_url.ends_with("/audio/lectio_null.mp3"));
        assert!(fillers.long_url.ends_with("/audio/lectio_full.mp3"));
        Ok(())
    }

    /// Test invalid configuration handling
    #[test]
    fn test_invalid_config_validation() {
        let empty_url = Settings {
            supabase_url: "".to_string(),
            anon_key: Some(TEST_ANON_KEY.to_string()),
            ..Settings::default()
        };
        let result = empty_url.validate();
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("URL cannot be empty"));
        }

        // The anon key is required by every store request
        let no_key = Settings { supabase_url: TEST_SUPABASE_URL.to_string(), ..Settings::default() };
        assert!(no_key.validate().is_err());

        let bad_background = Settings {
            supabase_url: TEST_SUPABASE_URL.to_string(),
            anon_key: Some(TEST_ANON_KEY.to_string()),
            background_audio: Some("not a url".to_string()),
            ..Settings::default()
        };
        assert!(bad_background.validate().is_err());
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, "{ not json")?;

        let err = Settings::load(&config_path).unwrap_err();
        assert!(err.to_string().starts_with("Parse error"));
        Ok(())
    }
}
