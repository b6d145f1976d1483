//! Filler clips played between two segment clips.

use crate::content::api::public_object_url;
use crate::segments::SegmentKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storage object of the short filler.
pub const SHORT_FILLER_OBJECT: &str = "lectio_null.mp3";
/// Storage object of the long filler.
pub const LONG_FILLER_OBJECT: &str = "lectio_full.mp3";

/// User-selected filler insertion between segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InterludeMode {
    None,
    #[default]
    Short,
    Long,
}

impl InterludeMode {
    /// Next mode in the none → short → long cycle.
    pub fn cycle(self) -> Self {
        match self {
            InterludeMode::None => InterludeMode::Short,
            InterludeMode::Short => InterludeMode::Long,
            InterludeMode::Long => InterludeMode::None,
        }
    }
}

impl fmt::Display for InterludeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InterludeMode::None => "none",
            InterludeMode::Short => "short",
            InterludeMode::Long => "long",
        })
    }
}

impl FromStr for InterludeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(InterludeMode::None),
            "short" => Ok(InterludeMode::Short),
            "long" => Ok(InterludeMode::Long),
            other => Err(format!("unknown interlude mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FillerKind {
    Short,
    Long,
}

/// Filler to play after the clip of `leaving` ends, if any.
///
/// Short mode uses the long filler after contemplatio and the short one everywhere else.
pub fn select_interlude(mode: InterludeMode, leaving: SegmentKey) -> Option<FillerKind> {
    match mode {
        InterludeMode::None => None,
        InterludeMode::Short if leaving == SegmentKey::Contemplatio => Some(FillerKind::Long),
        InterludeMode::Short => Some(FillerKind::Short),
        InterludeMode::Long => Some(FillerKind::Long),
    }
}

/// Resolved URLs of the two filler clips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillerClips {
    pub short_url: String,
    pub long_url: String,
}

impl FillerClips {
    pub fn new(short_url: impl Into<String>, long_url: impl Into<String>) -> Self {
        Self { short_url: short_url.into(), long_url: long_url.into() }
    }

    /// Fillers served from the public storage bucket of the project.
    pub fn from_storage(base_url: &str, bucket: &str) -> Self {
        Self::new(
            public_object_url(base_url, bucket, SHORT_FILLER_OBJECT),
            public_object_url(base_url, bucket, LONG_FILLER_OBJECT),
        )
    }

    pub fn url(&self, kind: FillerKind) -> &str {
        match kind {
            FillerKind::Short => &self.short_url,
            FillerKind::Long => &self.long_url,
        }
    }
}
