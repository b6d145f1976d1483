use crate::audio::error::AudioError;
use async_trait::async_trait;
use std::fmt;

/// Generation tag of a loaded clip. Events carrying an older id are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipId(pub u64);

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clip#{}", self.0)
    }
}

/// Notifications emitted by a sink about the clip it is playing.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Progress {
        clip: ClipId,
        position_secs: f64,
        duration_secs: Option<f64>,
    },
    /// The clip reached its natural end. Never sent for a released clip.
    Ended { clip: ClipId },
    Failed { clip: ClipId, error: String },
}

impl SinkEvent {
    pub fn clip(&self) -> ClipId {
        match self {
            SinkEvent::Progress { clip, .. } | SinkEvent::Ended { clip } | SinkEvent::Failed { clip, .. } => *clip,
        }
    }
}

/// A single-clip audio output. Holds at most one loaded clip at a time.
#[async_trait]
pub trait AudioSink: Send {
    /// Releases whatever is loaded, then loads `url` and starts it.
    /// Returns once playback has actually started, with the clip length when it is known.
    async fn play(&mut self, clip: ClipId, url: &str) -> Result<Option<f64>, AudioError>;

    async fn pause(&mut self) -> Result<(), AudioError>;

    async fn resume(&mut self) -> Result<(), AudioError>;

    /// Seeks within the loaded clip. Callers clamp the target.
    async fn seek(&mut self, position_secs: f64) -> Result<(), AudioError>;

    /// Stops and drops the loaded clip; no further events are sent for it.
    async fn release(&mut self);

    fn set_volume(&mut self, volume: f32);

    fn set_muted(&mut self, muted: bool);

    /// The clip currently loaded, if any.
    fn loaded_clip(&self) -> Option<ClipId>;
}
