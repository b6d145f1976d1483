use crate::audio::PlaybackProgressInfo;
use crate::player::interlude::{FillerKind, InterludeMode};
use crate::segments::{Segment, SegmentKey};
use std::sync::Arc;
use tokio::sync::oneshot;

/// What the engine is sounding right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NowPlaying {
    Segment { index: usize, key: SegmentKey },
    /// A filler, with the segment queued behind it.
    Interlude { filler: FillerKind, next_index: usize },
}

/// Playlist engine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Idle,
    Playing(NowPlaying),
    Paused(NowPlaying),
    Stopped,
}

impl EngineState {
    pub fn now_playing(&self) -> Option<NowPlaying> {
        match self {
            EngineState::Playing(now) | EngineState::Paused(now) => Some(*now),
            EngineState::Idle | EngineState::Stopped => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, EngineState::Playing(_))
    }
}

/// Commands that can be sent to the playback session task.
#[derive(Debug)]
pub enum PlayerCommand {
    Start,
    Select(usize),
    SkipForward,
    SkipBack,
    PlayPauseToggle,
    Pause,
    Resume,
    Stop,
    Seek(f64),
    SeekBy(f64),
    SetMode(InterludeMode),
    SetVolume(f32),
    SetMuted(bool),
    /// New content for the session; always a full reset.
    ReplaceSegments(Arc<Vec<Segment>>),
    GetSnapshot(oneshot::Sender<PlaybackSnapshot>),
    Shutdown,
}

/// Updates broadcast by the engine about its state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistUpdate {
    SegmentStarted { index: usize, key: SegmentKey },
    InterludeStarted { filler: FillerKind, next_index: usize },
    Paused,
    Resumed,
    Stopped,
    /// Reached the end of the audio-bearing segments.
    Finished,
    Progress(PlaybackProgressInfo),
    ModeChanged(InterludeMode),
    ContentReplaced { segment_count: usize },
    /// Non-fatal playback problem; the engine has already fallen back to stopped.
    Warning(String),
}

/// Point-in-time view of the engine, answered to `PlayerCommand::GetSnapshot`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub state: EngineState,
    /// Segment the visual pointer is on; set only once its clip has started.
    pub pointer: Option<usize>,
    pub mode: InterludeMode,
    pub progress: PlaybackProgressInfo,
    pub segment_count: usize,
}
