//! Playlist state machine: one clip at a time, fillers between segments.

use crate::audio::{AudioError, AudioSink, ClipId, PlaybackProgressInfo, SinkEvent};
use crate::player::interlude::{select_interlude, FillerClips, FillerKind, InterludeMode};
use crate::player::state::{EngineState, NowPlaying, PlaybackSnapshot, PlaylistUpdate};
use crate::segments::Segment;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, trace, warn};

const LOG_TARGET: &str = "lectio_player::player::engine";

/// Requests the engine refuses; nothing changes when one is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistError {
    NoSuchSegment(usize),
    /// The segment exists but carries no audio.
    NoAudio(usize),
    NothingToPlay,
}

impl fmt::Display for PlaylistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaylistError::NoSuchSegment(i) => write!(f, "No segment at position {}", i + 1),
            PlaylistError::NoAudio(i) => write!(f, "Segment {} has no audio", i + 1),
            PlaylistError::NothingToPlay => write!(f, "No segment has audio"),
        }
    }
}

impl std::error::Error for PlaylistError {}

/// The follow-up queued behind a filler clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NextAction {
    PlaySegment(usize),
}

pub struct PlaylistEngine {
    sink: Box<dyn AudioSink>,
    segments: Arc<Vec<Segment>>,
    fillers: FillerClips,
    mode: InterludeMode,
    state: EngineState,
    pointer: Option<usize>,
    /// Clip whose events are current; anything else is stale.
    active_clip: Option<ClipId>,
    last_clip_id: u64,
    pending: Option<NextAction>,
    /// The active clip reached its end while paused; the transition runs on resume.
    ended_while_paused: bool,
    progress: PlaybackProgressInfo,
    update_tx: broadcast::Sender<PlaylistUpdate>,
}

impl PlaylistEngine {
    pub fn new(
        sink: Box<dyn AudioSink>,
        segments: Arc<Vec<Segment>>,
        fillers: FillerClips,
        mode: InterludeMode,
        update_capacity: usize,
    ) -> Self {
        let (update_tx, _) = broadcast::channel(update_capacity.max(1));
        Self {
            sink,
            segments,
            fillers,
            mode,
            state: EngineState::Idle,
            pointer: None,
            active_clip: None,
            last_clip_id: 0,
            pending: None,
            ended_while_paused: false,
            progress: PlaybackProgressInfo::default(),
            update_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlaylistUpdate> {
        self.update_tx.subscribe()
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn pointer(&self) -> Option<usize> {
        self.pointer
    }

    pub fn mode(&self) -> InterludeMode {
        self.mode
    }

    pub fn progress(&self) -> PlaybackProgressInfo {
        self.progress
    }

    pub fn segments(&self) -> &Arc<Vec<Segment>> {
        &self.segments
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state: self.state,
            pointer: self.pointer,
            mode: self.mode,
            progress: self.progress,
            segment_count: self.segments.len(),
        }
    }

    fn broadcast_update(&self, update: PlaylistUpdate) {
        trace!(target: LOG_TARGET, "Broadcasting update: {:?}", update);
        if self.update_tx.send(update.clone()).is_err() {
            trace!(target: LOG_TARGET, "No active listeners for update: {:?}", update);
        }
    }

    /// Broadcasts an update that did not come from a state change.
    pub(super) fn notify(&self, update: PlaylistUpdate) {
        self.broadcast_update(update);
    }

    fn next_clip_id(&mut self) -> ClipId {
        self.last_clip_id += 1;
        ClipId(self.last_clip_id)
    }

    fn next_audio_index(&self, after: Option<usize>) -> Option<usize> {
        let from = after.map_or(0, |i| i + 1);
        (from..self.segments.len()).find(|&i| self.segments[i].has_audio())
    }

    fn previous_audio_index(&self, before: usize) -> Option<usize> {
        (0..before.min(self.segments.len())).rev().find(|&i| self.segments[i].has_audio())
    }

    /// Plays from the first segment with audio.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<(), PlaylistError> {
        let first = self.next_audio_index(None).ok_or(PlaylistError::NothingToPlay)?;
        self.play_segment(first).await;
        Ok(())
    }

    /// Jumps straight to `index`, never through a filler.
    #[instrument(skip(self))]
    pub async fn select(&mut self, index: usize) -> Result<(), PlaylistError> {
        let segment = self.segments.get(index).ok_or(PlaylistError::NoSuchSegment(index))?;
        if !segment.has_audio() {
            return Err(PlaylistError::NoAudio(index));
        }
        self.play_segment(index).await;
        Ok(())
    }

    /// Next segment with audio, skipping any filler. Finishes the session when none is left.
    #[instrument(skip(self))]
    pub async fn skip_forward(&mut self) {
        let target = match self.state.now_playing() {
            Some(NowPlaying::Interlude { next_index, .. }) => Some(next_index),
            Some(NowPlaying::Segment { index, .. }) => self.next_audio_index(Some(index)),
            None => self.next_audio_index(self.pointer),
        };
        match target {
            Some(index) => self.play_segment(index).await,
            None => self.finish().await,
        }
    }

    /// Previous segment with audio; restarts the first one when there is none before it.
    #[instrument(skip(self))]
    pub async fn skip_back(&mut self) {
        let target = match self.state.now_playing() {
            Some(NowPlaying::Segment { index, .. }) => self.previous_audio_index(index).or(Some(index)),
            Some(NowPlaying::Interlude { next_index, .. }) => self.previous_audio_index(next_index),
            None => self.pointer.or_else(|| self.next_audio_index(None)),
        };
        if let Some(index) = target {
            self.play_segment(index).await;
        }
    }

    pub async fn pause(&mut self) {
        let EngineState::Playing(now) = self.state else {
            debug!(target: LOG_TARGET, "Pause ignored in state {:?}", self.state);
            return;
        };
        match self.sink.pause().await {
            Ok(()) => {
                self.state = EngineState::Paused(now);
                self.broadcast_update(PlaylistUpdate::Paused);
            }
            Err(e) => self.fail(e).await,
        }
    }

    pub async fn resume(&mut self) {
        let EngineState::Paused(now) = self.state else {
            debug!(target: LOG_TARGET, "Resume ignored in state {:?}", self.state);
            return;
        };
        if self.ended_while_paused {
            self.ended_while_paused = false;
            self.state = EngineState::Playing(now);
            self.broadcast_update(PlaylistUpdate::Resumed);
            debug!(target: LOG_TARGET, "Clip ended while paused; moving on");
            self.on_clip_ended().await;
            return;
        }
        match self.sink.resume().await {
            Ok(()) => {
                self.state = EngineState::Playing(now);
                self.broadcast_update(PlaylistUpdate::Resumed);
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// Pauses, resumes, or starts from the top depending on the state.
    pub async fn toggle(&mut self) -> Result<(), PlaylistError> {
        match self.state {
            EngineState::Playing(_) => self.pause().await,
            EngineState::Paused(_) => self.resume().await,
            EngineState::Idle | EngineState::Stopped => return self.start().await,
        }
        Ok(())
    }

    /// Releases the clip, drops any queued follow-up and clears the pointer.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) {
        self.teardown().await;
        self.state = EngineState::Stopped;
        info!(target: LOG_TARGET, "Playback stopped");
        self.broadcast_update(PlaylistUpdate::Stopped);
    }

    /// Seeks within the loaded clip; the target is clamped to its duration.
    pub async fn seek(&mut self, position_secs: f64) {
        if self.state.now_playing().is_none() || self.active_clip.is_none() {
            debug!(target: LOG_TARGET, "Seek ignored: nothing loaded");
            return;
        }
        let target = self.progress.clamp_target(position_secs);
        match self.sink.seek(target).await {
            Ok(()) => {
                self.progress.current_seconds = target;
                self.broadcast_update(PlaylistUpdate::Progress(self.progress));
            }
            Err(e) => self.fail(e).await,
        }
    }

    pub async fn seek_by(&mut self, delta_secs: f64) {
        let target = self.progress.current_seconds + delta_secs;
        self.seek(target).await;
    }

    /// Takes effect at the next natural transition; a filler already queued is kept.
    pub fn set_mode(&mut self, mode: InterludeMode) {
        if self.mode != mode {
            info!(target: LOG_TARGET, "Interlude mode: {} -> {}", self.mode, mode);
            self.mode = mode;
            self.broadcast_update(PlaylistUpdate::ModeChanged(mode));
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.sink.set_muted(muted);
    }

    /// Swaps in freshly built segments. The session is reset to idle.
    #[instrument(skip(self, segments), fields(count = segments.len()))]
    pub async fn replace_segments(&mut self, segments: Arc<Vec<Segment>>) {
        self.teardown().await;
        self.segments = segments;
        self.state = EngineState::Idle;
        info!(target: LOG_TARGET, "Content replaced; session reset");
        self.broadcast_update(PlaylistUpdate::ContentReplaced { segment_count: self.segments.len() });
    }

    /// Routes a sink notification. Events of any clip but the active one are dropped.
    pub async fn handle_event(&mut self, event: SinkEvent) {
        if Some(event.clip()) != self.active_clip {
            trace!(target: LOG_TARGET, clip = %event.clip(), "Ignoring stale sink event");
            return;
        }
        match event {
            SinkEvent::Progress { position_secs, duration_secs, .. } => {
                self.progress.current_seconds = position_secs;
                if duration_secs.is_some() {
                    self.progress.total_seconds = duration_secs;
                }
                self.broadcast_update(PlaylistUpdate::Progress(self.progress));
            }
            SinkEvent::Failed { error, .. } => {
                self.fail(AudioError::StreamError(error)).await;
            }
            SinkEvent::Ended { clip } if matches!(self.state, EngineState::Paused(_)) => {
                debug!(target: LOG_TARGET, %clip, "Clip ended while paused");
                self.ended_while_paused = true;
            }
            SinkEvent::Ended { clip } => {
                debug!(target: LOG_TARGET, %clip, "Clip ended");
                self.on_clip_ended().await;
            }
        }
    }

    /// Releases the sink on session end.
    pub async fn shutdown(&mut self) {
        self.teardown().await;
        self.state = EngineState::Idle;
    }

    async fn on_clip_ended(&mut self) {
        match self.state {
            EngineState::Playing(NowPlaying::Segment { index, key }) => {
                let Some(next) = self.next_audio_index(Some(index)) else {
                    self.finish().await;
                    return;
                };
                match select_interlude(self.mode, key) {
                    Some(filler) => self.play_interlude(filler, next).await,
                    None => self.play_segment(next).await,
                }
            }
            EngineState::Playing(NowPlaying::Interlude { .. }) => match self.pending.take() {
                Some(NextAction::PlaySegment(next)) => self.play_segment(next).await,
                None => self.finish().await,
            },
            other => debug!(target: LOG_TARGET, "End of clip ignored in state {:?}", other),
        }
    }

    async fn play_segment(&mut self, index: usize) {
        let Some(segment) = self.segments.get(index) else {
            warn!(target: LOG_TARGET, "Segment {} vanished before playback", index);
            self.finish().await;
            return;
        };
        let Some(url) = segment.audio_url.clone() else {
            warn!(target: LOG_TARGET, "Segment {} has no audio", index);
            return;
        };
        let key = segment.key;

        self.teardown_clip().await;
        let clip = self.next_clip_id();
        match self.sink.play(clip, &url).await {
            Ok(duration_secs) => {
                self.active_clip = Some(clip);
                self.progress.total_seconds = duration_secs;
                self.state = EngineState::Playing(NowPlaying::Segment { index, key });
                self.pointer = Some(index);
                info!(target: LOG_TARGET, %clip, index, %key, "Segment started");
                self.broadcast_update(PlaylistUpdate::SegmentStarted { index, key });
            }
            Err(e) => self.fail(e).await,
        }
    }

    async fn play_interlude(&mut self, filler: FillerKind, next_index: usize) {
        let url = self.fillers.url(filler).to_string();
        self.teardown_clip().await;
        let clip = self.next_clip_id();
        match self.sink.play(clip, &url).await {
            Ok(duration_secs) => {
                self.active_clip = Some(clip);
                self.progress.total_seconds = duration_secs;
                self.pending = Some(NextAction::PlaySegment(next_index));
                self.state = EngineState::Playing(NowPlaying::Interlude { filler, next_index });
                info!(target: LOG_TARGET, %clip, ?filler, next_index, "Interlude started");
                self.broadcast_update(PlaylistUpdate::InterludeStarted { filler, next_index });
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// Releases the loaded clip and drops the queued follow-up. Pointer is untouched.
    async fn teardown_clip(&mut self) {
        self.pending = None;
        self.ended_while_paused = false;
        self.active_clip = None;
        self.progress = PlaybackProgressInfo::default();
        self.sink.release().await;
    }

    async fn teardown(&mut self) {
        self.teardown_clip().await;
        self.pointer = None;
    }

    async fn finish(&mut self) {
        self.teardown().await;
        self.state = EngineState::Idle;
        info!(target: LOG_TARGET, "Reached end of sequence");
        self.broadcast_update(PlaylistUpdate::Finished);
    }

    async fn fail(&mut self, error: AudioError) {
        warn!(target: LOG_TARGET, "Audio failure: {}", error);
        self.teardown().await;
        self.state = EngineState::Stopped;
        self.broadcast_update(PlaylistUpdate::Warning(error.to_string()));
        self.broadcast_update(PlaylistUpdate::Stopped);
    }
}
