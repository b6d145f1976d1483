//! Audio playlist session: owns the engine and serializes every operation on it.

use crate::audio::{AudioSink, SinkEvent};
use crate::segments::Segment;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::instrument;

mod command_handler;
mod engine;
mod interlude;
mod run_loop;
mod state;

pub use engine::{PlaylistEngine, PlaylistError};
pub use interlude::{
    select_interlude, FillerClips, FillerKind, InterludeMode, LONG_FILLER_OBJECT, SHORT_FILLER_OBJECT,
};
pub use state::{EngineState, NowPlaying, PlaybackSnapshot, PlayerCommand, PlaylistUpdate};

const PLAYER_LOG_TARGET: &str = "lectio_player::player";

/// One playback session. Run it in its own task with [`Player::run`];
/// commands and sink events are handled strictly one at a time.
pub struct Player {
    engine: PlaylistEngine,
    command_rx: mpsc::Receiver<PlayerCommand>,
    sink_event_rx: mpsc::UnboundedReceiver<SinkEvent>,
}

impl Player {
    /// Creates a session and the sender used to command it.
    /// `sink_event_rx` must receive the events of `sink`.
    pub fn new(
        sink: Box<dyn AudioSink>,
        sink_event_rx: mpsc::UnboundedReceiver<SinkEvent>,
        segments: Arc<Vec<Segment>>,
        fillers: FillerClips,
        mode: InterludeMode,
        state_update_capacity: usize,
        command_buffer_size: usize,
    ) -> (Self, mpsc::Sender<PlayerCommand>) {
        let (command_tx, command_rx) = mpsc::channel(command_buffer_size);
        let engine = PlaylistEngine::new(sink, segments, fillers, mode, state_update_capacity);
        (Player { engine, command_rx, sink_event_rx }, command_tx)
    }

    pub fn subscribe_state_updates(&self) -> broadcast::Receiver<PlaylistUpdate> {
        self.engine.subscribe()
    }

    /// Runs until `Shutdown` is received or every command sender is dropped.
    #[instrument(skip(self))]
    pub async fn run(&mut self) {
        run_loop::run_player_loop(self).await;
    }
}
