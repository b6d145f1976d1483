//! Drives a [`StepPlayer`] from a tokio clock, with optional looping background audio.

use crate::audio::{AudioError, AudioSink, ClipId, SinkEvent};
use crate::steps::model::{StepDurations, StepKey};
use crate::steps::player::{StepObserver, StepPhase, StepPlayer};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, trace, warn};

const LOG_TARGET: &str = "lectio_player::steps::runner";

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq)]
pub enum GuideCommand {
    Next,
    Previous,
    Restart,
    TogglePause,
    SetVolume(f32),
    SetMuted(bool),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuideUpdate {
    StepChanged(StepKey),
    Tick { step: StepKey, remaining: Duration, in_transition: bool },
    Paused(bool),
    Complete,
    Warning(String),
}

/// Observer that republishes step notifications on a broadcast channel.
pub struct BroadcastObserver {
    tx: broadcast::Sender<GuideUpdate>,
}

impl BroadcastObserver {
    pub fn new(tx: broadcast::Sender<GuideUpdate>) -> Self {
        Self { tx }
    }
}

impl StepObserver for BroadcastObserver {
    fn on_step_change(&mut self, step: StepKey) {
        let _ = self.tx.send(GuideUpdate::StepChanged(step));
    }

    fn on_complete(&mut self) {
        let _ = self.tx.send(GuideUpdate::Complete);
    }
}

/// One clip replayed for the whole session, unaffected by step changes.
pub struct BackgroundAudio {
    sink: Box<dyn AudioSink>,
    events: mpsc::UnboundedReceiver<SinkEvent>,
    url: String,
    clip: Option<ClipId>,
    last_clip_id: u64,
    paused: bool,
    /// The clip ran out while paused; it restarts on resume.
    ended_while_paused: bool,
}

impl BackgroundAudio {
    pub fn new(sink: Box<dyn AudioSink>, events: mpsc::UnboundedReceiver<SinkEvent>, url: impl Into<String>) -> Self {
        Self {
            sink,
            events,
            url: url.into(),
            clip: None,
            last_clip_id: 0,
            paused: false,
            ended_while_paused: false,
        }
    }

    pub(super) async fn play_from_start(&mut self) -> Result<(), AudioError> {
        self.last_clip_id += 1;
        let clip = ClipId(self.last_clip_id);
        self.clip = None;
        self.ended_while_paused = false;
        self.sink.play(clip, &self.url).await?;
        self.clip = Some(clip);
        Ok(())
    }

    /// Follows the countdown's pause state. A failed restart stops the background audio and is returned.
    pub(super) async fn set_paused(&mut self, paused: bool) -> Option<String> {
        if self.paused == paused {
            return None;
        }
        self.paused = paused;
        if !paused && self.ended_while_paused {
            debug!(target: LOG_TARGET, "Background clip ended while paused; restarting");
            return match self.play_from_start().await {
                Ok(()) => None,
                Err(e) => Some(self.fail(e).await),
            };
        }
        let result = if paused { self.sink.pause().await } else { self.sink.resume().await };
        if let Err(e) = result {
            debug!(target: LOG_TARGET, "Background audio did not follow pause state: {}", e);
        }
        None
    }

    /// Loops the clip on its end. A failure stops the background audio and is returned.
    pub(super) async fn handle_event(&mut self, event: SinkEvent) -> Option<String> {
        if Some(event.clip()) != self.clip {
            return None;
        }
        match event {
            SinkEvent::Ended { clip } if self.paused => {
                trace!(target: LOG_TARGET, %clip, "Background clip ended while paused");
                self.ended_while_paused = true;
                None
            }
            SinkEvent::Ended { clip } => {
                trace!(target: LOG_TARGET, %clip, "Background clip ended; looping");
                match self.play_from_start().await {
                    Ok(()) => None,
                    Err(e) => Some(self.fail(e).await),
                }
            }
            SinkEvent::Failed { error, .. } => Some(self.fail(AudioError::StreamError(error)).await),
            SinkEvent::Progress { .. } => None,
        }
    }

    async fn fail(&mut self, error: AudioError) -> String {
        warn!(target: LOG_TARGET, "Background audio stopped: {}", error);
        self.clip = None;
        self.sink.release().await;
        format!("Background audio stopped: {}", error)
    }

    async fn release(&mut self) {
        self.clip = None;
        self.sink.release().await;
    }
}

async fn next_background_event(background: &mut Option<BackgroundAudio>) -> Option<SinkEvent> {
    match background {
        Some(bg) => bg.events.recv().await,
        None => std::future::pending().await,
    }
}

/// Guided session task: owns the step player and the background audio.
pub struct GuideSession {
    player: StepPlayer,
    background: Option<BackgroundAudio>,
    command_rx: mpsc::Receiver<GuideCommand>,
    update_tx: broadcast::Sender<GuideUpdate>,
    tick_interval: Duration,
}

impl GuideSession {
    pub fn new(
        durations: StepDurations,
        transition_delay: Duration,
        background: Option<BackgroundAudio>,
        update_capacity: usize,
        command_buffer_size: usize,
    ) -> (Self, mpsc::Sender<GuideCommand>) {
        let (command_tx, command_rx) = mpsc::channel(command_buffer_size);
        let (update_tx, _) = broadcast::channel(update_capacity.max(1));
        let observer = BroadcastObserver::new(update_tx.clone());
        let player = StepPlayer::new(durations, transition_delay, Box::new(observer));
        let session = Self { player, background, command_rx, update_tx, tick_interval: DEFAULT_TICK_INTERVAL };
        (session, command_tx)
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GuideUpdate> {
        self.update_tx.subscribe()
    }

    pub fn player(&self) -> &StepPlayer {
        &self.player
    }

    fn broadcast_update(&self, update: GuideUpdate) {
        if self.update_tx.send(update).is_err() {
            trace!(target: LOG_TARGET, "No active listeners for guide update");
        }
    }

    /// Runs until the last step is left, `Shutdown` arrives, or every sender is dropped.
    #[instrument(skip(self))]
    pub async fn run(&mut self) {
        info!(target: LOG_TARGET, "Guided session started");
        self.player.start();
        if let Some(bg) = self.background.as_mut() {
            if let Err(e) = bg.play_from_start().await {
                let message = bg.fail(e).await;
                self.background = None;
                self.broadcast_update(GuideUpdate::Warning(message));
            }
        }

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_tick = Instant::now();

        while !self.player.is_complete() {
            tokio::select! {
                biased;

                command = self.command_rx.recv() => {
                    let Some(command) = command else {
                        info!(target: LOG_TARGET, "Command channel closed. Exiting guided session.");
                        break;
                    };
                    if !self.handle_command(command).await {
                        break;
                    }
                }

                now = ticker.tick() => {
                    let elapsed = now.duration_since(last_tick);
                    last_tick = now;
                    self.player.tick(elapsed);
                    if !self.player.is_complete() {
                        self.broadcast_tick();
                    }
                }

                Some(event) = next_background_event(&mut self.background) => {
                    if let Some(bg) = self.background.as_mut() {
                        if let Some(message) = bg.handle_event(event).await {
                            self.background = None;
                            self.broadcast_update(GuideUpdate::Warning(message));
                        }
                    }
                }
            }
        }

        if let Some(bg) = self.background.as_mut() {
            bg.release().await;
        }
        info!(target: LOG_TARGET, "Guided session finished");
    }

    fn broadcast_tick(&self) {
        let in_transition = matches!(self.player.phase(), StepPhase::Transition { .. });
        self.broadcast_update(GuideUpdate::Tick {
            step: self.player.current_step(),
            remaining: self.player.remaining(),
            in_transition,
        });
    }

    async fn background_follow_pause(&mut self, paused: bool) {
        let Some(bg) = self.background.as_mut() else {
            return;
        };
        if let Some(message) = bg.set_paused(paused).await {
            self.background = None;
            self.broadcast_update(GuideUpdate::Warning(message));
        }
    }

    /// Returns false when the session should end.
    async fn handle_command(&mut self, command: GuideCommand) -> bool {
        debug!(target: LOG_TARGET, "Guide command: {:?}", command);
        match command {
            GuideCommand::Next => self.player.next(),
            GuideCommand::Previous => self.player.previous(),
            GuideCommand::Restart => {
                let was_paused = self.player.is_paused();
                self.player.restart();
                self.background_follow_pause(false).await;
                if was_paused {
                    self.broadcast_update(GuideUpdate::Paused(false));
                }
            }
            GuideCommand::TogglePause => {
                let pause = !self.player.is_paused();
                if pause {
                    self.player.pause();
                } else {
                    self.player.resume();
                }
                self.background_follow_pause(pause).await;
                self.broadcast_update(GuideUpdate::Paused(pause));
            }
            GuideCommand::SetVolume(volume) => {
                if let Some(bg) = self.background.as_mut() {
                    bg.sink.set_volume(volume);
                }
            }
            GuideCommand::SetMuted(muted) => {
                if let Some(bg) = self.background.as_mut() {
                    bg.sink.set_muted(muted);
                }
            }
            GuideCommand::Shutdown => return false,
        }
        true
    }
}
