//! ALSA-backed `AudioSink`: download, decode with Symphonia, write on a blocking task.

use crate::audio::alsa_handler::AlsaPcmHandler;
use crate::audio::decoder::{apply_gain, ClipDecoder, DecodeStep};
use crate::audio::error::AudioError;
use crate::audio::progress::PROGRESS_UPDATE_INTERVAL;
use crate::audio::sink::{AudioSink, ClipId, SinkEvent};
use crate::audio::stream_wrapper::BufferedClip;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration as StdDuration, Instant};
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, instrument, trace, warn};

const LOG_TARGET: &str = "lectio_player::audio::alsa_sink";

/// How long `release` waits for the output thread before giving up on it.
const RELEASE_TIMEOUT: StdDuration = StdDuration::from_secs(5);
const PAUSE_POLL_INTERVAL: StdDuration = StdDuration::from_millis(20);

/// Flags shared between the sink and the output thread of one clip.
#[derive(Default)]
struct ClipControl {
    paused: AtomicBool,
    stop: AtomicBool,
    seek_to: Mutex<Option<f64>>,
}

/// Volume shared by every clip the sink plays.
struct VolumeControl {
    volume_bits: AtomicU32,
    muted: AtomicBool,
}

impl VolumeControl {
    fn gain(&self) -> f32 {
        if self.muted.load(Ordering::Relaxed) {
            0.0
        } else {
            f32::from_bits(self.volume_bits.load(Ordering::Relaxed))
        }
    }
}

struct ActiveClip {
    id: ClipId,
    control: Arc<ClipControl>,
    handle: JoinHandle<()>,
}

pub struct AlsaSink {
    device_name: String,
    client: Client,
    events: mpsc::UnboundedSender<SinkEvent>,
    volume: Arc<VolumeControl>,
    active: Option<ActiveClip>,
}

impl AlsaSink {
    /// Creates a sink for `device_name`; clip events are sent to `events`.
    pub fn new(device_name: &str, events: mpsc::UnboundedSender<SinkEvent>) -> Self {
        info!(target: LOG_TARGET, "Creating ALSA sink for device: {}", device_name);
        let client = Client::builder()
            .timeout(StdDuration::from_secs(60))
            .build()
            .unwrap_or_else(|e| {
                warn!(target: LOG_TARGET, "Error creating HTTP client with timeout: {:?}. Falling back to default.", e);
                Client::new()
            });
        Self {
            device_name: device_name.to_string(),
            client,
            events,
            volume: Arc::new(VolumeControl {
                volume_bits: AtomicU32::new(1.0f32.to_bits()),
                muted: AtomicBool::new(false),
            }),
            active: None,
        }
    }

    fn extension_hint(url: &str) -> Option<String> {
        let path = url.split(['?', '#']).next()?;
        let file = path.rsplit('/').next()?;
        let (_, ext) = file.rsplit_once('.')?;
        Some(ext.to_ascii_lowercase())
    }
}

#[async_trait]
impl AudioSink for AlsaSink {
    #[instrument(skip(self), fields(device = %self.device_name))]
    async fn play(&mut self, clip: ClipId, url: &str) -> Result<Option<f64>, AudioError> {
        self.release().await;

        let buffered = BufferedClip::fetch(&self.client, url).await?;
        let hint = Self::extension_hint(url);
        let decoder = task::spawn_blocking(move || ClipDecoder::new(buffered, hint.as_deref())).await??;
        let duration_secs = decoder.duration_secs();

        let control = Arc::new(ClipControl::default());
        let handle = task::spawn_blocking({
            let control = Arc::clone(&control);
            let volume = Arc::clone(&self.volume);
            let events = self.events.clone();
            let device = self.device_name.clone();
            move || run_output(clip, decoder, &device, &control, &volume, &events)
        });

        info!(target: LOG_TARGET, %clip, ?duration_secs, "Clip started");
        self.active = Some(ActiveClip { id: clip, control, handle });
        Ok(duration_secs)
    }

    async fn pause(&mut self) -> Result<(), AudioError> {
        let active = self
            .active
            .as_ref()
            .ok_or_else(|| AudioError::InvalidState("no clip loaded".to_string()))?;
        active.control.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn resume(&mut self) -> Result<(), AudioError> {
        let active = self
            .active
            .as_ref()
            .ok_or_else(|| AudioError::InvalidState("no clip loaded".to_string()))?;
        active.control.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn seek(&mut self, position_secs: f64) -> Result<(), AudioError> {
        let active = self
            .active
            .as_ref()
            .ok_or_else(|| AudioError::InvalidState("no clip loaded".to_string()))?;
        if let Ok(mut pending) = active.control.seek_to.lock() {
            *pending = Some(position_secs);
        }
        Ok(())
    }

    async fn release(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        debug!(target: LOG_TARGET, clip = %active.id, "Releasing clip");
        active.control.stop.store(true, Ordering::SeqCst);
        match tokio::time::timeout(RELEASE_TIMEOUT, active.handle).await {
            Ok(Ok(())) => trace!(target: LOG_TARGET, clip = %active.id, "Output thread finished"),
            Ok(Err(e)) => error!(target: LOG_TARGET, clip = %active.id, "Output thread panicked: {:?}", e),
            Err(_) => error!(target: LOG_TARGET, clip = %active.id, "Timeout waiting for output thread after {:?}", RELEASE_TIMEOUT),
        }
    }

    fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.volume.volume_bits.store(volume.to_bits(), Ordering::Relaxed);
    }

    fn set_muted(&mut self, muted: bool) {
        self.volume.muted.store(muted, Ordering::Relaxed);
    }

    fn loaded_clip(&self) -> Option<ClipId> {
        self.active.as_ref().map(|a| a.id)
    }
}

/// Body of the blocking output thread for one clip.
fn run_output(
    clip: ClipId,
    mut decoder: ClipDecoder,
    device: &str,
    control: &ClipControl,
    volume: &VolumeControl,
    events: &mpsc::UnboundedSender<SinkEvent>,
) {
    let report_failure = |error: AudioError| {
        error!(target: LOG_TARGET, %clip, "Clip playback failed: {}", error);
        let _ = events.send(SinkEvent::Failed { clip, error: error.to_string() });
    };

    let mut output = AlsaPcmHandler::new(device);
    if let Err(e) = output.initialize(decoder.spec()) {
        report_failure(e);
        return;
    }

    let duration_secs = decoder.duration_secs();
    let mut position_secs = 0.0;
    let mut last_report = Instant::now()
        .checked_sub(PROGRESS_UPDATE_INTERVAL)
        .unwrap_or_else(Instant::now);
    let mut was_paused = false;

    loop {
        if control.stop.load(Ordering::SeqCst) {
            debug!(target: LOG_TARGET, %clip, "Stop requested; dropping buffered audio");
            output.close();
            return;
        }

        let paused = control.paused.load(Ordering::SeqCst);
        if paused != was_paused {
            if let Err(e) = output.set_paused(paused) {
                warn!(target: LOG_TARGET, %clip, "Could not change ALSA pause state: {}", e);
            }
            was_paused = paused;
        }
        if paused {
            std::thread::sleep(PAUSE_POLL_INTERVAL);
            continue;
        }

        let pending_seek = control.seek_to.lock().ok().and_then(|mut s| s.take());
        if let Some(target) = pending_seek {
            match decoder.seek(target) {
                Ok(reached) => position_secs = reached,
                Err(e) => warn!(target: LOG_TARGET, %clip, "Seek failed: {}", e),
            }
        }

        match decoder.next_step() {
            Ok(DecodeStep::Samples(mut samples, timestamp)) => {
                position_secs = timestamp;
                apply_gain(&mut samples, volume.gain());
                if let Err(e) = output.write(&samples) {
                    report_failure(e);
                    return;
                }
            }
            Ok(DecodeStep::Skipped) => continue,
            Ok(DecodeStep::EndOfStream) => {
                if let Err(e) = output.drain() {
                    warn!(target: LOG_TARGET, %clip, "Error draining ALSA buffer: {}", e);
                }
                if !control.stop.load(Ordering::SeqCst) {
                    let final_position = duration_secs.unwrap_or(position_secs);
                    let _ = events.send(SinkEvent::Progress { clip, position_secs: final_position, duration_secs });
                    let _ = events.send(SinkEvent::Ended { clip });
                }
                return;
            }
            Err(e) => {
                report_failure(e);
                return;
            }
        }

        if last_report.elapsed() >= PROGRESS_UPDATE_INTERVAL {
            last_report = Instant::now();
            let _ = events.send(SinkEvent::Progress { clip, position_secs, duration_secs });
        }
    }
}
