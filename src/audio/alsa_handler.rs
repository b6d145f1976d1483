use crate::audio::error::AudioError;
use alsa::pcm::{Access, Format, HwParams, State as PcmState, PCM};
use alsa::{Direction, ValueOr};
use std::ffi::CString;
use symphonia::core::audio::SignalSpec;
use tracing::{debug, instrument, warn};

const LOG_TARGET: &str = "lectio_player::audio::alsa_handler";

/// Manages the ALSA PCM device for one clip.
pub struct AlsaPcmHandler {
    device_name: String,
    pcm: Option<PCM>,
    channels: usize,
}

impl AlsaPcmHandler {
    pub fn new(device_name: &str) -> Self {
        AlsaPcmHandler {
            device_name: device_name.to_string(),
            pcm: None,
            channels: 2,
        }
    }

    /// Opens the device for S16 interleaved output matching `spec`.
    #[instrument(skip(self, spec), fields(device = %self.device_name, rate = spec.rate, channels = spec.channels.count()))]
    pub fn initialize(&mut self, spec: SignalSpec) -> Result<(), AudioError> {
        self.close();

        let device = CString::new(self.device_name.clone())
            .map_err(|e| AudioError::AlsaError(format!("Invalid device name: {}", e)))?;
        let pcm = PCM::open(&device, Direction::Playback, false)?;
        {
            let hwp = HwParams::any(&pcm)?;
            hwp.set_access(Access::RWInterleaved)?;
            hwp.set_format(Format::s16())?;
            hwp.set_channels(spec.channels.count() as u32)?;
            hwp.set_rate_near(spec.rate, ValueOr::Nearest)?;
            let actual_rate = hwp.get_rate()?;
            if actual_rate != spec.rate {
                warn!(target: LOG_TARGET, "ALSA rate negotiation: requested={}, actual={}", spec.rate, actual_rate);
            }
            pcm.hw_params(&hwp)?;

            let swp = pcm.sw_params_current()?;
            let buffer_size = hwp.get_buffer_size()?;
            let period_size = hwp.get_period_size()?;
            swp.set_start_threshold(buffer_size - period_size)?;
            pcm.sw_params(&swp)?;
            debug!(target: LOG_TARGET, "ALSA parameters applied (buffer={}, period={}).", buffer_size, period_size);
        }

        self.channels = spec.channels.count();
        self.pcm = Some(pcm);
        Ok(())
    }

    /// Writes interleaved samples, recovering from underruns. Blocks until ALSA accepts them.
    pub fn write(&self, samples: &[i16]) -> Result<(), AudioError> {
        let pcm = self
            .pcm
            .as_ref()
            .ok_or_else(|| AudioError::InvalidState("PCM not initialized for writing".to_string()))?;
        let io = pcm.io_i16()?;
        let channels = self.channels.max(1);
        let total_frames = samples.len() / channels;
        let mut offset = 0;

        while offset < total_frames {
            match io.writei(&samples[offset * channels..total_frames * channels]) {
                Ok(frames) => offset += frames,
                Err(e) => {
                    warn!(target: LOG_TARGET, "ALSA write error, attempting recovery: {}", e);
                    pcm.try_recover(e, true)?;
                }
            }
        }
        Ok(())
    }

    pub fn set_paused(&self, paused: bool) -> Result<(), AudioError> {
        let Some(pcm) = &self.pcm else {
            return Ok(());
        };
        match (pcm.state(), paused) {
            (PcmState::Running, true) | (PcmState::Paused, false) => {
                pcm.pause(paused)?;
                debug!(target: LOG_TARGET, paused, "ALSA pause state changed");
            }
            _ => {}
        }
        Ok(())
    }

    /// Plays out what is buffered. Used on natural end of a clip.
    pub fn drain(&self) -> Result<(), AudioError> {
        if let Some(pcm) = &self.pcm {
            if matches!(pcm.state(), PcmState::Running | PcmState::Prepared) {
                pcm.drain()?;
            }
        }
        Ok(())
    }

    /// Discards buffered frames immediately and closes the device.
    pub fn close(&mut self) {
        if let Some(pcm) = self.pcm.take() {
            if matches!(pcm.state(), PcmState::Running | PcmState::Prepared | PcmState::Paused) {
                if let Err(e) = pcm.drop() {
                    warn!(target: LOG_TARGET, "Error dropping ALSA buffer during close (ignored): {}", e);
                }
            }
            debug!(target: LOG_TARGET, "ALSA PCM closed.");
        }
    }
}

impl Drop for AlsaPcmHandler {
    fn drop(&mut self) {
        self.close();
    }
}
