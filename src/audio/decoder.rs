use crate::audio::error::AudioError;
use crate::audio::stream_wrapper::BufferedClip;
use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::{Time, TimeBase};
use tracing::{debug, warn};

const LOG_TARGET: &str = "lectio_player::audio::decoder";

/// Result of pulling the next packet through the decoder.
pub enum DecodeStep {
    /// Interleaved S16 samples and the timestamp of the packet in seconds.
    Samples(Vec<i16>, f64),
    Skipped,
    EndOfStream,
}

/// Symphonia format reader and decoder for one buffered clip.
pub struct ClipDecoder {
    format_reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    time_base: Option<TimeBase>,
    spec: SignalSpec,
    duration_secs: Option<f64>,
    sample_buffer: Option<SampleBuffer<i16>>,
}

impl ClipDecoder {
    /// Probes the clip and prepares a decoder for its first playable track.
    pub fn new(clip: BufferedClip, extension_hint: Option<&str>) -> Result<Self, AudioError> {
        let mss = MediaSourceStream::new(Box::new(clip), MediaSourceStreamOptions::default());
        let mut hint = Hint::new();
        if let Some(ext) = extension_hint {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe().format(
            &hint,
            mss,
            &FormatOptions { enable_gapless: true, ..Default::default() },
            &MetadataOptions::default(),
        )?;
        let format_reader = probed.format;

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::UnsupportedFormat("No suitable audio track found".to_string()))?
            .clone();

        let decoder = symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

        let spec = SignalSpec::new(
            track.codec_params.sample_rate.ok_or(AudioError::MissingCodecParams("sample rate"))?,
            track.codec_params.channels.ok_or(AudioError::MissingCodecParams("channels map"))?,
        );
        let time_base = track.codec_params.time_base;
        let duration_secs = match (time_base, track.codec_params.n_frames) {
            (Some(tb), Some(frames)) => Some(time_to_secs(tb.calc_time(frames))),
            _ => None,
        };

        debug!(target: LOG_TARGET, track_id = track.id, rate = spec.rate, channels = spec.channels.count(), ?duration_secs, "Clip decoder ready");

        Ok(Self {
            format_reader,
            decoder,
            track_id: track.id,
            time_base,
            spec,
            duration_secs,
            sample_buffer: None,
        })
    }

    pub fn spec(&self) -> SignalSpec {
        self.spec
    }

    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }

    /// Decodes the next packet of the selected track.
    pub fn next_step(&mut self) -> Result<DecodeStep, AudioError> {
        let packet = match self.format_reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(DecodeStep::EndOfStream);
            }
            Err(SymphoniaError::ResetRequired) => {
                self.decoder.reset();
                return Ok(DecodeStep::Skipped);
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != self.track_id {
            return Ok(DecodeStep::Skipped);
        }
        let timestamp = self
            .time_base
            .map(|tb| time_to_secs(tb.calc_time(packet.ts())))
            .unwrap_or(0.0);

        match self.decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let needed = decoded.capacity() * spec.channels.count();
                if self.sample_buffer.as_ref().map_or(true, |b| b.capacity() < needed) {
                    self.sample_buffer = Some(SampleBuffer::<i16>::new(decoded.capacity() as u64, spec));
                }
                match self.sample_buffer.as_mut() {
                    Some(buffer) => {
                        buffer.copy_interleaved_ref(decoded);
                        Ok(DecodeStep::Samples(buffer.samples().to_vec(), timestamp))
                    }
                    None => Ok(DecodeStep::Skipped),
                }
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                warn!(target: LOG_TARGET, "Skipping undecodable packet: {}", msg);
                Ok(DecodeStep::Skipped)
            }
            Err(e) => Err(AudioError::DecodingError(e.to_string())),
        }
    }

    /// Coarse seek to `position_secs`; returns the position actually reached.
    pub fn seek(&mut self, position_secs: f64) -> Result<f64, AudioError> {
        let seeked = self.format_reader.seek(
            SeekMode::Coarse,
            SeekTo::Time {
                time: Time::new(position_secs.trunc() as u64, position_secs.fract()),
                track_id: Some(self.track_id),
            },
        )?;
        self.decoder.reset();
        let reached = self
            .time_base
            .map(|tb| time_to_secs(tb.calc_time(seeked.actual_ts)))
            .unwrap_or(position_secs);
        debug!(target: LOG_TARGET, requested = position_secs, reached, "Seek complete");
        Ok(reached)
    }
}

fn time_to_secs(time: Time) -> f64 {
    time.seconds as f64 + time.frac
}

/// Multiplies samples by a linear gain in place.
pub fn apply_gain(samples: &mut [i16], gain: f32) {
    if (gain - 1.0).abs() < f32::EPSILON {
        return;
    }
    for sample in samples.iter_mut() {
        let scaled = (*sample as f32 * gain).round();
        *sample = scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16;
    }
}
