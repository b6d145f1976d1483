//! Audio output: the single-clip sink abstraction and its ALSA implementation

mod alsa_handler;
mod alsa_sink;
mod decoder;
mod error;
mod progress;
mod sink;
mod stream_wrapper;

pub use alsa_sink::AlsaSink;
pub use decoder::{apply_gain, ClipDecoder, DecodeStep};
pub use error::AudioError;
pub use progress::{PlaybackProgressInfo, PROGRESS_UPDATE_INTERVAL};
pub use sink::{AudioSink, ClipId, SinkEvent};
pub use stream_wrapper::BufferedClip;
