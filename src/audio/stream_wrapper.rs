use crate::audio::error::AudioError;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use symphonia::core::io::MediaSource;
use tracing::{debug, trace};
use url::Url;

const LOG_TARGET: &str = "lectio_player::audio::stream_wrapper";

/// A clip fully buffered in memory, so Symphonia gets `Read + Seek` and scrubbing is cheap.
pub struct BufferedClip {
    buffer: Cursor<Vec<u8>>,
}

impl BufferedClip {
    /// Downloads the whole clip behind `url`.
    pub async fn fetch(client: &Client, url: &str) -> Result<Self, AudioError> {
        let parsed = Url::parse(url).map_err(|e| AudioError::InvalidUrl(format!("{}: {}", url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(AudioError::InvalidUrl(format!("unsupported scheme in {}", url)));
        }

        let response = client.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AudioError::StreamError(format!("{} returned status {}", url, status)));
        }
        Self::from_stream(response.bytes_stream()).await
    }

    pub async fn from_stream(
        stream: impl Stream<Item = Result<Bytes, reqwest::Error>> + Unpin,
    ) -> Result<Self, AudioError> {
        let mut buffer = Vec::new();
        let mut stream = stream;

        debug!(target: LOG_TARGET, "Downloading audio clip into memory...");
        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result?;
            buffer.extend_from_slice(&chunk);
            trace!(target: LOG_TARGET, "Downloaded {} bytes (total {})", chunk.len(), buffer.len());
        }
        if buffer.is_empty() {
            return Err(AudioError::StreamError("audio clip is empty".to_string()));
        }
        debug!(target: LOG_TARGET, "Download complete ({} bytes).", buffer.len());

        Ok(Self::from_bytes(buffer))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { buffer: Cursor::new(bytes) }
    }

    pub fn len(&self) -> usize {
        self.buffer.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Read for BufferedClip {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.buffer.read(buf)
    }
}

impl Seek for BufferedClip {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.buffer.seek(pos)
    }
}

impl MediaSource for BufferedClip {
    fn is_seekable(&self) -> bool {
        true
    }

    fn byte_len(&self) -> Option<u64> {
        Some(self.buffer.get_ref().len() as u64)
    }
}
