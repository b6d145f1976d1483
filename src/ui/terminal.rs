//! Raw-mode keyboard input for the interactive commands.

use crossterm::event::{self, Event, KeyEvent};
use crossterm::terminal;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const LOG_TARGET: &str = "lectio_player::ui::terminal";
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Keeps the terminal in raw mode until dropped.
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!(target: LOG_TARGET, "Failed to restore terminal mode: {}", e);
        }
    }
}

/// Reads key presses on a dedicated thread and hands them to async code.
pub struct KeyReader {
    rx: mpsc::UnboundedReceiver<KeyEvent>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl KeyReader {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            while !thread_stop.load(Ordering::Relaxed) {
                match event::poll(POLL_INTERVAL) {
                    Ok(true) => match event::read() {
                        Ok(Event::Key(key)) => {
                            if tx.send(key).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!(target: LOG_TARGET, "Error reading terminal event: {}", e);
                            break;
                        }
                    },
                    Ok(false) => {}
                    Err(e) => {
                        warn!(target: LOG_TARGET, "Error polling terminal: {}", e);
                        break;
                    }
                }
            }
            debug!(target: LOG_TARGET, "Key reader stopped");
        });
        Self { rx, stop, handle: Some(handle) }
    }

    /// Next key press; `None` once the reader thread is gone.
    pub async fn next(&mut self) -> Option<KeyEvent> {
        self.rx.recv().await
    }
}

impl Drop for KeyReader {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
