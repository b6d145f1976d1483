//! lectio-player library core functionality

pub mod audio;
pub mod config;
pub mod content;
pub mod player;
pub mod segments;
pub mod steps;
pub mod ui;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "lectio_player=info";

/// Initialize the application directories
pub fn init_app_dirs() -> std::io::Result<()> {
    let default_path = config::Settings::default_path();
    if let Some(config_dir) = default_path.parent() {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir)?;
        }
    }
    Ok(())
}

/// Installs the global subscriber. Logs go to stderr; `json` switches to JSON lines.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)).try_init()
    };
    if let Err(e) = result {
        eprintln!("Tracing was already initialized: {}", e);
    }
}
