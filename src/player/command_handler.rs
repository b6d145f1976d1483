use super::{PlaylistEngine, PlaylistError, PlaylistUpdate, PlayerCommand, PLAYER_LOG_TARGET};
use tracing::{info, warn};

/// Whether the run loop should keep going after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Applies one command to the engine.
pub async fn handle_command(engine: &mut PlaylistEngine, command: PlayerCommand) -> Flow {
    match command {
        PlayerCommand::Start => {
            let result = engine.start().await;
            report(engine, result);
        }
        PlayerCommand::Select(index) => {
            let result = engine.select(index).await;
            report(engine, result);
        }
        PlayerCommand::SkipForward => engine.skip_forward().await,
        PlayerCommand::SkipBack => engine.skip_back().await,
        PlayerCommand::PlayPauseToggle => {
            let result = engine.toggle().await;
            report(engine, result);
        }
        PlayerCommand::Pause => engine.pause().await,
        PlayerCommand::Resume => engine.resume().await,
        PlayerCommand::Stop => engine.stop().await,
        PlayerCommand::Seek(position) => engine.seek(position).await,
        PlayerCommand::SeekBy(delta) => engine.seek_by(delta).await,
        PlayerCommand::SetMode(mode) => engine.set_mode(mode),
        PlayerCommand::SetVolume(volume) => engine.set_volume(volume),
        PlayerCommand::SetMuted(muted) => engine.set_muted(muted),
        PlayerCommand::ReplaceSegments(segments) => engine.replace_segments(segments).await,
        PlayerCommand::GetSnapshot(responder) => {
            let _ = responder.send(engine.snapshot());
        }
        PlayerCommand::Shutdown => {
            info!(target: PLAYER_LOG_TARGET, "Shutdown command received");
            return Flow::Exit;
        }
    }
    Flow::Continue
}

/// Refused requests reach listeners as warnings.
fn report(engine: &PlaylistEngine, result: Result<(), PlaylistError>) {
    if let Err(e) = result {
        warn!(target: PLAYER_LOG_TARGET, "Command refused: {}", e);
        engine.notify(PlaylistUpdate::Warning(e.to_string()));
    }
}
