use super::command_handler::{self, Flow};
use super::{Player, PLAYER_LOG_TARGET};
use tracing::{info, trace};

/// Runs the session's command processing loop.
pub async fn run_player_loop(player: &mut Player) {
    info!(target: PLAYER_LOG_TARGET, "Player run loop started.");

    loop {
        tokio::select! {
            biased; // Commands first, so a stop wins over a queued end-of-clip

            command = player.command_rx.recv() => {
                let Some(command) = command else {
                    info!(target: PLAYER_LOG_TARGET, "Command channel closed. Exiting run loop.");
                    break;
                };
                trace!(target: PLAYER_LOG_TARGET, "Received command: {:?}", command);
                if command_handler::handle_command(&mut player.engine, command).await == Flow::Exit {
                    break;
                }
            }

            Some(event) = player.sink_event_rx.recv() => {
                player.engine.handle_event(event).await;
            }
        }
    }

    player.engine.shutdown().await;
    info!(target: PLAYER_LOG_TARGET, "Player task cleanup complete.");
}
