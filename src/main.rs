use lectio_player::audio::AlsaSink;
use lectio_player::config::Settings;
use lectio_player::content::{ContentResolver, DevotionalUnit, SessionContext, SupabaseClient};
use lectio_player::player::{FillerClips, Player, PlayerCommand, PlaylistUpdate};
use lectio_player::segments::{LabelTable, Segment, SegmentCache};
use lectio_player::steps::{guide_steps, BackgroundAudio, GuideCommand, GuideSession, GuideUpdate};
use lectio_player::ui::{
    guide_action, play_action, Cli, Command, CountdownDisplay, GuideAction, KeyReader, PlayAction, PlaybackDisplay,
    RawModeGuard, VOLUME_STEP,
};
use lectio_player::{init_app_dirs, init_tracing};
use std::error::Error;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

const LOG_TARGET: &str = "lectio_player::main";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Parse command-line arguments and initialize CLI
    let cli = Cli::new();
    let args = &cli.args;
    init_tracing(args.log_json);

    // Initialize application directories
    init_app_dirs()?;

    // Config file, then environment and command-line overrides
    let config_path = args.config.clone().unwrap_or_else(Settings::default_path);
    let mut settings = Settings::load(&config_path)?;
    args.apply_overrides(&mut settings);
    settings.validate()?;

    let anon_key = settings.anon_key.clone().unwrap_or_default();
    let store = SupabaseClient::new(&settings.supabase_url, &anon_key);
    let resolver = ContentResolver::new(Arc::new(store));
    let ctx = SessionContext::new(settings.language, settings.access_token.clone());

    let target = args.command.unit();
    let unit = match resolver.resolve(&ctx, &target.category, target.ordinal).await {
        Ok(Some(unit)) => unit,
        Ok(None) => {
            cli.display_not_found(target);
            return Ok(());
        }
        Err(e) => {
            cli.display_resolve_error(&e);
            return Err(e.into());
        }
    };

    let mut cache = SegmentCache::new();
    let segments = cache.get_or_build(&unit, ctx.language());

    let session_id = Uuid::new_v4();
    let span = info_span!("session", id = %session_id, unit_id = unit.id);
    match &args.command {
        Command::Show { .. } => {
            cli.display_segments(&unit, &segments);
            cli.display_segment_texts(&segments);
        }
        Command::Play { from, .. } => {
            run_play(&cli, &settings, &unit, segments, *from).instrument(span).await?;
        }
        Command::Guide { .. } => {
            let labels = LabelTable::for_language(ctx.language());
            run_guide(&cli, &settings, &unit, labels).instrument(span).await?;
        }
    }

    Ok(())
}

/// Audio playlist with keyboard controls.
async fn run_play(
    cli: &Cli,
    settings: &Settings,
    unit: &DevotionalUnit,
    segments: Arc<Vec<Segment>>,
    from: usize,
) -> Result<(), Box<dyn Error>> {
    cli.display_segments(unit, &segments);
    cli.display_play_controls();

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let sink = AlsaSink::new(&settings.alsa_device, event_tx);
    let fillers = FillerClips::from_storage(&settings.supabase_url, &settings.audio_bucket);
    let (mut player, command_tx) =
        Player::new(Box::new(sink), event_rx, Arc::clone(&segments), fillers, settings.interlude_mode, 64, 32);
    let mut updates = player.subscribe_state_updates();
    let player_task = tokio::spawn(async move { player.run().await }.in_current_span());

    let first = match from.saturating_sub(1) {
        0 => PlayerCommand::Start,
        index => PlayerCommand::Select(index),
    };
    command_tx.send(first).await?;

    let display = PlaybackDisplay::new();
    let _raw_mode = RawModeGuard::enable()?;
    let mut keys = KeyReader::spawn();
    let mut mode = settings.interlude_mode;

    loop {
        tokio::select! {
            key = keys.next() => {
                let Some(key) = key else { break };
                match play_action(&key) {
                    Some(PlayAction::Quit) => break,
                    Some(PlayAction::CycleMode) => {
                        mode = mode.cycle();
                        command_tx.send(PlayerCommand::SetMode(mode)).await?;
                    }
                    Some(PlayAction::Command(command)) => command_tx.send(command).await?,
                    None => {}
                }
            }
            update = updates.recv() => match update {
                Ok(update) => render_playlist_update(&display, &segments, update),
                Err(RecvError::Lagged(skipped)) => debug!(target: LOG_TARGET, "Display skipped {} updates", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    }

    let _ = command_tx.send(PlayerCommand::Shutdown).await;
    player_task.await?;
    display.finish("Session ended");
    info!(target: LOG_TARGET, "Playlist session ended");
    Ok(())
}

fn render_playlist_update(display: &PlaybackDisplay, segments: &[Segment], update: PlaylistUpdate) {
    match update {
        PlaylistUpdate::SegmentStarted { index, .. } => {
            let title = segments.get(index).map(|s| s.title.as_str()).unwrap_or("?");
            display.set_now_playing(title);
            display.note(&format!("> {}. {}", index + 1, title));
        }
        PlaylistUpdate::InterludeStarted { .. } => display.set_now_playing("interlude"),
        PlaylistUpdate::Paused => display.note("Paused"),
        PlaylistUpdate::Resumed => display.note("Resumed"),
        PlaylistUpdate::Stopped => display.set_now_playing("stopped"),
        PlaylistUpdate::Finished => {
            display.set_now_playing("idle");
            display.note("End of the decade. Press space to start again or q to quit.");
        }
        PlaylistUpdate::Progress(progress) => display.update_progress(progress),
        PlaylistUpdate::ModeChanged(mode) => display.note(&format!("Interlude mode: {}", mode)),
        PlaylistUpdate::ContentReplaced { .. } => display.set_now_playing("idle"),
        PlaylistUpdate::Warning(message) => display.note(&format!("Warning: {}", message)),
    }
}

/// Timer-paced guided mode.
async fn run_guide(
    cli: &Cli,
    settings: &Settings,
    unit: &DevotionalUnit,
    labels: &LabelTable,
) -> Result<(), Box<dyn Error>> {
    let steps = guide_steps(unit, labels);
    cli.display_guide_outline(unit, &steps);
    cli.display_guide_controls();

    let background = settings.background_audio.as_ref().map(|url| {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let sink = AlsaSink::new(&settings.alsa_device, event_tx);
        BackgroundAudio::new(Box::new(sink), event_rx, url.clone())
    });
    let durations = settings.step_durations;
    let (mut session, command_tx) = GuideSession::new(durations, settings.transition_delay(), background, 64, 16);
    let mut updates = session.subscribe();
    let session_task = tokio::spawn(async move { session.run().await }.in_current_span());

    let display = CountdownDisplay::new();
    let _raw_mode = RawModeGuard::enable()?;
    let mut keys = KeyReader::spawn();
    let mut volume = 1.0f32;
    let mut muted = false;
    let mut paused = false;

    loop {
        tokio::select! {
            key = keys.next() => {
                let Some(key) = key else { break };
                let command = match guide_action(&key) {
                    Some(GuideAction::Quit) => break,
                    Some(GuideAction::Command(command)) => command,
                    Some(GuideAction::VolumeUp) => {
                        volume = (volume + VOLUME_STEP).min(1.0);
                        GuideCommand::SetVolume(volume)
                    }
                    Some(GuideAction::VolumeDown) => {
                        volume = (volume - VOLUME_STEP).max(0.0);
                        GuideCommand::SetVolume(volume)
                    }
                    Some(GuideAction::ToggleMute) => {
                        muted = !muted;
                        GuideCommand::SetMuted(muted)
                    }
                    None => continue,
                };
                if command_tx.send(command).await.is_err() {
                    break;
                }
            }
            update = updates.recv() => match update {
                Ok(GuideUpdate::StepChanged(step)) => {
                    let current = &steps[step.index()];
                    display.set_step(&current.title, durations.for_step(step));
                    display.note(&format!("== {} ({}) ==", current.title, current.subtitle));
                    if !current.body.is_empty() {
                        display.note(&current.body);
                    }
                }
                Ok(GuideUpdate::Tick { remaining, in_transition, .. }) => display.update(remaining, in_transition, paused),
                Ok(GuideUpdate::Paused(now_paused)) => paused = now_paused,
                Ok(GuideUpdate::Complete) => {
                    display.finish("Session complete");
                    break;
                }
                Ok(GuideUpdate::Warning(message)) => display.note(&format!("Warning: {}", message)),
                Err(RecvError::Lagged(skipped)) => debug!(target: LOG_TARGET, "Display skipped {} updates", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    }

    let _ = command_tx.send(GuideCommand::Shutdown).await;
    session_task.await?;
    info!(target: LOG_TARGET, "Guided session ended");
    Ok(())
}
