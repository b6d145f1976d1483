//! Keyboard bindings of the interactive commands.

use crate::player::PlayerCommand;
use crate::steps::GuideCommand;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub const SEEK_STEP_SECS: f64 = 10.0;
pub const VOLUME_STEP: f32 = 0.1;

/// What a key press asks of the playlist session.
#[derive(Debug)]
pub enum PlayAction {
    Command(PlayerCommand),
    /// Needs the current mode, which the caller tracks.
    CycleMode,
    Quit,
}

#[derive(Debug, PartialEq)]
pub enum GuideAction {
    Command(GuideCommand),
    VolumeUp,
    VolumeDown,
    ToggleMute,
    Quit,
}

fn is_quit(key: &KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

pub fn play_action(key: &KeyEvent) -> Option<PlayAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if is_quit(key) {
        return Some(PlayAction::Quit);
    }
    let command = match key.code {
        KeyCode::Char(' ') => PlayerCommand::PlayPauseToggle,
        KeyCode::Char('n') => PlayerCommand::SkipForward,
        KeyCode::Char('p') => PlayerCommand::SkipBack,
        KeyCode::Char('s') => PlayerCommand::Stop,
        KeyCode::Right => PlayerCommand::SeekBy(SEEK_STEP_SECS),
        KeyCode::Left => PlayerCommand::SeekBy(-SEEK_STEP_SECS),
        KeyCode::Char('m') => return Some(PlayAction::CycleMode),
        KeyCode::Char(c @ '1'..='8') => PlayerCommand::Select(c as usize - '1' as usize),
        _ => return None,
    };
    Some(PlayAction::Command(command))
}

pub fn guide_action(key: &KeyEvent) -> Option<GuideAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if is_quit(key) {
        return Some(GuideAction::Quit);
    }
    let action = match key.code {
        KeyCode::Char(' ') => GuideAction::Command(GuideCommand::TogglePause),
        KeyCode::Char('n') => GuideAction::Command(GuideCommand::Next),
        KeyCode::Char('p') => GuideAction::Command(GuideCommand::Previous),
        KeyCode::Char('r') => GuideAction::Command(GuideCommand::Restart),
        KeyCode::Char('+') | KeyCode::Char('=') => GuideAction::VolumeUp,
        KeyCode::Char('-') => GuideAction::VolumeDown,
        KeyCode::Char('m') => GuideAction::ToggleMute,
        _ => return None,
    };
    Some(action)
}
