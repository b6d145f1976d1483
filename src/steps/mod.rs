//! Guided mode: fixed steps paced by a countdown instead of audio.

mod model;
mod player;
mod runner;
#[cfg(test)]
mod tests;

pub use model::{guide_steps, GuideStep, StepDurations, StepKey, STEP_COUNT};
pub use player::{StepObserver, StepPhase, StepPlayer};
pub use runner::{BackgroundAudio, BroadcastObserver, GuideCommand, GuideSession, GuideUpdate, DEFAULT_TICK_INTERVAL};
