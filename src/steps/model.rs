use crate::content::DevotionalUnit;
use crate::segments::{strip_markup, LabelTable, SegmentKey, SLOTS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const STEP_COUNT: usize = 5;

/// Steps of the guided mode, in their only order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKey {
    Lectio,
    Meditatio,
    Oratio,
    Contemplatio,
    Actio,
}

impl StepKey {
    pub const ALL: [StepKey; STEP_COUNT] =
        [StepKey::Lectio, StepKey::Meditatio, StepKey::Oratio, StepKey::Contemplatio, StepKey::Actio];

    pub fn as_str(&self) -> &'static str {
        self.segment_key().as_str()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// The segment slot that supplies this step's text.
    pub fn segment_key(self) -> SegmentKey {
        match self {
            StepKey::Lectio => SegmentKey::Lectio,
            StepKey::Meditatio => SegmentKey::Meditatio,
            StepKey::Oratio => SegmentKey::Oratio,
            StepKey::Contemplatio => SegmentKey::Contemplatio,
            StepKey::Actio => SegmentKey::Actio,
        }
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Countdown of each step, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepDurations {
    pub lectio_secs: u64,
    pub meditatio_secs: u64,
    pub oratio_secs: u64,
    pub contemplatio_secs: u64,
    pub actio_secs: u64,
}

impl Default for StepDurations {
    fn default() -> Self {
        Self { lectio_secs: 180, meditatio_secs: 300, oratio_secs: 180, contemplatio_secs: 300, actio_secs: 120 }
    }
}

impl StepDurations {
    pub fn for_step(&self, step: StepKey) -> Duration {
        let secs = match step {
            StepKey::Lectio => self.lectio_secs,
            StepKey::Meditatio => self.meditatio_secs,
            StepKey::Oratio => self.oratio_secs,
            StepKey::Contemplatio => self.contemplatio_secs,
            StepKey::Actio => self.actio_secs,
        };
        Duration::from_secs(secs)
    }

    pub fn total(&self) -> Duration {
        StepKey::ALL.iter().map(|s| self.for_step(*s)).sum()
    }
}

/// Text shown while a step runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideStep {
    pub key: StepKey,
    pub title: String,
    pub subtitle: String,
    /// Plain text; empty when the unit has nothing for this step.
    pub body: String,
}

/// One entry per step, always all five, with whatever text the unit carries.
pub fn guide_steps(unit: &DevotionalUnit, labels: &LabelTable) -> Vec<GuideStep> {
    StepKey::ALL
        .iter()
        .map(|&key| {
            let slot_key = key.segment_key();
            let label = labels.get(slot_key);
            let body = SLOTS
                .iter()
                .find(|slot| slot.key == slot_key)
                .and_then(|slot| (slot.text)(unit))
                .map(strip_markup)
                .unwrap_or_default();
            GuideStep { key, title: label.title.to_string(), subtitle: label.subtitle.to_string(), body }
        })
        .collect()
}
