use crate::content::DevotionalUnit;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable key of a guided segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKey {
    Opening,
    Introduction,
    Lectio,
    Commentary,
    Meditatio,
    Oratio,
    Contemplatio,
    Actio,
}

impl SegmentKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKey::Opening => "opening",
            SegmentKey::Introduction => "introduction",
            SegmentKey::Lectio => "lectio",
            SegmentKey::Commentary => "commentary",
            SegmentKey::Meditatio => "meditatio",
            SegmentKey::Oratio => "oratio",
            SegmentKey::Contemplatio => "contemplatio",
            SegmentKey::Actio => "actio",
        }
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type FieldAccessor = fn(&DevotionalUnit) -> Option<&str>;

/// One slot of the fixed template: which fields feed it and how it is tagged.
pub struct SlotTemplate {
    pub key: SegmentKey,
    pub text: FieldAccessor,
    pub audio: FieldAccessor,
    pub accent: &'static str,
    /// Kept even when its text is absent.
    pub mandatory: bool,
}

/// Slots in presentation (and playback) order.
pub static SLOTS: [SlotTemplate; 8] = [
    SlotTemplate {
        key: SegmentKey::Opening,
        text: |u| u.opening_prayers.as_deref(),
        audio: |u| u.opening_prayers_audio.as_deref(),
        accent: "slate",
        mandatory: false,
    },
    SlotTemplate {
        key: SegmentKey::Introduction,
        text: |u| u.introduction.as_deref(),
        audio: |u| u.introduction_audio.as_deref(),
        accent: "amber",
        mandatory: true,
    },
    SlotTemplate {
        key: SegmentKey::Lectio,
        text: |u| u.lectio.as_deref(),
        audio: |u| u.lectio_audio.as_deref(),
        accent: "sky",
        mandatory: false,
    },
    SlotTemplate {
        key: SegmentKey::Commentary,
        text: |u| u.commentary.as_deref(),
        audio: |u| u.commentary_audio.as_deref(),
        accent: "indigo",
        mandatory: false,
    },
    SlotTemplate {
        key: SegmentKey::Meditatio,
        text: |u| u.meditatio.as_deref(),
        audio: |u| u.meditatio_audio.as_deref(),
        accent: "violet",
        mandatory: false,
    },
    SlotTemplate {
        key: SegmentKey::Oratio,
        text: |u| u.oratio.as_deref(),
        audio: |u| u.oratio_audio.as_deref(),
        accent: "rose",
        mandatory: false,
    },
    SlotTemplate {
        key: SegmentKey::Contemplatio,
        text: |u| u.contemplatio.as_deref(),
        audio: |u| u.contemplatio_audio.as_deref(),
        accent: "emerald",
        mandatory: false,
    },
    SlotTemplate {
        key: SegmentKey::Actio,
        text: |u| u.actio.as_deref(),
        audio: |u| u.actio_audio.as_deref(),
        accent: "orange",
        mandatory: false,
    },
];

/// A field counts as present only when it holds something other than whitespace.
pub fn is_present(value: Option<&str>) -> bool {
    value.map_or(false, |v| !v.trim().is_empty())
}
