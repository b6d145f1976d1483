//! Slide/step model: turns a devotional unit into its ordered segments

mod builder;
mod labels;
mod template;
#[cfg(test)]
mod tests;

pub use builder::{build_segments, strip_markup, Segment, SegmentCache};
pub use labels::{LabelTable, SlotLabel};
pub use template::{is_present, SegmentKey, SlotTemplate, SLOTS};
