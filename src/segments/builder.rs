use crate::content::{DevotionalUnit, Language};
use crate::segments::labels::LabelTable;
use crate::segments::template::{is_present, SegmentKey, SLOTS};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, trace};

const LOG_TARGET: &str = "lectio_player::segments";

/// One step of the guided sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub key: SegmentKey,
    pub title: String,
    pub subtitle: String,
    /// Body text; may contain simple markup
    pub body: String,
    pub accent: String,
    pub audio_url: Option<String>,
}

impl Segment {
    pub fn has_audio(&self) -> bool {
        self.audio_url.is_some()
    }

    /// Body with the simple markup flattened for a terminal.
    pub fn plain_text(&self) -> String {
        strip_markup(&self.body)
    }
}

/// Builds the ordered segment list for a unit. Pure; the introduction is always kept.
pub fn build_segments(unit: &DevotionalUnit, labels: &LabelTable) -> Vec<Segment> {
    let segments: Vec<Segment> = SLOTS
        .iter()
        .filter(|slot| slot.mandatory || is_present((slot.text)(unit)))
        .map(|slot| {
            let label = labels.get(slot.key);
            let audio_url = (slot.audio)(unit)
                .filter(|url| is_present(Some(*url)))
                .map(|url| url.trim().to_string());
            Segment {
                key: slot.key,
                title: label.title.to_string(),
                subtitle: label.subtitle.to_string(),
                body: (slot.text)(unit).unwrap_or_default().to_string(),
                accent: slot.accent.to_string(),
                audio_url,
            }
        })
        .collect();

    debug!(
        target: LOG_TARGET,
        unit_id = unit.id,
        language = %labels.language(),
        "Built {} segments ({} with audio)",
        segments.len(),
        segments.iter().filter(|s| s.has_audio()).count()
    );
    segments
}

type CacheKey = (i64, Option<String>, Language);

/// Memoizes the last build against the unit identity and the active language.
#[derive(Debug, Default)]
pub struct SegmentCache {
    entry: Option<(CacheKey, Arc<Vec<Segment>>)>,
}

impl SegmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(&mut self, unit: &DevotionalUnit, language: Language) -> Arc<Vec<Segment>> {
        let (id, updated_at) = unit.identity();
        if let Some(((cached_id, cached_updated, cached_lang), segments)) = &self.entry {
            if *cached_id == id && cached_updated.as_deref() == updated_at && *cached_lang == language {
                trace!(target: LOG_TARGET, unit_id = id, "Segment cache hit");
                return Arc::clone(segments);
            }
        }

        let segments = Arc::new(build_segments(unit, LabelTable::for_language(language)));
        self.entry = Some(((id, updated_at.map(String::from), language), Arc::clone(&segments)));
        segments
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

/// Flattens the small tag set used in prayer texts: line breaks, paragraphs, emphasis, entities.
pub fn strip_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        match rest[start..].find('>') {
            Some(end) => {
                let tag = rest[start + 1..start + end].trim().to_ascii_lowercase();
                let name = tag.trim_start_matches('/').trim_end_matches('/').trim();
                let name = name.split_whitespace().next().unwrap_or("");
                if name == "br" || (name == "p" && tag.starts_with('/')) {
                    out.push('\n');
                }
                rest = &rest[start + end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);

    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    decoded
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
