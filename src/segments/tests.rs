//! Tests for the segment builder

#[cfg(test)]
mod tests {
    use crate::content::{DevotionalUnit, Language};
    use crate::segments::*;
    use std::sync::Arc;

    fn bare_unit() -> DevotionalUnit {
        DevotionalUnit {
            id: 1,
            category: "joyful".to_string(),
            number: 1,
            language: "en".to_string(),
            published: true,
            ..Default::default()
        }
    }

    fn full_unit() -> DevotionalUnit {
        DevotionalUnit {
            opening_prayers: Some("In the name of the Father".into()),
            opening_prayers_audio: Some("https://cdn/opening.mp3".into()),
            introduction: Some("The Annunciation".into()),
            introduction_audio: Some("https://cdn/intro.mp3".into()),
            lectio: Some("Luke 1:26-38".into()),
            lectio_audio: Some("https://cdn/lectio.mp3".into()),
            commentary: Some("Gabriel is sent".into()),
            commentary_audio: Some("https://cdn/commentary.mp3".into()),
            meditatio: Some("What does the Lord say to me?".into()),
            meditatio_audio: Some("https://cdn/meditatio.mp3".into()),
            oratio: Some("<p>Our Father</p><p>Hail Mary</p>".into()),
            oratio_audio: Some("https://cdn/oratio.mp3".into()),
            contemplatio: Some("Rest in His presence".into()),
            contemplatio_audio: Some("https://cdn/contemplatio.mp3".into()),
            actio: Some("Say yes today".into()),
            actio_audio: Some("https://cdn/actio.mp3".into()),
            ..bare_unit()
        }
    }

    fn keys(segments: &[Segment]) -> Vec<SegmentKey> {
        segments.iter().map(|s| s.key).collect()
    }

    #[test]
    fn test_empty_unit_yields_only_introduction() {
        let segments = build_segments(&bare_unit(), LabelTable::for_language(Language::English));
        assert_eq!(keys(&segments), vec![SegmentKey::Introduction]);
        assert!(segments[0].audio_url.is_none());
        assert_eq!(segments[0].title, "Introduction");
    }

    #[test]
    fn test_blank_fields_are_not_present() {
        let unit = DevotionalUnit {
            lectio: Some("   ".into()),
            lectio_audio: Some("https://cdn/lectio.mp3".into()),
            actio: Some(String::new()),
            ..bare_unit()
        };
        let segments = build_segments(&unit, LabelTable::for_language(Language::English));
        assert_eq!(keys(&segments), vec![SegmentKey::Introduction]);
    }

    #[test]
    fn test_full_unit_follows_template_order() {
        let segments = build_segments(&full_unit(), LabelTable::for_language(Language::English));
        assert_eq!(
            keys(&segments),
            vec![
                SegmentKey::Opening,
                SegmentKey::Introduction,
                SegmentKey::Lectio,
                SegmentKey::Commentary,
                SegmentKey::Meditatio,
                SegmentKey::Oratio,
                SegmentKey::Contemplatio,
                SegmentKey::Actio,
            ]
        );
        assert!(segments.iter().all(Segment::has_audio));
        assert_eq!(segments[2].audio_url.as_deref(), Some("https://cdn/lectio.mp3"));
    }

    #[test]
    fn test_partial_unit_scenario() {
        let unit = DevotionalUnit {
            introduction: Some("Intro".into()),
            introduction_audio: Some("https://cdn/intro.mp3".into()),
            lectio: Some("Reading".into()),
            lectio_audio: Some("https://cdn/lectio.mp3".into()),
            meditatio: Some("Meditation".into()),
            meditatio_audio: Some("https://cdn/meditatio.mp3".into()),
            ..bare_unit()
        };
        let segments = build_segments(&unit, LabelTable::for_language(Language::English));
        assert_eq!(
            keys(&segments),
            vec![SegmentKey::Introduction, SegmentKey::Lectio, SegmentKey::Meditatio]
        );
    }

    #[test]
    fn test_text_without_audio_keeps_segment() {
        let unit = DevotionalUnit {
            commentary: Some("Only text".into()),
            commentary_audio: Some("  ".into()),
            ..bare_unit()
        };
        let segments = build_segments(&unit, LabelTable::for_language(Language::English));
        assert_eq!(keys(&segments), vec![SegmentKey::Introduction, SegmentKey::Commentary]);
        assert!(!segments[1].has_audio());
    }

    #[test]
    fn test_labels_follow_language() {
        let segments = build_segments(&full_unit(), LabelTable::for_language(Language::Spanish));
        assert_eq!(segments[1].title, "Introducción");
        assert_eq!(segments[4].subtitle, "Meditación");
    }

    #[test]
    fn test_cache_reuses_until_identity_or_language_changes() {
        let mut cache = SegmentCache::new();
        let unit = full_unit();

        let first = cache.get_or_build(&unit, Language::English);
        let second = cache.get_or_build(&unit, Language::English);
        assert!(Arc::ptr_eq(&first, &second));

        let other_language = cache.get_or_build(&unit, Language::French);
        assert!(!Arc::ptr_eq(&first, &other_language));

        let republished = DevotionalUnit { updated_at: Some("2026-01-02T00:00:00Z".into()), ..unit.clone() };
        let rebuilt = cache.get_or_build(&republished, Language::French);
        assert!(!Arc::ptr_eq(&other_language, &rebuilt));

        cache.invalidate();
        let after_invalidate = cache.get_or_build(&republished, Language::French);
        assert!(!Arc::ptr_eq(&rebuilt, &after_invalidate));
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(strip_markup("<p>Our Father</p><p>Hail Mary</p>"), "Our Father\nHail Mary");
        assert_eq!(strip_markup("Glory<br/>be &amp; <b>praise</b>"), "Glory\nbe & praise");
        assert_eq!(strip_markup("plain"), "plain");
        assert_eq!(strip_markup("a < b"), "a < b");
    }
}
