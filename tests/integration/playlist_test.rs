//! Integration tests for the resolve, build and play path
//!
//! A unit is resolved from an in-memory store, turned into segments and
//! played through a session task over its command and update channels.

use lectio_player::content::{ContentResolver, Language, SessionContext};
use lectio_player::player::{EngineState, FillerClips, InterludeMode, Player, PlayerCommand, PlaylistUpdate};
use lectio_player::segments::{SegmentCache, SegmentKey};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};

#[cfg(test)]
mod playlist_integration_tests {
    use super::*;
    use crate::test_utils::{unit_with, MemoryStore, ScriptedSink};

    const SHORT: &str = "https://cdn.test/fillers/short.mp3";
    const LONG: &str = "https://cdn.test/fillers/long.mp3";

    fn store() -> MemoryStore {
        let mut unpublished = unit_with(99, "joyful", 1, &["lectio"]);
        unpublished.published = false;
        let mut second = unit_with(12, "joyful", 2, &["introduction", "lectio", "contemplatio", "actio"]);
        second.meditatio = Some("<p>read in silence</p>".to_string());
        MemoryStore {
            rows: vec![
                second,
                unit_with(11, "joyful", 1, &["lectio"]),
                unpublished,
                unit_with(31, "sorrowful", 1, &["lectio", "meditatio"]),
            ],
        }
    }

    async fn wait_for<F>(updates: &mut broadcast::Receiver<PlaylistUpdate>, mut done: F) -> Vec<PlaylistUpdate>
    where
        F: FnMut(&PlaylistUpdate) -> bool,
    {
        let mut seen = Vec::new();
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let update = updates.recv().await.unwrap();
                let finished = done(&update);
                seen.push(update);
                if finished {
                    break;
                }
            }
        })
        .await
        .expect("timed out waiting for playlist update");
        seen
    }

    #[tokio::test]
    async fn test_resolved_unit_plays_to_the_end() {
        let resolver = ContentResolver::new(Arc::new(store()));
        let ctx = SessionContext::new(Language::English, None);

        // Ordinal 2 is the second published row by number, whatever the store order
        let unit = resolver.resolve(&ctx, "joyful", 2).await.unwrap().expect("unit 2 exists");
        assert_eq!(unit.id, 12);

        let mut cache = SegmentCache::new();
        let segments = cache.get_or_build(&unit, ctx.language());
        let keys: Vec<SegmentKey> = segments.iter().map(|s| s.key).collect();
        assert_eq!(
            keys,
            vec![
                SegmentKey::Introduction,
                SegmentKey::Lectio,
                SegmentKey::Meditatio,
                SegmentKey::Contemplatio,
                SegmentKey::Actio
            ]
        );

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (sink, played) = ScriptedSink::new(event_tx, true);
        let (mut player, command_tx) = Player::new(
            Box::new(sink),
            event_rx,
            segments,
            FillerClips::new(SHORT, LONG),
            InterludeMode::Short,
            256,
            8,
        );
        let mut updates = player.subscribe_state_updates();
        let handle = tokio::spawn(async move { player.run().await });

        command_tx.send(PlayerCommand::Start).await.unwrap();
        let seen = wait_for(&mut updates, |u| *u == PlaylistUpdate::Finished).await;

        let started: Vec<usize> = seen
            .iter()
            .filter_map(|u| match u {
                PlaylistUpdate::SegmentStarted { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        // Meditatio carries no audio and is passed over
        assert_eq!(started, vec![0, 1, 3, 4]);
        assert_eq!(
            *played.lock().unwrap(),
            vec![
                "https://cdn.test/12/introduction.mp3",
                SHORT,
                "https://cdn.test/12/lectio.mp3",
                SHORT,
                "https://cdn.test/12/contemplatio.mp3",
                LONG,
                "https://cdn.test/12/actio.mp3",
            ]
        );

        command_tx.send(PlayerCommand::Shutdown).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_ordinal_and_bad_input() {
        let resolver = ContentResolver::new(Arc::new(store()));
        let ctx = SessionContext::new(Language::English, None);

        assert!(resolver.resolve(&ctx, "sorrowful", 3).await.unwrap().is_none());
        assert!(resolver.resolve(&ctx, "luminous", 1).await.unwrap().is_none());

        let err = resolver.resolve(&ctx, "mournful", 1).await.unwrap_err();
        assert!(!err.is_retryable());
        assert!(resolver.resolve(&ctx, "joyful", 0).await.is_err());

        // Only English rows exist in the store
        let spanish = SessionContext::new(Language::Spanish, None);
        assert!(resolver.resolve(&spanish, "joyful", 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_republished_content_resets_the_session() {
        let resolver = ContentResolver::new(Arc::new(store()));
        let ctx = SessionContext::new(Language::English, None);
        let unit = resolver.resolve(&ctx, "sorrowful", 1).await.unwrap().unwrap();

        let mut cache = SegmentCache::new();
        let segments = cache.get_or_build(&unit, ctx.language());

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (sink, played) = ScriptedSink::new(event_tx, false);
        let (mut player, command_tx) = Player::new(
            Box::new(sink),
            event_rx,
            Arc::clone(&segments),
            FillerClips::new(SHORT, LONG),
            InterludeMode::Long,
            256,
            8,
        );
        let mut updates = player.subscribe_state_updates();
        let handle = tokio::spawn(async move { player.run().await });

        // Introduction is kept without text or audio, so meditatio sits at index 2
        command_tx.send(PlayerCommand::Select(2)).await.unwrap();
        wait_for(&mut updates, |u| matches!(u, PlaylistUpdate::SegmentStarted { index: 2, .. })).await;

        // Same row, new revision: the cache rebuilds and the session goes back to idle
        let mut republished = unit.clone();
        republished.updated_at = Some("2026-02-01T00:00:00Z".to_string());
        republished.meditatio = Some("<p>revised</p>".to_string());
        let rebuilt = cache.get_or_build(&republished, ctx.language());
        assert!(!Arc::ptr_eq(&segments, &rebuilt));

        command_tx.send(PlayerCommand::ReplaceSegments(rebuilt)).await.unwrap();
        wait_for(&mut updates, |u| matches!(u, PlaylistUpdate::ContentReplaced { .. })).await;

        let (reply_tx, reply_rx) = oneshot::channel();
        command_tx.send(PlayerCommand::GetSnapshot(reply_tx)).await.unwrap();
        let snapshot = reply_rx.await.unwrap();
        assert_eq!(snapshot.state, EngineState::Idle);
        assert_eq!(snapshot.pointer, None);
        assert_eq!(snapshot.mode, InterludeMode::Long);
        assert_eq!(*played.lock().unwrap(), vec!["https://cdn.test/31/meditatio.mp3"]);

        drop(command_tx);
        handle.await.unwrap();
    }
}
