//! Tests for the guided step player

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::audio::{AudioError, AudioSink, ClipId, SinkEvent};
    use crate::content::{DevotionalUnit, Language};
    use crate::segments::LabelTable;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[derive(Debug, Clone, PartialEq)]
    enum Seen {
        Step(StepKey),
        Complete,
    }

    #[derive(Clone, Default)]
    struct RecordingObserver {
        seen: Arc<Mutex<Vec<Seen>>>,
    }

    impl StepObserver for RecordingObserver {
        fn on_step_change(&mut self, step: StepKey) {
            self.seen.lock().unwrap().push(Seen::Step(step));
        }

        fn on_complete(&mut self) {
            self.seen.lock().unwrap().push(Seen::Complete);
        }
    }

    fn short_durations() -> StepDurations {
        StepDurations { lectio_secs: 10, meditatio_secs: 20, oratio_secs: 10, contemplatio_secs: 30, actio_secs: 5 }
    }

    fn player_with(delay: Duration) -> (StepPlayer, Arc<Mutex<Vec<Seen>>>) {
        let observer = RecordingObserver::default();
        let seen = Arc::clone(&observer.seen);
        let mut player = StepPlayer::new(short_durations(), delay, Box::new(observer));
        player.start();
        (player, seen)
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_durations_default_and_lookup() {
        let durations = StepDurations::default();
        assert_eq!(durations.for_step(StepKey::Meditatio), secs(300));
        assert_eq!(short_durations().total(), secs(75));
        let partial: StepDurations = serde_json::from_str(r#"{"actio_secs": 1}"#).unwrap();
        assert_eq!(partial.actio_secs, 1);
        assert_eq!(partial.lectio_secs, 180);
    }

    #[test]
    fn test_start_announces_first_step() {
        let (player, seen) = player_with(secs(1));
        assert_eq!(player.current_step(), StepKey::Lectio);
        assert_eq!(player.remaining(), secs(10));
        assert_eq!(*seen.lock().unwrap(), vec![Seen::Step(StepKey::Lectio)]);
        assert!(player.completed_steps().is_empty());
    }

    #[test]
    fn test_countdown_then_transition_delay() {
        let (mut player, seen) = player_with(secs(2));
        player.tick(secs(4));
        assert_eq!(player.remaining(), secs(6));
        assert!(!player.is_completed(StepKey::Lectio), "not completed while still on it");

        player.tick(secs(6));
        assert_eq!(player.phase(), StepPhase::Transition { remaining: secs(2), next: 1 });
        assert!(player.is_completed(StepKey::Lectio));
        assert_eq!(player.current_step(), StepKey::Lectio);

        player.tick(secs(1));
        assert_eq!(player.current_step(), StepKey::Lectio);
        player.tick(secs(1));
        assert_eq!(player.current_step(), StepKey::Meditatio);
        assert_eq!(player.remaining(), secs(20));
        assert_eq!(seen.lock().unwrap().last(), Some(&Seen::Step(StepKey::Meditatio)));
    }

    #[test]
    fn test_full_run_completes_once() {
        let (mut player, seen) = player_with(Duration::ZERO);
        for _ in 0..5 {
            player.tick(secs(30));
        }
        assert!(player.is_complete());
        assert_eq!(player.completed_steps(), StepKey::ALL.to_vec());

        // No loop and no second notification
        player.tick(secs(30));
        player.next();
        player.previous();
        let seen = seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                Seen::Step(StepKey::Lectio),
                Seen::Step(StepKey::Meditatio),
                Seen::Step(StepKey::Oratio),
                Seen::Step(StepKey::Contemplatio),
                Seen::Step(StepKey::Actio),
                Seen::Complete,
            ]
        );
    }

    #[test]
    fn test_manual_navigation() {
        let (mut player, seen) = player_with(secs(2));
        player.next();
        assert_eq!(player.current_step(), StepKey::Meditatio);
        assert!(player.is_completed(StepKey::Lectio));

        player.previous();
        assert_eq!(player.current_step(), StepKey::Lectio);
        assert!(!player.is_completed(StepKey::Meditatio), "previous does not complete the step left");

        player.previous();
        assert_eq!(player.current_step(), StepKey::Lectio);

        // `next` during the transition delay skips the rest of the delay
        player.tick(secs(10));
        assert!(matches!(player.phase(), StepPhase::Transition { .. }));
        player.next();
        assert_eq!(player.current_step(), StepKey::Meditatio);

        for _ in 0..4 {
            player.next();
        }
        assert!(player.is_complete());
        assert_eq!(seen.lock().unwrap().iter().filter(|s| **s == Seen::Complete).count(), 1);
    }

    #[test]
    fn test_restart_clears_completion() {
        let (mut player, seen) = player_with(Duration::ZERO);
        player.next();
        player.next();
        player.restart();
        assert_eq!(player.current_step(), StepKey::Lectio);
        assert!(player.completed_steps().is_empty());
        assert_eq!(seen.lock().unwrap().last(), Some(&Seen::Step(StepKey::Lectio)));

        for _ in 0..5 {
            player.next();
        }
        player.restart();
        assert!(!player.is_complete());
        for _ in 0..5 {
            player.next();
        }
        assert_eq!(seen.lock().unwrap().iter().filter(|s| **s == Seen::Complete).count(), 2);
    }

    #[test]
    fn test_pause_freezes_countdown() {
        let (mut player, _) = player_with(secs(1));
        player.tick(secs(3));
        player.pause();
        player.tick(secs(100));
        assert_eq!(player.remaining(), secs(7));
        player.resume();
        player.tick(secs(2));
        assert_eq!(player.remaining(), secs(5));
    }

    #[test]
    fn test_guide_steps_from_unit() {
        let unit = DevotionalUnit {
            lectio: Some("<p>In the beginning</p>".to_string()),
            oratio: Some("Lord, <b>hear</b> us".to_string()),
            ..Default::default()
        };
        let steps = guide_steps(&unit, LabelTable::for_language(Language::English));
        assert_eq!(steps.len(), STEP_COUNT);
        assert_eq!(steps.iter().map(|s| s.key).collect::<Vec<_>>(), StepKey::ALL.to_vec());
        assert_eq!(steps[0].body, "In the beginning");
        assert_eq!(steps[2].body, "Lord, hear us");
        assert!(steps[1].body.is_empty());
        assert_eq!(steps[4].title, "Actio");
    }

    #[derive(Default)]
    struct LoopLog {
        plays: Vec<ClipId>,
        loaded: Option<ClipId>,
        paused: bool,
        muted: bool,
        volume: Option<f32>,
    }

    struct LoopSink {
        log: Arc<Mutex<LoopLog>>,
        fail: bool,
    }

    #[async_trait]
    impl AudioSink for LoopSink {
        async fn play(&mut self, clip: ClipId, _url: &str) -> Result<Option<f64>, AudioError> {
            if self.fail {
                return Err(AudioError::InvalidUrl("bad".to_string()));
            }
            let mut log = self.log.lock().unwrap();
            log.plays.push(clip);
            log.loaded = Some(clip);
            Ok(None)
        }
        async fn pause(&mut self) -> Result<(), AudioError> {
            self.log.lock().unwrap().paused = true;
            Ok(())
        }
        async fn resume(&mut self) -> Result<(), AudioError> {
            self.log.lock().unwrap().paused = false;
            Ok(())
        }
        async fn seek(&mut self, _position_secs: f64) -> Result<(), AudioError> {
            Ok(())
        }
        async fn release(&mut self) {
            self.log.lock().unwrap().loaded = None;
        }
        fn set_volume(&mut self, volume: f32) {
            self.log.lock().unwrap().volume = Some(volume);
        }
        fn set_muted(&mut self, muted: bool) {
            self.log.lock().unwrap().muted = muted;
        }
        fn loaded_clip(&self) -> Option<ClipId> {
            self.log.lock().unwrap().loaded
        }
    }

    fn instant_durations() -> StepDurations {
        StepDurations { lectio_secs: 0, meditatio_secs: 0, oratio_secs: 0, contemplatio_secs: 0, actio_secs: 0 }
    }

    #[tokio::test]
    async fn test_session_runs_to_completion() {
        let (session, _command_tx) = GuideSession::new(instant_durations(), Duration::ZERO, None, 64, 4);
        let mut session = session.with_tick_interval(Duration::from_millis(5));
        let mut updates = session.subscribe();

        tokio::time::timeout(Duration::from_secs(5), session.run()).await.unwrap();
        assert!(session.player().is_complete());

        let mut changes = Vec::new();
        let mut completes = 0;
        while let Ok(update) = updates.try_recv() {
            match update {
                GuideUpdate::StepChanged(step) => changes.push(step),
                GuideUpdate::Complete => completes += 1,
                _ => {}
            }
        }
        assert_eq!(changes, StepKey::ALL.to_vec());
        assert_eq!(completes, 1);
    }

    #[tokio::test]
    async fn test_session_commands_and_background_loop() {
        let log = Arc::new(Mutex::new(LoopLog::default()));
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let background = BackgroundAudio::new(
            Box::new(LoopSink { log: Arc::clone(&log), fail: false }),
            event_rx,
            "https://cdn.test/ambient.mp3",
        );
        let (mut session, command_tx) =
            GuideSession::new(StepDurations::default(), Duration::ZERO, Some(background), 64, 8);
        let mut updates = session.subscribe();
        let handle = tokio::spawn(async move {
            session.run().await;
            session
        });

        assert_eq!(updates.recv().await.unwrap(), GuideUpdate::StepChanged(StepKey::Lectio));

        // The looping clip is restarted when it ends
        while log.lock().unwrap().plays.is_empty() {
            tokio::task::yield_now().await;
        }
        event_tx.send(SinkEvent::Ended { clip: ClipId(1) }).unwrap();
        while log.lock().unwrap().plays.len() < 2 {
            tokio::task::yield_now().await;
        }
        command_tx.send(GuideCommand::SetVolume(0.4)).await.unwrap();
        command_tx.send(GuideCommand::SetMuted(true)).await.unwrap();
        command_tx.send(GuideCommand::TogglePause).await.unwrap();
        command_tx.send(GuideCommand::Next).await.unwrap();
        command_tx.send(GuideCommand::Shutdown).await.unwrap();

        let session = tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
        assert_eq!(session.player().current_step(), StepKey::Meditatio);
        assert!(session.player().is_paused());

        let log = log.lock().unwrap();
        assert_eq!(log.plays, vec![ClipId(1), ClipId(2)]);
        assert!(log.paused && log.muted);
        assert_eq!(log.volume, Some(0.4));
        assert!(log.loaded.is_none(), "background released at the end");
    }

    #[tokio::test]
    async fn test_background_failure_is_a_warning() {
        let log = Arc::new(Mutex::new(LoopLog::default()));
        let (_event_tx, event_rx) = mpsc::unbounded_channel();
        let background =
            BackgroundAudio::new(Box::new(LoopSink { log: Arc::clone(&log), fail: true }), event_rx, "not a url");
        let (mut session, command_tx) =
            GuideSession::new(StepDurations::default(), Duration::ZERO, Some(background), 64, 8);
        let mut updates = session.subscribe();
        command_tx.send(GuideCommand::Shutdown).await.unwrap();
        session.run().await;

        let mut warned = false;
        while let Ok(update) = updates.try_recv() {
            warned |= matches!(update, GuideUpdate::Warning(ref m) if m.contains("Background audio stopped"));
        }
        assert!(warned);
        assert_eq!(session.player().current_step(), StepKey::Lectio);
    }

    #[tokio::test]
    async fn test_background_end_during_pause_restarts_on_resume() {
        let log = Arc::new(Mutex::new(LoopLog::default()));
        let (_event_tx, event_rx) = mpsc::unbounded_channel();
        let mut background = BackgroundAudio::new(
            Box::new(LoopSink { log: Arc::clone(&log), fail: false }),
            event_rx,
            "https://cdn.test/ambient.mp3",
        );
        background.play_from_start().await.unwrap();
        assert!(background.set_paused(true).await.is_none());
        assert!(log.lock().unwrap().paused);

        // Ended while paused must not start the loop again yet
        assert!(background.handle_event(SinkEvent::Ended { clip: ClipId(1) }).await.is_none());
        assert_eq!(log.lock().unwrap().plays, vec![ClipId(1)]);

        assert!(background.set_paused(false).await.is_none());
        assert_eq!(log.lock().unwrap().plays, vec![ClipId(1), ClipId(2)]);

        // The old clip's events no longer count
        assert!(background.handle_event(SinkEvent::Ended { clip: ClipId(1) }).await.is_none());
        assert_eq!(log.lock().unwrap().plays.len(), 2);
    }

    #[tokio::test]
    async fn test_restart_unpauses_background() {
        let log = Arc::new(Mutex::new(LoopLog::default()));
        let (_event_tx, event_rx) = mpsc::unbounded_channel();
        let background = BackgroundAudio::new(
            Box::new(LoopSink { log: Arc::clone(&log), fail: false }),
            event_rx,
            "https://cdn.test/ambient.mp3",
        );
        let (mut session, command_tx) =
            GuideSession::new(StepDurations::default(), Duration::ZERO, Some(background), 64, 8);
        let mut updates = session.subscribe();
        command_tx.send(GuideCommand::Next).await.unwrap();
        command_tx.send(GuideCommand::TogglePause).await.unwrap();
        command_tx.send(GuideCommand::Restart).await.unwrap();
        command_tx.send(GuideCommand::Shutdown).await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), session.run()).await.unwrap();

        assert_eq!(session.player().current_step(), StepKey::Lectio);
        assert!(!session.player().is_paused());
        assert!(!log.lock().unwrap().paused);

        let mut pause_states = Vec::new();
        while let Ok(update) = updates.try_recv() {
            if let GuideUpdate::Paused(paused) = update {
                pause_states.push(paused);
            }
        }
        assert_eq!(pause_states, vec![true, false]);
    }
}
