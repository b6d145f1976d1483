//! Integration tests for the guided (timer) mode

use lectio_player::content::Language;
use lectio_player::segments::LabelTable;
use lectio_player::steps::{guide_steps, GuideCommand, GuideSession, GuideUpdate, StepDurations, StepKey};
use std::time::Duration;

#[cfg(test)]
mod guide_integration_tests {
    use super::*;
    use crate::test_utils::unit_with;

    #[test]
    fn test_steps_follow_the_unit_language() {
        let unit = unit_with(5, "glorious", 3, &["lectio", "oratio"]);
        let english = guide_steps(&unit, LabelTable::for_language(Language::English));
        let spanish = guide_steps(&unit, LabelTable::for_language(Language::Spanish));

        assert_eq!(english.len(), 5);
        assert_eq!(english.iter().map(|s| s.key).collect::<Vec<_>>(), StepKey::ALL.to_vec());
        assert_eq!(english[0].body, "lectio of 5");
        assert!(english[1].body.is_empty());
        assert_eq!(english[2].body, "oratio of 5");
        assert_ne!(english[1].subtitle, spanish[1].subtitle);
    }

    /// Manual navigation through every step ends the session exactly once.
    #[tokio::test]
    async fn test_navigation_to_completion() {
        let (session, command_tx) = GuideSession::new(StepDurations::default(), Duration::from_secs(1), None, 64, 16);
        let mut session = session.with_tick_interval(Duration::from_millis(10));
        let mut updates = session.subscribe();
        let handle = tokio::spawn(async move {
            session.run().await;
            session
        });

        assert_eq!(updates.recv().await.unwrap(), GuideUpdate::StepChanged(StepKey::Lectio));
        command_tx.send(GuideCommand::Next).await.unwrap();
        command_tx.send(GuideCommand::Previous).await.unwrap();
        for _ in 0..StepKey::ALL.len() {
            command_tx.send(GuideCommand::Next).await.unwrap();
        }

        let session = tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
        let player = session.player();
        assert!(player.is_complete());
        assert_eq!(player.completed_steps(), StepKey::ALL.to_vec());

        let mut changes = Vec::new();
        let mut completes = 0;
        while let Ok(update) = updates.try_recv() {
            match update {
                GuideUpdate::StepChanged(step) => changes.push(step),
                GuideUpdate::Complete => completes += 1,
                _ => {}
            }
        }
        assert_eq!(
            changes,
            vec![
                StepKey::Meditatio,
                StepKey::Lectio,
                StepKey::Meditatio,
                StepKey::Oratio,
                StepKey::Contemplatio,
                StepKey::Actio
            ]
        );
        assert_eq!(completes, 1);
    }
}
