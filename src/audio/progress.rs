use std::time::Duration as StdDuration;

pub const PROGRESS_UPDATE_INTERVAL: StdDuration = StdDuration::from_millis(500);

/// Position within the loaded clip.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PlaybackProgressInfo {
    pub current_seconds: f64,
    pub total_seconds: Option<f64>,
}

impl PlaybackProgressInfo {
    /// Clamps a seek target into the playable range of the clip.
    pub fn clamp_target(&self, target_secs: f64) -> f64 {
        let lower = if target_secs.is_finite() { target_secs.max(0.0) } else { 0.0 };
        match self.total_seconds {
            Some(total) => lower.min(total.max(0.0)),
            None => lower,
        }
    }

    /// Fraction played, for progress bars.
    pub fn fraction(&self) -> Option<f64> {
        self.total_seconds
            .filter(|total| *total > 0.0)
            .map(|total| (self.current_seconds / total).clamp(0.0, 1.0))
    }
}
