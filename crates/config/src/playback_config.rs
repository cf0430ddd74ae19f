//! Playback configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Slide timing and autoplay preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Wall-clock tick interval for image slides, in milliseconds
    pub image_tick_ms: u64,

    /// Position polling interval for video slides, in milliseconds
    pub video_poll_ms: u64,

    /// Start playing as soon as a session opens
    pub autoplay: bool,

    /// Length reported for every video by the simulated media backend
    pub simulated_video_secs: f64,
}

impl PlaybackConfig {
    pub fn image_tick(&self) -> Duration {
        Duration::from_millis(self.image_tick_ms)
    }

    pub fn video_poll(&self) -> Duration {
        Duration::from_millis(self.video_poll_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            image_tick_ms: 1000,
            video_poll_ms: 500,
            autoplay: true,
            simulated_video_secs: 15.0,
        }
    }
}

impl ConfigSection for PlaybackConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(self.image_tick_ms, 50, 10_000, "playback.image_tick_ms"),
            Validator::in_range(self.video_poll_ms, 50, 5_000, "playback.video_poll_ms"),
            Validator::finite_in_range(
                self.simulated_video_secs,
                0.5,
                3600.0,
                "playback.simulated_video_secs",
            ),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.image_tick_ms = other.image_tick_ms;
        self.video_poll_ms = other.video_poll_ms;
        self.autoplay = other.autoplay;
        self.simulated_video_secs = other.simulated_video_secs;
    }

    fn section_name(&self) -> &'static str {
        "playback"
    }
}
