//! Engine state management

use crate::progress::progress;
use serde::{Deserialize, Serialize};
use storyreel_core::Seconds;

/// Pointer into the story/slide collections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaybackPosition {
    pub story_index: usize,
    pub slide_index: usize,
}

impl PlaybackPosition {
    pub fn new(story_index: usize, slide_index: usize) -> Self {
        Self {
            story_index,
            slide_index,
        }
    }
}

impl std::fmt::Display for PlaybackPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.story_index, self.slide_index)
    }
}

/// State machine mode derived from the `playing`/`seeking` flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackMode {
    Playing,
    Paused,
    Seeking,
}

/// Snapshot of the playback session handed to observers
///
/// Only the sequencer writes to it. `elapsed` stays within `[0, duration]`
/// whenever the duration is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    position: PlaybackPosition,
    elapsed: Seconds,
    duration: Option<Seconds>,
    playing: bool,
    seeking: bool,
}

impl PlaybackState {
    pub(crate) fn new(playing: bool, duration: Option<Seconds>) -> Self {
        Self {
            position: PlaybackPosition::default(),
            elapsed: 0.0,
            duration,
            playing,
            seeking: false,
        }
    }

    pub fn position(&self) -> PlaybackPosition {
        self.position
    }

    pub fn story_index(&self) -> usize {
        self.position.story_index
    }

    pub fn slide_index(&self) -> usize {
        self.position.slide_index
    }

    pub fn elapsed(&self) -> Seconds {
        self.elapsed
    }

    /// Duration of the current slide, if determined
    pub fn duration(&self) -> Option<Seconds> {
        self.duration
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_seeking(&self) -> bool {
        self.seeking
    }

    pub fn mode(&self) -> PlaybackMode {
        if self.seeking {
            PlaybackMode::Seeking
        } else if self.playing {
            PlaybackMode::Playing
        } else {
            PlaybackMode::Paused
        }
    }

    /// Normalized progress through the current slide
    pub fn progress(&self) -> f64 {
        progress(self.elapsed, self.duration)
    }

    /// Remaining time on the current slide, if determined
    pub fn remaining(&self) -> Option<Seconds> {
        self.duration.map(|d| (d - self.elapsed).max(0.0))
    }

    /// Moves to a new slide, resetting elapsed time
    pub(crate) fn enter(&mut self, position: PlaybackPosition, duration: Option<Seconds>) {
        self.position = position;
        self.duration = duration;
        self.elapsed = 0.0;
    }

    /// Writes elapsed time, clamped to `[0, duration]`
    pub(crate) fn set_elapsed(&mut self, elapsed: Seconds) {
        let floor = elapsed.max(0.0);
        self.elapsed = match self.duration {
            Some(d) => floor.min(d),
            None => floor,
        };
    }

    /// Records a newly determined duration and re-clamps elapsed time
    pub(crate) fn set_duration(&mut self, duration: Seconds) {
        self.duration = Some(duration);
        let elapsed = self.elapsed;
        self.set_elapsed(elapsed);
    }

    pub(crate) fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub(crate) fn set_seeking(&mut self, seeking: bool) {
        self.seeking = seeking;
    }
}

#[cfg(test)]
mod state_tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = PlaybackState::new(true, Some(3.0));
        assert_eq!(state.position(), PlaybackPosition::new(0, 0));
        assert_eq!(state.elapsed(), 0.0);
        assert!(state.is_playing());
        assert!(!state.is_seeking());
        assert_eq!(state.mode(), PlaybackMode::Playing);
    }

    #[test]
    fn test_mode_precedence() {
        let mut state = PlaybackState::new(true, None);
        state.set_seeking(true);
        assert_eq!(state.mode(), PlaybackMode::Seeking);
        state.set_seeking(false);
        state.set_playing(false);
        assert_eq!(state.mode(), PlaybackMode::Paused);
    }

    #[test]
    fn test_elapsed_clamped_to_duration() {
        let mut state = PlaybackState::new(true, Some(3.0));
        state.set_elapsed(7.5);
        assert_eq!(state.elapsed(), 3.0);
        state.set_elapsed(-2.0);
        assert_eq!(state.elapsed(), 0.0);
    }

    #[test]
    fn test_elapsed_unbounded_without_duration() {
        let mut state = PlaybackState::new(true, None);
        state.set_elapsed(42.0);
        assert_eq!(state.elapsed(), 42.0);
        assert_eq!(state.remaining(), None);
    }

    #[test]
    fn test_set_duration_reclamps() {
        let mut state = PlaybackState::new(true, None);
        state.set_elapsed(20.0);
        state.set_duration(15.0);
        assert_eq!(state.elapsed(), 15.0);
        assert_eq!(state.remaining(), Some(0.0));
    }

    #[test]
    fn test_enter_resets_elapsed() {
        let mut state = PlaybackState::new(true, Some(3.0));
        state.set_elapsed(2.0);
        state.enter(PlaybackPosition::new(1, 2), None);
        assert_eq!(state.elapsed(), 0.0);
        assert_eq!(state.story_index(), 1);
        assert_eq!(state.slide_index(), 2);
        assert_eq!(state.duration(), None);
    }

    #[test]
    fn test_progress() {
        let mut state = PlaybackState::new(true, Some(20.0));
        state.set_elapsed(5.0);
        assert_eq!(state.progress(), 0.25);
    }

    #[test]
    fn test_position_display() {
        assert_eq!(PlaybackPosition::new(2, 4).to_string(), "(2, 4)");
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut state = PlaybackState::new(false, Some(4.0));
        state.enter(PlaybackPosition::new(2, 1), Some(4.0));
        state.set_elapsed(1.5);

        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"story_index\":2"));
        let restored: PlaybackState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }
}
