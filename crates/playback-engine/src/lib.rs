//! Playback Engine - slide sequencing and timing for StoryReel

pub mod clock;
mod engine;
mod error;
mod events;
pub mod media;
mod progress;
mod seek;
mod sequencer;
mod state;
mod time_source;

pub use clock::{ClockHandle, ClockRequest, ManualClock, PlaybackClock, ThreadClock};
pub use engine::{EngineSettings, StoryEngine};
pub use error::{EngineError, EngineResult};
pub use events::{EngineEvent, EventSink, Generation};
pub use media::{MediaBackend, MediaHandle, MediaReporter, NullMediaBackend, SimulatedMediaBackend};
pub use progress::progress;
pub use seek::{SeekCommit, SeekController};
pub use sequencer::{SlideSequencer, Step, Transition};
pub use state::{PlaybackMode, PlaybackPosition, PlaybackState};
pub use time_source::{MediaPositionSource, TimeSource, WallClockSource};
pub use storyreel_core::{Seconds, Slide, Story, StoryCatalog};

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_exports_accessible() {
        let _ = PlaybackMode::Paused;
        let _ = SeekController::new();
        let _ = EngineSettings::default();
    }

    #[test]
    fn test_error_display() {
        let error = EngineError::InvalidSeekFraction(1.5);
        assert!(format!("{}", error).contains("1.5"));
    }
}
