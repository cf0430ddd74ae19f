//! Manual scrubbing

use crate::error::{EngineError, EngineResult};
use crate::sequencer::{SlideSequencer, Step};
use storyreel_core::Seconds;

#[derive(Debug, Clone, Copy, PartialEq)]
struct SeekSession {
    resume_playing: bool,
    preview: Option<f64>,
}

/// Outcome of a committed seek
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekCommit {
    /// Elapsed time the slide was moved to, if its duration was known
    pub target: Option<Seconds>,
    /// Whether playback resumed after the seek
    pub resumed: bool,
}

/// Mediates begin/update/commit of a scrub gesture
///
/// While a session is open the sequencer ignores ticks. Preview fractions
/// never touch the committed elapsed time.
#[derive(Debug, Default)]
pub struct SeekController {
    session: Option<SeekSession>,
}

impl SeekController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Opens a seek session, capturing the current `playing` flag
    ///
    /// A second call while a session is open keeps the original capture.
    pub fn begin(&mut self, sequencer: &mut SlideSequencer) -> Step {
        if self.session.is_some() {
            log::debug!("begin_seek while already seeking");
            return Step::Ignored;
        }

        let resume_playing = sequencer.enter_seek();
        self.session = Some(SeekSession {
            resume_playing,
            preview: None,
        });
        log::debug!("Seek started (resume_playing={})", resume_playing);
        Step::Updated
    }

    /// Records a live preview fraction. Returns false without an open session.
    pub fn update(&mut self, fraction: f64) -> bool {
        let Some(session) = self.session.as_mut() else {
            log::debug!("update_seek without begin_seek ignored");
            return false;
        };
        if fraction.is_nan() {
            return false;
        }
        session.preview = Some(fraction.clamp(0.0, 1.0));
        true
    }

    /// Current preview fraction, if a session is open and was updated
    pub fn preview(&self) -> Option<f64> {
        self.session.and_then(|s| s.preview)
    }

    /// Commits the seek at `fraction` of the current slide's duration
    ///
    /// The fraction is clamped to `[0, 1]`. If the duration is undetermined
    /// the session ends without moving elapsed time.
    pub fn commit(
        &mut self,
        sequencer: &mut SlideSequencer,
        fraction: f64,
    ) -> EngineResult<SeekCommit> {
        let Some(session) = self.session else {
            return Err(EngineError::NoActiveSeek);
        };
        if fraction.is_nan() {
            return Err(EngineError::InvalidSeekFraction(fraction));
        }

        let fraction = fraction.clamp(0.0, 1.0);
        let target = sequencer.state().duration().map(|d| fraction * d);
        sequencer.exit_seek(session.resume_playing, target);
        self.session = None;

        log::debug!("Seek committed at {:.3} ({:?})", fraction, target);
        Ok(SeekCommit {
            target,
            resumed: session.resume_playing,
        })
    }

    /// Drops any open session without touching the sequencer
    pub(crate) fn clear(&mut self) {
        self.session = None;
    }
}
