// FILE: crates/playback-engine/src/sequencer.rs

//! Slide sequencing state machine
//!
//! The sequencer owns the catalog and the single [`PlaybackState`]. Every
//! mutation goes through one of its transition functions, which report what
//! happened as a [`Step`] so the runtime can rebuild clocks and media.

use crate::state::{PlaybackPosition, PlaybackState};
use crate::time_source::TimeSource;
use storyreel_core::{Seconds, Slide, SlideKind, StoryCatalog};

/// How the sequencer arrived at a new slide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Auto-advance within the same story
    NextSlide,
    /// Auto-advance into the first slide of the following story
    NextStory,
    /// Auto-advance from the last slide of the last story back to `(0, 0)`
    Wrapped,
    /// Manual navigation
    Jump,
}

/// Result of applying a transition function
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Nothing changed
    Ignored,
    /// State changed on the same slide
    Updated,
    /// The current slide changed (or was restarted)
    SlideChanged {
        from: PlaybackPosition,
        to: PlaybackPosition,
        transition: Transition,
    },
}

impl Step {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }

    pub fn changed_slide(&self) -> bool {
        matches!(self, Self::SlideChanged { .. })
    }
}

pub struct SlideSequencer {
    catalog: StoryCatalog,
    state: PlaybackState,
    source: TimeSource,
}

impl SlideSequencer {
    /// Creates a sequencer positioned at `(0, 0)`
    ///
    /// The catalog is validated on construction, so it is never empty.
    pub fn new(catalog: StoryCatalog, playing: bool) -> Self {
        let first = first_slide(&catalog);
        let source = TimeSource::for_slide(first);
        let state = PlaybackState::new(playing, source.duration());
        Self {
            catalog,
            state,
            source,
        }
    }

    pub fn catalog(&self) -> &StoryCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn time_source(&self) -> &TimeSource {
        &self.source
    }

    pub fn position(&self) -> PlaybackPosition {
        self.state.position()
    }

    pub fn current_slide(&self) -> &Slide {
        let position = self.state.position();
        &self.catalog.stories()[position.story_index].slides()[position.slide_index]
    }

    /// Applies an elapsed-time observation from the active time source
    ///
    /// Only processed while playing. Advances once elapsed reaches a known
    /// duration.
    pub fn tick(&mut self, elapsed: Seconds) -> Step {
        if !self.state.is_playing() || self.state.is_seeking() {
            log::trace!("Tick at {:.3}s ignored while not playing", elapsed);
            return Step::Ignored;
        }
        if !elapsed.is_finite() {
            log::trace!("Dropping non-finite tick");
            return Step::Ignored;
        }

        self.source.on_tick(elapsed);
        self.state.set_elapsed(elapsed);

        match self.source.duration() {
            Some(duration) if self.state.elapsed() >= duration => self.advance(),
            _ => Step::Updated,
        }
    }

    /// Moves to the successor slide, wrapping after the last story
    pub fn advance(&mut self) -> Step {
        let from = self.state.position();
        let story_len = self.catalog.stories()[from.story_index].len();

        let (to, transition) = if from.slide_index + 1 < story_len {
            (
                PlaybackPosition::new(from.story_index, from.slide_index + 1),
                Transition::NextSlide,
            )
        } else if from.story_index + 1 < self.catalog.len() {
            (
                PlaybackPosition::new(from.story_index + 1, 0),
                Transition::NextStory,
            )
        } else {
            (PlaybackPosition::new(0, 0), Transition::Wrapped)
        };

        self.enter(from, to, transition)
    }

    /// Shows slide `index` of the current story, restarting it from zero
    pub fn jump_to_slide(&mut self, index: usize) -> Step {
        let from = self.state.position();
        let story_len = self.catalog.stories()[from.story_index].len();
        if index >= story_len {
            log::debug!(
                "Slide index {} out of range for story {} ({} slides)",
                index,
                from.story_index,
                story_len
            );
            return Step::Ignored;
        }

        let to = PlaybackPosition::new(from.story_index, index);
        self.enter(from, to, Transition::Jump)
    }

    /// Shows the first slide of story `index`
    pub fn jump_to_story(&mut self, index: usize) -> Step {
        if index >= self.catalog.len() {
            log::debug!(
                "Story index {} out of range ({} stories)",
                index,
                self.catalog.len()
            );
            return Step::Ignored;
        }

        let from = self.state.position();
        self.enter(from, PlaybackPosition::new(index, 0), Transition::Jump)
    }

    /// Moves to the following story. Does not wrap.
    pub fn next(&mut self) -> Step {
        let story = self.state.story_index();
        if story >= self.catalog.last_index() {
            log::debug!("Already at the last story");
            return Step::Ignored;
        }
        self.jump_to_story(story + 1)
    }

    /// Moves to the preceding story. Does not wrap.
    pub fn previous(&mut self) -> Step {
        let story = self.state.story_index();
        if story == 0 {
            log::debug!("Already at the first story");
            return Step::Ignored;
        }
        self.jump_to_story(story - 1)
    }

    pub fn pause(&mut self) -> Step {
        if self.state.is_seeking() || !self.state.is_playing() {
            return Step::Ignored;
        }
        self.state.set_playing(false);
        Step::Updated
    }

    pub fn resume(&mut self) -> Step {
        if self.state.is_seeking() || self.state.is_playing() {
            return Step::Ignored;
        }
        self.state.set_playing(true);
        Step::Updated
    }

    /// Accepts a duration reported by the media layer for the current slide
    ///
    /// Invalid reports leave the duration undetermined. A valid one is cached
    /// on the slide and re-clamps elapsed time; advancing waits for the next
    /// tick.
    pub fn resolve_duration(&mut self, raw: Seconds) -> Step {
        let Some(duration) = self.source.report_duration(raw) else {
            if self.source.kind() == SlideKind::Video {
                log::warn!(
                    "Ignoring invalid media duration {} at {}",
                    raw,
                    self.state.position()
                );
            }
            return Step::Ignored;
        };

        let position = self.state.position();
        self.catalog
            .record_duration(position.story_index, position.slide_index, duration);
        self.state.set_duration(duration);
        log::debug!("Duration for {} resolved to {:.3}s", position, duration);
        Step::Updated
    }

    /// Suspends ticking for a scrub. Returns the `playing` value to restore.
    pub(crate) fn enter_seek(&mut self) -> bool {
        let was_playing = self.state.is_playing();
        self.state.set_seeking(true);
        self.state.set_playing(false);
        was_playing
    }

    /// Leaves a scrub, optionally moving elapsed time to `target`
    pub(crate) fn exit_seek(&mut self, restore_playing: bool, target: Option<Seconds>) -> Step {
        if let Some(target) = target {
            self.source.on_tick(target);
            self.state.set_elapsed(target);
        }
        self.state.set_seeking(false);
        self.state.set_playing(restore_playing);
        Step::Updated
    }

    /// Returns to `(0, 0)` with the initial flags
    pub(crate) fn reset(&mut self, playing: bool) {
        let source = TimeSource::for_slide(first_slide(&self.catalog));
        self.state = PlaybackState::new(playing, source.duration());
        self.source = source;
    }

    fn enter(
        &mut self,
        from: PlaybackPosition,
        to: PlaybackPosition,
        transition: Transition,
    ) -> Step {
        let source = TimeSource::for_slide(
            &self.catalog.stories()[to.story_index].slides()[to.slide_index],
        );
        self.state.enter(to, source.duration());
        self.source = source;
        log::debug!("Slide {} -> {} ({:?})", from, to, transition);
        Step::SlideChanged {
            from,
            to,
            transition,
        }
    }
}

fn first_slide(catalog: &StoryCatalog) -> &Slide {
    &catalog.stories()[0].slides()[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyreel_core::{MediaRef, Story};

    fn image(name: &str, secs: Seconds) -> Slide {
        Slide::image(MediaRef::new(name).unwrap(), secs)
    }

    fn video(name: &str) -> Slide {
        Slide::video(MediaRef::new(name).unwrap())
    }

    fn catalog(shape: &[usize]) -> StoryCatalog {
        let stories = shape
            .iter()
            .enumerate()
            .map(|(s, &n)| {
                Story::new(
                    (0..n)
                        .map(|i| image(&format!("{}-{}.jpg", s, i), 3.0))
                        .collect(),
                )
                .unwrap()
            })
            .collect();
        StoryCatalog::new(stories).unwrap()
    }

    #[test]
    fn test_initial_position() {
        let seq = SlideSequencer::new(catalog(&[2, 2]), true);
        assert_eq!(seq.position(), PlaybackPosition::new(0, 0));
        assert_eq!(seq.state().duration(), Some(3.0));
        assert!(seq.state().is_playing());
    }

    #[test]
    fn test_tick_advances_at_exact_duration() {
        let mut seq = SlideSequencer::new(catalog(&[2]), true);
        assert_eq!(seq.tick(2.0), Step::Updated);
        let step = seq.tick(3.0);
        assert_eq!(
            step,
            Step::SlideChanged {
                from: PlaybackPosition::new(0, 0),
                to: PlaybackPosition::new(0, 1),
                transition: Transition::NextSlide,
            }
        );
        assert_eq!(seq.state().elapsed(), 0.0);
    }

    #[test]
    fn test_tick_clamps_overshoot_then_advances() {
        let mut seq = SlideSequencer::new(catalog(&[1, 1]), true);
        let step = seq.tick(4.2);
        assert!(step.changed_slide());
        assert_eq!(seq.position(), PlaybackPosition::new(1, 0));
    }

    #[test]
    fn test_advance_crosses_story_and_wraps() {
        let mut seq = SlideSequencer::new(catalog(&[1, 2]), true);
        assert!(matches!(
            seq.advance(),
            Step::SlideChanged {
                transition: Transition::NextStory,
                ..
            }
        ));
        seq.advance();
        assert!(matches!(
            seq.advance(),
            Step::SlideChanged {
                transition: Transition::Wrapped,
                ..
            }
        ));
        assert_eq!(seq.position(), PlaybackPosition::new(0, 0));
    }

    #[test]
    fn test_tick_ignored_when_paused() {
        let mut seq = SlideSequencer::new(catalog(&[2]), true);
        seq.pause();
        assert_eq!(seq.tick(1.0), Step::Ignored);
        assert_eq!(seq.state().elapsed(), 0.0);
    }

    #[test]
    fn test_non_finite_tick_dropped() {
        let mut seq = SlideSequencer::new(catalog(&[2]), true);
        seq.tick(1.0);
        assert_eq!(seq.tick(f64::NAN), Step::Ignored);
        assert_eq!(seq.state().elapsed(), 1.0);
    }

    #[test]
    fn test_jump_to_slide_out_of_range() {
        let mut seq = SlideSequencer::new(catalog(&[3]), true);
        seq.tick(1.0);
        assert_eq!(seq.jump_to_slide(3), Step::Ignored);
        assert_eq!(seq.state().elapsed(), 1.0);
        assert!(seq.jump_to_slide(2).changed_slide());
        assert_eq!(seq.state().slide_index(), 2);
        assert_eq!(seq.state().elapsed(), 0.0);
    }

    #[test]
    fn test_next_previous_do_not_wrap() {
        let mut seq = SlideSequencer::new(catalog(&[2, 2]), true);
        assert_eq!(seq.previous(), Step::Ignored);
        seq.jump_to_slide(1);
        assert!(seq.next().changed_slide());
        assert_eq!(seq.position(), PlaybackPosition::new(1, 0));
        assert_eq!(seq.next(), Step::Ignored);
        assert!(seq.previous().changed_slide());
        assert_eq!(seq.position(), PlaybackPosition::new(0, 0));
    }

    #[test]
    fn test_pause_resume_keep_elapsed() {
        let mut seq = SlideSequencer::new(catalog(&[1]), true);
        seq.tick(2.0);
        assert_eq!(seq.pause(), Step::Updated);
        assert_eq!(seq.pause(), Step::Ignored);
        assert_eq!(seq.resume(), Step::Updated);
        assert_eq!(seq.state().elapsed(), 2.0);
    }

    #[test]
    fn test_video_duration_resolution() {
        let story = Story::new(vec![video("a.mp4"), image("b.jpg", 3.0)]).unwrap();
        let mut seq = SlideSequencer::new(StoryCatalog::new(vec![story]).unwrap(), true);

        assert_eq!(seq.tick(30.0), Step::Updated);
        assert_eq!(seq.resolve_duration(f64::NAN), Step::Ignored);
        assert_eq!(seq.resolve_duration(15.0), Step::Updated);
        assert_eq!(seq.state().elapsed(), 15.0);
        assert_eq!(seq.position(), PlaybackPosition::new(0, 0));
        assert_eq!(seq.catalog().slide(0, 0).unwrap().duration(), Some(15.0));
    }

    #[test]
    fn test_seek_suspends_and_restores() {
        let mut seq = SlideSequencer::new(catalog(&[1]), true);
        assert!(seq.enter_seek());
        assert!(seq.state().is_seeking());
        assert!(!seq.state().is_playing());
        assert_eq!(seq.tick(1.0), Step::Ignored);
        assert_eq!(seq.resume(), Step::Ignored);

        seq.exit_seek(true, Some(1.5));
        assert!(seq.state().is_playing());
        assert_eq!(seq.state().elapsed(), 1.5);
    }

    #[test]
    fn test_reset_returns_to_start() {
        let mut seq = SlideSequencer::new(catalog(&[2, 2]), true);
        seq.next();
        seq.pause();
        seq.reset(true);
        assert_eq!(seq.position(), PlaybackPosition::new(0, 0));
        assert!(seq.state().is_playing());
    }
}
