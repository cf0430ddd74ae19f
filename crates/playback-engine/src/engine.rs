//! Story playback runtime
//!
//! [`StoryEngine`] ties the sequencer to a clock and a media backend. It owns
//! the event queue that clocks and media handles push into, and applies
//! those events on the caller's thread.

use crate::clock::{
    ClockHandle, ClockRequest, PlaybackClock, IMAGE_TICK_INTERVAL, VIDEO_POLL_INTERVAL,
};
use crate::error::{EngineError, EngineResult};
use crate::events::{EngineEvent, EventSink, Generation};
use crate::media::{MediaBackend, MediaHandle, MediaReporter};
use crate::seek::{SeekCommit, SeekController};
use crate::sequencer::{SlideSequencer, Step};
use crate::state::{PlaybackMode, PlaybackState};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storyreel_core::{Seconds, Slide, SlideKind, Story, StoryCatalog};

/// Timing knobs for a [`StoryEngine`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Tick interval for image slides
    pub image_tick: Duration,
    /// Position polling interval for video slides
    pub video_poll: Duration,
    /// Whether the session starts playing
    pub autoplay: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            image_tick: IMAGE_TICK_INTERVAL,
            video_poll: VIDEO_POLL_INTERVAL,
            autoplay: true,
        }
    }
}

type Observer = Box<dyn FnMut(&PlaybackState)>;

pub struct StoryEngine<C: PlaybackClock, M: MediaBackend> {
    sequencer: SlideSequencer,
    seek: SeekController,
    settings: EngineSettings,
    clock: C,
    active_clock: Option<ClockHandle>,
    clock_generation: Generation,
    backend: M,
    media: Option<Box<dyn MediaHandle>>,
    slide_generation: Generation,
    position_epoch: Arc<AtomicU64>,
    events_tx: Sender<EngineEvent>,
    events_rx: Receiver<EngineEvent>,
    observers: Vec<Observer>,
    shut_down: bool,
}

impl<C: PlaybackClock, M: MediaBackend> StoryEngine<C, M> {
    pub fn new(catalog: StoryCatalog, clock: C, backend: M) -> Self {
        Self::with_settings(catalog, EngineSettings::default(), clock, backend)
    }

    pub fn with_settings(
        catalog: StoryCatalog,
        settings: EngineSettings,
        clock: C,
        backend: M,
    ) -> Self {
        let (events_tx, events_rx) = unbounded();
        let mut engine = Self {
            sequencer: SlideSequencer::new(catalog, settings.autoplay),
            seek: SeekController::new(),
            settings,
            clock,
            active_clock: None,
            clock_generation: 0,
            backend,
            media: None,
            slide_generation: 0,
            position_epoch: Arc::new(AtomicU64::new(0)),
            events_tx,
            events_rx,
            observers: Vec::new(),
            shut_down: false,
        };

        log::info!(
            "Story engine started with {} stories ({} slides)",
            engine.sequencer.catalog().len(),
            engine.sequencer.catalog().total_slides()
        );
        engine.load_current_slide();
        engine
    }

    /// Registers a callback fired after every state mutation
    pub fn on_state_change(&mut self, observer: impl FnMut(&PlaybackState) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn state(&self) -> &PlaybackState {
        self.sequencer.state()
    }

    /// Elapsed time of the current slide
    pub fn elapsed(&self) -> Seconds {
        self.sequencer.state().elapsed()
    }

    pub fn progress(&self) -> f64 {
        self.sequencer.state().progress()
    }

    pub fn current_slide(&self) -> &Slide {
        self.sequencer.current_slide()
    }

    pub fn current_story_index(&self) -> usize {
        self.sequencer.state().story_index()
    }

    pub fn current_slide_index(&self) -> usize {
        self.sequencer.state().slide_index()
    }

    pub fn mode(&self) -> PlaybackMode {
        self.sequencer.state().mode()
    }

    pub fn stories(&self) -> &[Story] {
        self.sequencer.catalog().stories()
    }

    pub fn catalog(&self) -> &StoryCatalog {
        self.sequencer.catalog()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Receiving end of the event queue, for use with `select!`
    ///
    /// Events taken from it must be passed to [`Self::handle_event`].
    pub fn events(&self) -> Receiver<EngineEvent> {
        self.events_rx.clone()
    }

    /// Applies one event. Returns false if it was stale or had no effect.
    pub fn handle_event(&mut self, event: EngineEvent) -> bool {
        if self.shut_down {
            return false;
        }

        let step = match event {
            EngineEvent::Tick {
                generation,
                elapsed,
            } => {
                if generation != self.clock_generation || self.active_clock.is_none() {
                    log::trace!(
                        "Dropping stale tick {} (current {})",
                        generation,
                        self.clock_generation
                    );
                    return false;
                }
                let observed = match self.sequencer.time_source().kind() {
                    SlideKind::Image => elapsed,
                    SlideKind::Video => self
                        .media
                        .as_ref()
                        .and_then(|media| media.position())
                        .unwrap_or(elapsed),
                };
                self.sequencer.tick(observed)
            }
            EngineEvent::MediaPosition {
                generation,
                epoch,
                position,
            } => {
                if generation != self.slide_generation {
                    log::trace!("Dropping stale media position from visit {}", generation);
                    return false;
                }
                if epoch != self.position_epoch.load(Ordering::Acquire) || self.seek.is_active() {
                    log::trace!("Dropping media position {} sampled before a seek", position);
                    return false;
                }
                self.sequencer.tick(position)
            }
            EngineEvent::MediaDuration {
                generation,
                duration,
            } => {
                if generation != self.slide_generation {
                    log::trace!("Dropping stale media duration from visit {}", generation);
                    return false;
                }
                self.sequencer.resolve_duration(duration)
            }
        };

        self.apply(step)
    }

    /// Applies every queued event without blocking. Returns how many were applied.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            if self.handle_event(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Waits up to `timeout` for an event, then drains the queue
    pub fn process_for(&mut self, timeout: Duration) -> usize {
        match self.events_rx.recv_timeout(timeout) {
            Ok(event) => {
                let first = usize::from(self.handle_event(event));
                first + self.process_pending()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    pub fn pause(&mut self) -> EngineResult<()> {
        self.ensure_running()?;
        let step = self.sequencer.pause();
        self.apply(step);
        Ok(())
    }

    pub fn resume(&mut self) -> EngineResult<()> {
        self.ensure_running()?;
        let step = self.sequencer.resume();
        self.apply(step);
        Ok(())
    }

    pub fn toggle_playback(&mut self) -> EngineResult<()> {
        if self.state().is_playing() {
            self.pause()
        } else {
            self.resume()
        }
    }

    /// Moves to the next story. No-op on the last story.
    pub fn next(&mut self) -> EngineResult<()> {
        self.ensure_running()?;
        let step = self.sequencer.next();
        self.apply(step);
        Ok(())
    }

    /// Moves to the previous story. No-op on the first story.
    pub fn previous(&mut self) -> EngineResult<()> {
        self.ensure_running()?;
        let step = self.sequencer.previous();
        self.apply(step);
        Ok(())
    }

    pub fn jump_to_slide(&mut self, index: usize) -> EngineResult<()> {
        self.ensure_running()?;
        let step = self.sequencer.jump_to_slide(index);
        self.apply(step);
        Ok(())
    }

    pub fn jump_to_story(&mut self, index: usize) -> EngineResult<()> {
        self.ensure_running()?;
        let step = self.sequencer.jump_to_story(index);
        self.apply(step);
        Ok(())
    }

    /// Starts a scrub: ticking stops until the seek is committed
    pub fn begin_seek(&mut self) -> EngineResult<()> {
        self.ensure_running()?;
        let step = self.seek.begin(&mut self.sequencer);
        if !step.is_ignored() {
            self.bump_position_epoch();
            self.stop_clock();
            if let Some(media) = self.media.as_mut() {
                media.pause();
            }
            self.notify();
        }
        Ok(())
    }

    /// Records a preview fraction. Committed elapsed time is untouched.
    pub fn update_seek(&mut self, fraction: f64) -> EngineResult<()> {
        self.ensure_running()?;
        self.seek.update(fraction);
        Ok(())
    }

    pub fn seek_preview(&self) -> Option<f64> {
        self.seek.preview()
    }

    /// Commits a scrub at `fraction` of the current slide's duration
    pub fn commit_seek(&mut self, fraction: f64) -> EngineResult<SeekCommit> {
        self.ensure_running()?;
        let commit = self.seek.commit(&mut self.sequencer, fraction)?;
        self.bump_position_epoch();

        if let Some(media) = self.media.as_mut() {
            if let Some(target) = commit.target {
                media.seek(target);
            }
            if commit.resumed {
                media.play();
            }
        }
        if commit.resumed {
            self.start_clock();
        }
        self.notify();
        Ok(commit)
    }

    /// Cancels the clock, releases media and resets to the initial state
    ///
    /// Further commands fail with [`EngineError::ShutDown`] and queued events
    /// are discarded.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.stop_clock();
        self.release_media();
        self.seek.clear();
        self.sequencer.reset(self.settings.autoplay);
        self.clock_generation += 1;
        self.slide_generation += 1;
        self.bump_position_epoch();
        self.shut_down = true;
        while self.events_rx.try_recv().is_ok() {}
        self.notify();
        log::info!("Story engine shut down");
    }

    fn ensure_running(&self) -> EngineResult<()> {
        if self.shut_down {
            Err(EngineError::ShutDown)
        } else {
            Ok(())
        }
    }

    fn apply(&mut self, step: Step) -> bool {
        match step {
            Step::Ignored => return false,
            Step::Updated => self.sync_playback(),
            Step::SlideChanged { .. } => self.load_current_slide(),
        }
        self.notify();
        true
    }

    /// Brings clock and media in line with the `playing` flag
    fn sync_playback(&mut self) {
        let state = self.sequencer.state();
        let should_run = state.is_playing() && !state.is_seeking();

        if should_run && self.active_clock.is_none() {
            self.bump_position_epoch();
            if let Some(media) = self.media.as_mut() {
                media.play();
            }
            self.start_clock();
        } else if !should_run && self.active_clock.is_some() {
            self.bump_position_epoch();
            self.stop_clock();
            if let Some(media) = self.media.as_mut() {
                media.pause();
            }
        }
    }

    fn load_current_slide(&mut self) {
        self.stop_clock();
        self.release_media();
        self.slide_generation += 1;

        let slide = self.sequencer.current_slide().clone();
        let state = self.sequencer.state();
        let should_run = state.is_playing() && !state.is_seeking();

        if let Slide::Video { media, .. } = &slide {
            let reporter = MediaReporter::with_epoch(
                self.slide_generation,
                Arc::clone(&self.position_epoch),
                EventSink::new(self.events_tx.clone()),
            );
            match self.backend.open(media, 0.0, reporter) {
                Ok(mut handle) => {
                    if should_run {
                        handle.play();
                    }
                    self.media = Some(handle);
                }
                Err(e) => {
                    log::error!("Failed to open {}: {}", media, e);
                }
            }
        }

        if should_run {
            self.start_clock();
        }
    }

    fn start_clock(&mut self) {
        self.stop_clock();
        self.clock_generation += 1;

        let interval = match self.sequencer.time_source().kind() {
            SlideKind::Image => self.settings.image_tick,
            SlideKind::Video => self.settings.video_poll,
        };
        let request = ClockRequest {
            generation: self.clock_generation,
            interval,
            offset: self.sequencer.state().elapsed(),
            sink: EventSink::new(self.events_tx.clone()),
        };
        self.active_clock = Some(self.clock.start(request));
    }

    fn stop_clock(&mut self) {
        if let Some(handle) = self.active_clock.take() {
            self.clock.cancel(handle);
        }
    }

    /// Invalidates every position report sampled so far
    fn bump_position_epoch(&self) {
        self.position_epoch.fetch_add(1, Ordering::AcqRel);
    }

    fn release_media(&mut self) {
        if let Some(mut media) = self.media.take() {
            media.stop();
        }
    }

    fn notify(&mut self) {
        let state = self.sequencer.state().clone();
        for observer in self.observers.iter_mut() {
            observer(&state);
        }
    }
}

impl<C: PlaybackClock, M: MediaBackend> Drop for StoryEngine<C, M> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod engine_tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::media::NullMediaBackend;
    use std::cell::RefCell;
    use std::rc::Rc;
    use storyreel_core::MediaRef;

    fn images(per_story: &[usize]) -> StoryCatalog {
        let stories = per_story
            .iter()
            .map(|&n| {
                Story::new(
                    (0..n)
                        .map(|i| Slide::image(MediaRef::new(format!("{}.jpg", i)).unwrap(), 3.0))
                        .collect(),
                )
                .unwrap()
            })
            .collect();
        StoryCatalog::new(stories).unwrap()
    }

    fn engine(per_story: &[usize]) -> (StoryEngine<ManualClock, NullMediaBackend>, ManualClock) {
        let clock = ManualClock::new();
        let engine = StoryEngine::new(images(per_story), clock.clone(), NullMediaBackend);
        (engine, clock)
    }

    #[test]
    fn test_starts_playing_with_clock() {
        let (engine, clock) = engine(&[2]);
        assert_eq!(engine.mode(), PlaybackMode::Playing);
        assert!(clock.is_running());
        assert_eq!(clock.last_interval(), Some(IMAGE_TICK_INTERVAL));
    }

    #[test]
    fn test_autoplay_disabled() {
        let clock = ManualClock::new();
        let settings = EngineSettings {
            autoplay: false,
            ..EngineSettings::default()
        };
        let engine = StoryEngine::with_settings(images(&[1]), settings, clock.clone(), NullMediaBackend);
        assert_eq!(engine.mode(), PlaybackMode::Paused);
        assert!(!clock.is_running());
    }

    #[test]
    fn test_observer_sees_ticks() {
        let (mut engine, clock) = engine(&[2]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        engine.on_state_change(move |state| sink.borrow_mut().push(state.elapsed()));

        clock.advance(1.0);
        clock.advance(1.0);
        assert_eq!(engine.process_pending(), 2);
        assert_eq!(*seen.borrow(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_pause_cancels_clock_resume_restarts_from_elapsed() {
        let (mut engine, clock) = engine(&[2]);
        clock.advance(2.0);
        engine.process_pending();

        engine.pause().unwrap();
        assert!(!clock.is_running());
        assert!(!clock.advance(1.0));

        engine.resume().unwrap();
        assert!(clock.is_running());
        assert_eq!(clock.running_offset(), Some(2.0));
    }

    #[test]
    fn test_toggle_playback() {
        let (mut engine, _clock) = engine(&[1]);
        engine.toggle_playback().unwrap();
        assert_eq!(engine.mode(), PlaybackMode::Paused);
        engine.toggle_playback().unwrap();
        assert_eq!(engine.mode(), PlaybackMode::Playing);
    }

    #[test]
    fn test_commands_after_shutdown() {
        let (mut engine, clock) = engine(&[2, 2]);
        engine.next().unwrap();
        engine.shutdown();

        assert!(!clock.is_running());
        assert_eq!(engine.current_story_index(), 0);
        assert!(matches!(engine.next(), Err(EngineError::ShutDown)));
        assert!(!engine.handle_event(EngineEvent::Tick {
            generation: 0,
            elapsed: 1.0
        }));
    }

    #[test]
    fn test_drop_cancels_clock() {
        let (engine, clock) = engine(&[1]);
        assert!(clock.is_running());
        drop(engine);
        assert!(!clock.is_running());
    }
}
