// FILE: crates/playback-engine/src/media.rs

//! Media playback backend seam
//!
//! The engine never decodes media. For each video slide it opens one handle
//! through a [`MediaBackend`], drives it with play/pause/seek, and releases it
//! before the next slide's handle is opened.

use crate::error::EngineResult;
use crate::events::{EngineEvent, EventSink, Generation};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use storyreel_core::{MediaRef, Seconds};

/// Control surface of one opened media item
pub trait MediaHandle {
    fn play(&mut self);

    fn pause(&mut self);

    fn seek(&mut self, to: Seconds);

    /// Current playback position, if the backend can tell
    fn position(&self) -> Option<Seconds>;

    /// Releases the media. No reports may follow.
    fn stop(&mut self);
}

/// Factory for media handles
pub trait MediaBackend {
    fn open(
        &mut self,
        media: &MediaRef,
        start_at: Seconds,
        reporter: MediaReporter,
    ) -> EngineResult<Box<dyn MediaHandle>>;
}

/// Reporting channel handed to a media handle
///
/// Bound to the slide visit it was created for; reports arriving after the
/// engine moved on are discarded. Position reports also carry the position
/// epoch read at report time.
#[derive(Debug, Clone)]
pub struct MediaReporter {
    generation: Generation,
    epoch: Arc<AtomicU64>,
    sink: EventSink,
}

impl MediaReporter {
    /// Creates a reporter with its own position epoch, fixed at 0
    pub fn new(generation: Generation, sink: EventSink) -> Self {
        Self::with_epoch(generation, Arc::new(AtomicU64::new(0)), sink)
    }

    /// Creates a reporter that stamps positions from a shared epoch
    pub fn with_epoch(generation: Generation, epoch: Arc<AtomicU64>, sink: EventSink) -> Self {
        Self {
            generation,
            epoch,
            sink,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Reports the media duration. The raw value may be NaN or negative.
    pub fn report_duration(&self, duration: Seconds) -> bool {
        self.sink.send(EngineEvent::MediaDuration {
            generation: self.generation,
            duration,
        })
    }

    pub fn report_position(&self, position: Seconds) -> bool {
        self.sink.send(EngineEvent::MediaPosition {
            generation: self.generation,
            epoch: self.epoch.load(Ordering::Acquire),
            position,
        })
    }
}

/// Backend whose media never reports anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMediaBackend;

struct NullHandle;

impl MediaHandle for NullHandle {
    fn play(&mut self) {}

    fn pause(&mut self) {}

    fn seek(&mut self, _to: Seconds) {}

    fn position(&self) -> Option<Seconds> {
        None
    }

    fn stop(&mut self) {}
}

impl MediaBackend for NullMediaBackend {
    fn open(
        &mut self,
        _media: &MediaRef,
        _start_at: Seconds,
        _reporter: MediaReporter,
    ) -> EngineResult<Box<dyn MediaHandle>> {
        Ok(Box::new(NullHandle))
    }
}

/// Backend that plays every video as a silent clip of fixed length
///
/// The duration is reported as soon as the media is opened. Position follows
/// wall time while playing, unless position tracking is disabled, in which
/// case the engine falls back to its clock's elapsed time.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedMediaBackend {
    duration: Seconds,
    track_position: bool,
}

impl SimulatedMediaBackend {
    pub fn new(duration: Seconds) -> Self {
        Self {
            duration,
            track_position: true,
        }
    }

    pub fn with_position_tracking(mut self, enabled: bool) -> Self {
        self.track_position = enabled;
        self
    }

    pub fn duration(&self) -> Seconds {
        self.duration
    }
}

impl Default for SimulatedMediaBackend {
    fn default() -> Self {
        Self::new(15.0)
    }
}

impl MediaBackend for SimulatedMediaBackend {
    fn open(
        &mut self,
        media: &MediaRef,
        start_at: Seconds,
        reporter: MediaReporter,
    ) -> EngineResult<Box<dyn MediaHandle>> {
        log::debug!("Opening simulated media {}", media);
        reporter.report_duration(self.duration);
        Ok(Box::new(SimulatedHandle {
            duration: self.duration,
            base: start_at.clamp(0.0, self.duration),
            resumed_at: None,
            stopped: false,
            track_position: self.track_position,
        }))
    }
}

struct SimulatedHandle {
    duration: Seconds,
    base: Seconds,
    resumed_at: Option<Instant>,
    stopped: bool,
    track_position: bool,
}

impl SimulatedHandle {
    fn current(&self) -> Seconds {
        let running = self
            .resumed_at
            .map(|at| at.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        (self.base + running).min(self.duration)
    }
}

impl MediaHandle for SimulatedHandle {
    fn play(&mut self) {
        if !self.stopped && self.resumed_at.is_none() {
            self.resumed_at = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        self.base = self.current();
        self.resumed_at = None;
    }

    fn seek(&mut self, to: Seconds) {
        self.base = to.clamp(0.0, self.duration);
        if self.resumed_at.is_some() {
            self.resumed_at = Some(Instant::now());
        }
    }

    fn position(&self) -> Option<Seconds> {
        if self.stopped || !self.track_position {
            None
        } else {
            Some(self.current())
        }
    }

    fn stop(&mut self) {
        self.pause();
        self.stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    fn media() -> MediaRef {
        MediaRef::new("clip.mp4").unwrap()
    }

    #[test]
    fn test_reporter_tags_generation() {
        let (tx, rx) = unbounded();
        let reporter = MediaReporter::new(9, EventSink::new(tx));
        reporter.report_position(1.5);
        reporter.report_duration(f64::NAN);

        let events: Vec<EngineEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.generation() == 9));
    }

    #[test]
    fn test_position_stamped_with_current_epoch() {
        let (tx, rx) = unbounded();
        let epoch = Arc::new(AtomicU64::new(3));
        let reporter = MediaReporter::with_epoch(1, epoch.clone(), EventSink::new(tx));

        reporter.report_position(2.0);
        epoch.store(4, Ordering::Release);
        reporter.report_position(2.5);

        let epochs: Vec<Generation> = rx
            .try_iter()
            .filter_map(|event| match event {
                EngineEvent::MediaPosition { epoch, .. } => Some(epoch),
                _ => None,
            })
            .collect();
        assert_eq!(epochs, vec![3, 4]);
    }

    #[test]
    fn test_null_backend_never_reports() {
        let (tx, rx) = unbounded();
        let mut backend = NullMediaBackend;
        let mut handle = backend
            .open(&media(), 0.0, MediaReporter::new(1, EventSink::new(tx)))
            .unwrap();
        handle.play();
        assert_eq!(handle.position(), None);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_simulated_backend_reports_duration_on_open() {
        let (tx, rx) = unbounded();
        let mut backend = SimulatedMediaBackend::new(12.0);
        let _handle = backend
            .open(&media(), 0.0, MediaReporter::new(4, EventSink::new(tx)))
            .unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            EngineEvent::MediaDuration {
                generation: 4,
                duration: 12.0
            }
        );
    }

    #[test]
    fn test_simulated_handle_seek_and_stop() {
        let (tx, _rx) = unbounded();
        let mut backend = SimulatedMediaBackend::new(12.0);
        let mut handle = backend
            .open(&media(), 2.0, MediaReporter::new(1, EventSink::new(tx)))
            .unwrap();

        assert_eq!(handle.position(), Some(2.0));
        handle.seek(30.0);
        assert_eq!(handle.position(), Some(12.0));
        handle.seek(6.0);
        assert_eq!(handle.position(), Some(6.0));

        handle.stop();
        assert_eq!(handle.position(), None);
    }

    #[test]
    fn test_untracked_handle_reports_no_position() {
        let (tx, rx) = unbounded();
        let mut backend = SimulatedMediaBackend::new(8.0).with_position_tracking(false);
        let handle = backend
            .open(&media(), 0.0, MediaReporter::new(2, EventSink::new(tx)))
            .unwrap();

        assert_eq!(handle.position(), None);
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn test_simulated_handle_advances_while_playing() {
        let (tx, _rx) = unbounded();
        let mut backend = SimulatedMediaBackend::new(60.0);
        let mut handle = backend
            .open(&media(), 0.0, MediaReporter::new(1, EventSink::new(tx)))
            .unwrap();

        handle.play();
        std::thread::sleep(std::time::Duration::from_millis(20));
        handle.pause();
        let paused_at = handle.position().unwrap();
        assert!(paused_at > 0.0);

        std::thread::sleep(std::time::Duration::from_millis(20));
        assert_eq!(handle.position(), Some(paused_at));
    }
}
