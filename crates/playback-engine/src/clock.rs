// FILE: crates/playback-engine/src/clock.rs

//! Cancellable tick scheduling
//!
//! A clock emits [`EngineEvent::Tick`] roughly every `interval`, carrying
//! `offset + time since start`. Cancelling is synchronous: once `cancel`
//! returns, the clock sends nothing more. Ticks already queued are rejected by
//! the engine's generation check.

use crate::events::{EngineEvent, EventSink, Generation};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};
use storyreel_core::Seconds;

/// Tick interval for image slides
pub const IMAGE_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Position polling interval for video slides
pub const VIDEO_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Parameters for starting a clock
#[derive(Debug, Clone)]
pub struct ClockRequest {
    pub generation: Generation,
    pub interval: Duration,
    /// Elapsed time the clock resumes from
    pub offset: Seconds,
    pub sink: EventSink,
}

/// Opaque handle to a started clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockHandle {
    generation: Generation,
}

impl ClockHandle {
    pub fn new(generation: Generation) -> Self {
        Self { generation }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }
}

/// Scheduling primitive behind every time source
pub trait PlaybackClock {
    /// Starts emitting ticks for `request.generation`
    fn start(&mut self, request: ClockRequest) -> ClockHandle;

    /// Stops the clock. Idempotent; unknown or finished handles are ignored.
    fn cancel(&mut self, handle: ClockHandle);
}

struct Worker {
    cancel_tx: Sender<()>,
    handle: Option<thread::JoinHandle<()>>,
}

/// Clock backed by one worker thread per running clock
#[derive(Default)]
pub struct ThreadClock {
    workers: HashMap<Generation, Worker>,
}

impl ThreadClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of clocks currently running
    pub fn active(&self) -> usize {
        self.workers.len()
    }
}

impl PlaybackClock for ThreadClock {
    fn start(&mut self, request: ClockRequest) -> ClockHandle {
        let generation = request.generation;
        let (cancel_tx, cancel_rx) = bounded::<()>(1);

        let handle = thread::spawn(move || {
            let started = Instant::now();
            loop {
                match cancel_rx.recv_timeout(request.interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let elapsed = request.offset + started.elapsed().as_secs_f64();
                        let delivered = request.sink.send(EngineEvent::Tick {
                            generation: request.generation,
                            elapsed,
                        });
                        if !delivered {
                            log::debug!("Clock {} lost its engine, stopping", request.generation);
                            break;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        log::trace!("Clock {} started", generation);
        self.workers.insert(
            generation,
            Worker {
                cancel_tx,
                handle: Some(handle),
            },
        );
        ClockHandle::new(generation)
    }

    fn cancel(&mut self, handle: ClockHandle) {
        let Some(mut worker) = self.workers.remove(&handle.generation) else {
            return;
        };

        let _ = worker.cancel_tx.send(());
        if let Some(join) = worker.handle.take() {
            if join.join().is_err() {
                log::error!("Clock {} worker panicked", handle.generation);
            }
        }
        log::trace!("Clock {} cancelled", handle.generation);
    }
}

impl Drop for ThreadClock {
    fn drop(&mut self) {
        let running: Vec<Generation> = self.workers.keys().copied().collect();
        for generation in running {
            self.cancel(ClockHandle::new(generation));
        }
    }
}

#[derive(Default)]
struct ManualState {
    active: Option<ManualRun>,
    starts: usize,
    cancels: usize,
    last_interval: Option<Duration>,
}

struct ManualRun {
    generation: Generation,
    offset: Seconds,
    accumulated: Seconds,
    sink: EventSink,
}

/// Deterministic clock driven by explicit `advance` calls
///
/// Clones share the same state, so a test can keep one copy while the engine
/// owns another.
#[derive(Clone, Default)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Moves the running clock forward and emits one tick
    ///
    /// Returns false if no clock is running.
    pub fn advance(&self, seconds: Seconds) -> bool {
        let mut state = self.lock();
        let Some(run) = state.active.as_mut() else {
            return false;
        };
        run.accumulated += seconds;
        run.sink.send(EngineEvent::Tick {
            generation: run.generation,
            elapsed: run.offset + run.accumulated,
        })
    }

    pub fn is_running(&self) -> bool {
        self.lock().active.is_some()
    }

    /// Generation of the running clock, if any
    pub fn running_generation(&self) -> Option<Generation> {
        self.lock().active.as_ref().map(|run| run.generation)
    }

    /// Offset the running clock was started from
    pub fn running_offset(&self) -> Option<Seconds> {
        self.lock().active.as_ref().map(|run| run.offset)
    }

    pub fn start_count(&self) -> usize {
        self.lock().starts
    }

    pub fn cancel_count(&self) -> usize {
        self.lock().cancels
    }

    pub fn last_interval(&self) -> Option<Duration> {
        self.lock().last_interval
    }
}

impl PlaybackClock for ManualClock {
    fn start(&mut self, request: ClockRequest) -> ClockHandle {
        let mut state = self.lock();
        state.starts += 1;
        state.last_interval = Some(request.interval);
        state.active = Some(ManualRun {
            generation: request.generation,
            offset: request.offset,
            accumulated: 0.0,
            sink: request.sink,
        });
        ClockHandle::new(request.generation)
    }

    fn cancel(&mut self, handle: ClockHandle) {
        let mut state = self.lock();
        let matches = state
            .active
            .as_ref()
            .is_some_and(|run| run.generation == handle.generation());
        if matches {
            state.active = None;
            state.cancels += 1;
        }
    }
}
