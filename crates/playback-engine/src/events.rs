//! Events flowing from time producers into the engine
//!
//! Clocks and media backends run on their own threads. They never touch the
//! playback state directly; they push [`EngineEvent`]s through an
//! [`EventSink`] and the engine applies them on its owning thread.

use crossbeam_channel::Sender;
use storyreel_core::Seconds;

/// Monotonic counter identifying one clock run or one slide visit
pub type Generation = u64;

/// Raw time signals delivered to the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    /// Periodic clock tick carrying the clock's elapsed time
    Tick {
        generation: Generation,
        elapsed: Seconds,
    },
    /// Media playback position reported by a backend
    ///
    /// `epoch` is the engine's position epoch when the report was made. It
    /// advances on every seek and play/pause, so a position sampled before
    /// one of those is recognizably stale.
    MediaPosition {
        generation: Generation,
        epoch: Generation,
        position: Seconds,
    },
    /// Media duration reported by a backend (may be NaN or negative)
    MediaDuration {
        generation: Generation,
        duration: Seconds,
    },
}

impl EngineEvent {
    pub fn generation(&self) -> Generation {
        match self {
            Self::Tick { generation, .. }
            | Self::MediaPosition { generation, .. }
            | Self::MediaDuration { generation, .. } => *generation,
        }
    }
}

/// Sending half of the engine's event queue
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Sender<EngineEvent>,
}

impl EventSink {
    pub fn new(tx: Sender<EngineEvent>) -> Self {
        Self { tx }
    }

    /// Queues an event. Returns false if the engine is gone.
    pub fn send(&self, event: EngineEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}
