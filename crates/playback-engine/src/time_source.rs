//! Time sources: how elapsed time advances for the current slide

use storyreel_core::{is_valid_duration, Seconds, Slide, SlideKind};

/// Wall-clock timing for image slides
#[derive(Debug, Clone, PartialEq)]
pub struct WallClockSource {
    display_duration: Seconds,
    elapsed: Seconds,
}

impl WallClockSource {
    pub fn new(display_duration: Seconds) -> Self {
        Self {
            display_duration,
            elapsed: 0.0,
        }
    }
}

/// Media-position timing for video slides
///
/// The duration stays `None` until the media layer reports a valid value.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaPositionSource {
    position: Seconds,
    duration: Option<Seconds>,
}

impl MediaPositionSource {
    pub fn new(known_duration: Option<Seconds>) -> Self {
        Self {
            position: 0.0,
            duration: known_duration.filter(|d| is_valid_duration(*d)),
        }
    }
}

/// Time source selected by the current slide's kind
#[derive(Debug, Clone, PartialEq)]
pub enum TimeSource {
    WallClock(WallClockSource),
    MediaPosition(MediaPositionSource),
}

impl TimeSource {
    pub fn for_slide(slide: &Slide) -> Self {
        match slide {
            Slide::Image {
                display_duration, ..
            } => Self::WallClock(WallClockSource::new(*display_duration)),
            Slide::Video { known_duration, .. } => {
                Self::MediaPosition(MediaPositionSource::new(*known_duration))
            }
        }
    }

    pub fn kind(&self) -> SlideKind {
        match self {
            Self::WallClock(_) => SlideKind::Image,
            Self::MediaPosition(_) => SlideKind::Video,
        }
    }

    /// Last observed elapsed time
    pub fn elapsed(&self) -> Seconds {
        match self {
            Self::WallClock(source) => source.elapsed,
            Self::MediaPosition(source) => source.position,
        }
    }

    pub fn duration(&self) -> Option<Seconds> {
        match self {
            Self::WallClock(source) => Some(source.display_duration),
            Self::MediaPosition(source) => source.duration,
        }
    }

    /// True once the advance condition can be evaluated
    pub fn is_ready(&self) -> bool {
        self.duration().is_some()
    }

    /// Records the elapsed time carried by a tick or position report
    pub fn on_tick(&mut self, elapsed: Seconds) {
        match self {
            Self::WallClock(source) => source.elapsed = elapsed,
            Self::MediaPosition(source) => source.position = elapsed,
        }
    }

    /// Accepts a media-reported duration
    ///
    /// Returns the accepted value, or `None` if the report was invalid or the
    /// source is not media driven.
    pub fn report_duration(&mut self, raw: Seconds) -> Option<Seconds> {
        match self {
            Self::MediaPosition(source) if is_valid_duration(raw) => {
                source.duration = Some(raw);
                Some(raw)
            }
            _ => None,
        }
    }
}
