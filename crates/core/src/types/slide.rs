//! Slide domain model

use crate::error::{CatalogError, CatalogResult};
use crate::types::{is_valid_duration, Seconds, Validator};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to the media shown by a slide (URL or local path)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(pub(crate) String);

impl MediaRef {
    /// Creates a media reference, rejecting blank values
    pub fn new(value: impl Into<String>) -> CatalogResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(CatalogError::InvalidMediaRef { value });
        }
        Ok(Self(value))
    }

    /// Returns the reference as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of slide, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideKind {
    Image,
    Video,
}

impl fmt::Display for SlideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlideKind::Image => write!(f, "image"),
            SlideKind::Video => write!(f, "video"),
        }
    }
}

/// A single slide within a story
///
/// Image slides are shown for a fixed `display_duration`. Video slides play
/// until the media ends; their duration is unknown until the media layer
/// reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Slide {
    Image {
        media: MediaRef,
        display_duration: Seconds,
    },
    Video {
        media: MediaRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        known_duration: Option<Seconds>,
    },
}

impl Slide {
    /// Creates an image slide
    pub fn image(media: MediaRef, display_duration: Seconds) -> Self {
        Self::Image {
            media,
            display_duration,
        }
    }

    /// Creates a video slide with an undetermined duration
    pub fn video(media: MediaRef) -> Self {
        Self::Video {
            media,
            known_duration: None,
        }
    }

    /// Returns the slide's media reference
    pub fn media(&self) -> &MediaRef {
        match self {
            Self::Image { media, .. } | Self::Video { media, .. } => media,
        }
    }

    /// Returns the slide kind
    pub fn kind(&self) -> SlideKind {
        match self {
            Self::Image { .. } => SlideKind::Image,
            Self::Video { .. } => SlideKind::Video,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video { .. })
    }

    /// Returns the slide duration if it is determined
    pub fn duration(&self) -> Option<Seconds> {
        match self {
            Self::Image {
                display_duration, ..
            } => Some(*display_duration),
            Self::Video { known_duration, .. } => *known_duration,
        }
    }

    /// Records a duration reported by the media layer
    ///
    /// Only video slides accept a reported duration, and only a valid one.
    /// Returns true if the slide was updated.
    pub fn record_duration(&mut self, duration: Seconds) -> bool {
        match self {
            Self::Video { known_duration, .. } if is_valid_duration(duration) => {
                *known_duration = Some(duration);
                true
            }
            _ => false,
        }
    }
}

impl Validator for Slide {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.media().is_blank() {
            errors.push("media reference must not be empty".to_string());
        }

        match self {
            Self::Image {
                display_duration, ..
            } => {
                if !display_duration.is_finite() || *display_duration <= 0.0 {
                    errors.push(format!(
                        "display duration must be a positive number of seconds (got {})",
                        display_duration
                    ));
                }
            }
            Self::Video {
                known_duration: Some(duration),
                ..
            } => {
                if !is_valid_duration(*duration) {
                    errors.push(format!(
                        "known duration must be a non-negative number of seconds (got {})",
                        duration
                    ));
                }
            }
            Self::Video { .. } => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
