//! Error types for loading and validating story catalogs
//!
//! Catalog errors are raised at load time only. Once a catalog has been
//! accepted, every story holds at least one slide and every slide carries a
//! usable duration, so navigation code never has to handle an empty collection.
//!
//! Each error is classified by severity so callers can decide whether to retry
//! (a file that is still being written), degrade, or give up.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Error can be automatically recovered from
    Recoverable,
    /// Feature degraded but the session can continue
    Degraded,
    /// The catalog is unusable and must be fixed before playback
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recoverable => write!(f, "Recoverable"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Errors produced while building a [`crate::StoryCatalog`]
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog contains no stories at all
    #[error("Story catalog is empty")]
    EmptyCatalog,

    /// A story was built without any slides
    #[error("Story has no slides")]
    NoSlides,

    /// A story inside a catalog contains no slides
    #[error("Story {story_index} has no slides")]
    EmptyStory { story_index: usize },

    /// A slide failed validation
    #[error("Invalid slide {slide_index} in story {story_index}: {reason}")]
    InvalidSlide {
        story_index: usize,
        slide_index: usize,
        reason: String,
    },

    /// A media reference is blank
    #[error("Invalid media reference: '{value}'")]
    InvalidMediaRef { value: String },

    /// Story file could not be read
    #[error("Failed to read story file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Story file is not valid JSON or does not match the schema
    #[error("Failed to parse story file: {source}")]
    ParseError {
        #[source]
        source: serde_json::Error,
    },

    /// Catalog could not be serialized
    #[error("Failed to serialize story catalog: {source}")]
    SerializeError {
        #[source]
        source: serde_json::Error,
    },
}

impl CatalogError {
    /// Returns the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ReadError { source, .. } => match source.kind() {
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => {
                    ErrorSeverity::Recoverable
                }
                _ => ErrorSeverity::Fatal,
            },
            Self::SerializeError { .. } => ErrorSeverity::Degraded,
            Self::EmptyCatalog
            | Self::NoSlides
            | Self::EmptyStory { .. }
            | Self::InvalidSlide { .. }
            | Self::InvalidMediaRef { .. }
            | Self::ParseError { .. } => ErrorSeverity::Fatal,
        }
    }

    /// Returns a user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyCatalog => "There are no stories to show.".to_string(),
            Self::NoSlides => "This story has nothing to show.".to_string(),
            Self::EmptyStory { story_index } => {
                format!("Story {} has nothing to show.", story_index + 1)
            }
            Self::InvalidSlide {
                story_index,
                slide_index,
                ..
            } => format!(
                "Slide {} of story {} cannot be shown.",
                slide_index + 1,
                story_index + 1
            ),
            Self::InvalidMediaRef { .. } => "A slide is missing its media.".to_string(),
            Self::ReadError { .. } => "The story file could not be opened.".to_string(),
            Self::ParseError { .. } => "The story file is damaged or malformed.".to_string(),
            Self::SerializeError { .. } => "The stories could not be exported.".to_string(),
        }
    }

    /// Returns true if this error should be logged at ERROR level
    pub fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Fatal
    }

    /// Helper to build an [`CatalogError::InvalidSlide`]
    pub fn invalid_slide(story_index: usize, slide_index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidSlide {
            story_index,
            slide_index,
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for catalog results
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
