// FILE: crates/playback-engine/src/error.rs

use storyreel_core::CatalogError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Seek committed without a matching begin_seek")]
    NoActiveSeek,

    #[error("Invalid seek fraction: {0}")]
    InvalidSeekFraction(f64),

    #[error("Media error for {media}: {reason}")]
    Media { media: String, reason: String },

    #[error("Engine has been shut down")]
    ShutDown,

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

impl EngineError {
    /// Helper to create a media error
    pub fn media(media: impl ToString, reason: impl Into<String>) -> Self {
        Self::Media {
            media: media.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error indicates a caller bug rather than a runtime condition
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Self::NoActiveSeek | Self::InvalidSeekFraction(_) | Self::ShutDown
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
