//! Domain types for StoryReel
//!
//! This module contains the story data model organized by responsibility:
//! - `slide`: Slide variants and media references
//! - `story`: Stories and their identifiers
//! - `catalog`: The validated story collection a session plays
//! - `common`: Shared traits and time helpers

mod catalog;
mod common;
mod slide;
mod story;

// Re-export all public types
pub use catalog::StoryCatalog;
pub use common::{format_hms, is_valid_duration, Seconds, Validator};
pub use slide::{MediaRef, Slide, SlideKind};
pub use story::{Story, StoryId};
