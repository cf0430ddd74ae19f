//! Story domain model

use crate::error::{CatalogError, CatalogResult};
use crate::types::{Slide, Validator};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a story
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryId(Uuid);

impl StoryId {
    /// Creates a new random StoryId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a StoryId from a UUID string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Returns the StoryId as a string
    pub fn as_string(&self) -> String {
        self.0.to_string()
    }
}

impl Default for StoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered sequence of slides
///
/// Slide order is meaningful and fixed once the story is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    #[serde(default)]
    pub id: StoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub(crate) slides: Vec<Slide>,
}

impl Story {
    /// Creates a story from its slides, rejecting an empty list
    pub fn new(slides: Vec<Slide>) -> CatalogResult<Self> {
        if slides.is_empty() {
            return Err(CatalogError::NoSlides);
        }
        Ok(Self {
            id: StoryId::new(),
            title: None,
            slides,
        })
    }

    /// Sets the story title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Returns the slide at `index`, if any
    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    /// Mutable access for recording media-reported durations
    pub(crate) fn slide_mut(&mut self, index: usize) -> Option<&mut Slide> {
        self.slides.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Index of the last slide
    pub fn last_index(&self) -> usize {
        self.slides.len().saturating_sub(1)
    }

    /// Returns the number of video slides in this story
    pub fn video_count(&self) -> usize {
        self.slides.iter().filter(|s| s.is_video()).count()
    }
}

impl Validator for Story {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.slides.is_empty() {
            errors.push("story must contain at least one slide".to_string());
        }

        for (index, slide) in self.slides.iter().enumerate() {
            if let Err(slide_errors) = slide.validate() {
                errors.extend(
                    slide_errors
                        .into_iter()
                        .map(|e| format!("slide {}: {}", index, e)),
                );
            }
        }

        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                errors.push("title must not be blank when present".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
