//! Story catalog: the ordered, validated collection a playback session runs over

use crate::error::{CatalogError, CatalogResult};
use crate::types::{MediaRef, Seconds, Slide, Story, Validator};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// On-disk shape of a story file
#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    stories: Vec<Story>,
}

/// A non-empty, validated list of stories
///
/// Construction is the only place where empty stories or malformed slides
/// are rejected. Story and slide order never changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryCatalog {
    stories: Vec<Story>,
}

impl StoryCatalog {
    /// Creates a catalog, validating every story and slide
    pub fn new(stories: Vec<Story>) -> CatalogResult<Self> {
        if stories.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        for (story_index, story) in stories.iter().enumerate() {
            if story.is_empty() {
                return Err(CatalogError::EmptyStory { story_index });
            }
            for (slide_index, slide) in story.slides().iter().enumerate() {
                if let Err(errors) = slide.validate() {
                    return Err(CatalogError::invalid_slide(
                        story_index,
                        slide_index,
                        errors.join("; "),
                    ));
                }
            }
        }

        Ok(Self { stories })
    }

    /// Parses and validates a JSON story file's contents
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|source| CatalogError::ParseError { source })?;
        Self::new(file.stories)
    }

    /// Reads, parses and validates a JSON story file
    pub fn from_path(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Serializes the catalog as pretty-printed JSON
    pub fn to_json_pretty(&self) -> CatalogResult<String> {
        let file = CatalogFile {
            stories: self.stories.clone(),
        };
        serde_json::to_string_pretty(&file).map_err(|source| CatalogError::SerializeError { source })
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn story(&self, index: usize) -> Option<&Story> {
        self.stories.get(index)
    }

    /// Returns the slide at `(story_index, slide_index)`, if any
    pub fn slide(&self, story_index: usize, slide_index: usize) -> Option<&Slide> {
        self.story(story_index)?.slide(slide_index)
    }

    /// Number of stories (always at least one)
    pub fn len(&self) -> usize {
        self.stories.len()
    }

    /// Always false; kept for API symmetry with other collections
    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    /// Index of the last story
    pub fn last_index(&self) -> usize {
        self.stories.len().saturating_sub(1)
    }

    /// Total number of slides across all stories
    pub fn total_slides(&self) -> usize {
        self.stories.iter().map(Story::len).sum()
    }

    /// Caches a media-reported duration on a video slide
    ///
    /// Returns true if the slide exists, is a video and the duration is valid.
    pub fn record_duration(
        &mut self,
        story_index: usize,
        slide_index: usize,
        duration: Seconds,
    ) -> bool {
        self.stories
            .get_mut(story_index)
            .and_then(|story| story.slide_mut(slide_index))
            .map(|slide| slide.record_duration(duration))
            .unwrap_or(false)
    }

    /// The sample catalog: three stories of five slides mixing images and videos
    pub fn demo() -> Self {
        const IMAGES: &str = "https://storage.googleapis.com/gtv-videos-bucket/sample/images";
        const VIDEOS: &str = "http://commondatastorage.googleapis.com/gtv-videos-bucket/sample";

        let image = |name: &str| Slide::Image {
            media: MediaRef(format!("{}/{}.jpg", IMAGES, name)),
            display_duration: 3.0,
        };
        let video = |name: &str| Slide::Video {
            media: MediaRef(format!("{}/{}.mp4", VIDEOS, name)),
            known_duration: None,
        };
        let story = |title: &str, slides: Vec<Slide>| Story {
            id: Default::default(),
            title: Some(title.to_string()),
            slides,
        };

        Self {
            stories: vec![
                story(
                    "Story 1",
                    vec![
                        image("BigBuckBunny"),
                        video("BigBuckBunny"),
                        video("ElephantsDream"),
                        image("ElephantsDream"),
                        image("ForBiggerBlazes"),
                    ],
                ),
                story(
                    "Story 2",
                    vec![
                        image("ForBiggerBlazes"),
                        video("ForBiggerBlazes"),
                        video("ForBiggerEscapes"),
                        image("ForBiggerEscapes"),
                        image("ForBiggerFun"),
                    ],
                ),
                story(
                    "Story 3",
                    vec![
                        image("ForBiggerFun"),
                        video("ForBiggerFun"),
                        video("ForBiggerJoyrides"),
                        image("ForBiggerJoyrides"),
                        image("ForBiggerMeltdowns"),
                    ],
                ),
            ],
        }
    }
}
