pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{CatalogError, CatalogResult, ErrorSeverity};
pub use types::{
    format_hms, is_valid_duration, MediaRef, Seconds, Slide, SlideKind, Story, StoryCatalog,
    StoryId, Validator,
};
