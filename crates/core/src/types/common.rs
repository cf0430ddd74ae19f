//! Common types and utilities shared across domain models

/// Time in seconds. Slide durations, elapsed time and media positions all use it.
pub type Seconds = f64;

/// Formats a number of seconds as H:MM:SS (always shows hours)
///
/// Fractions are truncated. Negative, NaN and infinite inputs render as `0:00:00`
/// so progress labels never show garbage while media metadata is loading.
pub fn format_hms(seconds: Seconds) -> String {
    let total_seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    format!("{}:{:02}:{:02}", hours, minutes, secs)
}

/// Returns true if `value` is a usable, non-negative duration
pub fn is_valid_duration(value: Seconds) -> bool {
    value.is_finite() && value >= 0.0
}

/// Trait for types that can validate themselves
pub trait Validator {
    /// Validates the instance and returns errors if invalid
    fn validate(&self) -> Result<(), Vec<String>>;

    /// Returns true if the instance is valid
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
