//! Validation helpers shared by config sections

pub use crate::error::ValidationError;

/// A config section that can validate and merge itself
pub trait ConfigSection: Default {
    /// Returns all validation errors. Empty means valid.
    fn validate(&self) -> Result<(), Vec<ValidationError>>;

    /// Merges another section into this one; values from `other` win
    fn merge(&mut self, other: Self);

    /// Section name for error reporting
    fn section_name(&self) -> &'static str;
}

/// Common validators for config values
pub struct Validator;

impl Validator {
    /// Validates that a numeric value is within an inclusive range
    pub fn in_range<T>(value: T, min: T, max: T, field: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            Err(ValidationError::with_value(
                field,
                format!("must be between {} and {}", min, max),
                value,
            ))
        } else {
            Ok(())
        }
    }

    /// Like [`Validator::in_range`], but also rejects NaN and infinities
    pub fn finite_in_range(
        value: f64,
        min: f64,
        max: f64,
        field: &str,
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::with_value(
                field,
                "must be a finite number",
                value,
            ));
        }
        Self::in_range(value, min, max, field)
    }

    /// Collects multiple validation results into a single result
    pub fn collect_errors(
        results: Vec<Result<(), ValidationError>>,
    ) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = results.into_iter().filter_map(|r| r.err()).collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
