//! Validation system for configuration values
//!
//! Each config section implements `ConfigSection`, which includes validation
//! and merge behaviour for override chains.

pub use crate::error::ValidationError;

/// Trait for configuration sections that can validate themselves
pub trait ConfigSection: Default {
    /// Validates the configuration section
    fn validate(&self) -> Result<(), Vec<ValidationError>>;

    /// Merges another config section into this one
    ///
    /// Values from `other` take precedence.
    fn merge(&mut self, other: Self);

    /// Returns the section name for error reporting
    fn section_name(&self) -> &'static str;
}

/// Common validators for config values
pub struct Validator;

impl Validator {
    /// Validates that a numeric value is within a range
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

    /// Validates that a string is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::new(field, "must not be empty"))
        } else {
            Ok(())
        }
    }

    /// Validates that a string is an http(s) URL
    pub fn http_url(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.starts_with("https://") || value.starts_with("http://") {
            Ok(())
        } else {
            Err(ValidationError::with_value(
                field,
                "must start with http:// or https://",
                value,
            ))
        }
    }

    /// Validates that a template string contains every placeholder
    pub fn has_placeholders(
        value: &str,
        placeholders: &[&str],
        field: &str,
    ) -> Result<(), ValidationError> {
        let missing: Vec<&str> = placeholders
            .iter()
            .copied()
            .filter(|p| !value.contains(p))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::with_value(
                field,
                format!("must contain {}", missing.join(" and ")),
                value,
            ))
        }
    }

    /// Validates that a value is one of the allowed options
    pub fn one_of<T>(value: &T, allowed: &[T], field: &str) -> Result<(), ValidationError>
    where
        T: PartialEq + std::fmt::Display,
    {
        if !allowed.contains(value) {
            let allowed_str = allowed
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Err(ValidationError::with_value(
                field,
                format!("must be one of: {}", allowed_str),
                value,
            ))
        } else {
            Ok(())
        }
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
