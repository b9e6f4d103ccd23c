//! Field and invariant validation
//!
//! A fluent validator that records every violation in declaration order.
//! Build plan assembly only surfaces the first one, so checks must be
//! chained in the order their invariants should be reported.
//!
//! # Example
//!
//! ```rust
//! use droidplan_core::validation::Validator;
//!
//! let result = Validator::new()
//!     .required("applicationId", "com.example.step_counter")
//!     .ordered("minSdk", 21, "targetSdk", 33)
//!     .ordered("targetSdk", 33, "compileSdk", 34)
//!     .validate();
//!
//! assert!(result.is_valid());
//! ```

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A single violated check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Field that failed validation
    pub field: String,
    /// Invariant or message, e.g. `minSdk>targetSdk`
    pub message: String,
    /// Check code
    pub code: String,
    /// Expected value (if applicable)
    pub expected: Option<String>,
    /// Actual value (if applicable)
    pub actual: Option<String>,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl From<Violation> for Error {
    fn from(violation: Violation) -> Self {
        let mut err = Error::validation(violation.message).with_field(violation.field);
        if let (Some(expected), Some(actual)) = (violation.expected, violation.actual) {
            err = err.with_context(format!("expected {}, got {}", expected, actual));
        }
        err
    }
}

/// Validation result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    violations: Vec<Violation>,
}

impl ValidationResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Get all violations
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Add a violation
    pub fn add(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.violations.extend(other.violations);
    }

    /// Convert to a Result carrying the first violation
    pub fn into_result(self) -> Result<()> {
        match self.violations.into_iter().next() {
            None => Ok(()),
            Some(first) => Err(first.into()),
        }
    }
}

/// Fluent validator builder
pub struct Validator {
    result: ValidationResult,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            result: ValidationResult::new(),
        }
    }

    /// Validate that a field is not empty
    pub fn required(mut self, field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.result.add(Violation {
                field: field.to_string(),
                message: format!("{} is required", field),
                code: "REQUIRED".to_string(),
                expected: Some("non-empty value".to_string()),
                actual: Some("empty".to_string()),
            });
        }
        self
    }

    /// Validate against a compiled pattern
    pub fn pattern(mut self, field: &str, value: &str, re: &Regex, description: &str) -> Self {
        if !value.trim().is_empty() && !re.is_match(value) {
            self.result.add(Violation {
                field: field.to_string(),
                message: format!("{} must be {}", field, description),
                code: "PATTERN".to_string(),
                expected: Some(description.to_string()),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Validate a lower bound
    pub fn at_least<T: PartialOrd + std::fmt::Display>(mut self, field: &str, value: T, min: T) -> Self {
        if value < min {
            self.result.add(Violation {
                field: field.to_string(),
                message: format!("{}<{}", field, min),
                code: "MIN".to_string(),
                expected: Some(format!(">= {}", min)),
                actual: Some(value.to_string()),
            });
        }
        self
    }

    /// Validate `low <= high`; a violation is reported as `low>high`
    pub fn ordered<T: PartialOrd + std::fmt::Display>(
        mut self,
        low_field: &str,
        low: T,
        high_field: &str,
        high: T,
    ) -> Self {
        if low > high {
            self.result.add(Violation {
                field: low_field.to_string(),
                message: format!("{}>{}", low_field, high_field),
                code: "ORDER".to_string(),
                expected: Some(format!("{} <= {} ({})", low_field, high_field, high)),
                actual: Some(low.to_string()),
            });
        }
        self
    }

    /// Add a custom validation
    pub fn custom<F>(mut self, field: &str, f: F) -> Self
    where
        F: FnOnce() -> Option<String>,
    {
        if let Some(message) = f() {
            self.result.add(Violation {
                field: field.to_string(),
                message,
                code: "CUSTOM".to_string(),
                expected: None,
                actual: None,
            });
        }
        self
    }

    /// Complete validation and return result
    pub fn validate(self) -> ValidationResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use proptest::prelude::*;

    #[test]
    fn test_required_validation() {
        let result = Validator::new().required("namespace", "  ").validate();
        assert!(!result.is_valid());
        assert_eq!(result.violations()[0].code, "REQUIRED");
    }

    #[test]
    fn test_pattern_validation() {
        let re = Regex::new(r"^[a-z]+(\.[a-z]+)+$").unwrap();
        let result = Validator::new()
            .pattern("applicationId", "Step Counter", &re, "a package name")
            .validate();
        assert!(!result.is_valid());
        assert_eq!(result.violations()[0].code, "PATTERN");
    }

    #[test]
    fn test_pattern_skips_empty_value() {
        let re = Regex::new(r"^x$").unwrap();
        let result = Validator::new().pattern("applicationId", "", &re, "x").validate();
        assert!(result.is_valid());
    }

    #[test]
    fn test_ordered_reports_invariant_name() {
        let result = Validator::new()
            .ordered("minSdk", 34, "targetSdk", 21)
            .validate();
        assert_eq!(result.violations()[0].message, "minSdk>targetSdk");
    }

    #[test]
    fn test_into_result_keeps_first_violation() {
        let err = Validator::new()
            .ordered("minSdk", 34, "targetSdk", 21)
            .at_least("versionCode", 0, 1)
            .validate()
            .into_result()
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "minSdk>targetSdk");
        assert_eq!(err.field.as_deref(), Some("minSdk"));
    }

    #[test]
    fn test_chained_validation() {
        let result = Validator::new()
            .required("versionName", "1.0.0")
            .at_least("versionCode", 3, 1)
            .custom("plugins", || None)
            .validate();
        assert!(result.is_valid());
    }

    proptest! {
        #[test]
        fn ordered_fails_exactly_when_low_exceeds_high(low in 0u32..100, high in 0u32..100) {
            let result = Validator::new().ordered("a", low, "b", high).validate();
            prop_assert_eq!(result.is_valid(), low <= high);
        }
    }
}
