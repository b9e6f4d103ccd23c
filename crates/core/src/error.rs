//! Structured error handling with codes, offending field and recovery hints
//!
//! Every failure droidplan can report is a configuration error: nothing is
//! retried and no partial build plan is ever returned. Errors carry:
//! - An error code for programmatic handling
//! - The offending field, when one can be named
//! - Optional context and recovery suggestion
//! - A serializable report form

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // General errors (1xxx)
    /// Bug in droidplan
    Internal = 1001,

    // IO errors (2xxx)
    /// I/O failure
    IoError = 2000,
    /// A required file does not exist
    FileNotFound = 2001,
    /// A file cannot be read or written
    PermissionDenied = 2002,

    // Configuration errors (3xxx)
    /// Inconsistent configuration
    ConfigError = 3000,
    /// No config file was found
    ConfigNotFound = 3001,
    /// The config file is not valid TOML
    ConfigParseError = 3002,
    /// A config value is out of range or malformed
    InvalidConfigValue = 3004,

    // Build plan errors (6xxx)
    /// One or more plan invariants failed
    ValidationError = 6000,
    /// Two `force()` rules disagree
    DuplicateConstraint = 6001,
    /// A plugin is applied twice
    DuplicatePlugin = 6002,
    /// A symbol the platform descriptor does not know
    UnknownSymbol = 6003,
    /// No version satisfies a dependency request
    UnresolvedDependency = 6004,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "IO",
            3 => "Configuration",
            6 => "Build plan",
            _ => "Unknown",
        }
    }

    /// Exit code a CLI should terminate with for this error
    pub fn exit_code(&self) -> i32 {
        match self.code() / 1000 {
            3 => exit_codes::CONFIG_ERROR,
            6 => exit_codes::VALIDATION_ERROR,
            _ => exit_codes::FAILURE,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Offending field or entity, e.g. `minSdk` or `androidx.core:core-ktx`
    pub field: Option<String>,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(field) = &self.field {
            write!(f, " (field: {})", field)?;
        }
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {}", ctx)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Name the offending field
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Convert to a serializable report
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            category: self.code.category().to_string(),
            message: self.message.clone(),
            field: self.field.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(|e| e.to_string()),
        }
    }

    // Convenience constructors

    /// Generic configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// An explicitly given config file does not exist
    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a droidplan.toml file or use --config to specify a path")
    }

    /// A config value failed to parse or is out of range
    pub fn invalid_value(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfigValue, message).with_field(field)
    }

    /// A cross-entity invariant does not hold; `invariant` names it, e.g. `minSdk>targetSdk`
    pub fn validation(invariant: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, invariant)
    }

    /// A second, different forced version for the same artifact
    pub fn duplicate_constraint(group_artifact: &str, existing: &str, requested: &str) -> Self {
        Self::new(
            ErrorCode::DuplicateConstraint,
            format!(
                "Conflicting forced versions for {}: {} already forced, {} requested",
                group_artifact, existing, requested
            ),
        )
        .with_field(group_artifact)
        .with_suggestion("Keep a single force() rule per artifact")
    }

    /// A plugin id, or an alias of it, registered twice
    pub fn duplicate_plugin(plugin_id: &str) -> Self {
        Self::new(
            ErrorCode::DuplicatePlugin,
            format!("Plugin already registered: {}", plugin_id),
        )
        .with_field(plugin_id)
    }

    /// A platform symbol outside the supported set
    pub fn unknown_symbol(symbol: &str) -> Self {
        Self::new(
            ErrorCode::UnknownSymbol,
            format!("Unknown platform symbol: {}", symbol),
        )
        .with_field(symbol)
        .with_suggestion("Use one of compileSdk, minSdk, targetSdk, ndkVersion, versionCode, versionName")
    }

    /// Neither a forced version nor the repository index yields a version
    pub fn unresolved_dependency(group_artifact: &str) -> Self {
        Self::new(
            ErrorCode::UnresolvedDependency,
            format!("No version could be resolved for {}", group_artifact),
        )
        .with_field(group_artifact)
        .with_suggestion("Force a version or add the artifact to the repository index")
    }
}

/// Serializable error report for logging and machine-readable output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Machine-readable code
    pub code: ErrorCode,
    /// Code as displayed, e.g. `E6001`
    pub code_str: String,
    /// Category of the code
    pub category: String,
    /// Human-readable message
    pub message: String,
    /// Offending field, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// What droidplan was doing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// How to fix it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Underlying error, rendered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
pub mod exit_codes {
    /// Command completed
    pub const SUCCESS: i32 = 0;
    /// IO or internal failure
    pub const FAILURE: i32 = 1;
    /// The build violates an invariant or cannot be resolved
    pub const VALIDATION_ERROR: i32 = 2;
    /// The configuration is missing or malformed
    pub const CONFIG_ERROR: i32 = 3;
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::Internal, format!("JSON error: {}", err)).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {}", err))
            .with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Attach context to the error, if any
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::FileNotFound.to_string(), "E2001");
        assert_eq!(ErrorCode::DuplicatePlugin.to_string(), "E6002");
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::IoError.category(), "IO");
        assert_eq!(ErrorCode::ConfigParseError.category(), "Configuration");
        assert_eq!(ErrorCode::UnknownSymbol.category(), "Build plan");
    }

    #[test]
    fn test_error_code_exit_code() {
        assert_eq!(ErrorCode::ValidationError.exit_code(), exit_codes::VALIDATION_ERROR);
        assert_eq!(ErrorCode::ConfigNotFound.exit_code(), exit_codes::CONFIG_ERROR);
        assert_eq!(ErrorCode::IoError.exit_code(), exit_codes::FAILURE);
    }

    #[test]
    fn test_duplicate_constraint_names_artifact() {
        let err = Error::duplicate_constraint("androidx.core:core-ktx", "1.12.0", "1.10.0");

        assert_eq!(err.code, ErrorCode::DuplicateConstraint);
        assert_eq!(err.field.as_deref(), Some("androidx.core:core-ktx"));
        assert!(err.message.contains("1.12.0"));
        assert!(err.message.contains("1.10.0"));
    }

    #[test]
    fn test_display_includes_field() {
        let err = Error::validation("minSdk>targetSdk").with_field("minSdk");
        assert_eq!(err.to_string(), "[E6000] minSdk>targetSdk (field: minSdk)");
    }

    #[test]
    fn test_error_report_serialization() {
        let err = Error::unknown_symbol("buildToolsVersion").with_context("While resolving defaultConfig");

        let report = err.to_report();
        let json = serde_json::to_string(&report).unwrap();

        assert!(json.contains("E6003"));
        assert!(json.contains("buildToolsVersion"));
        assert!(json.contains("Build plan"));
    }
}
