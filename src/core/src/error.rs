//! Error handling for Formkit Core.
//!
//! This module provides:
//! - Machine-readable error codes for programmer errors (unknown keys, bad templates)
//! - Severity mapping used when logging errors through `tracing`
//! - Conversions from the parsing and configuration crates the engine uses
//!
//! Validation failures are never errors. A field that fails its rules is
//! represented as data (`is_valid == false` plus a `validation_message`); the
//! types here only cover mismatches between a screen's form template and the
//! way the screen uses it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use formkit_core::error::{ErrorCode, Result};
//!
//! fn rename(form: &FormState, name: &str) -> Result<FormState> {
//!     let next = form.update("name", name)?;
//!     Ok(next)
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

// ═══════════════════════════════════════════════════════════════════════════════
// Result Type Alias
// ═══════════════════════════════════════════════════════════════════════════════

/// A specialized Result type for Formkit operations.
pub type Result<T> = std::result::Result<T, FormError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Error Codes
// ═══════════════════════════════════════════════════════════════════════════════

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Form Errors (1000-1099)
    UnknownField,
    DuplicateField,

    // Rule Errors (1100-1199)
    UnknownRule,
    InvalidPattern,

    // Template Errors (1200-1299)
    InvalidTemplate,
    SerializationError,

    // Configuration Errors (5000-5099)
    ConfigurationError,
    IoError,
}

impl ErrorCode {
    /// Get the numeric code for this error.
    pub const fn numeric_code(&self) -> u32 {
        match self {
            Self::UnknownField => 1000,
            Self::DuplicateField => 1001,

            Self::UnknownRule => 1100,
            Self::InvalidPattern => 1101,

            Self::InvalidTemplate => 1200,
            Self::SerializationError => 1201,

            Self::ConfigurationError => 5000,
            Self::IoError => 5001,
        }
    }

    /// Get the error category for grouping.
    pub const fn category(&self) -> &'static str {
        match self.numeric_code() {
            1000..=1099 => "form",
            1100..=1199 => "rule",
            1200..=1299 => "template",
            5000..=5099 => "configuration",
            _ => "unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Severity
// ═══════════════════════════════════════════════════════════════════════════════

/// Severity level for errors (affects logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Bad input from a template author or a config file.
    Low,
    /// A screen addressing a field its form does not have.
    High,
}

impl ErrorSeverity {
    /// Get severity based on error code.
    pub const fn from_code(code: &ErrorCode) -> Self {
        match code {
            ErrorCode::UnknownRule
            | ErrorCode::InvalidTemplate
            | ErrorCode::SerializationError
            | ErrorCode::ConfigurationError
            | ErrorCode::IoError => Self::Low,

            ErrorCode::UnknownField | ErrorCode::DuplicateField | ErrorCode::InvalidPattern => {
                Self::High
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Main Error Type
// ═══════════════════════════════════════════════════════════════════════════════

/// The error type for Formkit Core.
#[derive(Error, Debug)]
pub struct FormError {
    /// Machine-readable error code
    code: ErrorCode,

    /// Human-readable message
    message: Cow<'static, str>,

    /// Key of the field involved, when there is one
    field: Option<String>,

    /// The source error that caused this error
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref field) = self.field {
            write!(f, " (field: {})", field)?;
        }
        Ok(())
    }
}

impl FormError {
    // ─────────────────────────────────────────────────────────────────────────
    // Constructors
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new error with code and message.
    pub fn new(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
            source: None,
        }
    }

    /// A key that is not part of the form was addressed.
    pub fn unknown_field(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(ErrorCode::UnknownField, format!("form has no field '{}'", key)).with_field(key)
    }

    /// Two fields share one key.
    pub fn duplicate_field(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(ErrorCode::DuplicateField, format!("field '{}' is declared more than once", key))
            .with_field(key)
    }

    /// A custom pattern failed to compile.
    pub fn invalid_pattern(pattern: &str, source: regex::Error) -> Self {
        Self::new(ErrorCode::InvalidPattern, format!("invalid pattern: {}", pattern))
            .with_source(source)
    }

    /// A template declared a rule that is not in the catalog.
    pub fn unknown_rule(name: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownRule, format!("unknown validation rule '{}'", name.into()))
    }

    /// A template was structurally invalid.
    pub fn invalid_template(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidTemplate, message.into())
    }

    /// Configuration could not be loaded.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigurationError, message.into())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builder Methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Attach the key of the field involved.
    pub fn with_field(mut self, key: impl Into<String>) -> Self {
        self.field = Some(key.into());
        self
    }

    /// Add a source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the key of the field involved (if any).
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::from_code(&self.code)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Logging
    // ─────────────────────────────────────────────────────────────────────────

    /// Log this error with appropriate severity.
    pub fn log(&self) {
        let code = self.code.to_string();
        let category = self.code.category();

        match self.severity() {
            ErrorSeverity::High => {
                error!(
                    error_code = %code,
                    category = category,
                    field = ?self.field,
                    message = %self.message,
                    source = ?self.source,
                    "Form usage error"
                );
            }
            ErrorSeverity::Low => {
                warn!(
                    error_code = %code,
                    category = category,
                    message = %self.message,
                    "Form definition error"
                );
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Conversions
// ═══════════════════════════════════════════════════════════════════════════════

impl From<regex::Error> for FormError {
    fn from(error: regex::Error) -> Self {
        Self::new(ErrorCode::InvalidPattern, "invalid pattern").with_source(error)
    }
}

impl From<serde_json::Error> for FormError {
    fn from(error: serde_json::Error) -> Self {
        let message = format!("JSON error: {}", error);
        Self::new(ErrorCode::SerializationError, message).with_source(error)
    }
}

impl From<toml::de::Error> for FormError {
    fn from(error: toml::de::Error) -> Self {
        let message = format!("TOML error: {}", error.message());
        Self::new(ErrorCode::SerializationError, message).with_source(error)
    }
}

impl From<config::ConfigError> for FormError {
    fn from(error: config::ConfigError) -> Self {
        let message = format!("configuration error: {}", error);
        Self::new(ErrorCode::ConfigurationError, message).with_source(error)
    }
}

impl From<std::io::Error> for FormError {
    fn from(error: std::io::Error) -> Self {
        let message = format!("I/O error: {}", error);
        Self::new(ErrorCode::IoError, message).with_source(error)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
