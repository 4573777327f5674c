//! Telemetry: structured logging and log redaction.
//!
//! # Example
//!
//! ```rust,no_run
//! use formkit_core::telemetry::{init_logging, LoggingConfig};
//!
//! init_logging(&LoggingConfig::default()).expect("Failed to initialize logging");
//! ```

pub mod logging;

pub use logging::{init_logging, FieldRedactor, LogFormat, LoggingConfig, RedactionConfig};

use crate::form::FieldDefinition;

/// Loggable rendering of a field's value using the global redactor.
pub fn redact_field_value(field: &FieldDefinition) -> String {
    FieldRedactor::global().redact_field(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::ControlKind;

    #[test]
    fn test_password_control_value_is_redacted_by_key() {
        let field = FieldDefinition::builder("password", "Password")
            .control(ControlKind::Password)
            .value("hunter2")
            .build();
        assert_eq!(redact_field_value(&field), "[REDACTED]");
    }
}
