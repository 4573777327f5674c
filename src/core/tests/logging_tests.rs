//! Global logging setup.
//!
//! `init_logging` installs process-wide state, so this binary holds a single
//! test that drives the whole sequence.

use formkit_core::form::{FieldDefinition, FormState};
use formkit_core::telemetry::{
    init_logging, redact_field_value, FieldRedactor, LogFormat, LoggingConfig, RedactionConfig,
};
use formkit_core::validation::Rule;
use formkit_core::{ErrorSeverity, FormError};

#[test]
fn test_init_logging_installs_configured_redactor_once() {
    let config = LoggingConfig {
        level: "debug".to_string(),
        format: LogFormat::Compact,
        redaction: RedactionConfig {
            replacement: "***".to_string(),
            ..RedactionConfig::default()
        },
        ..LoggingConfig::default()
    };

    init_logging(&config).unwrap();

    let cvc = FieldDefinition::builder("securityCode", "CVC")
        .value("123")
        .rule(Rule::Cvc(3))
        .build();
    assert_eq!(redact_field_value(&cvc), "***");
    assert_eq!(FieldRedactor::global().redact_field(&cvc), "***");

    // Engine events flow through the installed subscriber.
    let form = FormState::new([cvc]).unwrap().update("securityCode", "12").unwrap();
    assert!(!form.is_valid());

    let usage = FormError::unknown_field("cvv");
    assert_eq!(usage.severity(), ErrorSeverity::High);
    usage.log();
    let definition = FormError::unknown_rule("palindrome");
    assert_eq!(definition.severity(), ErrorSeverity::Low);
    definition.log();

    // A second call cannot replace the redactor that is already in use.
    let err = init_logging(&LoggingConfig::default()).unwrap_err();
    assert!(err.to_string().contains("redactor already initialized"));
    assert_eq!(redact_field_value(form.field("securityCode").unwrap()), "***");
}
