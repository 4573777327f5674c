//! Structured logging with JSON/pretty formats and field value redaction.
//!
//! The engine itself only emits `debug` and `trace` events. Installing a
//! subscriber is left to the host; [`init_logging`] is the stock one.
//!
//! Values of sensitive fields never reach a log line in clear text: a field
//! is sensitive when it is flagged so, when it carries a payment card rule,
//! or when its key matches one of the configured name fragments.

use crate::form::FieldDefinition;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Global redactor instance.
static REDACTOR: OnceLock<FieldRedactor> = OnceLock::new();

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Global log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// Per-module log levels, e.g. `formkit_core::form = "trace"`
    #[serde(default)]
    pub module_levels: HashMap<String, String>,

    /// Whether to include file/line information
    #[serde(default)]
    pub include_location: bool,

    #[serde(default)]
    pub include_thread: bool,

    /// Whether to include target (module path)
    #[serde(default = "default_include_target")]
    pub include_target: bool,

    #[serde(default)]
    pub redaction: RedactionConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            module_levels: HashMap::new(),
            include_location: false,
            include_thread: false,
            include_target: default_include_target(),
            redaction: RedactionConfig::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format for production/structured logging
    #[default]
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact single-line format
    Compact,
}

/// Configuration for field value redaction.
#[derive(Debug, Clone, Deserialize)]
pub struct RedactionConfig {
    #[serde(default = "default_redaction_enabled")]
    pub enabled: bool,

    /// Key fragments (case-insensitive) that mark a field as sensitive
    #[serde(default = "default_sensitive_keys")]
    pub sensitive_keys: Vec<String>,

    /// Regexes whose matches are masked inside otherwise loggable values
    #[serde(default = "default_value_patterns")]
    pub value_patterns: Vec<String>,

    #[serde(default = "default_redaction_replacement")]
    pub replacement: String,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            enabled: default_redaction_enabled(),
            sensitive_keys: default_sensitive_keys(),
            value_patterns: default_value_patterns(),
            replacement: default_redaction_replacement(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Redaction
// ═══════════════════════════════════════════════════════════════════════════════

/// Renders field values for log output with sensitive data masked.
#[derive(Debug, Clone)]
pub struct FieldRedactor {
    sensitive_keys: Vec<String>,
    value_patterns: Vec<Regex>,
    replacement: String,
    enabled: bool,
}

impl FieldRedactor {
    /// Create a redactor from configuration. Patterns that fail to compile
    /// are skipped.
    pub fn new(config: &RedactionConfig) -> Self {
        Self {
            sensitive_keys: config.sensitive_keys.iter().map(|k| k.to_lowercase()).collect(),
            value_patterns: config
                .value_patterns
                .iter()
                .filter_map(|pattern| Regex::new(pattern).ok())
                .collect(),
            replacement: config.replacement.clone(),
            enabled: config.enabled,
        }
    }

    /// Check if a field key names sensitive data.
    pub fn is_sensitive_key(&self, key: &str) -> bool {
        if !self.enabled {
            return false;
        }
        let lower = key.to_lowercase();
        self.sensitive_keys.iter().any(|k| lower.contains(k))
    }

    /// Mask every value pattern match inside `value`.
    pub fn redact_value(&self, value: &str) -> String {
        if !self.enabled {
            return value.to_string();
        }
        self.value_patterns
            .iter()
            .fold(value.to_string(), |acc, regex| {
                regex.replace_all(&acc, self.replacement.as_str()).into_owned()
            })
    }

    /// Loggable rendering of a field's current value.
    pub fn redact_field(&self, field: &FieldDefinition) -> String {
        if !self.enabled {
            return field.value().as_text();
        }
        if field.is_sensitive() || self.is_sensitive_key(field.key()) {
            return self.replacement.clone();
        }
        self.redact_value(&field.value().as_text())
    }

    /// Get the global redactor instance.
    pub fn global() -> &'static FieldRedactor {
        REDACTOR.get_or_init(|| FieldRedactor::new(&RedactionConfig::default()))
    }
}

// Default value functions
fn default_log_level() -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
}

fn default_include_target() -> bool {
    true
}

fn default_redaction_enabled() -> bool {
    true
}

fn default_redaction_replacement() -> String {
    "[REDACTED]".to_string()
}

fn default_sensitive_keys() -> Vec<String> {
    ["password", "secret", "token", "card", "cvc", "cvv", "ssn"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_value_patterns() -> Vec<String> {
    vec![
        // Payment card numbers
        r"\b(?:\d{4}[-\s]?){3}\d{4}\b".to_string(),
        // JWTs
        r"eyJ[a-zA-Z0-9_-]+\.[a-zA-Z0-9_-]+\.[a-zA-Z0-9_-]+".to_string(),
    ]
}

// ═══════════════════════════════════════════════════════════════════════════════
// Subscriber
// ═══════════════════════════════════════════════════════════════════════════════

/// Install a global `tracing` subscriber.
///
/// Also installs the global [`FieldRedactor`] from `config.redaction`, so it
/// must run before any field value is logged.
///
/// # Errors
///
/// Returns an error if a level directive does not parse, if the redactor was
/// already initialized (by an earlier call or by logging a field), or if a
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    if REDACTOR.set(FieldRedactor::new(&config.redaction)).is_err() {
        anyhow::bail!("field redactor already initialized; call init_logging before logging fields");
    }

    let mut filter = EnvFilter::try_new(&config.level)?;
    for (module, level) in &config.module_levels {
        let directive = format!("{}={}", module, level);
        filter = filter.add_directive(directive.parse()?);
    }

    let registry = tracing_subscriber::registry().with(filter);
    let layer = fmt::layer()
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_thread_ids(config.include_thread)
        .with_thread_names(config.include_thread)
        .with_target(config.include_target);

    match config.format {
        LogFormat::Json => registry.with(layer.json()).try_init()?,
        LogFormat::Pretty => registry.with(layer.pretty()).try_init()?,
        LogFormat::Compact => registry.with(layer.compact()).try_init()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{PatternKind, Rule};

    #[test]
    fn test_sensitive_keys() {
        let redactor = FieldRedactor::new(&RedactionConfig::default());
        assert!(redactor.is_sensitive_key("cardNumber"));
        assert!(redactor.is_sensitive_key("ADMIN_PASSWORD"));
        assert!(redactor.is_sensitive_key("cvc"));
        assert!(!redactor.is_sensitive_key("instanceName"));
    }

    #[test]
    fn test_redact_flagged_field() {
        let redactor = FieldRedactor::new(&RedactionConfig::default());
        let field = FieldDefinition::builder("pan", "PAN")
            .value("4111 1111 1111 1111")
            .rule(Rule::Pattern(PatternKind::CreditCard))
            .build();
        assert_eq!(redactor.redact_field(&field), "[REDACTED]");

        let note = FieldDefinition::builder("note", "Note").value("hello").build();
        assert_eq!(redactor.redact_field(&note), "hello");
    }

    #[test]
    fn test_value_patterns_mask_card_numbers_in_free_text() {
        let redactor = FieldRedactor::new(&RedactionConfig::default());
        assert_eq!(
            redactor.redact_value("paid with 4111-1111-1111-1111 today"),
            "paid with [REDACTED] today"
        );
    }

    #[test]
    fn test_disabled_redaction() {
        let config = RedactionConfig {
            enabled: false,
            ..RedactionConfig::default()
        };
        let redactor = FieldRedactor::new(&config);
        let field = FieldDefinition::builder("password", "Password").value("hunter2").build();
        assert_eq!(redactor.redact_field(&field), "hunter2");
    }

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.redaction.enabled);
        assert!(config.include_target);
    }
}
