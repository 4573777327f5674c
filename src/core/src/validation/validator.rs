//! Applying a rule list to a value.
//!
//! [`validate`] is a pure function: the same value, rules and label always
//! give the same [`Validation`].

use crate::validation::rules::Rule;
use crate::value::FieldValue;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// Policy
// ═══════════════════════════════════════════════════════════════════════════════

/// How failures of several rules on one value are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Report the message of the first failing rule in list order.
    #[default]
    FirstFailure,
    /// Report every failing rule, messages joined with `"; "`.
    CollectAll,
}

/// Knobs that change how values are validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    #[serde(default)]
    pub failure_mode: FailureMode,

    /// Treat whitespace-only text as empty.
    #[serde(default)]
    pub trim_whitespace: bool,

    /// Date the calendar rules compare against. `None` means the local date.
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

impl ValidationPolicy {
    pub fn collect_all() -> Self {
        Self {
            failure_mode: FailureMode::CollectAll,
            ..Self::default()
        }
    }

    /// Pin the date used by future-date and card-expiry rules.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Validation Outcome
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of validating one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub is_valid: bool,
    /// Empty when valid.
    pub message: String,
}

impl Validation {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: String::new(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Validate
// ═══════════════════════════════════════════════════════════════════════════════

/// Validate `value` against `rules` with the default policy.
pub fn validate(value: &FieldValue, rules: &[Rule], label: &str) -> Validation {
    validate_with(value, rules, label, ValidationPolicy::default())
}

/// Validate `value` against `rules`.
///
/// An empty value short-circuits: a required field reports only the
/// required message, an optional one is valid without running its other
/// rules. A non-empty value runs every rule in order.
pub fn validate_with(
    value: &FieldValue,
    rules: &[Rule],
    label: &str,
    policy: ValidationPolicy,
) -> Validation {
    let label = clean_label(label);
    let today = policy.today();

    if value.is_empty(policy.trim_whitespace) {
        return if rules.iter().any(Rule::is_required) {
            Validation::invalid(Rule::required_message(&label))
        } else {
            Validation::valid()
        };
    }

    match policy.failure_mode {
        FailureMode::FirstFailure => rules
            .iter()
            .find_map(|rule| rule.failure_on(value, &label, today))
            .map(Validation::invalid)
            .unwrap_or_else(Validation::valid),
        FailureMode::CollectAll => {
            let messages: Vec<String> = rules
                .iter()
                .filter_map(|rule| rule.failure_on(value, &label, today))
                .collect();
            if messages.is_empty() {
                Validation::valid()
            } else {
                Validation::invalid(messages.join("; "))
            }
        }
    }
}

/// Strip the decorations screens add to labels (`"Name: *"` → `"Name"`).
///
/// Only the first colon and the first `" *"` are removed.
pub fn clean_label(label: &str) -> String {
    label.replacen(':', "", 1).replacen(" *", "", 1).trim().to_string()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
