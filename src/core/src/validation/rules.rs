//! The validation rule catalog.
//!
//! A field carries an ordered list of [`Rule`]s. The order is significant:
//! under the default failure mode the first rule that fails decides the
//! message the field shows.
//!
//! The set of rule kinds is closed. Templates name rules by string and are
//! resolved through [`Rule::from_spec`], which rejects names it does not know
//! instead of skipping them.

use crate::error::{FormError, Result};
use crate::validation::pattern::{CustomPattern, PatternKind};
use crate::validation::payment;
use crate::value::FieldValue;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ═══════════════════════════════════════════════════════════════════════════════
// Rule
// ═══════════════════════════════════════════════════════════════════════════════

/// A validation rule attached to a field.
#[derive(Debug, Clone)]
pub enum Rule {
    /// The field must not be empty.
    Required,
    /// At most `n` characters (or list items).
    MaxLength(usize),
    /// At least `n` characters (or list items).
    MinLength(usize),
    /// Numeric value must not exceed the bound.
    MaxValue(f64),
    /// Numeric value must not be below the bound.
    MinValue(f64),
    /// Text must match a pattern.
    Pattern(PatternKind),
    /// A `YYYY-MM-DD` date strictly after today.
    FutureDate,
    /// Card expiry month, 1 through 12.
    CardMonth,
    /// Two-digit card expiry year, not before the current year.
    CardYear,
    /// Card security code of exactly `n` digits.
    Cvc(usize),
    /// ZIP code of at most `n` characters.
    ZipCode(usize),
    /// Escape hatch for predicates the catalog cannot express.
    Custom(CustomRule),
}

impl Rule {
    /// A rule backed by an arbitrary predicate.
    pub fn custom<F>(predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&FieldValue) -> bool + Send + Sync + 'static,
    {
        Self::Custom(CustomRule::new(predicate, message))
    }

    /// The value must equal `target` exactly (delete confirmations).
    pub fn equals(target: impl Into<String>, message: impl Into<String>) -> Self {
        let target = target.into();
        Self::custom(move |value| value.as_str() == Some(target.as_str()), message)
    }

    /// A pattern rule from a regular expression.
    pub fn regex(pattern: &str) -> Result<Self> {
        Ok(Self::Pattern(PatternKind::custom(pattern)?))
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required)
    }

    /// Whether the field value should be kept out of logs.
    pub fn is_sensitive(&self) -> bool {
        match self {
            Self::Pattern(kind) => kind.is_sensitive(),
            Self::Cvc(_) => true,
            _ => false,
        }
    }

    /// Check a non-empty value against this rule, using the local date for
    /// calendar rules.
    pub fn failure(&self, value: &FieldValue, label: &str) -> Option<String> {
        self.failure_on(value, label, Local::now().date_naive())
    }

    /// Check a non-empty value against this rule as of `today`.
    ///
    /// Emptiness is decided once per field before individual rules run, so
    /// `Required` always passes here.
    pub fn failure_on(&self, value: &FieldValue, label: &str, today: NaiveDate) -> Option<String> {
        match self {
            Self::Required => None,
            Self::MaxLength(max) => {
                (value.len() > *max).then(|| format!("Max length {} characters.", max))
            }
            Self::MinLength(min) => {
                (value.len() < *min).then(|| format!("Min length {} characters.", min))
            }
            Self::MaxValue(max) => match value.as_number() {
                Some(n) if n <= *max => None,
                _ => Some(format!("Value more than {} is not allowed.", max)),
            },
            Self::MinValue(min) => match value.as_number() {
                Some(n) if n >= *min => None,
                _ => Some(format!("Value less than {} is not allowed.", min)),
            },
            Self::Pattern(kind) => match value {
                FieldValue::List(items) => items.iter().find_map(|item| kind.failure(item, label)),
                other => kind.failure(&other.as_text(), label),
            },
            Self::FutureDate => match value.as_date() {
                Some(date) if date > today => None,
                _ => Some("Date must be greater than today".to_string()),
            },
            Self::CardMonth => (!payment::card_month_valid(&value.as_text()))
                .then(|| format!("Invalid {}.", label)),
            Self::CardYear => (!payment::card_year_valid(&value.as_text(), today))
                .then(|| format!("Invalid {}.", label)),
            Self::Cvc(digits) => (value.len() != *digits).then(|| "Invalid CVC".to_string()),
            Self::ZipCode(max) => (value.len() > *max).then(|| "Invalid ZIP code".to_string()),
            Self::Custom(custom) => {
                (!custom.check(value)).then(|| custom.message.clone())
            }
        }
    }

    /// The message this rule reports for a field labelled `label` when it
    /// fails on an empty value.
    pub fn required_message(label: &str) -> String {
        format!("{} is required", label)
    }

    /// Get a description of this rule.
    pub fn description(&self) -> String {
        match self {
            Self::Required => "field is required".to_string(),
            Self::MaxLength(max) => format!("maximum length: {}", max),
            Self::MinLength(min) => format!("minimum length: {}", min),
            Self::MaxValue(max) => format!("maximum value: {}", max),
            Self::MinValue(min) => format!("minimum value: {}", min),
            Self::Pattern(kind) => kind.description(),
            Self::FutureDate => "date after today".to_string(),
            Self::CardMonth => "card expiry month".to_string(),
            Self::CardYear => "card expiry year".to_string(),
            Self::Cvc(digits) => format!("card security code: {} digits", digits),
            Self::ZipCode(max) => format!("ZIP code: at most {} characters", max),
            Self::Custom(custom) => format!("custom: {}", custom.message),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Registry
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve a rule declared in a template.
    pub fn from_spec(spec: &RuleSpec) -> Result<Self> {
        let rule = match spec.kind.as_str() {
            "required" => Self::Required,
            "max_length" => Self::MaxLength(spec.count()?),
            "min_length" => Self::MinLength(spec.count()?),
            "max_value" => Self::MaxValue(spec.number()?),
            "min_value" => Self::MinValue(spec.number()?),
            "pattern" => Self::Pattern(spec.pattern()?),
            "future_date" => Self::FutureDate,
            "card_month" => Self::CardMonth,
            "card_year" => Self::CardYear,
            "cvc" => Self::Cvc(spec.count()?),
            "zip_code" => Self::ZipCode(spec.count()?),
            "equals" => {
                let target = match spec.value.as_ref() {
                    Some(serde_json::Value::String(s)) => s.clone(),
                    _ => return Err(spec.missing("a string `value`")),
                };
                let message = spec
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("Value must be {}.", target));
                Self::equals(target, message)
            }
            other => return Err(FormError::unknown_rule(other)),
        };
        Ok(rule)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Custom Rule
// ═══════════════════════════════════════════════════════════════════════════════

/// A predicate with the message it reports on failure.
#[derive(Clone)]
pub struct CustomRule {
    predicate: Arc<dyn Fn(&FieldValue) -> bool + Send + Sync>,
    message: String,
}

impl CustomRule {
    pub fn new<F>(predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&FieldValue) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            message: message.into(),
        }
    }

    pub fn check(&self, value: &FieldValue) -> bool {
        (self.predicate)(value)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRule")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rule Spec (template form)
// ═══════════════════════════════════════════════════════════════════════════════

/// A rule as written in a form template.
///
/// ```toml
/// rules = [
///     { kind = "required" },
///     { kind = "max_length", value = 50 },
///     { kind = "pattern", pattern = "alpha_numeric_lower_hyphen" },
///     { kind = "pattern", pattern = "custom", regex = "^v[0-9]+$" },
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RuleSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: None,
            pattern: None,
            regex: None,
            message: None,
        }
    }

    fn number(&self) -> Result<f64> {
        self.value
            .as_ref()
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| self.missing("a numeric `value`"))
    }

    fn count(&self) -> Result<usize> {
        self.value
            .as_ref()
            .and_then(serde_json::Value::as_u64)
            .map(|n| n as usize)
            .ok_or_else(|| self.missing("a non-negative integer `value`"))
    }

    fn pattern(&self) -> Result<PatternKind> {
        let name = self.pattern.as_deref().ok_or_else(|| self.missing("a `pattern`"))?;
        if name == "custom" {
            let regex = self.regex.as_deref().ok_or_else(|| self.missing("a `regex`"))?;
            let mut custom = CustomPattern::new(regex)?;
            if let Some(message) = &self.message {
                custom = custom.with_message(message.clone());
            }
            return Ok(PatternKind::Custom(custom));
        }
        PatternKind::builtin(name).ok_or_else(|| FormError::unknown_rule(format!("pattern:{}", name)))
    }

    fn missing(&self, what: &str) -> FormError {
        FormError::invalid_template(format!("rule '{}' needs {}", self.kind, what))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_length_rules() {
        let value = FieldValue::from("hello");
        assert!(Rule::MaxLength(5).failure(&value, "Name").is_none());
        assert_eq!(
            Rule::MaxLength(4).failure(&value, "Name").unwrap(),
            "Max length 4 characters."
        );
        assert!(Rule::MinLength(5).failure(&value, "Name").is_none());
        assert_eq!(
            Rule::MinLength(6).failure(&value, "Name").unwrap(),
            "Min length 6 characters."
        );
    }

    #[test]
    fn test_length_rules_count_list_items() {
        let value = FieldValue::List(vec!["a".into(), "b".into(), "c".into()]);
        assert!(Rule::MaxLength(3).failure(&value, "Tags").is_none());
        assert!(Rule::MaxLength(2).failure(&value, "Tags").is_some());
    }

    #[test]
    fn test_value_rules() {
        assert!(Rule::MinValue(1.0).failure(&FieldValue::from("5"), "Uses").is_none());
        assert_eq!(
            Rule::MinValue(1.0).failure(&FieldValue::from(0.5), "Uses").unwrap(),
            "Value less than 1 is not allowed."
        );
        assert!(Rule::MaxValue(100.0).failure(&FieldValue::from(100.0), "Amount").is_none());
        assert_eq!(
            Rule::MaxValue(100.0).failure(&FieldValue::from("101"), "Amount").unwrap(),
            "Value more than 100 is not allowed."
        );
    }

    #[test]
    fn test_value_rules_reject_non_numeric_text() {
        assert!(Rule::MinValue(0.0).failure(&FieldValue::from("abc"), "Amount").is_some());
        assert!(Rule::MaxValue(10.0).failure(&FieldValue::from("abc"), "Amount").is_some());
    }

    #[test]
    fn test_pattern_applies_to_each_list_item() {
        let rule = Rule::Pattern(PatternKind::Ipv4Cidr);
        let ok = FieldValue::List(vec!["10.0.0.1".into(), "any".into()]);
        let bad = FieldValue::List(vec!["10.0.0.1".into(), "nope".into()]);
        assert!(rule.failure(&ok, "Source IPs").is_none());
        assert_eq!(rule.failure(&bad, "Source IPs").unwrap(), "Invalid IP");
    }

    #[test]
    fn test_equals_rule() {
        let rule = Rule::equals("myrole1", "Name does not match");
        assert!(rule.failure(&FieldValue::from("myrole1"), "Name").is_none());
        assert_eq!(
            rule.failure(&FieldValue::from("myrole"), "Name").unwrap(),
            "Name does not match"
        );
    }

    #[test]
    fn test_custom_rule() {
        let rule = Rule::custom(|v| v.as_text().starts_with("pk-"), "Must start with pk-");
        assert!(rule.failure(&FieldValue::from("pk-1"), "Key").is_none());
        assert!(rule.failure(&FieldValue::from("sk-1"), "Key").is_some());
        assert!(format!("{:?}", rule).contains("Must start with pk-"));
    }

    #[test]
    fn test_required_passes_on_non_empty() {
        assert!(Rule::Required.failure(&FieldValue::from("x"), "Name").is_none());
        assert!(Rule::Required.is_required());
        assert!(!Rule::MaxLength(1).is_required());
    }

    #[test]
    fn test_regex_rule() {
        assert!(Rule::regex(r"^[a-z]+$").is_ok());
        assert_eq!(Rule::regex("[").unwrap_err().code(), ErrorCode::InvalidPattern);
    }

    #[test]
    fn test_from_spec() {
        let mut spec = RuleSpec::new("max_length");
        spec.value = Some(serde_json::json!(50));
        assert!(matches!(Rule::from_spec(&spec).unwrap(), Rule::MaxLength(50)));

        let mut spec = RuleSpec::new("pattern");
        spec.pattern = Some("email".into());
        assert!(matches!(Rule::from_spec(&spec).unwrap(), Rule::Pattern(PatternKind::Email)));

        let mut spec = RuleSpec::new("pattern");
        spec.pattern = Some("custom".into());
        spec.regex = Some("^x$".into());
        assert!(matches!(Rule::from_spec(&spec).unwrap(), Rule::Pattern(PatternKind::Custom(_))));
    }

    #[test]
    fn test_from_spec_rejects_unknown_rule() {
        let err = Rule::from_spec(&RuleSpec::new("only_credit_cvc")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownRule);

        let mut spec = RuleSpec::new("pattern");
        spec.pattern = Some("hex".into());
        assert_eq!(Rule::from_spec(&spec).unwrap_err().code(), ErrorCode::UnknownRule);
    }

    #[test]
    fn test_from_spec_missing_parameter() {
        let err = Rule::from_spec(&RuleSpec::new("min_value")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidTemplate);

        let mut spec = RuleSpec::new("max_length");
        spec.value = Some(serde_json::json!(-1));
        assert_eq!(Rule::from_spec(&spec).unwrap_err().code(), ErrorCode::InvalidTemplate);
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_future_date_rule() {
        let today = day(2025, 6, 15);
        let rule = Rule::FutureDate;
        assert!(rule.failure_on(&FieldValue::from(day(2025, 6, 16)), "Start", today).is_none());
        assert!(rule.failure_on(&FieldValue::from("2026-01-01"), "Start", today).is_none());
        assert_eq!(
            rule.failure_on(&FieldValue::from(today), "Start", today).unwrap(),
            "Date must be greater than today"
        );
        assert!(rule.failure_on(&FieldValue::from(day(2024, 1, 1)), "Start", today).is_some());
        assert!(rule.failure_on(&FieldValue::from("tomorrow"), "Start", today).is_some());
    }

    #[test]
    fn test_card_month_and_year_rules() {
        let today = day(2025, 6, 15);
        assert!(Rule::CardMonth.failure_on(&FieldValue::from("12"), "Month", today).is_none());
        assert_eq!(
            Rule::CardMonth.failure_on(&FieldValue::from("13"), "Month", today).unwrap(),
            "Invalid Month."
        );
        assert!(Rule::CardYear.failure_on(&FieldValue::from("25"), "Year", today).is_none());
        assert_eq!(
            Rule::CardYear.failure_on(&FieldValue::from("24"), "Year", today).unwrap(),
            "Invalid Year."
        );
    }

    #[test]
    fn test_cvc_and_zip_code_rules() {
        assert!(Rule::Cvc(3).failure(&FieldValue::from("123"), "CVC").is_none());
        assert_eq!(Rule::Cvc(3).failure(&FieldValue::from("12"), "CVC").unwrap(), "Invalid CVC");
        assert!(Rule::Cvc(3).failure(&FieldValue::from("1234"), "CVC").is_some());

        assert!(Rule::ZipCode(5).failure(&FieldValue::from("94105"), "ZIP").is_none());
        assert!(Rule::ZipCode(5).failure(&FieldValue::from("941"), "ZIP").is_none());
        assert_eq!(
            Rule::ZipCode(5).failure(&FieldValue::from("941050"), "ZIP").unwrap(),
            "Invalid ZIP code"
        );
    }

    #[test]
    fn test_from_spec_calendar_and_payment_rules() {
        assert!(matches!(Rule::from_spec(&RuleSpec::new("future_date")).unwrap(), Rule::FutureDate));
        assert!(matches!(Rule::from_spec(&RuleSpec::new("card_month")).unwrap(), Rule::CardMonth));
        assert!(matches!(Rule::from_spec(&RuleSpec::new("card_year")).unwrap(), Rule::CardYear));

        let mut spec = RuleSpec::new("cvc");
        spec.value = Some(serde_json::json!(4));
        assert!(matches!(Rule::from_spec(&spec).unwrap(), Rule::Cvc(4)));

        let mut spec = RuleSpec::new("zip_code");
        spec.value = Some(serde_json::json!(5));
        assert!(matches!(Rule::from_spec(&spec).unwrap(), Rule::ZipCode(5)));

        assert_eq!(
            Rule::from_spec(&RuleSpec::new("cvc")).unwrap_err().code(),
            ErrorCode::InvalidTemplate
        );
    }

    #[test]
    fn test_sensitive_rules() {
        assert!(Rule::Cvc(3).is_sensitive());
        assert!(Rule::Pattern(PatternKind::CreditCard).is_sensitive());
        assert!(!Rule::Pattern(PatternKind::Email).is_sensitive());
    }
}
