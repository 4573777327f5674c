//! Raw field values.
//!
//! A control hands the engine whatever it produced: text from an input,
//! a number from a spinner, a flag from a checkbox, a date from a picker, or a
//! list of selections from a multi-select. The engine treats the value as
//! opaque except where a rule needs to inspect it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The current raw value of a field.
///
/// Deserialized literals never become [`FieldValue::Date`]: every string
/// stays text. Date controls in templates are parsed by the template layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// No value selected yet.
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
    Date(NaiveDate),
}

impl FieldValue {
    /// Whether the value counts as "not provided".
    ///
    /// Empty text, `false`, zero, an empty list and [`FieldValue::Empty`] are
    /// all empty. With `trim_whitespace` set, text made only of whitespace is
    /// empty as well.
    pub fn is_empty(&self, trim_whitespace: bool) -> bool {
        match self {
            Self::Empty => true,
            Self::Bool(b) => !b,
            Self::Number(n) => *n == 0.0 || n.is_nan(),
            Self::Date(_) => false,
            Self::Text(s) if trim_whitespace => s.trim().is_empty(),
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    /// Text form of the value, used by length and pattern rules.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::Text(s) => s.clone(),
            Self::List(items) => items.join(","),
        }
    }

    /// Numeric form of the value, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if !n.is_nan() => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
            _ => None,
        }
    }

    /// Length in the unit length rules count: items for lists, characters otherwise.
    pub fn len(&self) -> usize {
        match self {
            Self::List(items) => items.len(),
            other => other.as_text().chars().count(),
        }
    }

    /// Calendar date of the value. Text is read as `YYYY-MM-DD`.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// JSON representation used when assembling a submit payload.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Empty => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => serde_json::Value::Array(
                items.iter().cloned().map(serde_json::Value::String).collect(),
            ),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_equivalents() {
        assert!(FieldValue::Empty.is_empty(false));
        assert!(FieldValue::from("").is_empty(false));
        assert!(FieldValue::from(false).is_empty(false));
        assert!(FieldValue::from(0.0).is_empty(false));
        assert!(FieldValue::List(vec![]).is_empty(false));

        assert!(!FieldValue::from("0").is_empty(false));
        assert!(!FieldValue::from(true).is_empty(false));
        assert!(!FieldValue::from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).is_empty(false));
    }

    #[test]
    fn test_whitespace_only_depends_on_trim() {
        let value = FieldValue::from("   ");
        assert!(!value.is_empty(false));
        assert!(value.is_empty(true));
    }

    #[test]
    fn test_as_number() {
        assert_eq!(FieldValue::from(" 50 ").as_number(), Some(50.0));
        assert_eq!(FieldValue::from("abc").as_number(), None);
        assert_eq!(FieldValue::from(2.5).as_number(), Some(2.5));
        assert_eq!(FieldValue::from(true).as_number(), None);
    }

    #[test]
    fn test_len_counts_items_for_lists() {
        let list = FieldValue::List(vec!["a".into(), "bb".into()]);
        assert_eq!(list.len(), 2);
        assert_eq!(FieldValue::from("héllo").len(), 5);
    }

    #[test]
    fn test_untagged_deserialization() {
        let v: FieldValue = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(v, FieldValue::from("abc"));
        let v: FieldValue = serde_json::from_str("12").unwrap();
        assert_eq!(v, FieldValue::from(12.0));
        let v: FieldValue = serde_json::from_str("[\"x\"]").unwrap();
        assert_eq!(v, FieldValue::List(vec!["x".into()]));
        let v: FieldValue = serde_json::from_str("null").unwrap();
        assert_eq!(v, FieldValue::Empty);
    }

    #[test]
    fn test_date_like_text_stays_text() {
        let text = FieldValue::from("2024-01-01");
        let json = serde_json::to_string(&text).unwrap();
        let back: FieldValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, text);
        assert_eq!(back.as_str(), Some("2024-01-01"));

        // A date serializes as text and comes back as text.
        let day = FieldValue::from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let back: FieldValue = serde_json::from_str(&serde_json::to_string(&day).unwrap()).unwrap();
        assert_eq!(back, text);
    }

    #[test]
    fn test_as_date() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(FieldValue::from(day).as_date(), Some(day));
        assert_eq!(FieldValue::from("2024-02-29").as_date(), Some(day));
        assert_eq!(FieldValue::from("2023-02-29").as_date(), None);
        assert_eq!(FieldValue::from(3.0).as_date(), None);
    }

    #[test]
    fn test_to_json() {
        assert_eq!(FieldValue::from("a").to_json(), serde_json::json!("a"));
        assert_eq!(FieldValue::Empty.to_json(), serde_json::Value::Null);
        assert_eq!(
            FieldValue::List(vec!["a".into()]).to_json(),
            serde_json::json!(["a"])
        );
    }
}
