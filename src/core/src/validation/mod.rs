//! Field validation: the rule catalog and the function that applies it.
//!
//! - **Rules**: the closed [`Rule`] catalog
//!   - Required fields
//!   - Length bounds (min, max), counted in characters or list items
//!   - Numeric bounds (min, max)
//!   - Patterns: resource names, alphanumerics, digits, email, URL, IPv4/CIDR,
//!     payment cards, custom regexes
//!   - Calendar and payment checks: future dates, card expiry month and
//!     year, CVC and ZIP code lengths
//!   - Custom predicates (e.g. "must equal the resource name")
//!
//! - **Validation**: [`validate`] / [`validate_with`]
//!   - Empty and optional is always valid
//!   - Empty and required reports only the required message
//!   - Otherwise the first failing rule in list order wins, unless the
//!     policy asks to collect every failure
//!
//! # Example
//!
//! ```rust
//! use formkit_core::validation::{validate, PatternKind, Rule};
//! use formkit_core::FieldValue;
//!
//! let rules = vec![Rule::Required, Rule::Pattern(PatternKind::NumericOnly)];
//!
//! let result = validate(&FieldValue::from("abc"), &rules, "Amount");
//! assert!(!result.is_valid);
//! assert_eq!(result.message, "Only numbers are allowed for Amount.");
//!
//! let result = validate(&FieldValue::from(""), &rules, "Amount");
//! assert_eq!(result.message, "Amount is required");
//! ```

pub mod pattern;
pub mod payment;
pub mod rules;
pub mod validator;

pub use pattern::{card_network, luhn_valid, CustomPattern, PatternKind};
pub use payment::{card_expiry_failure, card_expiry_valid, card_month_valid, card_year_valid};
pub use rules::{CustomRule, Rule, RuleSpec};
pub use validator::{
    clean_label, validate, validate_with, FailureMode, Validation, ValidationPolicy,
};
