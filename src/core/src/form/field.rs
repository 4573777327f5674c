//! Field definitions.
//!
//! A [`FieldDefinition`] is one logical input of a form: its value, its
//! rules, and the state the rendering layer reads back (validity, touched,
//! messages). Fields are built once as part of a form template and then
//! change only through [`FormState`](crate::form::FormState) operations.

use crate::validation::{clean_label, validate_with, Rule, ValidationPolicy};
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ═══════════════════════════════════════════════════════════════════════════════
// Control Kind
// ═══════════════════════════════════════════════════════════════════════════════

/// The kind of control a field is rendered with.
///
/// The engine only uses it to pick a field's initial empty value and to know
/// which fields carry an option list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    #[default]
    Text,
    TextArea,
    Password,
    Number,
    Checkbox,
    Radio,
    Select,
    MultiSelect,
    Date,
}

impl ControlKind {
    /// The value a fresh field of this kind starts with.
    pub fn empty_value(&self) -> FieldValue {
        match self {
            Self::Text | Self::TextArea | Self::Password | Self::Radio | Self::Select => {
                FieldValue::Text(String::new())
            }
            Self::Checkbox => FieldValue::Bool(false),
            Self::MultiSelect => FieldValue::List(Vec::new()),
            Self::Number | Self::Date => FieldValue::Empty,
        }
    }

    /// Whether the control picks from an option list.
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Radio | Self::Select | Self::MultiSelect)
    }
}

/// One entry of a select, radio or multi-select control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub name: String,
    pub value: String,
}

impl FieldOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Field Definition
// ═══════════════════════════════════════════════════════════════════════════════

/// A single form field and its current state.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    key: String,
    label: String,
    control: ControlKind,
    value: FieldValue,
    rules: Arc<[Rule]>,
    is_required: bool,
    is_valid: bool,
    is_touched: bool,
    is_read_only: bool,
    is_hidden: bool,
    is_sensitive: bool,
    validation_message: String,
    helper_message: Option<String>,
    options: Vec<FieldOption>,
}

impl FieldDefinition {
    /// Start building a field.
    pub fn builder(key: impl Into<String>, label: impl Into<String>) -> FieldBuilder {
        FieldBuilder::new(key, label)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn control(&self) -> ControlKind {
        self.control
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// True iff the rules contain `Rule::Required`.
    pub fn is_required(&self) -> bool {
        self.is_required
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn is_touched(&self) -> bool {
        self.is_touched
    }

    pub fn is_read_only(&self) -> bool {
        self.is_read_only
    }

    pub fn is_hidden(&self) -> bool {
        self.is_hidden
    }

    /// Whether the value must be kept out of logs.
    pub fn is_sensitive(&self) -> bool {
        self.is_sensitive
    }

    /// Empty when the field is valid.
    pub fn validation_message(&self) -> &str {
        &self.validation_message
    }

    pub fn helper_message(&self) -> Option<&str> {
        self.helper_message.as_deref()
    }

    pub fn options(&self) -> &[FieldOption] {
        &self.options
    }

    /// Whether the rendering layer should show the error state.
    pub fn shows_error(&self) -> bool {
        self.is_touched && !self.is_valid
    }

    /// Label with a `*` appended for required fields.
    pub fn display_label(&self) -> String {
        let label = clean_label(&self.label);
        if self.is_required {
            format!("{} *", label)
        } else {
            label
        }
    }

    /// Whether rules are currently enforced on this field.
    pub fn is_enforced(&self) -> bool {
        !(self.is_read_only || self.is_hidden)
    }

    /// Serializable snapshot for the rendering layer.
    pub fn view(&self) -> FieldView {
        FieldView {
            key: self.key.clone(),
            label: self.display_label(),
            control: self.control,
            value: self.value.clone(),
            is_required: self.is_required,
            is_valid: self.is_valid,
            is_touched: self.is_touched,
            is_read_only: self.is_read_only,
            is_hidden: self.is_hidden,
            validation_message: self.validation_message.clone(),
            helper_message: self.helper_message.clone(),
            options: self.options.clone(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // State transitions (driven by FormState)
    // ─────────────────────────────────────────────────────────────────────────

    /// Recompute `is_valid` / `validation_message` from the current value.
    pub(crate) fn revalidate(&mut self, policy: ValidationPolicy) {
        if !self.is_enforced() {
            self.force_valid();
            return;
        }
        let result = validate_with(&self.value, &self.rules, &self.label, policy);
        self.is_valid = result.is_valid;
        self.validation_message = result.message;
    }

    pub(crate) fn assign(&mut self, value: FieldValue, policy: ValidationPolicy) {
        self.value = value;
        self.revalidate(policy);
    }

    pub(crate) fn touch(&mut self) {
        self.is_touched = true;
    }

    pub(crate) fn inject_message(&mut self, message: String) {
        self.is_valid = false;
        self.validation_message = message;
        self.is_touched = true;
    }

    pub(crate) fn force_valid(&mut self) {
        self.is_valid = true;
        self.validation_message.clear();
    }

    pub(crate) fn set_read_only(&mut self, read_only: bool) {
        self.is_read_only = read_only;
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.is_hidden = hidden;
    }

    pub(crate) fn set_options(&mut self, options: Vec<FieldOption>) {
        self.options = options;
    }

    pub(crate) fn set_helper_message(&mut self, message: Option<String>) {
        self.helper_message = message;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Field View
// ═══════════════════════════════════════════════════════════════════════════════

/// What a control needs to render a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldView {
    pub key: String,
    pub label: String,
    pub control: ControlKind,
    pub value: FieldValue,
    pub is_required: bool,
    pub is_valid: bool,
    pub is_touched: bool,
    pub is_read_only: bool,
    pub is_hidden: bool,
    pub validation_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helper_message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub options: Vec<FieldOption>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for [`FieldDefinition`].
///
/// ```rust
/// use formkit_core::form::{ControlKind, FieldDefinition};
/// use formkit_core::validation::{PatternKind, Rule};
///
/// let field = FieldDefinition::builder("name", "Instance name:")
///     .control(ControlKind::Text)
///     .rule(Rule::Required)
///     .rule(Rule::MaxLength(50))
///     .rule(Rule::Pattern(PatternKind::AlphaNumericLowerHyphen))
///     .helper("Max length 50 characters.")
///     .build();
///
/// assert!(field.is_required());
/// assert!(!field.is_valid());
/// assert!(!field.is_touched());
/// ```
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    key: String,
    label: String,
    control: ControlKind,
    value: Option<FieldValue>,
    rules: Vec<Rule>,
    read_only: bool,
    hidden: bool,
    sensitive: bool,
    helper_message: Option<String>,
    options: Vec<FieldOption>,
}

impl FieldBuilder {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            control: ControlKind::default(),
            value: None,
            rules: Vec::new(),
            read_only: false,
            hidden: false,
            sensitive: false,
            helper_message: None,
            options: Vec::new(),
        }
    }

    pub fn control(mut self, control: ControlKind) -> Self {
        self.control = control;
        self
    }

    /// Initial value; defaults to the control's empty value.
    pub fn value(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Keep the value out of logs.
    pub fn sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }

    pub fn helper(mut self, message: impl Into<String>) -> Self {
        self.helper_message = Some(message.into());
        self
    }

    pub fn option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push(FieldOption::new(name, value));
        self
    }

    pub fn options(mut self, options: impl IntoIterator<Item = FieldOption>) -> Self {
        self.options.extend(options);
        self
    }

    /// Build a pristine field validated with the default policy.
    pub fn build(self) -> FieldDefinition {
        self.build_with(ValidationPolicy::default())
    }

    /// Build a pristine field validated with `policy`.
    pub fn build_with(self, policy: ValidationPolicy) -> FieldDefinition {
        let is_required = self.rules.iter().any(Rule::is_required);
        let is_sensitive = self.sensitive || self.rules.iter().any(Rule::is_sensitive);
        let value = self.value.unwrap_or_else(|| self.control.empty_value());

        let mut field = FieldDefinition {
            key: self.key,
            label: self.label,
            control: self.control,
            value,
            rules: self.rules.into(),
            is_required,
            is_valid: true,
            is_touched: false,
            is_read_only: self.read_only,
            is_hidden: self.hidden,
            is_sensitive,
            validation_message: String::new(),
            helper_message: self.helper_message,
            options: self.options,
        };
        field.revalidate(policy);
        field
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::PatternKind;

    #[test]
    fn test_pristine_required_empty_field_is_invalid_but_untouched() {
        let field = FieldDefinition::builder("amount", "Amount").rule(Rule::Required).build();
        assert!(field.is_required());
        assert!(!field.is_valid());
        assert!(!field.is_touched());
        assert!(!field.shows_error());
        assert_eq!(field.validation_message(), "Amount is required");
    }

    #[test]
    fn test_pristine_default_value_satisfying_rules_is_valid() {
        let field = FieldDefinition::builder("uses", "Number of uses")
            .value("1")
            .rule(Rule::Required)
            .rule(Rule::MinValue(1.0))
            .build();
        assert!(field.is_valid());
        assert_eq!(field.validation_message(), "");
    }

    #[test]
    fn test_read_only_field_is_valid_regardless_of_rules() {
        let field = FieldDefinition::builder("startDtCld", "Start date")
            .control(ControlKind::Date)
            .rule(Rule::Required)
            .read_only(true)
            .build();
        assert!(field.is_valid());
        assert!(!field.is_enforced());
    }

    #[test]
    fn test_control_empty_values() {
        assert_eq!(ControlKind::Checkbox.empty_value(), FieldValue::Bool(false));
        assert_eq!(ControlKind::MultiSelect.empty_value(), FieldValue::List(vec![]));
        assert_eq!(ControlKind::Date.empty_value(), FieldValue::Empty);
        assert_eq!(ControlKind::Select.empty_value(), FieldValue::from(""));
        assert!(ControlKind::Radio.has_options());
        assert!(!ControlKind::Text.has_options());
    }

    #[test]
    fn test_display_label() {
        let required = FieldDefinition::builder("name", "Name:").rule(Rule::Required).build();
        assert_eq!(required.display_label(), "Name *");
        let optional = FieldDefinition::builder("note", "Note:").build();
        assert_eq!(optional.display_label(), "Note");
    }

    #[test]
    fn test_credit_card_rule_marks_field_sensitive() {
        let field = FieldDefinition::builder("cardNumber", "Card number")
            .rule(Rule::Pattern(PatternKind::CreditCard))
            .build();
        assert!(field.is_sensitive());
        let plain = FieldDefinition::builder("name", "Name").build();
        assert!(!plain.is_sensitive());
    }

    #[test]
    fn test_view_serializes() {
        let field = FieldDefinition::builder("region", "Region")
            .control(ControlKind::Select)
            .rule(Rule::Required)
            .option("US West", "us-west-1")
            .build();
        let json = serde_json::to_value(field.view()).unwrap();
        assert_eq!(json["key"], "region");
        assert_eq!(json["label"], "Region *");
        assert_eq!(json["is_valid"], false);
        assert_eq!(json["options"][0]["value"], "us-west-1");
    }
}
