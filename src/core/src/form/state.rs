//! Form state and the operations that read and transform it.
//!
//! A [`FormState`] maps field keys to [`FieldDefinition`]s. Every mutating
//! operation takes `&self` and returns a new snapshot; the original is never
//! changed. Fields that an operation does not touch are shared between the
//! old and new snapshots.
//!
//! # Submit flow
//!
//! ```rust
//! use formkit_core::form::{FieldDefinition, FormState, Submission};
//! use formkit_core::validation::{PatternKind, Rule};
//!
//! let form = FormState::new([
//!     FieldDefinition::builder("amount", "Amount")
//!         .rule(Rule::Required)
//!         .rule(Rule::Pattern(PatternKind::NumericOnly))
//!         .build(),
//! ])?;
//!
//! // Submitting an untouched form reveals the required-field error.
//! let form = match form.submit() {
//!     Submission::Blocked(revealed) => revealed,
//!     Submission::Ready(_) => unreachable!(),
//! };
//! assert!(form.field("amount")?.shows_error());
//!
//! let form = form.update("amount", "50")?;
//! assert!(matches!(form.submit(), Submission::Ready(_)));
//! # Ok::<(), formkit_core::FormError>(())
//! ```

use crate::error::{FormError, Result};
use crate::form::field::{FieldDefinition, FieldOption, FieldView};
use crate::telemetry::redact_field_value;
use crate::validation::ValidationPolicy;
use crate::value::FieldValue;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

// ═══════════════════════════════════════════════════════════════════════════════
// Form State
// ═══════════════════════════════════════════════════════════════════════════════

/// An immutable snapshot of a form.
#[derive(Debug, Clone)]
pub struct FormState {
    fields: HashMap<String, Arc<FieldDefinition>>,
    /// Keys in authored order (rendering only).
    order: Arc<[String]>,
    policy: ValidationPolicy,
}

/// Outcome of [`FormState::submit`].
#[derive(Debug, Clone)]
pub enum Submission {
    /// The form is valid; the payload holds every visible field's value.
    Ready(Map<String, Value>),
    /// The form is invalid; the snapshot has its required-field errors revealed.
    Blocked(FormState),
}

impl FormState {
    // ─────────────────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a form with the default validation policy.
    pub fn new(fields: impl IntoIterator<Item = FieldDefinition>) -> Result<Self> {
        Self::with_policy(fields, ValidationPolicy::default())
    }

    /// Build a form whose fields are validated with `policy`.
    ///
    /// Each field's initial validity is recomputed under the policy; no
    /// field is touched.
    pub fn with_policy(
        fields: impl IntoIterator<Item = FieldDefinition>,
        policy: ValidationPolicy,
    ) -> Result<Self> {
        let mut map = HashMap::new();
        let mut order = Vec::new();

        for mut field in fields {
            field.revalidate(policy);
            let key = field.key().to_string();
            if map.contains_key(&key) {
                return Err(FormError::duplicate_field(key));
            }
            order.push(key.clone());
            map.insert(key, Arc::new(field));
        }

        Ok(Self {
            fields: map,
            order: order.into(),
            policy,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Get a field, failing if the key is not part of the form.
    pub fn field(&self, key: &str) -> Result<&FieldDefinition> {
        self.fields
            .get(key)
            .map(Arc::as_ref)
            .ok_or_else(|| FormError::unknown_field(key))
    }

    /// Get a field if present.
    pub fn get(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.get(key).map(Arc::as_ref)
    }

    /// Current value at `key`.
    pub fn value(&self, key: &str) -> Result<&FieldValue> {
        self.field(key).map(FieldDefinition::value)
    }

    /// Fields in authored order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.order.iter().filter_map(|key| self.get(key))
    }

    /// Keys in authored order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Render snapshots of every field in authored order.
    pub fn views(&self) -> Vec<FieldView> {
        self.fields().map(FieldDefinition::view).collect()
    }

    /// Whether the form may be submitted.
    ///
    /// A field blocks submission when it is invalid and is either required
    /// or carries a validation message. Optional fields that satisfy their
    /// rules never block, touched or not.
    pub fn is_valid(&self) -> bool {
        self.fields.values().all(|field| !blocks_submission(field))
    }

    /// Keys of the fields currently blocking submission, in authored order.
    pub fn invalid_fields(&self) -> Vec<&str> {
        self.fields()
            .filter(|field| blocks_submission(field))
            .map(FieldDefinition::key)
            .collect()
    }

    /// Values of every visible field, keyed by field key.
    pub fn payload(&self) -> Map<String, Value> {
        self.fields()
            .filter(|field| !field.is_hidden())
            .map(|field| (field.key().to_string(), field.value().to_json()))
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Set a field's value from user input.
    ///
    /// The field becomes touched and is re-validated against its rules. A
    /// read-only or hidden field is always left valid with no message.
    pub fn update(&self, key: &str, value: impl Into<FieldValue>) -> Result<Self> {
        let policy = self.policy;
        let value = value.into();
        let next = self.with_field(key, |field| {
            field.touch();
            field.assign(value, policy);
        })?;
        next.trace_field("field updated", key);
        Ok(next)
    }

    /// Report a failure the rules cannot see (cross-field checks, server
    /// responses).
    ///
    /// The field becomes invalid and touched with `message`; its value is
    /// unchanged. The injected error stays until the next `update` of the
    /// field re-validates it.
    pub fn set_validation_message(&self, key: &str, message: impl Into<String>) -> Result<Self> {
        let message = message.into();
        let next = self.with_field(key, |field| field.inject_message(message))?;
        next.trace_field("validation message set", key);
        Ok(next)
    }

    /// Touch every required, invalid, enforced field so its error shows.
    ///
    /// Validity and messages are left exactly as they were.
    pub fn show_required_field_errors(&self) -> Self {
        let mut next = self.clone();
        let mut revealed = 0usize;

        for key in self.order.iter() {
            let Some(field) = next.fields.get_mut(key) else {
                continue;
            };
            if field.is_required() && !field.is_valid() && field.is_enforced() && !field.is_touched()
            {
                Arc::make_mut(field).touch();
                revealed += 1;
            }
        }

        debug!(revealed, "required field errors shown");
        next
    }

    /// Assign a value without touching the field (pre-filling from a record).
    pub fn set_value(&self, key: &str, value: impl Into<FieldValue>) -> Result<Self> {
        let policy = self.policy;
        let value = value.into();
        let next = self.with_field(key, |field| field.assign(value, policy))?;
        next.trace_field("field value set", key);
        Ok(next)
    }

    /// Replace the option list of a field.
    pub fn set_options(&self, key: &str, options: Vec<FieldOption>) -> Result<Self> {
        self.with_field(key, |field| field.set_options(options))
    }

    /// Replace the helper text of a field.
    pub fn set_helper_message(&self, key: &str, message: Option<String>) -> Result<Self> {
        self.with_field(key, |field| field.set_helper_message(message))
    }

    /// Hide or show a field.
    ///
    /// A hidden field is not enforced: it is valid with no message and is
    /// left out of the payload. Showing it again re-validates its current
    /// value without touching it.
    pub fn set_hidden(&self, key: &str, hidden: bool) -> Result<Self> {
        let policy = self.policy;
        let next = self.with_field(key, |field| {
            field.set_hidden(hidden);
            field.revalidate(policy);
        })?;
        next.trace_field("field visibility changed", key);
        Ok(next)
    }

    /// Touch and re-validate every visible field.
    ///
    /// Messages injected with `set_validation_message` are replaced by rule
    /// results.
    pub fn validate_all(&self) -> Self {
        let policy = self.policy;
        let mut next = self.clone();
        for field in next.fields.values_mut() {
            if field.is_hidden() {
                continue;
            }
            let field = Arc::make_mut(field);
            field.touch();
            field.revalidate(policy);
        }
        debug!(is_valid = next.is_valid(), "form re-validated");
        next
    }

    /// Check the form for submission.
    pub fn submit(&self) -> Submission {
        if self.is_valid() {
            debug!(fields = self.len(), "form ready to submit");
            Submission::Ready(self.payload())
        } else {
            debug!(invalid = ?self.invalid_fields(), "form submit blocked");
            Submission::Blocked(self.show_required_field_errors())
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    /// Copy the form and change one field in the copy.
    pub(crate) fn with_field<F>(&self, key: &str, f: F) -> Result<Self>
    where
        F: FnOnce(&mut FieldDefinition),
    {
        let mut next = self.clone();
        let field = next
            .fields
            .get_mut(key)
            .ok_or_else(|| FormError::unknown_field(key))?;
        f(Arc::make_mut(field));
        Ok(next)
    }

    fn trace_field(&self, event: &'static str, key: &str) {
        if let Some(field) = self.get(key) {
            trace!(
                field = key,
                value = %redact_field_value(field),
                is_valid = field.is_valid(),
                is_touched = field.is_touched(),
                message = field.validation_message(),
                "{}",
                event
            );
        }
    }
}

/// Hidden fields never block, even when a message was injected after hiding.
fn blocks_submission(field: &FieldDefinition) -> bool {
    !field.is_hidden()
        && !field.is_valid()
        && (field.is_required() || !field.validation_message().is_empty())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::form::field::ControlKind;
    use crate::validation::{PatternKind, Rule};

    fn banner_form() -> FormState {
        FormState::new([
            FieldDefinition::builder("title", "Title")
                .rule(Rule::Required)
                .rule(Rule::MaxLength(20))
                .build(),
            FieldDefinition::builder("link", "Link")
                .rule(Rule::Pattern(PatternKind::Url))
                .build(),
            FieldDefinition::builder("region", "Region")
                .control(ControlKind::Select)
                .rule(Rule::Required)
                .build(),
        ])
        .unwrap()
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let result = FormState::new([
            FieldDefinition::builder("a", "A").build(),
            FieldDefinition::builder("a", "A again").build(),
        ]);
        assert_eq!(result.unwrap_err().code(), ErrorCode::DuplicateField);
    }

    #[test]
    fn test_authored_order_is_kept() {
        let form = banner_form();
        let keys: Vec<_> = form.keys().collect();
        assert_eq!(keys, vec!["title", "link", "region"]);
    }

    #[test]
    fn test_update_touches_and_revalidates() {
        let form = banner_form();
        let next = form.update("title", "a".repeat(21)).unwrap();
        let title = next.field("title").unwrap();
        assert!(title.is_touched());
        assert!(!title.is_valid());
        assert_eq!(title.validation_message(), "Max length 20 characters.");

        // Original snapshot is unchanged.
        let original = form.field("title").unwrap();
        assert!(!original.is_touched());
        assert_eq!(original.value(), &FieldValue::from(""));
    }

    #[test]
    fn test_update_unknown_key_fails() {
        let err = banner_form().update("subtitle", "x").unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownField);
        assert_eq!(err.field(), Some("subtitle"));
    }

    #[test]
    fn test_value_lookup() {
        let form = banner_form().update("title", "Maintenance").unwrap();
        assert_eq!(form.value("title").unwrap(), &FieldValue::from("Maintenance"));
        assert!(form.value("missing").is_err());
    }

    #[test]
    fn test_is_valid_ignores_optional_untouched_fields() {
        let form = banner_form()
            .update("title", "Maintenance")
            .unwrap()
            .update("region", "us-west-1")
            .unwrap();
        assert!(form.is_valid());
        assert!(form.invalid_fields().is_empty());
    }

    #[test]
    fn test_invalid_optional_field_with_message_blocks() {
        let form = banner_form()
            .update("title", "Maintenance")
            .unwrap()
            .update("region", "us-west-1")
            .unwrap()
            .update("link", "not a url")
            .unwrap();
        assert!(!form.is_valid());
        assert_eq!(form.invalid_fields(), vec!["link"]);
    }

    #[test]
    fn test_set_validation_message_keeps_value() {
        let form = banner_form().update("title", "Maintenance").unwrap();
        let next = form.set_validation_message("title", "Title already in use").unwrap();
        let title = next.field("title").unwrap();
        assert!(!title.is_valid());
        assert!(title.is_touched());
        assert_eq!(title.validation_message(), "Title already in use");
        assert_eq!(title.value(), &FieldValue::from("Maintenance"));
    }

    #[test]
    fn test_update_clears_injected_message() {
        let form = banner_form()
            .set_validation_message("title", "Title already in use")
            .unwrap()
            .update("title", "Other title")
            .unwrap();
        assert!(form.field("title").unwrap().is_valid());
    }

    #[test]
    fn test_show_required_field_errors_only_touches_required_invalid() {
        let form = banner_form().update("title", "Maintenance").unwrap();
        let revealed = form.show_required_field_errors();

        assert!(revealed.field("region").unwrap().is_touched());
        assert!(!revealed.field("link").unwrap().is_touched());
        assert_eq!(
            revealed.field("region").unwrap().validation_message(),
            form.field("region").unwrap().validation_message()
        );
    }

    #[test]
    fn test_show_required_field_errors_skips_read_only() {
        let form = FormState::new([FieldDefinition::builder("computed", "Computed")
            .rule(Rule::Required)
            .read_only(true)
            .build()])
        .unwrap();
        let revealed = form.show_required_field_errors();
        assert!(!revealed.field("computed").unwrap().is_touched());
    }

    #[test]
    fn test_set_value_does_not_touch() {
        let form = banner_form().set_value("title", "Prefilled").unwrap();
        let title = form.field("title").unwrap();
        assert!(!title.is_touched());
        assert!(title.is_valid());
    }

    #[test]
    fn test_hidden_fields_do_not_block_and_leave_payload() {
        let form = banner_form()
            .update("title", "Maintenance")
            .unwrap()
            .set_hidden("region", true)
            .unwrap();
        assert!(form.is_valid());
        assert!(!form.payload().contains_key("region"));

        let shown = form.set_hidden("region", false).unwrap();
        assert!(!shown.is_valid());
        assert!(!shown.field("region").unwrap().is_touched());
    }

    #[test]
    fn test_message_injected_into_hidden_field_does_not_block() {
        let form = banner_form()
            .update("title", "Maintenance")
            .unwrap()
            .set_hidden("link", true)
            .unwrap()
            .set_validation_message("link", "Link is unreachable")
            .unwrap();
        assert!(!form.field("link").unwrap().is_valid());
        assert_eq!(form.invalid_fields(), vec!["region"]);

        let form = form.update("region", "us-west-1").unwrap();
        assert!(form.is_valid());
        assert!(matches!(form.submit(), Submission::Ready(_)));
    }

    #[test]
    fn test_validate_all_touches_visible_fields() {
        let form = banner_form().validate_all();
        assert!(form.fields().all(FieldDefinition::is_touched));
        assert!(!form.is_valid());
    }

    #[test]
    fn test_set_options() {
        let form = banner_form()
            .set_options("region", vec![FieldOption::new("US West", "us-west-1")])
            .unwrap();
        assert_eq!(form.field("region").unwrap().options().len(), 1);
    }

    #[test]
    fn test_payload() {
        let form = banner_form()
            .update("title", "Maintenance")
            .unwrap()
            .update("region", "us-west-1")
            .unwrap();
        let payload = form.payload();
        assert_eq!(payload["title"], "Maintenance");
        assert_eq!(payload["region"], "us-west-1");
        assert_eq!(payload["link"], "");
    }

    #[test]
    fn test_submit_blocked_reveals_errors() {
        match banner_form().submit() {
            Submission::Blocked(form) => {
                assert!(form.field("title").unwrap().shows_error());
                assert!(form.field("region").unwrap().shows_error());
            }
            Submission::Ready(_) => panic!("empty form must not submit"),
        }
    }

    #[test]
    fn test_collect_all_policy_applies_to_updates() {
        let form = FormState::with_policy(
            [FieldDefinition::builder("code", "Code")
                .rule(Rule::MaxLength(2))
                .rule(Rule::Pattern(PatternKind::NumericOnly))
                .build()],
            ValidationPolicy::collect_all(),
        )
        .unwrap();
        let form = form.update("code", "abc").unwrap();
        assert!(form.field("code").unwrap().validation_message().contains("; "));
    }
}
