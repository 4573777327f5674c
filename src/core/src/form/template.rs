//! Declarative form templates.
//!
//! A [`FormTemplate`] lists a form's fields the way a screen author writes
//! them, in TOML or JSON. [`FormTemplate::instantiate`] builds a pristine
//! [`FormState`] from it; calling it again is how a form is reset.
//!
//! ```toml
//! name = "create-coupon"
//!
//! [[fields]]
//! key = "amount"
//! label = "Amount"
//! rules = [{ kind = "required" }, { kind = "pattern", pattern = "numeric_only" }]
//!
//! [[fields]]
//! key = "uses"
//! label = "Number of uses"
//! control = "number"
//! value = 1
//! rules = [{ kind = "min_value", value = 1 }]
//! ```

use crate::error::{FormError, Result};
use crate::form::field::{ControlKind, FieldDefinition, FieldOption};
use crate::form::state::FormState;
use crate::validation::{Rule, RuleSpec, ValidationPolicy};
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// A form definition that can be loaded from a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

/// One field of a [`FormTemplate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub key: String,
    pub label: String,

    #[serde(default)]
    pub control: ControlKind,

    /// Initial value; the control's empty value when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,

    #[serde(default)]
    pub rules: Vec<RuleSpec>,

    #[serde(default)]
    pub read_only: bool,

    #[serde(default)]
    pub hidden: bool,

    #[serde(default)]
    pub sensitive: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
}

impl FieldSpec {
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
            helper: None,
            options: Vec::new(),
        }
    }

    /// Resolve the rules and build a pristine field.
    pub fn build(&self, policy: ValidationPolicy) -> Result<FieldDefinition> {
        if self.key.trim().is_empty() {
            return Err(FormError::invalid_template("field key must not be empty"));
        }

        let rules = self
            .rules
            .iter()
            .map(Rule::from_spec)
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.with_field(self.key.clone()))?;

        let mut builder = FieldDefinition::builder(self.key.clone(), self.label.clone())
            .control(self.control)
            .rules(rules)
            .read_only(self.read_only)
            .hidden(self.hidden)
            .sensitive(self.sensitive)
            .options(self.options.iter().cloned());
        if let Some(value) = self.initial_value()? {
            builder = builder.value(value);
        }
        if let Some(helper) = &self.helper {
            builder = builder.helper(helper.clone());
        }

        Ok(builder.build_with(policy))
    }

    /// The authored value. Date pickers get a `YYYY-MM-DD` literal parsed
    /// into a date; every other control keeps the literal as written.
    fn initial_value(&self) -> Result<Option<FieldValue>> {
        match (&self.value, self.control) {
            (Some(FieldValue::Text(text)), ControlKind::Date) if !text.is_empty() => {
                let date = FieldValue::from(text.as_str()).as_date().ok_or_else(|| {
                    FormError::invalid_template(format!("'{}' is not a YYYY-MM-DD date", text))
                        .with_field(self.key.clone())
                })?;
                Ok(Some(FieldValue::Date(date)))
            }
            (value, _) => Ok(value.clone()),
        }
    }
}

impl FormTemplate {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { name: None, fields }
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Load a template, choosing the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let template = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&source)?,
            Some("json") => Self::from_json_str(&source)?,
            other => {
                return Err(FormError::invalid_template(format!(
                    "unsupported template extension: {}",
                    other.unwrap_or("<none>")
                )))
            }
        };
        debug!(
            path = %path.display(),
            fields = template.fields.len(),
            "form template loaded"
        );
        Ok(template)
    }

    /// Build a pristine form with the default policy.
    pub fn instantiate(&self) -> Result<FormState> {
        self.instantiate_with(ValidationPolicy::default())
    }

    /// Build a pristine form validated with `policy`.
    pub fn instantiate_with(&self, policy: ValidationPolicy) -> Result<FormState> {
        let fields = self
            .fields
            .iter()
            .map(|spec| spec.build(policy))
            .collect::<Result<Vec<_>>>()?;
        FormState::with_policy(fields, policy)
    }
}
