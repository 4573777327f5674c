//! Repeated sub-forms.
//!
//! Screens such as "listeners" or "allowed IPs" edit a variable number of
//! items that share one shape. A [`FormList`] holds one [`FormState`] per
//! item, all instantiated from the same prototype. A dictionary editor is a
//! list whose items have exactly two fields, `key` and `value`
//! ([`FormList::dictionary`]).

use crate::error::{FormError, Result};
use crate::form::field::FieldDefinition;
use crate::form::state::FormState;
use crate::form::template::FormTemplate;
use crate::validation::Rule;
use crate::value::FieldValue;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Field key of a dictionary row's key.
pub const DICTIONARY_KEY: &str = "key";
/// Field key of a dictionary row's value.
pub const DICTIONARY_VALUE: &str = "value";

/// An ordered list of item forms.
#[derive(Debug, Clone)]
pub struct FormList {
    prototype: FormState,
    items: Arc<[FormState]>,
}

impl FormList {
    /// An empty list whose items start as copies of `prototype`.
    pub fn new(prototype: FormState) -> Self {
        Self {
            prototype,
            items: Arc::from(Vec::new()),
        }
    }

    /// An empty list whose items are instantiated from `template`.
    pub fn from_template(template: &FormTemplate) -> Result<Self> {
        Ok(Self::new(template.instantiate()?))
    }

    /// An empty key/value dictionary editor.
    pub fn dictionary(key_rules: Vec<Rule>, value_rules: Vec<Rule>) -> Result<Self> {
        let prototype = FormState::new([
            FieldDefinition::builder(DICTIONARY_KEY, "Key").rules(key_rules).build(),
            FieldDefinition::builder(DICTIONARY_VALUE, "Value").rules(value_rules).build(),
        ])?;
        Ok(Self::new(prototype))
    }

    pub fn prototype(&self) -> &FormState {
        &self.prototype
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[FormState] {
        &self.items
    }

    /// Item at `index`, failing when out of range.
    pub fn item(&self, index: usize) -> Result<&FormState> {
        self.items.get(index).ok_or_else(|| out_of_range(index))
    }

    /// Append a pristine item.
    pub fn push(&self) -> Self {
        let mut items = self.items.to_vec();
        items.push(self.prototype.clone());
        debug!(len = items.len(), "list item added");
        self.with_items(items)
    }

    /// Append an item built from `(key, value)` pairs without touching it.
    pub fn push_with<K, V>(&self, values: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: AsRef<str>,
        V: Into<FieldValue>,
    {
        let mut item = self.prototype.clone();
        for (key, value) in values {
            item = item.set_value(key.as_ref(), value)?;
        }
        let mut items = self.items.to_vec();
        items.push(item);
        Ok(self.with_items(items))
    }

    /// Remove the item at `index`.
    pub fn remove(&self, index: usize) -> Result<Self> {
        if index >= self.items.len() {
            return Err(out_of_range(index));
        }
        let mut items = self.items.to_vec();
        items.remove(index);
        debug!(index, len = items.len(), "list item removed");
        Ok(self.with_items(items))
    }

    /// [`FormState::update`] on one item.
    pub fn update_item(&self, index: usize, key: &str, value: impl Into<FieldValue>) -> Result<Self> {
        self.map_item(index, |item| item.update(key, value))
    }

    /// [`FormState::set_validation_message`] on one item.
    pub fn set_item_message(&self, index: usize, key: &str, message: impl Into<String>) -> Result<Self> {
        self.map_item(index, |item| item.set_validation_message(key, message))
    }

    /// Every item is valid. An empty list is valid.
    pub fn is_valid(&self) -> bool {
        self.items.iter().all(FormState::is_valid)
    }

    /// Reveal required-field errors in every item.
    pub fn show_required_field_errors(&self) -> Self {
        self.with_items(
            self.items
                .iter()
                .map(FormState::show_required_field_errors)
                .collect(),
        )
    }

    /// Payload of every item, in order.
    pub fn payload(&self) -> Vec<Map<String, Value>> {
        self.items.iter().map(FormState::payload).collect()
    }

    /// Dictionary rows as a single map, later rows overriding earlier ones.
    ///
    /// Rows with an empty key are skipped.
    pub fn dictionary_payload(&self) -> Map<String, Value> {
        self.items
            .iter()
            .filter_map(|item| {
                let key = item.get(DICTIONARY_KEY)?.value().as_text();
                let value = item.get(DICTIONARY_VALUE)?.value().to_json();
                (!key.is_empty()).then_some((key, value))
            })
            .collect()
    }

    fn map_item<F>(&self, index: usize, f: F) -> Result<Self>
    where
        F: FnOnce(&FormState) -> Result<FormState>,
    {
        let mut items = self.items.to_vec();
        let slot = items.get_mut(index).ok_or_else(|| out_of_range(index))?;
        *slot = f(slot)?;
        Ok(self.with_items(items))
    }

    fn with_items(&self, items: Vec<FormState>) -> Self {
        Self {
            prototype: self.prototype.clone(),
            items: items.into(),
        }
    }
}

fn out_of_range(index: usize) -> FormError {
    FormError::unknown_field(format!("[{}]", index))
}
