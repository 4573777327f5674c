//! Dependent-field coordination.
//!
//! Some screens couple fields: choosing "start now" on a radio makes the
//! sibling date picker read-only and valid. Those side effects live at the
//! call site, applied to the snapshot an engine call just returned and
//! before the screen stores it.
//!
//! [`PendingUpdate`] is that window. It is only obtainable from
//! [`FormState::begin_update`] or [`FormState::begin_validation_message`],
//! so patches always land on the latest snapshot. [`FieldPatch`] edits flags
//! only; it cannot re-run rules. When a sibling's rules must be evaluated
//! again, commit and call [`FormState::update`] for that sibling.
//!
//! ```rust
//! use formkit_core::form::{ControlKind, FieldDefinition, FormState};
//! use formkit_core::validation::Rule;
//!
//! let form = FormState::new([
//!     FieldDefinition::builder("startDt", "Start date")
//!         .control(ControlKind::Radio)
//!         .option("Now", "1")
//!         .option("Pick a date", "2")
//!         .build(),
//!     FieldDefinition::builder("startDtCld", "Start date")
//!         .control(ControlKind::Date)
//!         .rule(Rule::Required)
//!         .build(),
//! ])?;
//!
//! let pending = form.begin_update("startDt", "1")?;
//! let start_now = pending.changed_value().as_str() == Some("1");
//! let form = pending
//!     .patch_if(start_now, "startDtCld", |field| {
//!         field.read_only(true);
//!     })?
//!     .commit();
//!
//! assert!(form.field("startDtCld")?.is_valid());
//! assert!(form.is_valid());
//! # Ok::<(), formkit_core::FormError>(())
//! ```

use crate::error::Result;
use crate::form::field::{FieldDefinition, FieldOption};
use crate::form::state::FormState;
use crate::value::FieldValue;
use tracing::debug;

/// A snapshot fresh from an engine call, open for sibling patches.
#[derive(Debug, Clone)]
#[must_use = "a pending update does nothing until it is committed"]
pub struct PendingUpdate {
    form: FormState,
    key: String,
    value: FieldValue,
    patched: Vec<String>,
}

impl FormState {
    /// [`FormState::update`], leaving the result open for dependent patches.
    pub fn begin_update(&self, key: &str, value: impl Into<FieldValue>) -> Result<PendingUpdate> {
        let value = value.into();
        let form = self.update(key, value.clone())?;
        Ok(PendingUpdate::new(form, key, value))
    }

    /// [`FormState::set_validation_message`], leaving the result open for
    /// dependent patches.
    pub fn begin_validation_message(
        &self,
        key: &str,
        message: impl Into<String>,
    ) -> Result<PendingUpdate> {
        let form = self.set_validation_message(key, message)?;
        let value = form.value(key)?.clone();
        Ok(PendingUpdate::new(form, key, value))
    }
}

impl PendingUpdate {
    fn new(form: FormState, key: &str, value: FieldValue) -> Self {
        Self {
            form,
            key: key.to_string(),
            value,
            patched: Vec::new(),
        }
    }

    /// Key of the field the engine call changed.
    pub fn changed_key(&self) -> &str {
        &self.key
    }

    /// Value of the field the engine call changed.
    pub fn changed_value(&self) -> &FieldValue {
        &self.value
    }

    /// The snapshot as patched so far.
    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Edit the flags of the field at `key`.
    pub fn patch<F>(mut self, key: &str, f: F) -> Result<Self>
    where
        F: FnOnce(&mut FieldPatch<'_>),
    {
        self.form = self.form.with_field(key, |field| f(&mut FieldPatch { field }))?;
        self.patched.push(key.to_string());
        Ok(self)
    }

    /// [`patch`](Self::patch) when `condition` holds; otherwise unchanged.
    pub fn patch_if<F>(self, condition: bool, key: &str, f: F) -> Result<Self>
    where
        F: FnOnce(&mut FieldPatch<'_>),
    {
        if condition {
            self.patch(key, f)
        } else {
            Ok(self)
        }
    }

    /// Finish coordination and hand back the snapshot to store.
    pub fn commit(self) -> FormState {
        debug!(
            field = %self.key,
            patched = ?self.patched,
            is_valid = self.form.is_valid(),
            "form update committed"
        );
        self.form
    }
}

/// Flag-level edits of one sibling field.
pub struct FieldPatch<'a> {
    field: &'a mut FieldDefinition,
}

impl FieldPatch<'_> {
    /// Set the read-only flag. A read-only field is always valid.
    ///
    /// Clearing the flag does not re-run rules; follow up with an update of
    /// the field if its value must be checked again.
    pub fn read_only(&mut self, read_only: bool) -> &mut Self {
        self.field.set_read_only(read_only);
        if read_only {
            self.field.force_valid();
        }
        self
    }

    /// Mark the field valid and clear its message.
    pub fn mark_valid(&mut self) -> &mut Self {
        self.field.force_valid();
        self
    }

    /// Replace the option list.
    pub fn options(&mut self, options: Vec<FieldOption>) -> &mut Self {
        self.field.set_options(options);
        self
    }

    /// Replace the helper text.
    pub fn helper(&mut self, message: Option<String>) -> &mut Self {
        self.field.set_helper_message(message);
        self
    }

    /// The field as patched so far.
    pub fn field(&self) -> &FieldDefinition {
        &*self.field
    }
}
