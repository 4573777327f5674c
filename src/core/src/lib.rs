//! # Formkit Core
//!
//! Declarative form state and validation.
//!
//! ## Architecture
//!
//! - **Values**: [`FieldValue`], the tagged value a control holds
//! - **Validation**: the closed rule catalog and the pure `validate` function
//! - **Form**: immutable [`FormState`] snapshots, update / query / reveal
//!   operations, dependent-field coordination, item lists and templates
//! - **Config**: policy, logging and template lookup from file + environment
//! - **Telemetry**: structured logging with redaction of sensitive values
//!
//! ## Example
//!
//! ```rust
//! use formkit_core::prelude::*;
//!
//! let form = FormState::new([
//!     FieldDefinition::builder("name", "Instance name")
//!         .rule(Rule::Required)
//!         .rule(Rule::MaxLength(50))
//!         .rule(Rule::Pattern(PatternKind::AlphaNumericLowerHyphen))
//!         .build(),
//! ])?;
//!
//! let form = form.update("name", "My Instance")?;
//! let name = form.field("name")?;
//! assert!(name.shows_error());
//! assert_eq!(
//!     name.validation_message(),
//!     "Only lower case alphanumeric and hypen(-) allowed for Instance name."
//! );
//!
//! let form = form.update("name", "my-instance")?;
//! assert!(form.is_valid());
//! # Ok::<(), formkit_core::FormError>(())
//! ```

pub mod config;
pub mod error;
pub mod form;
pub mod telemetry;
pub mod validation;
pub mod value;

pub use error::{ErrorCode, ErrorSeverity, FormError, Result};
pub use value::FieldValue;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::FormkitConfig;
    pub use crate::error::{ErrorCode, ErrorSeverity, FormError, Result};
    pub use crate::form::{
        ControlKind, FieldDefinition, FieldOption, FieldPatch, FieldSpec, FieldView, FormList,
        FormState, FormTemplate, PendingUpdate, Submission,
    };
    pub use crate::validation::{
        validate, validate_with, FailureMode, PatternKind, Rule, RuleSpec, Validation,
        ValidationPolicy,
    };
    pub use crate::value::FieldValue;
}
