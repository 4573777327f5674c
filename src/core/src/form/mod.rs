//! Form state engine.
//!
//! - [`field`]: field definitions and their builder
//! - [`state`]: immutable [`FormState`] snapshots and the update, query and
//!   reveal operations
//! - [`coordination`]: patching sibling fields right after an update
//! - [`collection`]: lists of item sub-forms and key/value dictionaries
//! - [`template`]: TOML/JSON form templates

pub mod collection;
pub mod coordination;
pub mod field;
pub mod state;
pub mod template;

pub use collection::{FormList, DICTIONARY_KEY, DICTIONARY_VALUE};
pub use coordination::{FieldPatch, PendingUpdate};
pub use field::{ControlKind, FieldBuilder, FieldDefinition, FieldOption, FieldView};
pub use state::{FormState, Submission};
pub use template::{FieldSpec, FormTemplate};
