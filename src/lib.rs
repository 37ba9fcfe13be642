//! # Formguard
//!
//! Declarative validation for interactive forms.
//!
//! Fields and radio/checkbox groups are registered with ordered rule lists.
//! The engine evaluates them on submit and on input changes, mixes immediate
//! answers with asynchronous checks, and hands a plain snapshot of the
//! outcome to a renderer. It never touches a UI toolkit itself: inputs and
//! forms are reached through the [`input::InputHandle`] and
//! [`input::FormHandle`] traits.
//!
//! ## Quick Example
//!
//! ```rust
//! # tokio_test::block_on(async {
//! use formguard::prelude::*;
//! use formguard::testing::{MockForm, MockInput};
//!
//! let email = MockInput::text("not-an-email");
//! let terms = [MockInput::checkbox(), MockInput::checkbox()];
//! let form = MockForm::new()
//!     .with_input("#email", &email)
//!     .with_group("#terms", &terms)
//!     .into_handle();
//!
//! let mut engine = FormValidator::new(form);
//! engine
//!     .add_field("#email", vec![FieldRule::required(), FieldRule::email()], None)
//!     .await
//!     .unwrap();
//! engine
//!     .add_required_group("#terms", Some("Accept at least one".into()), None)
//!     .await
//!     .unwrap();
//!
//! assert_eq!(engine.submit().await, SubmitOutcome::Fail);
//!
//! email.set_text("a@b.com");
//! terms[0].set_checked(true);
//! assert_eq!(engine.submit().await, SubmitOutcome::Success);
//! # });
//! ```
//!
//! ## Feature flags
//!
//! - `tracing` (default): emit diagnostics and pass events through `tracing`
//! - `serde`: `Serialize`/`Deserialize` for configuration, values and snapshots
//! - `proptest`: `Arbitrary` implementations in [`testing`]

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

#[macro_use]
mod macros;

pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod field;
pub mod input;
pub mod join;
pub mod listener;
pub mod message;
pub mod rule;
pub mod snapshot;
pub mod submit;
pub mod testing;
pub mod value;
pub mod verdict;

// Re-exports
pub use engine::FormValidator;
pub use error::{ConfigError, EngineError};
pub use rule::{FieldRule, RuleKind};
pub use value::FieldValue;
pub use verdict::Verdict;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{FieldConfig, GlobalConfig, TooltipPosition};
    pub use crate::diagnostics::{Diagnostic, Severity};
    pub use crate::engine::FormValidator;
    pub use crate::error::{ConfigError, EngineError};
    pub use crate::field::{GroupKind, Validity};
    pub use crate::input::{EventKind, FormHandle, InputHandle, InputKind, InputRef};
    pub use crate::message::LocaleEntry;
    pub use crate::rule::{FieldRule, FileConstraints, RuleKind, RuleValue, ValidatorReturn};
    pub use crate::snapshot::{FieldsSnapshot, FormSnapshot, Renderer};
    pub use crate::submit::{SubmitEvent, SubmitOutcome};
    pub use crate::value::{FieldValue, FileInfo};
    pub use crate::verdict::{ValidatorError, Verdict};
}
