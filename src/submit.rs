//! Submission handling
//!
//! A submit runs through `Idle -> Validating -> Idle`. While validating, the
//! form's controls are disabled when `lock_form` is set. Once the full pass
//! settles the controls are re-enabled and exactly one of the success or
//! fail callbacks runs.
//!
//! ```
//! # tokio_test::block_on(async {
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//!
//! use formguard::prelude::*;
//! use formguard::testing::{MockForm, MockInput};
//!
//! let name = MockInput::text("Ada");
//! let mut engine = FormValidator::new(MockForm::new().with_input("#name", &name).into_handle());
//! engine.add_field("#name", vec![FieldRule::required()], None).await.unwrap();
//!
//! let sent = Arc::new(AtomicBool::new(false));
//! let flag = sent.clone();
//! engine.on_success(move |_event| flag.store(true, Ordering::SeqCst));
//!
//! let mut event = SubmitEvent::new();
//! assert_eq!(engine.handle_submit(&mut event).await, SubmitOutcome::Success);
//! assert!(event.is_default_prevented());
//! assert!(sent.load(Ordering::SeqCst));
//! # });
//! ```

use crate::engine::FormValidator;

/// The submit notification handed to the engine by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    /// Fresh event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the host from performing its own submission.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether [`SubmitEvent::prevent_default`] was called.
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Where the submission controller is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubmitState {
    /// No submit in progress
    #[default]
    Idle,
    /// A submit pass is running
    Validating,
}

/// How a submit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmitOutcome {
    /// Everything valid, success callback ran
    Success,
    /// Something invalid, fail callback ran
    Fail,
    /// The engine was torn down and no longer handles submits
    Ignored,
}

impl FormValidator {
    /// Handle a submit notification.
    ///
    /// Marks the form submitted, runs a full pass with the form locked if so
    /// configured, focuses the first invalid field on failure, unlocks, and
    /// runs the matching callback.
    pub async fn handle_submit(&mut self, event: &mut SubmitEvent) -> SubmitOutcome {
        if !self.submit_attached {
            return SubmitOutcome::Ignored;
        }

        event.prevent_default();
        self.is_submitted = true;
        self.submit_state = SubmitState::Validating;

        let lock = self.config.lock_form;
        if lock {
            self.lock_form();
        }

        let valid = self.validate_all().await;

        if !valid && self.config.focus_invalid_field {
            self.focus_first_invalid();
        }
        if lock {
            self.unlock_form();
        }

        let outcome = if valid {
            if let Some(callback) = self.on_success.as_mut() {
                callback(event);
            }
            SubmitOutcome::Success
        } else {
            let fields = self.fields_snapshot();
            if let Some(callback) = self.on_fail.as_mut() {
                callback(&fields);
            }
            SubmitOutcome::Fail
        };

        log_info!(outcome = ?outcome, "form submitted");
        self.submit_state = SubmitState::Idle;
        outcome
    }

    /// Submit programmatically with a fresh event.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let mut event = SubmitEvent::new();
        self.handle_submit(&mut event).await
    }

    /// Where the submission controller is.
    pub fn submit_state(&self) -> SubmitState {
        self.submit_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlobalConfig;
    use crate::input::InputHandle;
    use crate::rule::FieldRule;
    use crate::snapshot::FieldsSnapshot;
    use crate::testing::{MockForm, MockInput};
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_fail_callback_receives_fields() {
        let input = MockInput::text("");
        let form = MockForm::new().with_input("#f", &input).into_handle();
        let mut engine = FormValidator::new(form);
        engine.add_field("#f", vec![FieldRule::required()], None).await.unwrap();

        let seen: Arc<Mutex<Option<FieldsSnapshot>>> = Arc::default();
        let sink = seen.clone();
        engine
            .on_success(|_| panic!("form should not be valid"))
            .on_fail(move |fields| *sink.lock().unwrap() = Some(fields.clone()));

        assert_eq!(engine.submit().await, SubmitOutcome::Fail);
        let fields = seen.lock().unwrap().take().unwrap();
        assert!(fields["#f"].validity.is_invalid());
        assert_eq!(input.focus_count(), 1);
        assert_eq!(engine.submit_state(), SubmitState::Idle);
    }

    #[tokio::test]
    async fn test_controls_unlocked_after_submit() {
        let input = MockInput::text("x");
        let button = MockInput::text("");
        let form = MockForm::new()
            .with_input("#f", &input)
            .with_control(&button)
            .into_handle();
        let mut engine = FormValidator::new(form);
        engine
            .add_field(
                "#f",
                vec![FieldRule::custom_async(|_, _| async { Ok(true) })],
                None,
            )
            .await
            .unwrap();

        assert_eq!(engine.submit().await, SubmitOutcome::Success);
        assert!(input.is_enabled());
        assert!(button.is_enabled());
    }

    #[tokio::test]
    async fn test_no_focus_when_disabled() {
        let input = MockInput::text("");
        let form = MockForm::new().with_input("#f", &input).into_handle();
        let mut engine = FormValidator::new(form)
            .with_config(GlobalConfig::default().with_focus_invalid_field(false));
        engine.add_field("#f", vec![FieldRule::required()], None).await.unwrap();

        engine.submit().await;
        assert_eq!(input.focus_count(), 0);
    }

    #[tokio::test]
    async fn test_destroyed_engine_ignores_submit() {
        let input = MockInput::text("");
        let form = MockForm::new().with_input("#f", &input).into_handle();
        let mut engine = FormValidator::new(form);
        engine.add_field("#f", vec![FieldRule::required()], None).await.unwrap();

        engine.destroy();
        let mut event = SubmitEvent::new();
        assert_eq!(engine.handle_submit(&mut event).await, SubmitOutcome::Ignored);
        assert!(!event.is_default_prevented());
        assert!(!engine.is_submitted());
    }
}
