//! The validation engine
//!
//! [`FormValidator`] owns the field and group registries of one form, runs
//! validation passes over them and publishes the outcome to a [`Renderer`].
//!
//! Every pass borrows the engine mutably for its whole duration, so passes
//! never overlap: a second pass can only start once the first one's future
//! has completed. Within a pass, deferred checks of all fields run
//! concurrently and each field is settled as soon as its own checks are done.
//!
//! # Example
//!
//! ```
//! # tokio_test::block_on(async {
//! use formguard::prelude::*;
//! use formguard::testing::{MockForm, MockInput};
//!
//! let email = MockInput::text("not-an-email");
//! let form = MockForm::new().with_input("#email", &email).into_handle();
//!
//! let mut engine = FormValidator::new(form);
//! engine
//!     .add_field("#email", vec![FieldRule::required(), FieldRule::email()], None)
//!     .await?;
//!
//! assert!(!engine.validate_all().await);
//! assert_eq!(
//!     engine.field("#email").and_then(|f| f.error_message()),
//!     Some("Email has invalid format")
//! );
//!
//! email.set_text("a@b.com");
//! assert!(engine.validate_all().await);
//! # Ok::<(), formguard::error::ConfigError>(())
//! # }).unwrap();
//! ```

use std::fmt;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use indexmap::IndexMap;

use crate::config::{FieldConfig, GlobalConfig};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{ConfigError, EngineError};
use crate::evaluator::{check_group, Evaluator};
use crate::field::{Field, Group, GroupKind, Validity};
use crate::input::{same_input, EventKind, FormHandle, InputRef};
use crate::join::{RuleJoin, Settled};
use crate::listener::ListenerRegistry;
use crate::message::{LocaleEntry, MessageResolver};
use crate::rule::{FieldRule, GroupRule};
use crate::snapshot::{FieldSnapshot, FieldsSnapshot, FormSnapshot, Renderer, TargetReport};
use crate::submit::{SubmitEvent, SubmitState};
use crate::verdict::PassMode;

/// Called after a submit pass in which every field and group is valid.
pub type SuccessCallback = Box<dyn FnMut(&SubmitEvent) + Send>;

/// Called after a submit pass in which something is invalid.
pub type FailCallback = Box<dyn FnMut(&FieldsSnapshot) + Send>;

/// Validation engine for one form.
pub struct FormValidator {
    pub(crate) form: Arc<dyn FormHandle>,
    pub(crate) fields: IndexMap<String, Field>,
    pub(crate) groups: IndexMap<String, Group>,
    pub(crate) config: GlobalConfig,
    pub(crate) messages: MessageResolver,
    pub(crate) is_valid: bool,
    pub(crate) is_submitted: bool,
    pub(crate) listeners: ListenerRegistry,
    pub(crate) submit_attached: bool,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) renderer: Option<Box<dyn Renderer>>,
    pub(crate) on_success: Option<SuccessCallback>,
    pub(crate) on_fail: Option<FailCallback>,
    pub(crate) submit_state: SubmitState,
}

impl FormValidator {
    /// Engine over `form` with default configuration and no locale table.
    pub fn new(form: Arc<dyn FormHandle>) -> Self {
        Self {
            form,
            fields: IndexMap::new(),
            groups: IndexMap::new(),
            config: GlobalConfig::default(),
            messages: MessageResolver::default(),
            is_valid: false,
            is_submitted: false,
            listeners: ListenerRegistry::new(),
            submit_attached: true,
            diagnostics: Diagnostics::new(),
            renderer: None,
            on_success: None,
            on_fail: None,
            submit_state: SubmitState::Idle,
        }
    }

    /// Replace the global configuration.
    pub fn with_config(mut self, config: GlobalConfig) -> Self {
        self.config = config;
        self
    }

    /// Install a locale table.
    pub fn with_locales(mut self, table: Vec<LocaleEntry>) -> Self {
        let current = self.messages.locale().map(str::to_string);
        self.messages = MessageResolver::new(table);
        self.messages.set_locale(current);
        self
    }

    /// Install the renderer that receives snapshots after each pass.
    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Register a field.
    ///
    /// Fails when `name` does not resolve to an input, when `rules` is empty,
    /// or when a rule has neither or both of a catalog rule and a validator.
    /// Registering a name again replaces the previous field. If the form has
    /// already been submitted, a full pass runs before this returns.
    pub async fn add_field(
        &mut self,
        name: &str,
        rules: Vec<FieldRule>,
        config: Option<FieldConfig>,
    ) -> Result<&mut Self, ConfigError> {
        if rules.is_empty() {
            return Err(ConfigError::EmptyRules {
                field: name.to_string(),
            });
        }
        for rule in &rules {
            rule.check_shape(name)?;
        }

        let elem = self
            .form
            .query(name)
            .ok_or_else(|| ConfigError::FieldNotFound {
                selector: name.to_string(),
            })?;

        if let Some(previous) = self.fields.get(name) {
            let previous = previous.elem.clone();
            let event = previous.kind().listener_event();
            if !self.is_listened(event, &previous, Some(name), None) {
                self.listeners.detach(event, &previous);
            }
        }
        self.listeners.attach(elem.kind().listener_event(), &elem);
        self.fields
            .insert(name.to_string(), Field::new(elem, rules, config));
        log_debug!(field = name, "field registered");

        if self.is_submitted {
            self.validate_all().await;
        }
        Ok(self)
    }

    /// Register a required-one-of group of radios or checkboxes.
    ///
    /// Members must all be radios or all checkboxes. If the form has already
    /// been submitted, a full pass runs before this returns.
    pub async fn add_required_group(
        &mut self,
        name: &str,
        error_message: Option<String>,
        config: Option<FieldConfig>,
    ) -> Result<&mut Self, ConfigError> {
        let elems = self
            .form
            .query_group(name)
            .ok_or_else(|| ConfigError::GroupNotFound {
                selector: name.to_string(),
            })?;
        let kind = GroupKind::infer(name, &elems)?;

        if let Some(previous) = self.groups.get(name) {
            let previous = previous.elems.clone();
            for elem in &previous {
                if !self.is_listened(EventKind::Change, elem, None, Some(name)) {
                    self.listeners.detach(EventKind::Change, elem);
                }
            }
        }
        for elem in &elems {
            self.listeners.attach(EventKind::Change, elem);
        }
        self.groups.insert(
            name.to_string(),
            Group::new(kind, elems, vec![GroupRule::required(error_message)], config),
        );
        log_debug!(group = name, kind = ?kind, "group registered");

        if self.is_submitted {
            self.validate_all().await;
        }
        Ok(self)
    }

    /// Unregister a field and re-initialise the engine.
    ///
    /// An unknown name is reported as a diagnostic and otherwise ignored.
    pub fn remove_field(&mut self, name: &str) -> &mut Self {
        if self.fields.shift_remove(name).is_none() {
            self.diagnostics.report(Diagnostic::UnknownFieldRemoval {
                field: name.to_string(),
            });
            return self;
        }
        log_debug!(field = name, "field removed");
        self.refresh()
    }

    /// Set the callback for successful submits.
    pub fn on_success(
        &mut self,
        callback: impl FnMut(&SubmitEvent) + Send + 'static,
    ) -> &mut Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Set the callback for failed submits.
    pub fn on_fail(
        &mut self,
        callback: impl FnMut(&FieldsSnapshot) + Send + 'static,
    ) -> &mut Self {
        self.on_fail = Some(Box::new(callback));
        self
    }

    /// Switch the active locale; `None` turns localisation off.
    ///
    /// If the form has already been submitted, a full pass runs so visible
    /// messages change language.
    pub async fn set_current_locale(&mut self, locale: Option<String>) -> &mut Self {
        self.messages.set_locale(locale);
        if self.is_submitted {
            self.validate_all().await;
        }
        self
    }

    /// Detach every listener, clear rendered output and unlock the form.
    pub fn destroy(&mut self) -> &mut Self {
        self.listeners.detach_all();
        self.submit_attached = false;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.clear();
        }
        if self.config.lock_form {
            self.unlock_form();
        }
        log_debug!("engine destroyed");
        self
    }

    /// Tear down and re-initialise, keeping registrations and configuration.
    ///
    /// The submitted flag and every validity are reset; listeners for all
    /// fields and groups are attached again.
    pub fn refresh(&mut self) -> &mut Self {
        self.destroy();

        self.is_submitted = false;
        self.is_valid = false;
        self.submit_state = SubmitState::Idle;
        self.submit_attached = true;

        for field in self.fields.values_mut() {
            field.validity = Validity::Unchecked;
            field.error_message = None;
            self.listeners
                .attach(field.elem.kind().listener_event(), &field.elem);
        }
        for group in self.groups.values_mut() {
            group.validity = Validity::Unchecked;
            group.error_message = None;
            for elem in &group.elems {
                self.listeners.attach(EventKind::Change, elem);
            }
        }
        log_debug!(
            fields = self.fields.len(),
            groups = self.groups.len(),
            "engine refreshed"
        );
        self
    }

    /// Run every rule of one field, awaiting its deferred checks.
    pub async fn validate_field(&mut self, name: &str) -> Result<Validity, EngineError> {
        let validity = self.field_pass(name, PassMode::Full).await?;
        self.recompute_validity();
        Ok(validity)
    }

    /// Run the rules of one group.
    pub async fn validate_group(&mut self, name: &str) -> Result<Validity, EngineError> {
        let validity = self.group_pass(name)?;
        self.recompute_validity();
        Ok(validity)
    }

    /// Run every field and group, then render and return overall validity.
    ///
    /// Fields waiting on deferred checks read as [`Validity::Pending`] until
    /// their own checks have settled. The returned future completes once all
    /// of them have.
    pub async fn validate_all(&mut self) -> bool {
        log_debug!(
            fields = self.fields.len(),
            groups = self.groups.len(),
            "validation pass started"
        );
        let snapshot = self.fields_snapshot();

        let mut joins = FuturesUnordered::new();
        let names: Vec<String> = self.fields.keys().cloned().collect();
        for name in names {
            if let Some(join) = self.start_field(&name, &snapshot, PassMode::Full) {
                joins.push(async move { (name, join.settle().await) });
            }
        }

        let groups: Vec<String> = self.groups.keys().cloned().collect();
        for name in &groups {
            self.settle_group(name);
        }

        while let Some((name, settled)) = joins.next().await {
            self.commit_field(&name, settled);
        }

        self.finish_pass();
        log_debug!(valid = self.is_valid, "validation pass finished");
        self.is_valid
    }

    /// React to a change notification from `elem`.
    ///
    /// Ignored unless a listener for `event` is attached to `elem`. Runs the
    /// rules of the field reading `elem` without starting deferred checks,
    /// and the rule of the group containing it. Returns whether anything ran.
    pub async fn handle_input(&mut self, event: EventKind, elem: &InputRef) -> bool {
        if !self.listeners.is_attached(event, elem) {
            return false;
        }

        let field = self
            .fields
            .iter()
            .find(|(_, field)| same_input(&field.elem, elem))
            .map(|(name, _)| name.clone());
        let group = self
            .groups
            .iter()
            .find(|(_, group)| group.elems.iter().any(|e| same_input(e, elem)))
            .map(|(name, _)| name.clone());

        if field.is_none() && group.is_none() {
            return false;
        }

        if let Some(name) = &field {
            // Cannot fail: the name was just read from the registry.
            let _ = self.field_pass(name, PassMode::InputChanged).await;
        }
        if let Some(name) = &group {
            let _ = self.group_pass(name);
        }

        self.finish_pass();
        true
    }

    async fn field_pass(&mut self, name: &str, mode: PassMode) -> Result<Validity, EngineError> {
        let snapshot = self.fields_snapshot();
        let join = self
            .start_field(name, &snapshot, mode)
            .ok_or_else(|| EngineError::UnknownField(name.to_string()))?;

        let settled = join.settle().await;
        Ok(self.commit_field(name, settled))
    }

    fn group_pass(&mut self, name: &str) -> Result<Validity, EngineError> {
        self.settle_group(name)
            .ok_or_else(|| EngineError::UnknownGroup(name.to_string()))
    }

    // Evaluate every rule of a field, last declared first, and collect the
    // verdicts into a join. Leaves the field pending when checks are deferred.
    fn start_field(
        &mut self,
        name: &str,
        snapshot: &FieldsSnapshot,
        mode: PassMode,
    ) -> Option<RuleJoin> {
        let field = self.fields.get_mut(name)?;
        let value = field.elem.value();

        let mut evaluator = Evaluator::new(name, snapshot, mode);
        let mut join = RuleJoin::new();
        for (index, rule) in field.rules.iter().enumerate().rev() {
            join.push(index, evaluator.evaluate(rule, &value));
        }

        if join.has_pending() {
            field.set_pending();
        }
        self.diagnostics.extend(evaluator.into_diagnostics());
        Some(join)
    }

    fn commit_field(&mut self, name: &str, settled: Settled) -> Validity {
        for (_, reason) in settled.rejections() {
            self.diagnostics.report(Diagnostic::DeferredRejected {
                field: name.to_string(),
                reason: reason.clone(),
            });
        }

        let Some(field) = self.fields.get_mut(name) else {
            return Validity::Unchecked;
        };
        let message = settled
            .first_failure()
            .and_then(|index| field.rules.get(index))
            .map(|rule| self.messages.field_message(rule));
        field.settle(message);

        log_debug!(field = name, validity = ?field.validity, "field settled");
        field.validity
    }

    fn settle_group(&mut self, name: &str) -> Option<Validity> {
        let group = self.groups.get_mut(name)?;
        let message = group
            .rules
            .iter()
            .find(|rule| !check_group(rule, &group.elems))
            .map(|rule| self.messages.group_message(rule));
        group.settle(message);

        log_debug!(group = name, validity = ?group.validity, "group settled");
        Some(group.validity)
    }

    // Whether a registration other than the named field or group still
    // needs the `event` listener on `elem`.
    fn is_listened(
        &self,
        event: EventKind,
        elem: &InputRef,
        except_field: Option<&str>,
        except_group: Option<&str>,
    ) -> bool {
        let by_field = self.fields.iter().any(|(name, field)| {
            Some(name.as_str()) != except_field
                && field.elem.kind().listener_event() == event
                && same_input(&field.elem, elem)
        });
        let by_group = event == EventKind::Change
            && self.groups.iter().any(|(name, group)| {
                Some(name.as_str()) != except_group
                    && group.elems.iter().any(|member| same_input(member, elem))
            });
        by_field || by_group
    }

    fn recompute_validity(&mut self) {
        self.is_valid = self.fields.values().all(|f| f.validity.is_valid())
            && self.groups.values().all(|g| g.validity.is_valid());
    }

    fn finish_pass(&mut self) {
        self.recompute_validity();
        if !self.is_submitted {
            return;
        }
        let snapshot = self.render_snapshot();
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&snapshot);
        }
    }

    pub(crate) fn lock_form(&self) {
        for control in self.form.controls() {
            control.set_enabled(false);
        }
    }

    pub(crate) fn unlock_form(&self) {
        for control in self.form.controls() {
            control.set_enabled(true);
        }
    }

    pub(crate) fn focus_first_invalid(&self) {
        if let Some(field) = self.fields.values().find(|f| f.validity.is_invalid()) {
            field.elem.focus();
        }
    }

    /// Values and states of every field, as validators see them.
    pub fn fields_snapshot(&self) -> FieldsSnapshot {
        self.fields
            .iter()
            .map(|(name, field)| {
                (
                    name.clone(),
                    FieldSnapshot {
                        value: field.elem.value(),
                        validity: field.validity,
                        error_message: field.error_message.clone(),
                    },
                )
            })
            .collect()
    }

    /// What the renderer would receive now.
    pub fn render_snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            fields: self
                .fields
                .iter()
                .map(|(name, f)| {
                    let report = self.report(name, f.validity, f.error_message(), f.config());
                    (name.clone(), report)
                })
                .collect(),
            groups: self
                .groups
                .iter()
                .map(|(name, g)| {
                    let report = self.report(name, g.validity, g.error_message(), g.config());
                    (name.clone(), report)
                })
                .collect(),
            is_valid: self.is_valid,
        }
    }

    fn report(
        &self,
        name: &str,
        validity: Validity,
        message: Option<&str>,
        config: Option<&FieldConfig>,
    ) -> TargetReport {
        TargetReport {
            validity,
            error_message: message.filter(|_| validity.is_invalid()).map(str::to_string),
            presentation: self.config.resolve(config, name),
        }
    }

    /// A registered field.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// A registered group.
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Registered fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Registered groups in insertion order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &Group)> {
        self.groups.iter().map(|(name, group)| (name.as_str(), group))
    }

    /// Whether every field and group passed the last pass.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Whether a submit was ever attempted since the last re-initialisation.
    pub fn is_submitted(&self) -> bool {
        self.is_submitted
    }

    /// Global configuration.
    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// Active locale.
    pub fn current_locale(&self) -> Option<&str> {
        self.messages.locale()
    }

    /// Attached change listeners.
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Diagnostics recorded so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Drain recorded diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }
}

impl fmt::Debug for FormValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormValidator")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("groups", &self.groups.keys().collect::<Vec<_>>())
            .field("is_valid", &self.is_valid)
            .field("is_submitted", &self.is_submitted)
            .field("submit_state", &self.submit_state)
            .field("listeners", &self.listeners.len())
            .field("diagnostics", &self.diagnostics.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{RuleKind, ValidatorReturn};
    use crate::testing::{MockForm, MockInput, RecordingRenderer};
    use crate::verdict::ValidatorError;
    use std::time::Duration;

    async fn engine_with(input: &Arc<MockInput>, rules: Vec<FieldRule>) -> FormValidator {
        let form = MockForm::new().with_input("#f", input).into_handle();
        let mut engine = FormValidator::new(form);
        engine.add_field("#f", rules, None).await.unwrap();
        engine
    }

    #[tokio::test]
    async fn test_add_field_rejects_bad_declarations() {
        let input = MockInput::text("");
        let form = MockForm::new().with_input("#f", &input).into_handle();
        let mut engine = FormValidator::new(form);

        assert_eq!(
            engine.add_field("#f", vec![], None).await.err(),
            Some(ConfigError::EmptyRules { field: "#f".into() })
        );
        assert_eq!(
            engine.add_field("#missing", vec![FieldRule::required()], None).await.err(),
            Some(ConfigError::FieldNotFound { selector: "#missing".into() })
        );
        assert!(matches!(
            engine.add_field("#f", vec![FieldRule::default()], None).await,
            Err(ConfigError::MissingRule { .. })
        ));
        assert!(engine.field("#f").is_none());
    }

    #[tokio::test]
    async fn test_add_field_attaches_listener_by_kind() {
        let text = MockInput::text("");
        let check = MockInput::checkbox();
        let form = MockForm::new()
            .with_input("#t", &text)
            .with_input("#c", &check)
            .into_handle();
        let mut engine = FormValidator::new(form);
        engine.add_field("#t", vec![FieldRule::required()], None).await.unwrap();
        engine.add_field("#c", vec![FieldRule::required()], None).await.unwrap();

        assert_eq!(text.subscriptions(), vec![EventKind::KeyUp]);
        assert_eq!(check.subscriptions(), vec![EventKind::Change]);
    }

    #[tokio::test]
    async fn test_first_declared_failure_sets_message() {
        let input = MockInput::text("x");
        let mut engine = engine_with(
            &input,
            vec![
                FieldRule::custom(|_, _| false).with_message("A"),
                FieldRule::custom(|_, _| false).with_message("B"),
            ],
        )
        .await;

        engine.validate_all().await;
        assert_eq!(engine.field("#f").and_then(|f| f.error_message()), Some("A"));
    }

    #[tokio::test]
    async fn test_deferred_failure_outranks_later_sync_failure() {
        let input = MockInput::text("x");
        let mut engine = engine_with(
            &input,
            vec![
                FieldRule::custom_async(|_, _| async {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Ok(false)
                })
                .with_message("async"),
                FieldRule::custom(|_, _| false).with_message("sync"),
            ],
        )
        .await;

        engine.validate_all().await;
        assert_eq!(engine.field("#f").and_then(|f| f.error_message()), Some("async"));
    }

    #[tokio::test]
    async fn test_validate_field_unknown_name() {
        let input = MockInput::text("x");
        let mut engine = engine_with(&input, vec![FieldRule::required()]).await;
        assert_eq!(
            engine.validate_field("#nope").await,
            Err(EngineError::UnknownField("#nope".into()))
        );
        assert_eq!(engine.validate_field("#f").await, Ok(Validity::Valid));
        assert!(engine.is_valid());
    }

    #[tokio::test]
    async fn test_rejection_is_invalid_and_reported() {
        let input = MockInput::text("x");
        let mut engine = engine_with(
            &input,
            vec![FieldRule::custom(|_, _| {
                ValidatorReturn::deferred(|| async {
                    Err::<bool, ValidatorError>("service unavailable".into())
                })
            })],
        )
        .await;

        assert!(!engine.validate_all().await);
        assert_eq!(
            engine.take_diagnostics(),
            vec![Diagnostic::DeferredRejected {
                field: "#f".into(),
                reason: "service unavailable".into()
            }]
        );
        assert_eq!(
            engine.field("#f").and_then(|f| f.error_message()),
            Some("Value is incorrect")
        );
    }

    #[tokio::test]
    async fn test_misconfigured_rule_stays_invalid() {
        let input = MockInput::text("");
        let mut engine = engine_with(&input, vec![FieldRule::new(RuleKind::MinLength)]).await;

        assert!(!engine.validate_all().await);
        input.set_text("long enough");
        assert!(!engine.validate_all().await);
        assert_eq!(engine.diagnostics().len(), 2);
    }

    #[tokio::test]
    async fn test_no_render_before_submit() {
        let input = MockInput::text("");
        let record = RecordingRenderer::new();
        let form = MockForm::new().with_input("#f", &input).into_handle();
        let mut engine = FormValidator::new(form).with_renderer(record.clone());
        engine.add_field("#f", vec![FieldRule::required()], None).await.unwrap();

        engine.validate_all().await;
        assert_eq!(record.render_count(), 0);
        assert_eq!(engine.field("#f").map(|f| f.validity()), Some(Validity::Invalid));

        engine.submit().await;
        assert_eq!(record.render_count(), 1);
        let last = record.last().unwrap();
        assert_eq!(last.fields["#f"].error_message.as_deref(), Some("The field is required"));
    }

    #[tokio::test]
    async fn test_input_change_ignored_without_listener() {
        let input = MockInput::text("");
        let stray = MockInput::text("");
        let mut engine = engine_with(&input, vec![FieldRule::required()]).await;

        assert!(!engine.handle_input(EventKind::KeyUp, &stray.handle()).await);
        assert!(!engine.handle_input(EventKind::Change, &input.handle()).await);
        assert!(engine.handle_input(EventKind::KeyUp, &input.handle()).await);
        assert_eq!(engine.field("#f").map(|f| f.validity()), Some(Validity::Invalid));
    }

    #[tokio::test]
    async fn test_remove_unknown_field_reports() {
        let input = MockInput::text("");
        let mut engine = engine_with(&input, vec![FieldRule::required()]).await;

        engine.remove_field("#other");
        assert!(engine.field("#f").is_some());
        assert!(matches!(
            engine.diagnostics().entries(),
            [Diagnostic::UnknownFieldRemoval { .. }]
        ));
    }

    #[tokio::test]
    async fn test_refresh_resets_state_and_reattaches() {
        let input = MockInput::text("");
        let radio = MockInput::radio();
        let form = MockForm::new()
            .with_input("#f", &input)
            .with_group("#g", &[radio.clone()])
            .into_handle();
        let mut engine = FormValidator::new(form);
        engine.add_field("#f", vec![FieldRule::required()], None).await.unwrap();
        engine.add_required_group("#g", None, None).await.unwrap();

        engine.submit().await;
        assert!(engine.is_submitted());

        engine.refresh();
        assert!(!engine.is_submitted());
        assert_eq!(engine.field("#f").map(|f| f.validity()), Some(Validity::Unchecked));
        assert_eq!(input.subscriptions(), vec![EventKind::KeyUp]);
        assert_eq!(radio.subscriptions(), vec![EventKind::Change]);
        assert_eq!(engine.listeners().len(), 2);
    }

    // Form whose selectors can be re-pointed after registration.
    #[derive(Debug, Default)]
    struct RebindingForm {
        inputs: std::sync::Mutex<IndexMap<String, InputRef>>,
        groups: std::sync::Mutex<IndexMap<String, Vec<InputRef>>>,
    }

    impl RebindingForm {
        fn bind(&self, selector: &str, input: &Arc<MockInput>) {
            self.inputs
                .lock()
                .unwrap()
                .insert(selector.to_string(), input.handle());
        }

        fn bind_group(&self, selector: &str, members: &[Arc<MockInput>]) {
            self.groups.lock().unwrap().insert(
                selector.to_string(),
                members.iter().map(MockInput::handle).collect(),
            );
        }
    }

    impl FormHandle for RebindingForm {
        fn query(&self, selector: &str) -> Option<InputRef> {
            self.inputs.lock().unwrap().get(selector).cloned()
        }

        fn query_group(&self, selector: &str) -> Option<Vec<InputRef>> {
            self.groups.lock().unwrap().get(selector).cloned()
        }

        fn controls(&self) -> Vec<InputRef> {
            Vec::new()
        }
    }

    #[tokio::test]
    async fn test_replacing_field_keeps_listener_of_group_member() {
        let shared = MockInput::checkbox();
        let other = MockInput::checkbox();
        let form = Arc::new(RebindingForm::default());
        form.bind("#c", &shared);
        form.bind_group("#g", &[shared.clone()]);

        let mut engine = FormValidator::new(form.clone());
        engine.add_field("#c", vec![FieldRule::required()], None).await.unwrap();
        engine.add_required_group("#g", None, None).await.unwrap();

        form.bind("#c", &other);
        engine.add_field("#c", vec![FieldRule::required()], None).await.unwrap();

        assert!(engine.listeners().is_attached(EventKind::Change, &shared.handle()));
        assert_eq!(shared.subscriptions(), vec![EventKind::Change]);
        assert_eq!(other.subscriptions(), vec![EventKind::Change]);

        shared.set_checked(true);
        assert!(engine.handle_input(EventKind::Change, &shared.handle()).await);
        assert_eq!(engine.group("#g").map(|g| g.validity()), Some(Validity::Valid));
    }

    #[tokio::test]
    async fn test_replacing_field_detaches_unshared_input() {
        let old = MockInput::text("");
        let new = MockInput::text("");
        let form = Arc::new(RebindingForm::default());
        form.bind("#t", &old);

        let mut engine = FormValidator::new(form.clone());
        engine.add_field("#t", vec![FieldRule::required()], None).await.unwrap();
        form.bind("#t", &new);
        engine.add_field("#t", vec![FieldRule::required()], None).await.unwrap();

        assert!(old.subscriptions().is_empty());
        assert_eq!(new.subscriptions(), vec![EventKind::KeyUp]);
        assert!(!engine.handle_input(EventKind::KeyUp, &old.handle()).await);
        assert_eq!(engine.listeners().len(), 1);
    }

    #[tokio::test]
    async fn test_replacing_group_detaches_dropped_members() {
        let kept = MockInput::checkbox();
        let dropped = MockInput::checkbox();
        let added = MockInput::checkbox();
        let form = Arc::new(RebindingForm::default());
        form.bind("#kept", &kept);
        form.bind_group("#g", &[kept.clone(), dropped.clone()]);

        let mut engine = FormValidator::new(form.clone());
        engine.add_field("#kept", vec![FieldRule::required()], None).await.unwrap();
        engine.add_required_group("#g", None, None).await.unwrap();

        form.bind_group("#g", &[added.clone()]);
        engine.add_required_group("#g", None, None).await.unwrap();

        assert!(dropped.subscriptions().is_empty());
        assert!(!engine.listeners().is_attached(EventKind::Change, &dropped.handle()));
        assert_eq!(kept.subscriptions(), vec![EventKind::Change]);
        assert_eq!(added.subscriptions(), vec![EventKind::Change]);
        assert_eq!(engine.listeners().len(), 2);
    }

    #[tokio::test]
    async fn test_debug_lists_registrations() {
        let input = MockInput::text("");
        let engine = engine_with(&input, vec![FieldRule::required()]).await;
        let debug = format!("{:?}", engine);
        assert!(debug.contains("#f"));
    }
}
