//! Testing utilities for engines and hosts
//!
//! This module provides in-memory stand-ins for the host side of the engine
//! (inputs, forms and renderers), assertion macros over engine state and,
//! with the `proptest` feature, `Arbitrary` implementations for values.
//!
//! # Examples
//!
//! ## Mock form
//!
//! ```rust
//! use formguard::testing::{MockForm, MockInput};
//! use formguard::input::FormHandle;
//!
//! let email = MockInput::text("");
//! let form = MockForm::new().with_input("#email", &email).into_handle();
//!
//! email.set_text("a@b.com");
//! assert_eq!(
//!     form.query("#email").map(|input| input.value()),
//!     Some("a@b.com".into())
//! );
//! ```
//!
//! ## Assertion macros
//!
//! ```rust
//! # tokio_test::block_on(async {
//! use formguard::prelude::*;
//! use formguard::testing::{MockForm, MockInput};
//! use formguard::{assert_field_invalid, assert_field_valid};
//!
//! let name = MockInput::text("");
//! let form = MockForm::new().with_input("#name", &name).into_handle();
//!
//! let mut engine = FormValidator::new(form);
//! engine.add_field("#name", vec![FieldRule::required()], None).await.unwrap();
//!
//! engine.validate_all().await;
//! assert_field_invalid!(engine, "#name", "The field is required");
//!
//! name.set_text("Ada");
//! engine.validate_all().await;
//! assert_field_valid!(engine, "#name");
//! # });
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;

use crate::input::{same_input, EventKind, FormHandle, InputHandle, InputKind, InputRef};
use crate::snapshot::{FormSnapshot, Renderer};
use crate::value::{FieldValue, FileInfo};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory input element.
///
/// Constructors return an `Arc` so the test keeps a handle for driving the
/// value while the engine holds another through [`MockInput::handle`].
#[derive(Debug)]
pub struct MockInput {
    kind: InputKind,
    value: Mutex<FieldValue>,
    enabled: AtomicBool,
    subscriptions: Mutex<Vec<EventKind>>,
    focused: AtomicUsize,
}

impl MockInput {
    /// Input of any kind with an initial value.
    pub fn new(kind: InputKind, value: FieldValue) -> Arc<Self> {
        Arc::new(Self {
            kind,
            value: Mutex::new(value),
            enabled: AtomicBool::new(true),
            subscriptions: Mutex::new(Vec::new()),
            focused: AtomicUsize::new(0),
        })
    }

    /// Text input.
    pub fn text(value: &str) -> Arc<Self> {
        Self::new(InputKind::Text, FieldValue::text(value))
    }

    /// Unchecked checkbox.
    pub fn checkbox() -> Arc<Self> {
        Self::new(InputKind::Checkbox, FieldValue::Bool(false))
    }

    /// Unchecked radio button.
    pub fn radio() -> Arc<Self> {
        Self::new(InputKind::Radio, FieldValue::Bool(false))
    }

    /// Select with an initial choice.
    pub fn select(value: &str) -> Arc<Self> {
        Self::new(InputKind::Select, FieldValue::text(value))
    }

    /// File input with nothing selected.
    pub fn file() -> Arc<Self> {
        Self::new(InputKind::File, FieldValue::files(Vec::new()))
    }

    /// Shared handle for the engine.
    pub fn handle(self: &Arc<Self>) -> InputRef {
        self.clone()
    }

    /// Replace the value.
    pub fn set_value(&self, value: FieldValue) {
        *lock(&self.value) = value;
    }

    /// Replace the text.
    pub fn set_text(&self, text: &str) {
        self.set_value(FieldValue::text(text));
    }

    /// Check or uncheck a toggle.
    pub fn set_checked(&self, checked: bool) {
        self.set_value(FieldValue::Bool(checked));
    }

    /// Replace the selected files.
    pub fn set_files(&self, files: Vec<FileInfo>) {
        self.set_value(FieldValue::files(files));
    }

    /// Events currently subscribed, in subscription order.
    pub fn subscriptions(&self) -> Vec<EventKind> {
        lock(&self.subscriptions).clone()
    }

    /// Whether `event` is subscribed.
    pub fn is_subscribed(&self, event: EventKind) -> bool {
        lock(&self.subscriptions).contains(&event)
    }

    /// How many times the engine focused this input.
    pub fn focus_count(&self) -> usize {
        self.focused.load(Ordering::SeqCst)
    }
}

impl InputHandle for MockInput {
    fn kind(&self) -> InputKind {
        self.kind
    }

    fn value(&self) -> FieldValue {
        lock(&self.value).clone()
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn subscribe(&self, event: EventKind) {
        lock(&self.subscriptions).push(event);
    }

    fn unsubscribe(&self, event: EventKind) {
        let mut subscriptions = lock(&self.subscriptions);
        if let Some(pos) = subscriptions.iter().position(|e| *e == event) {
            subscriptions.remove(pos);
        }
    }

    fn focus(&self) {
        self.focused.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-memory form resolving selectors to mock inputs.
#[derive(Debug, Default)]
pub struct MockForm {
    inputs: IndexMap<String, InputRef>,
    groups: IndexMap<String, Vec<InputRef>>,
    controls: Vec<InputRef>,
}

impl MockForm {
    /// Empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an input under a field selector.
    pub fn with_input(mut self, selector: &str, input: &Arc<MockInput>) -> Self {
        self.inputs.insert(selector.to_string(), input.handle());
        self
    }

    /// Register a group container holding `members`.
    pub fn with_group(mut self, selector: &str, members: &[Arc<MockInput>]) -> Self {
        self.groups.insert(
            selector.to_string(),
            members.iter().map(MockInput::handle).collect(),
        );
        self
    }

    /// Register a control that is not a field (a submit button, say).
    pub fn with_control(mut self, control: &Arc<MockInput>) -> Self {
        self.controls.push(control.handle());
        self
    }

    /// Finish building and share the form.
    pub fn into_handle(self) -> Arc<dyn FormHandle> {
        Arc::new(self)
    }
}

impl FormHandle for MockForm {
    fn query(&self, selector: &str) -> Option<InputRef> {
        self.inputs.get(selector).cloned()
    }

    fn query_group(&self, selector: &str) -> Option<Vec<InputRef>> {
        self.groups.get(selector).cloned()
    }

    fn controls(&self) -> Vec<InputRef> {
        let mut all: Vec<InputRef> = Vec::new();
        let candidates = self
            .inputs
            .values()
            .chain(self.groups.values().flatten())
            .chain(self.controls.iter());

        for control in candidates {
            if !all.iter().any(|seen| same_input(seen, control)) {
                all.push(control.clone());
            }
        }
        all
    }
}

/// Renderer that records every snapshot it receives.
///
/// Clones share the same record, so a test can keep one clone and hand the
/// other to the engine.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    renders: Arc<Mutex<Vec<FormSnapshot>>>,
    clears: Arc<AtomicUsize>,
}

impl RecordingRenderer {
    /// Empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every snapshot rendered so far.
    pub fn renders(&self) -> Vec<FormSnapshot> {
        lock(&self.renders).clone()
    }

    /// The most recent snapshot.
    pub fn last(&self) -> Option<FormSnapshot> {
        lock(&self.renders).last().cloned()
    }

    /// Number of renders.
    pub fn render_count(&self) -> usize {
        lock(&self.renders).len()
    }

    /// Number of clears.
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, snapshot: &FormSnapshot) {
        lock(&self.renders).push(snapshot.clone());
    }

    fn clear(&mut self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}

/// Assert that a registered field is valid.
///
/// # Example
///
/// ```rust
/// # tokio_test::block_on(async {
/// use formguard::prelude::*;
/// use formguard::testing::{MockForm, MockInput};
/// use formguard::assert_field_valid;
///
/// let input = MockInput::text("x");
/// let mut engine = FormValidator::new(MockForm::new().with_input("#a", &input).into_handle());
/// engine.add_field("#a", vec![FieldRule::required()], None).await.unwrap();
/// engine.validate_all().await;
/// assert_field_valid!(engine, "#a");
/// # });
/// ```
#[macro_export]
macro_rules! assert_field_valid {
    ($engine:expr, $name:expr) => {
        match $engine.field($name) {
            Some(field) => {
                if !field.validity().is_valid() {
                    panic!(
                        "Expected field {} to be valid, got {:?}: {:?}",
                        $name,
                        field.validity(),
                        field.error_message()
                    );
                }
            }
            None => panic!("Field {} is not registered", $name),
        }
    };
}

/// Assert that a registered field is invalid, optionally with a message.
#[macro_export]
macro_rules! assert_field_invalid {
    ($engine:expr, $name:expr) => {
        match $engine.field($name) {
            Some(field) => {
                if !field.validity().is_invalid() {
                    panic!(
                        "Expected field {} to be invalid, got {:?}",
                        $name,
                        field.validity()
                    );
                }
            }
            None => panic!("Field {} is not registered", $name),
        }
    };
    ($engine:expr, $name:expr, $message:expr) => {
        $crate::assert_field_invalid!($engine, $name);
        if let Some(field) = $engine.field($name) {
            assert_eq!(field.error_message(), Some($message));
        }
    };
}

/// Assert that a registered group is valid.
#[macro_export]
macro_rules! assert_group_valid {
    ($engine:expr, $name:expr) => {
        match $engine.group($name) {
            Some(group) => {
                if !group.validity().is_valid() {
                    panic!(
                        "Expected group {} to be valid, got {:?}: {:?}",
                        $name,
                        group.validity(),
                        group.error_message()
                    );
                }
            }
            None => panic!("Group {} is not registered", $name),
        }
    };
}

/// Assert that a registered group is invalid, optionally with a message.
#[macro_export]
macro_rules! assert_group_invalid {
    ($engine:expr, $name:expr) => {
        match $engine.group($name) {
            Some(group) => {
                if !group.validity().is_invalid() {
                    panic!(
                        "Expected group {} to be invalid, got {:?}",
                        $name,
                        group.validity()
                    );
                }
            }
            None => panic!("Group {} is not registered", $name),
        }
    };
    ($engine:expr, $name:expr, $message:expr) => {
        $crate::assert_group_invalid!($engine, $name);
        if let Some(group) = $engine.group($name) {
            assert_eq!(group.error_message(), Some($message));
        }
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl Arbitrary for FileInfo {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            "[a-z]{1,8}(\\.[a-z]{1,4})?",
            0u64..10_000_000,
            prop_oneof![
                Just("image/png".to_string()),
                Just("application/pdf".to_string()),
                Just(String::new()),
            ],
        )
            .prop_map(|(name, size, mime)| FileInfo::new(name, size, mime))
            .boxed()
    }
}

#[cfg(feature = "proptest")]
impl Arbitrary for FieldValue {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            any::<bool>().prop_map(FieldValue::Bool),
            ".{0,24}".prop_map(FieldValue::Text),
            proptest::collection::vec(any::<FileInfo>(), 0..4).prop_map(FieldValue::Files),
            Just(FieldValue::Absent),
        ]
        .boxed()
    }
}
