//! Input and form capabilities consumed by the engine
//!
//! The engine never touches a concrete UI toolkit. It reads values, toggles the
//! enabled state and manages change subscriptions through [`InputHandle`], and
//! resolves selectors through [`FormHandle`]. Hosts (a DOM binding, a terminal
//! UI, a test double from [`crate::testing`]) implement these traits.

use std::fmt;
use std::sync::Arc;

use crate::value::FieldValue;

/// Kind of an input element, which decides value typing and listener kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum InputKind {
    /// Any text-like input (text, email, password, number, textarea)
    Text,
    /// Checkbox, read as a boolean
    Checkbox,
    /// Radio button, read as a boolean
    Radio,
    /// Single-choice select
    Select,
    /// File picker, read as a file list
    File,
}

impl InputKind {
    /// Event this kind of input is listened on.
    ///
    /// Toggles, selects and file pickers report on `change`; everything else on
    /// `keyup`.
    pub fn listener_event(self) -> EventKind {
        match self {
            InputKind::Checkbox | InputKind::Radio | InputKind::Select | InputKind::File => {
                EventKind::Change
            }
            InputKind::Text => EventKind::KeyUp,
        }
    }

    /// Whether this kind can take part in a required group.
    pub fn is_toggle(self) -> bool {
        matches!(self, InputKind::Checkbox | InputKind::Radio)
    }
}

/// Notification an input can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum EventKind {
    /// Committed change (toggles, selects, files)
    Change,
    /// Key released in a text input
    KeyUp,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Change => f.write_str("change"),
            EventKind::KeyUp => f.write_str("keyup"),
        }
    }
}

/// Capability over one input element.
///
/// Methods take `&self`: handles are shared between the host and the engine,
/// so implementations keep their mutable state behind interior mutability.
pub trait InputHandle: fmt::Debug + Send + Sync {
    /// Kind of the element.
    fn kind(&self) -> InputKind;

    /// Current value, typed according to [`InputHandle::kind`].
    fn value(&self) -> FieldValue;

    /// Whether the element currently accepts interaction.
    fn is_enabled(&self) -> bool;

    /// Enable or disable the element.
    fn set_enabled(&self, enabled: bool);

    /// Start delivering `event` notifications for this element to the engine.
    fn subscribe(&self, event: EventKind);

    /// Stop delivering `event` notifications for this element.
    fn unsubscribe(&self, event: EventKind);

    /// Move keyboard focus to the element.
    fn focus(&self) {}
}

/// Shared handle to an input element.
pub type InputRef = Arc<dyn InputHandle>;

/// Identity comparison of two handles, ignoring vtables.
pub fn same_input(a: &InputRef, b: &InputRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Capability over the form that owns the inputs.
pub trait FormHandle: fmt::Debug + Send + Sync {
    /// Resolve a field selector to its input.
    fn query(&self, selector: &str) -> Option<InputRef>;

    /// Resolve a group selector to the inputs it contains, in document order.
    fn query_group(&self, selector: &str) -> Option<Vec<InputRef>>;

    /// Every interactive control of the form (inputs, buttons, selects).
    fn controls(&self) -> Vec<InputRef>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_event_by_kind() {
        assert_eq!(InputKind::Text.listener_event(), EventKind::KeyUp);
        assert_eq!(InputKind::Checkbox.listener_event(), EventKind::Change);
        assert_eq!(InputKind::Radio.listener_event(), EventKind::Change);
        assert_eq!(InputKind::Select.listener_event(), EventKind::Change);
        assert_eq!(InputKind::File.listener_event(), EventKind::Change);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(EventKind::Change.to_string(), "change");
        assert_eq!(EventKind::KeyUp.to_string(), "keyup");
    }
}
