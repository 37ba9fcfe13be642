//! Change-notification subscriptions held by an engine

use crate::input::{same_input, EventKind, InputRef};

/// One attached subscription.
#[derive(Debug, Clone)]
pub struct Listener {
    /// Event listened to
    pub event: EventKind,
    /// Element listened on
    pub elem: InputRef,
}

/// Subscriptions in attachment order.
///
/// At most one entry exists per element and event; attaching again replaces
/// the previous entry.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    entries: Vec<Listener>,
}

impl ListenerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `elem` to `event`, dropping any previous subscription for
    /// the same pair first.
    pub fn attach(&mut self, event: EventKind, elem: &InputRef) {
        self.detach(event, elem);
        elem.subscribe(event);
        self.entries.push(Listener {
            event,
            elem: elem.clone(),
        });
    }

    /// Unsubscribe `elem` from `event`. Returns whether anything was attached.
    pub fn detach(&mut self, event: EventKind, elem: &InputRef) -> bool {
        let before = self.entries.len();
        self.entries.retain(|listener| {
            let hit = listener.event == event && same_input(&listener.elem, elem);
            if hit {
                listener.elem.unsubscribe(event);
            }
            !hit
        });
        self.entries.len() != before
    }

    /// Unsubscribe everything.
    pub fn detach_all(&mut self) {
        for listener in self.entries.drain(..) {
            listener.elem.unsubscribe(listener.event);
        }
    }

    /// Whether `elem` is subscribed to `event`.
    pub fn is_attached(&self, event: EventKind, elem: &InputRef) -> bool {
        self.entries
            .iter()
            .any(|listener| listener.event == event && same_input(&listener.elem, elem))
    }

    /// Attached subscriptions.
    pub fn iter(&self) -> impl Iterator<Item = &Listener> {
        self.entries.iter()
    }

    /// Number of subscriptions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockInput;

    #[test]
    fn test_attach_replaces_same_pair() {
        let input = MockInput::text("");
        let handle = input.handle();
        let mut registry = ListenerRegistry::new();

        registry.attach(EventKind::KeyUp, &handle);
        registry.attach(EventKind::KeyUp, &handle);

        assert_eq!(registry.len(), 1);
        assert_eq!(input.subscriptions(), vec![EventKind::KeyUp]);
    }

    #[test]
    fn test_detach_only_matching_pair() {
        let a = MockInput::text("");
        let b = MockInput::checkbox();
        let mut registry = ListenerRegistry::new();
        registry.attach(EventKind::KeyUp, &a.handle());
        registry.attach(EventKind::Change, &b.handle());

        assert!(!registry.detach(EventKind::Change, &a.handle()));
        assert!(registry.detach(EventKind::KeyUp, &a.handle()));
        assert!(a.subscriptions().is_empty());
        assert!(registry.is_attached(EventKind::Change, &b.handle()));
    }

    #[test]
    fn test_detach_all_unsubscribes() {
        let a = MockInput::radio();
        let b = MockInput::radio();
        let mut registry = ListenerRegistry::new();
        registry.attach(EventKind::Change, &a.handle());
        registry.attach(EventKind::Change, &b.handle());

        registry.detach_all();
        assert!(registry.is_empty());
        assert!(!a.is_subscribed(EventKind::Change));
        assert!(!b.is_subscribed(EventKind::Change));
    }
}
