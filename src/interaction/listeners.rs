//! Process-wide pointer listeners
//!
//! While a drag is active it needs pointer-move and pointer-up events from
//! anywhere in the window, not just from the handle that started it. A drag
//! takes a [`ListenerSubscription`]; dropping the subscription removes the
//! listeners, so ending the drag or tearing down its owner never leaves
//! global listeners behind.

use std::cell::RefCell;
use std::rc::Rc;

/// Kind of global pointer event a listener receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    Move,
    Up,
}

/// Registration handle inside the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    active: Vec<(ListenerId, ListenerKind)>,
}

impl Registry {
    fn register(&mut self, kind: ListenerKind) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.active.push((id, kind));
        id
    }
}

/// Shared registry of global pointer listeners for one window
#[derive(Debug, Clone, Default)]
pub struct PointerListeners {
    inner: Rc<RefCell<Registry>>,
}

impl PointerListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a move and an up listener for the duration of a drag
    pub fn subscribe(&self) -> ListenerSubscription {
        let mut registry = self.inner.borrow_mut();
        let ids = [
            registry.register(ListenerKind::Move),
            registry.register(ListenerKind::Up),
        ];
        log::trace!("Subscribed global pointer listeners {:?}", ids);
        ListenerSubscription {
            registry: Rc::clone(&self.inner),
            ids,
        }
    }

    /// Number of registered listeners of a kind
    pub fn count(&self, kind: ListenerKind) -> usize {
        self.inner
            .borrow()
            .active
            .iter()
            .filter(|(_, k)| *k == kind)
            .count()
    }

    pub fn active_count(&self) -> usize {
        self.inner.borrow().active.len()
    }

    /// Whether pointer events should currently be routed globally
    pub fn is_capturing(&self) -> bool {
        self.active_count() > 0
    }
}

/// Guard for a drag's global listeners; unsubscribes on drop
#[derive(Debug)]
pub struct ListenerSubscription {
    registry: Rc<RefCell<Registry>>,
    ids: [ListenerId; 2],
}

impl Drop for ListenerSubscription {
    fn drop(&mut self) {
        let mut registry = self.registry.borrow_mut();
        registry.active.retain(|(id, _)| !self.ids.contains(id));
        log::trace!("Unsubscribed global pointer listeners {:?}", self.ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_registers_move_and_up() {
        let listeners = PointerListeners::new();
        let sub = listeners.subscribe();
        assert_eq!(listeners.count(ListenerKind::Move), 1);
        assert_eq!(listeners.count(ListenerKind::Up), 1);
        assert!(listeners.is_capturing());

        drop(sub);
        assert_eq!(listeners.active_count(), 0);
        assert!(!listeners.is_capturing());
    }

    #[test]
    fn test_dropping_one_subscription_keeps_others() {
        let listeners = PointerListeners::new();
        let a = listeners.subscribe();
        let b = listeners.subscribe();
        assert_eq!(listeners.active_count(), 4);

        drop(a);
        assert_eq!(listeners.active_count(), 2);
        drop(b);
        assert_eq!(listeners.active_count(), 0);
    }
}
