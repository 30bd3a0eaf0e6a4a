//! Multicast change notification.
//!
//! [`ChangeSignal`] keeps an explicit list of listeners. Any number may
//! attach; `emit` calls every listener synchronously, in connection order.
//!
//! The listener list is snapshotted before dispatch and the lock released,
//! so a listener may connect, disconnect or trigger another emission on
//! the same signal without deadlocking. A listener connected during an
//! emission first fires on the next one.
//!
//! Clones share the same listener list.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Handle for removing a connected listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

struct Slots<T> {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener<T>)>,
}

/// Multicast channel of change events
pub struct ChangeSignal<T> {
    slots: Arc<RwLock<Slots<T>>>,
}

impl<T> ChangeSignal<T> {
    /// Create a signal with no listeners
    pub fn new() -> Self {
        Self {
            slots: Arc::new(RwLock::new(Slots {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Attach a listener
    pub fn connect<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let id = ListenerId(slots.next_id);
        slots.next_id += 1;
        slots.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Detach a listener. Returns false if it was not connected.
    pub fn disconnect(&self, id: ListenerId) -> bool {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        let before = slots.listeners.len();
        slots.listeners.retain(|(lid, _)| *lid != id);
        slots.listeners.len() != before
    }

    /// Detach every listener
    pub fn clear(&self) {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .clear();
    }

    /// Number of connected listeners
    pub fn listener_count(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .len()
    }

    /// Call every listener with `value`; returns how many were called
    pub fn emit(&self, value: &T) -> usize {
        let snapshot: Vec<Listener<T>> = {
            let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
            slots.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };

        for listener in &snapshot {
            listener(value);
        }
        snapshot.len()
    }
}

impl<T> Clone for ChangeSignal<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<T> Default for ChangeSignal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ChangeSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeSignal")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
