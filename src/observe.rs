// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Minimal observer plumbing: {subscribe(listener), notify(event)}.
//!
//! No framework base type, just a listener list keyed by uuid and an
//! ordered collection that raises add/remove events. Consumers (a UI
//! binding layer) subscribe; the core notifies from the dispatch context.

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use uuid::Uuid;

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync + 'static>;

/// Token returned by `subscribe`; pass back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(Uuid);

/// A listener list for one event type.
pub struct Notifier<E> {
    listeners: Mutex<Vec<(SubscriptionId, Listener<E>)>>,
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
        }
    }
}

impl<E> Notifier<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&E) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(Uuid::new_v4());
        self.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.lock().retain(|(lid, _)| *lid != id);
    }

    pub fn notify(&self, event: &E) {
        // Snapshot outside the lock so a listener may write back through
        // the source of the event, or (un)subscribe, without deadlocking.
        let listeners: Vec<Listener<E>> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

/// Structural change raised by [`ObservableVec`].
#[derive(Debug, Clone)]
pub enum CollectionEvent<T> {
    Added(T),
    Removed(T),
    Cleared,
}

/// Ordered, observable collection of shared handles.
///
/// Structural writes happen on the dispatch context only (single writer by
/// convention); reads may come from anywhere, hence the `RwLock`.
pub struct ObservableVec<T: Clone> {
    items: RwLock<Vec<T>>,
    changes: Notifier<CollectionEvent<T>>,
}

impl<T: Clone> Default for ObservableVec<T> {
    fn default() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            changes: Notifier::new(),
        }
    }
}

impl<T: Clone> ObservableVec<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, item: T) {
        self.items.write().push(item.clone());
        self.changes.notify(&CollectionEvent::Added(item));
    }

    /// Remove the first element matching `pred`. Returns whether anything
    /// was removed; removing an absent element is a no-op.
    pub fn remove_where(&self, pred: impl Fn(&T) -> bool) -> bool {
        let removed = {
            let mut items = self.items.write();
            match items.iter().position(|i| pred(i)) {
                Some(pos) => Some(items.remove(pos)),
                None => None,
            }
        };
        match removed {
            Some(item) => {
                self.changes.notify(&CollectionEvent::Removed(item));
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        let had_items = {
            let mut items = self.items.write();
            let had = !items.is_empty();
            items.clear();
            had
        };
        if had_items {
            self.changes.notify(&CollectionEvent::Cleared);
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Copy of the current elements, in order. The live collection keeps
    /// mutating underneath; use `subscribe` to follow it.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.read().clone()
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&CollectionEvent<T>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.changes.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.changes.unsubscribe(id)
    }
}

/// Shared handle to an observable collection.
pub type SharedVec<T> = Arc<ObservableVec<T>>;
