//! Minimal publish/subscribe primitive shared by every state handle.
//!
//! State mutations notify subscribers after the mutation is applied. The rendering layer
//! subscribes and re-renders; see `reactive` for the Leptos signal bridge.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

type Listener<E> = Rc<dyn Fn(&E)>;

struct Registry<E> {
    next_key: Cell<u64>,
    listeners: RefCell<Vec<(u64, Listener<E>)>>,
}

/// Listener list for events of type `E`. Clones share the same list.
pub struct Observers<E: 'static> {
    registry: Rc<Registry<E>>,
}

impl<E: 'static> Observers<E> {
    /// Creates an empty listener list.
    pub fn new() -> Self {
        Self {
            registry: Rc::new(Registry {
                next_key: Cell::new(0),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Registers `listener`. It stays registered until the returned [`Subscription`] is dropped.
    pub fn subscribe(&self, listener: impl Fn(&E) + 'static) -> Subscription {
        let key = self.registry.next_key.get();
        self.registry.next_key.set(key + 1);
        self.registry
            .listeners
            .borrow_mut()
            .push((key, Rc::new(listener)));

        let registry: Weak<Registry<E>> = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            let Some(registry) = registry.upgrade() else {
                return;
            };
            // Dropped after the borrow ends; the listener may own other subscriptions.
            let removed = {
                let mut listeners = registry.listeners.borrow_mut();
                listeners
                    .iter()
                    .position(|(candidate, _)| *candidate == key)
                    .map(|index| listeners.remove(index))
            };
            drop(removed);
        })
    }

    /// Calls every registered listener with `event`.
    ///
    /// Listeners registered or removed during notification take effect on the next call.
    pub fn notify(&self, event: &E) {
        let snapshot = self
            .registry
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect::<Vec<_>>();
        for listener in snapshot {
            listener(event);
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.registry.listeners.borrow().len()
    }

    /// Returns `true` when nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: 'static> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> Clone for Observers<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<E: 'static> fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Handle for a registered listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes its listener immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Keeps the listener registered for the lifetime of the observed object.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn listeners_receive_events_until_dropped() {
        let observers = Observers::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let subscription = observers.subscribe(move |value| sink.borrow_mut().push(*value));
        observers.notify(&1);
        observers.notify(&2);
        drop(subscription);
        observers.notify(&3);

        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert!(observers.is_empty());
    }

    #[test]
    fn detached_subscription_stays_registered() {
        let observers = Observers::<()>::new();
        let count = Rc::new(Cell::new(0));

        let counter = Rc::clone(&count);
        observers
            .subscribe(move |_| counter.set(counter.get() + 1))
            .detach();
        observers.notify(&());
        observers.notify(&());

        assert_eq!(count.get(), 2);
        assert_eq!(observers.len(), 1);
    }

    #[test]
    fn listener_may_subscribe_during_notification() {
        let observers = Observers::<u8>::new();
        let late = Rc::new(RefCell::new(Vec::<Subscription>::new()));

        let registry = observers.clone();
        let holder = Rc::clone(&late);
        observers
            .subscribe(move |_| {
                holder.borrow_mut().push(registry.subscribe(|_| {}));
            })
            .detach();
        observers.notify(&0);

        assert_eq!(observers.len(), 2);
        late.borrow_mut().clear();
        assert_eq!(observers.len(), 1);
    }

    #[test]
    fn subscription_outliving_observers_drops_cleanly() {
        let observers = Observers::<u8>::new();
        let subscription = observers.subscribe(|_| {});
        drop(observers);
        drop(subscription);
    }
}
