//! Application-owned stack of open modal dialogs.
//!
//! Insertion order is z-order and the last entry is the top. At most one entry is active: opening
//! a modal deactivates the previous top without removing it, and closing the top reactivates the
//! entry below it without re-pushing.

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use crate::{
    dialog::Dialog,
    focus::DialogHost,
    observer::{Observers, Subscription},
};

#[derive(Default)]
pub(crate) struct StackInner {
    entries: RefCell<Vec<Dialog>>,
    observers: Observers<usize>,
    scroll_lock: RefCell<Option<Rc<dyn DialogHost>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Where a dialog was when it left the stack.
pub(crate) enum StackRemoval {
    /// It was the top entry.
    Top,
    /// It was covered by another modal.
    Covered,
    /// It was not on the stack.
    NotPresent,
}

#[derive(Clone, Default)]
/// Shared handle to the modal stack. Construct one at the application root and pass it to every
/// modal [`Dialog`].
pub struct ModalStack {
    inner: Rc<StackInner>,
}

impl ModalStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open modals, covered ones included.
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    /// Returns `true` when no modal is open.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Topmost modal.
    pub fn top(&self) -> Option<Dialog> {
        self.inner.entries.borrow().last().cloned()
    }

    /// The modal that currently receives interaction.
    pub fn active(&self) -> Option<Dialog> {
        self.inner
            .entries
            .borrow()
            .iter()
            .find(|dialog| dialog.is_active())
            .cloned()
    }

    /// Dialog ids bottom to top.
    pub fn ids(&self) -> Vec<String> {
        self.inner
            .entries
            .borrow()
            .iter()
            .map(|dialog| dialog.id().to_string())
            .collect()
    }

    /// Whether `dialog` is on the stack.
    pub fn contains(&self, dialog: &Dialog) -> bool {
        self.inner
            .entries
            .borrow()
            .iter()
            .any(|entry| entry.same(dialog))
    }

    /// Closes the top modal, reactivating the one below. Returns `false` when empty.
    pub fn close_top(&self) -> bool {
        match self.top() {
            Some(top) => {
                top.close();
                true
            }
            None => false,
        }
    }

    /// Drains the stack and deactivates every entry without reactivating anything.
    pub fn close_all(&self) {
        let drained = std::mem::take(&mut *self.inner.entries.borrow_mut());
        if drained.is_empty() {
            return;
        }
        self.release_scroll_lock();
        for (index, dialog) in drained.iter().enumerate().rev() {
            dialog.finish_drained(index == 0);
        }
        self.inner.observers.notify(&0);
    }

    /// Whether a host currently holds the document scroll lock for this stack.
    pub fn is_scroll_locked(&self) -> bool {
        self.inner.scroll_lock.borrow().is_some()
    }

    /// Locks document scrolling through `host` unless the stack already holds the lock.
    pub(crate) fn lock_scroll(&self, host: Rc<dyn DialogHost>) {
        if self.is_scroll_locked() {
            return;
        }
        host.set_scroll_locked(true);
        *self.inner.scroll_lock.borrow_mut() = Some(host);
    }

    fn release_scroll_lock(&self) {
        let holder = self.inner.scroll_lock.borrow_mut().take();
        if let Some(host) = holder {
            host.set_scroll_locked(false);
        }
    }

    /// Subscribes to stack depth changes.
    pub fn subscribe(&self, listener: impl Fn(&usize) + 'static) -> Subscription {
        self.inner.observers.subscribe(listener)
    }

    pub(crate) fn downgrade(&self) -> WeakModalStack {
        WeakModalStack(Rc::downgrade(&self.inner))
    }

    /// Moves `dialog` to the top, deactivating the previous top. Activating `dialog` is left to
    /// the caller.
    pub(crate) fn push(&self, dialog: &Dialog) {
        let previous_top = {
            let mut entries = self.inner.entries.borrow_mut();
            if let Some(position) = entries.iter().position(|entry| entry.same(dialog)) {
                if position + 1 == entries.len() {
                    return;
                }
                entries.remove(position);
            }
            let previous_top = entries.last().cloned();
            entries.push(dialog.clone());
            previous_top
        };
        if let Some(previous_top) = previous_top {
            previous_top.set_active_silently(false);
        }
        if let Some(host) = dialog.host() {
            self.lock_scroll(host);
        }
        self.inner.observers.notify(&self.len());
    }

    /// Removes `dialog` wherever it sits. When it was the top, the new top is reactivated.
    pub(crate) fn remove(&self, dialog: &Dialog) -> StackRemoval {
        let (removal, new_top) = {
            let mut entries = self.inner.entries.borrow_mut();
            let Some(position) = entries.iter().position(|entry| entry.same(dialog)) else {
                return StackRemoval::NotPresent;
            };
            let was_top = position + 1 == entries.len();
            entries.remove(position);
            if was_top {
                (StackRemoval::Top, entries.last().cloned())
            } else {
                (StackRemoval::Covered, None)
            }
        };
        dialog.set_active_silently(false);
        if let Some(new_top) = new_top {
            new_top.set_active_silently(true);
        }
        if self.is_empty() {
            self.release_scroll_lock();
        }
        self.inner.observers.notify(&self.len());
        removal
    }
}

impl fmt::Debug for ModalStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalStack")
            .field("ids", &self.ids())
            .finish()
    }
}

#[derive(Clone, Default)]
pub(crate) struct WeakModalStack(Weak<StackInner>);

impl WeakModalStack {
    pub(crate) fn upgrade(&self) -> Option<ModalStack> {
        self.0.upgrade().map(|inner| ModalStack { inner })
    }
}
