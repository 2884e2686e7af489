//! Boolean open/closed state machine underlying every disclosure primitive.

use std::{cell::Cell, fmt, rc::Rc};

use crate::observer::{Observers, Subscription};

#[derive(Clone, Default)]
/// Optional lifecycle callbacks run synchronously inside [`Toggle`] mutations.
pub struct ToggleCallbacks {
    on_show: Option<Rc<dyn Fn()>>,
    on_hide: Option<Rc<dyn Fn()>>,
    on_toggle: Option<Rc<dyn Fn(bool)>>,
}

impl ToggleCallbacks {
    /// Called after every [`Toggle::show`], including repeated calls.
    pub fn on_show(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_show = Some(Rc::new(callback));
        self
    }

    /// Called after every [`Toggle::hide`].
    pub fn on_hide(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_hide = Some(Rc::new(callback));
        self
    }

    /// Called after every [`Toggle::toggle`] with the new active flag.
    pub fn on_toggle(mut self, callback: impl Fn(bool) + 'static) -> Self {
        self.on_toggle = Some(Rc::new(callback));
        self
    }
}

impl fmt::Debug for ToggleCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToggleCallbacks")
            .field("on_show", &self.on_show.is_some())
            .field("on_hide", &self.on_hide.is_some())
            .field("on_toggle", &self.on_toggle.is_some())
            .finish()
    }
}

struct ToggleInner {
    active: Cell<bool>,
    callbacks: ToggleCallbacks,
    observers: Observers<bool>,
}

#[derive(Clone)]
/// Shared handle to an active/inactive flag.
///
/// Clones refer to the same state, so a handle can be passed to every view fragment that needs
/// it. `is_active` is the only source of truth.
pub struct Toggle {
    inner: Rc<ToggleInner>,
}

impl Toggle {
    /// Creates a toggle without callbacks.
    pub fn new(initial_active: bool) -> Self {
        Self::with_callbacks(initial_active, ToggleCallbacks::default())
    }

    /// Creates a toggle with lifecycle callbacks.
    pub fn with_callbacks(initial_active: bool, callbacks: ToggleCallbacks) -> Self {
        Self {
            inner: Rc::new(ToggleInner {
                active: Cell::new(initial_active),
                callbacks,
                observers: Observers::new(),
            }),
        }
    }

    /// Activates and runs `on_show`.
    pub fn show(&self) {
        self.set_active(true);
        if let Some(on_show) = self.inner.callbacks.on_show.clone() {
            on_show();
        }
    }

    /// Deactivates and runs `on_hide`.
    pub fn hide(&self) {
        self.set_active(false);
        if let Some(on_hide) = self.inner.callbacks.on_hide.clone() {
            on_hide();
        }
    }

    /// Flips the flag and runs `on_toggle` with the new value.
    pub fn toggle(&self) {
        let next = !self.is_active();
        self.set_active(next);
        if let Some(on_toggle) = self.inner.callbacks.on_toggle.clone() {
            on_toggle(next);
        }
    }

    /// Current flag.
    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    /// Subscribes to flag changes. Listeners see the new value.
    pub fn subscribe(&self, listener: impl Fn(&bool) + 'static) -> Subscription {
        self.inner.observers.subscribe(listener)
    }

    /// Returns `true` when both handles point at the same state.
    pub fn same(&self, other: &Toggle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Sets the flag and notifies subscribers without running lifecycle callbacks.
    pub(crate) fn set_active(&self, active: bool) {
        if self.inner.active.replace(active) != active {
            self.inner.observers.notify(&active);
        }
    }
}

impl fmt::Debug for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toggle")
            .field("active", &self.is_active())
            .field("callbacks", &self.inner.callbacks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Show,
        Hide,
        Toggle,
    }

    fn sequences(len: usize) -> Vec<Vec<Op>> {
        let mut out = vec![Vec::new()];
        for _ in 0..len {
            out = out
                .into_iter()
                .flat_map(|seq| {
                    [Op::Show, Op::Hide, Op::Toggle].into_iter().map(move |op| {
                        let mut next = seq.clone();
                        next.push(op);
                        next
                    })
                })
                .collect();
        }
        out
    }

    #[test]
    fn is_active_folds_every_operation_sequence() {
        for initial in [false, true] {
            for len in 0..=5 {
                for ops in sequences(len) {
                    let toggle = Toggle::new(initial);
                    let mut expected = initial;
                    for op in &ops {
                        match op {
                            Op::Show => {
                                toggle.show();
                                expected = true;
                            }
                            Op::Hide => {
                                toggle.hide();
                                expected = false;
                            }
                            Op::Toggle => {
                                toggle.toggle();
                                expected = !expected;
                            }
                        }
                    }
                    assert_eq!(toggle.is_active(), expected, "initial={initial} ops={ops:?}");
                }
            }
        }
    }

    #[test]
    fn callbacks_fire_on_every_call_including_repeats() {
        let log = Rc::new(RefCell::new(Vec::<String>::new()));
        let (show_log, hide_log, toggle_log) = (Rc::clone(&log), Rc::clone(&log), Rc::clone(&log));
        let toggle = Toggle::with_callbacks(
            false,
            ToggleCallbacks::default()
                .on_show(move || show_log.borrow_mut().push("show".into()))
                .on_hide(move || hide_log.borrow_mut().push("hide".into()))
                .on_toggle(move |active| toggle_log.borrow_mut().push(format!("toggle:{active}"))),
        );

        toggle.show();
        toggle.show();
        toggle.toggle();
        toggle.hide();

        assert_eq!(
            *log.borrow(),
            vec!["show", "show", "toggle:false", "hide"]
        );
    }

    #[test]
    fn subscribers_only_see_real_transitions() {
        let toggle = Toggle::new(false);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _subscription = toggle.subscribe(move |active| sink.borrow_mut().push(*active));

        toggle.show();
        toggle.show();
        toggle.toggle();
        toggle.hide();

        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn clones_share_state() {
        let toggle = Toggle::new(false);
        let other = toggle.clone();
        other.show();
        assert!(toggle.is_active());
        assert!(toggle.same(&other));
        assert!(!toggle.same(&Toggle::new(true)));
    }
}
