//! Per-name view of a [`Form`] value with touched/dirty tracking.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use crate::{
    form::{FieldValue, Form, FormEvent},
    observer::{Observers, Subscription},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What changed on a [`Field`].
pub enum FieldChange {
    /// Value or touched flag.
    Value,
    /// Error message.
    Error,
}

struct FieldInner<T> {
    name: String,
    form: Form<T>,
    initial: Option<T>,
    touched: Cell<bool>,
    last_error: RefCell<String>,
    observers: Observers<FieldChange>,
    form_subscription: RefCell<Option<Subscription>>,
}

impl<T: FieldValue> FieldInner<T> {
    fn on_form_event(&self, event: &FormEvent) {
        match event {
            FormEvent::FieldChanged(name) if *name == self.name => {
                self.touched.set(true);
                self.observers.notify(&FieldChange::Value);
            }
            FormEvent::ErrorsChanged => {
                let current = self.form.error(&self.name);
                if *self.last_error.borrow() != current {
                    *self.last_error.borrow_mut() = current;
                    self.observers.notify(&FieldChange::Error);
                }
            }
            _ => {}
        }
    }
}

/// Two-way binding between one named input and its form.
///
/// The form map is the source of truth for the value and the error; the field only owns the
/// touched flag and the captured initial value.
pub struct Field<T> {
    inner: Rc<FieldInner<T>>,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: FieldValue> Field<T> {
    /// Binds `name` on `form`, capturing its current value as the field's initial value.
    pub(crate) fn bind(form: Form<T>, name: &str) -> Self {
        let initial = form.get(name);
        let error = form.error(name);
        let inner = Rc::new(FieldInner {
            name: name.to_string(),
            form,
            initial,
            touched: Cell::new(false),
            last_error: RefCell::new(error),
            observers: Observers::new(),
            form_subscription: RefCell::new(None),
        });
        let weak = Rc::downgrade(&inner);
        let subscription = inner.form.subscribe(move |event| {
            if let Some(inner) = weak.upgrade() {
                inner.on_form_event(event);
            }
        });
        *inner.form_subscription.borrow_mut() = Some(subscription);
        Self { inner }
    }

    /// Input name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Owning form.
    pub fn form(&self) -> &Form<T> {
        &self.inner.form
    }

    /// Current value from the form map.
    pub fn value(&self) -> Option<T> {
        self.inner.form.get(&self.inner.name)
    }

    /// Value captured when the field was bound.
    pub fn initial(&self) -> Option<T> {
        self.inner.initial.clone()
    }

    /// Records a user edit. Marks the field touched; the form map changes only when the value
    /// differs. `None` removes the entry.
    pub fn set_value(&self, value: Option<T>) {
        let was_touched = self.inner.touched.replace(true);
        let changed = self.inner.form.write_value(&self.inner.name, value);
        if !changed && !was_touched {
            self.inner.observers.notify(&FieldChange::Value);
        }
    }

    /// Current error message, empty when valid.
    pub fn error(&self) -> String {
        self.inner.form.error(&self.inner.name)
    }

    /// Writes an error into the form's error map. An empty message clears it.
    pub fn set_error(&self, message: impl Into<String>) {
        self.inner.form.set_error(&self.inner.name, message);
    }

    /// Whether the value was edited or changed from outside since binding or the last reset.
    pub fn touched(&self) -> bool {
        self.inner.touched.get()
    }

    /// Touched and different from the captured initial value.
    pub fn dirty(&self) -> bool {
        self.touched() && self.value() != self.inner.initial
    }

    /// Restores the initial value and clears the error and touched flag.
    pub fn reset(&self) {
        self.inner
            .form
            .write_value(&self.inner.name, self.inner.initial.clone());
        self.inner.form.set_error(&self.inner.name, "");
        self.inner.touched.set(false);
        self.inner.observers.notify(&FieldChange::Value);
    }

    /// Subscribes to value and error changes.
    pub fn subscribe(&self, listener: impl Fn(&FieldChange) + 'static) -> Subscription {
        self.inner.observers.subscribe(listener)
    }
}

impl<T: FieldValue> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.inner.name)
            .field("value", &self.value())
            .field("touched", &self.inner.touched.get())
            .field("error", &self.error())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use platform_host::MemoryKeyValueStore;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::form::{FieldMap, FormConfig};

    fn login() -> Form<String> {
        Form::new(
            "login",
            FieldMap::from([
                ("username".to_string(), String::new()),
                ("password".to_string(), String::new()),
            ]),
            FormConfig::default(),
        )
    }

    #[test]
    fn dirty_tracks_difference_from_initial_after_edit() {
        let form = login();
        let username = form.field("username");
        assert!(!username.dirty());
        assert!(!username.touched());

        username.set_value(Some(String::new()));
        assert!(username.touched());
        assert!(!username.dirty());

        username.set_value(Some("ada".to_string()));
        assert!(username.dirty());
        assert_eq!(form.get("username").as_deref(), Some("ada"));

        username.set_value(Some(String::new()));
        assert!(!username.dirty());
    }

    #[test]
    fn external_writes_mark_touched_only_on_change() {
        let form = login();
        let username = form.field("username");

        form.set_field("username", String::new());
        assert!(!username.touched());

        form.set_field("username", "grace".to_string());
        assert!(username.touched());
        assert_eq!(username.value().as_deref(), Some("grace"));
        assert!(username.dirty());
    }

    #[test]
    fn errors_flow_both_ways() {
        let form = login();
        let password = form.field("password");
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        let _subscription = password.subscribe(move |change| sink.borrow_mut().push(*change));

        password.set_error("required");
        assert_eq!(form.error("password"), "required");

        form.set_error("username", "taken");
        form.set_error("password", "");
        assert_eq!(password.error(), "");
        assert_eq!(*changes.borrow(), vec![FieldChange::Error, FieldChange::Error]);
    }

    #[test]
    fn reset_restores_initial_and_clears_state() {
        let form = login();
        let username = form.field("username");
        username.set_value(Some("ada".to_string()));
        username.set_error("taken");

        username.reset();
        assert_eq!(username.value().as_deref(), Some(""));
        assert_eq!(username.error(), "");
        assert!(!username.touched());
        assert!(!username.dirty());
    }

    #[test]
    fn hydrated_values_become_the_field_initial_value() {
        let store = MemoryKeyValueStore::default();
        let initial = FieldMap::from([("title".to_string(), String::new())]);
        Form::persisted("draft", initial.clone(), FormConfig::default(), Rc::new(store.clone()))
            .set_field("title", "Saved".to_string());

        let form = Form::persisted("draft", initial, FormConfig::default(), Rc::new(store));
        let title = form.field("title");
        assert!(!title.touched());
        assert!(!title.dirty());
        assert_eq!(title.initial().as_deref(), Some("Saved"));
    }

    #[test]
    fn field_bound_after_programmatic_write_starts_clean() {
        let form = login();
        form.set_field("username", "grace".to_string());

        let username = form.field("username");
        assert!(!username.touched());
        assert!(!username.dirty());

        username.set_value(Some("ada".to_string()));
        assert!(username.dirty());
        username.reset();
        assert_eq!(username.value().as_deref(), Some("grace"));
        assert!(!username.touched());
    }

    #[test]
    fn dropped_field_stops_listening() {
        let form = login();
        let field = form.field("username");
        drop(field);
        form.set_field("username", "ada".to_string());
        assert_eq!(form.get("username").as_deref(), Some("ada"));
    }
}
