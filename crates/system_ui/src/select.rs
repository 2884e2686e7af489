//! Listbox-style select: open state, keyboard highlight, and selection bound to a form field.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use crate::{
    error::UiError,
    field::{Field, FieldChange},
    form::FieldValue,
    id::next_id,
    observer::{Observers, Subscription},
    props::{ContentProps, DataState, TriggerProps},
    toggle::Toggle,
};

#[derive(Debug, Clone, PartialEq)]
/// One choice in a [`SelectState`].
pub struct SelectOption<T> {
    /// Value written on selection.
    pub value: T,
    /// Display label.
    pub label: String,
    /// Disabled options are skipped by the highlight and cannot be selected.
    pub disabled: bool,
}

impl<T> SelectOption<T> {
    /// Enabled option.
    pub fn new(value: T, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
            disabled: false,
        }
    }

    /// Marks the option disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Change notifications published by a [`SelectState`].
pub enum SelectEvent {
    /// The listbox opened or closed.
    OpenChanged(bool),
    /// The keyboard highlight moved.
    Highlighted(Option<usize>),
    /// The selection changed.
    Selected(Option<usize>),
}

struct SelectInner<T> {
    id: String,
    open: Toggle,
    options: Vec<SelectOption<T>>,
    selected: Cell<Option<usize>>,
    highlighted: Cell<Option<usize>>,
    field: RefCell<Option<(Field<T>, Subscription)>>,
    observers: Observers<SelectEvent>,
}

impl<T: FieldValue> SelectInner<T> {
    fn position_of(&self, value: Option<&T>) -> Option<usize> {
        let value = value?;
        self.options.iter().position(|option| option.value == *value)
    }

    fn set_selected(&self, selected: Option<usize>) {
        if self.selected.replace(selected) != selected {
            self.observers.notify(&SelectEvent::Selected(selected));
        }
    }

    fn set_highlighted(&self, highlighted: Option<usize>) {
        if self.highlighted.replace(highlighted) != highlighted {
            self.observers.notify(&SelectEvent::Highlighted(highlighted));
        }
    }

    fn enabled(&self, index: usize) -> bool {
        self.options
            .get(index)
            .is_some_and(|option| !option.disabled)
    }
}

/// Select state. Clones refer to the same select.
pub struct SelectState<T> {
    inner: Rc<SelectInner<T>>,
}

impl<T> Clone for SelectState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: FieldValue> SelectState<T> {
    /// Creates a closed select with nothing selected.
    pub fn new(options: Vec<SelectOption<T>>) -> Self {
        Self {
            inner: Rc::new(SelectInner {
                id: next_id("select"),
                open: Toggle::new(false),
                options,
                selected: Cell::new(None),
                highlighted: Cell::new(None),
                field: RefCell::new(None),
                observers: Observers::new(),
            }),
        }
    }

    /// Stable instance id.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Trigger element id.
    pub fn trigger_id(&self) -> String {
        format!("{}-trigger", self.inner.id)
    }

    /// Listbox element id.
    pub fn listbox_id(&self) -> String {
        format!("{}-listbox", self.inner.id)
    }

    /// Element id of the option at `index`.
    pub fn option_id(&self, index: usize) -> String {
        format!("{}-option-{index}", self.inner.id)
    }

    /// Options in display order.
    pub fn options(&self) -> &[SelectOption<T>] {
        &self.inner.options
    }

    /// Whether the listbox is open.
    pub fn is_open(&self) -> bool {
        self.inner.open.is_active()
    }

    /// Selected option index.
    pub fn selected(&self) -> Option<usize> {
        self.inner.selected.get()
    }

    /// Selected option value.
    pub fn selected_value(&self) -> Option<T> {
        self.selected()
            .and_then(|index| self.inner.options.get(index))
            .map(|option| option.value.clone())
    }

    /// Highlighted option index.
    pub fn highlighted(&self) -> Option<usize> {
        self.inner.highlighted.get()
    }

    /// `aria-activedescendant` for the listbox while open.
    pub fn active_descendant(&self) -> Option<String> {
        if !self.is_open() {
            return None;
        }
        self.highlighted().map(|index| self.option_id(index))
    }

    /// Opens the listbox, highlighting the selected option or the first enabled one.
    pub fn open(&self) {
        if self.is_open() {
            return;
        }
        let start = self
            .selected()
            .filter(|index| self.inner.enabled(*index))
            .or_else(|| self.first_enabled());
        self.inner.open.show();
        self.inner.observers.notify(&SelectEvent::OpenChanged(true));
        self.inner.set_highlighted(start);
    }

    /// Closes the listbox and drops the highlight.
    pub fn close(&self) {
        if !self.is_open() {
            return;
        }
        self.inner.open.hide();
        self.inner.observers.notify(&SelectEvent::OpenChanged(false));
        self.inner.set_highlighted(None);
    }

    /// Closes when open, opens otherwise.
    pub fn toggle(&self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    /// Moves the highlight to the next enabled option, wrapping at the end.
    pub fn highlight_next(&self) {
        self.step(true);
    }

    /// Moves the highlight to the previous enabled option, wrapping at the start.
    pub fn highlight_previous(&self) {
        self.step(false);
    }

    /// Highlights the first enabled option.
    pub fn highlight_first(&self) {
        self.inner.set_highlighted(self.first_enabled());
    }

    /// Highlights the last enabled option.
    pub fn highlight_last(&self) {
        let last = (0..self.inner.options.len())
            .rev()
            .find(|index| self.inner.enabled(*index));
        self.inner.set_highlighted(last);
    }

    /// Selects the option at `index`, closes, and writes the bound field.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::OptionOutOfRange`] or [`UiError::OptionDisabled`].
    pub fn select(&self, index: usize) -> Result<(), UiError> {
        let Some(option) = self.inner.options.get(index) else {
            return Err(UiError::OptionOutOfRange {
                index,
                len: self.inner.options.len(),
            });
        };
        if option.disabled {
            return Err(UiError::OptionDisabled(index));
        }
        let value = option.value.clone();
        self.inner.set_selected(Some(index));
        self.close();
        let field = self
            .inner
            .field
            .borrow()
            .as_ref()
            .map(|(field, _)| field.clone());
        if let Some(field) = field {
            field.set_value(Some(value));
        }
        Ok(())
    }

    /// Selects the enabled option holding `value`. Returns whether one was found.
    pub fn select_value(&self, value: &T) -> bool {
        match self.inner.position_of(Some(value)) {
            Some(index) => self.select(index).is_ok(),
            None => false,
        }
    }

    /// Applies listbox keyboard behavior. Returns whether the key was handled.
    pub fn handle_key(&self, key: &str) -> bool {
        if !self.is_open() {
            return match key {
                "ArrowDown" | "ArrowUp" | "Enter" | " " => {
                    self.open();
                    true
                }
                _ => false,
            };
        }
        match key {
            "ArrowDown" => self.highlight_next(),
            "ArrowUp" => self.highlight_previous(),
            "Home" => self.highlight_first(),
            "End" => self.highlight_last(),
            "Enter" | " " => match self.highlighted() {
                Some(index) => {
                    if let Err(err) = self.select(index) {
                        leptos::logging::debug_warn!("select {}: {err}", self.inner.id);
                    }
                }
                None => self.close(),
            },
            "Escape" => self.close(),
            _ => return false,
        }
        true
    }

    /// Binds `field` two ways: selections write the field, and field changes move the
    /// selection. Replaces any previous binding.
    pub fn bind_field(&self, field: Field<T>) {
        let weak: Weak<SelectInner<T>> = Rc::downgrade(&self.inner);
        let subscription = field.subscribe(move |change| {
            if *change != FieldChange::Value {
                return;
            }
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let value = inner
                .field
                .borrow()
                .as_ref()
                .and_then(|(field, _)| field.value());
            inner.set_selected(inner.position_of(value.as_ref()));
        });
        self.inner
            .set_selected(self.inner.position_of(field.value().as_ref()));
        *self.inner.field.borrow_mut() = Some((field, subscription));
    }

    /// Subscribes to select events.
    pub fn subscribe(&self, listener: impl Fn(&SelectEvent) + 'static) -> Subscription {
        self.inner.observers.subscribe(listener)
    }

    /// Trigger attributes; clicking toggles the listbox.
    pub fn trigger_props(&self) -> TriggerProps {
        let select = self.clone();
        TriggerProps::new(
            self.trigger_id(),
            self.listbox_id(),
            self.is_open(),
            Some("listbox"),
            move || select.toggle(),
        )
    }

    /// Listbox attributes.
    pub fn content_props(&self) -> ContentProps {
        let open = self.is_open();
        ContentProps {
            id: self.listbox_id(),
            role: Some("listbox"),
            aria_modal: None,
            aria_labelledby: Some(self.trigger_id()),
            aria_describedby: None,
            hidden: !open,
            inert: false,
            data_state: DataState::from_open(open),
        }
    }

    fn first_enabled(&self) -> Option<usize> {
        (0..self.inner.options.len()).find(|index| self.inner.enabled(*index))
    }

    fn step(&self, forward: bool) {
        let len = self.inner.options.len();
        if len == 0 {
            return;
        }
        let Some(current) = self.highlighted() else {
            if forward {
                self.highlight_first();
            } else {
                self.highlight_last();
            }
            return;
        };
        let next = (1..=len)
            .map(|offset| {
                if forward {
                    (current + offset) % len
                } else {
                    (current + len - offset % len) % len
                }
            })
            .find(|index| self.inner.enabled(*index));
        self.inner.set_highlighted(next);
    }
}

impl<T: FieldValue> fmt::Debug for SelectState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectState")
            .field("id", &self.inner.id)
            .field("open", &self.is_open())
            .field("selected", &self.selected())
            .field("highlighted", &self.highlighted())
            .field("options", &self.inner.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::form::{FieldMap, Form, FormConfig};

    fn fruit() -> SelectState<String> {
        SelectState::new(vec![
            SelectOption::new("apple".to_string(), "Apple"),
            SelectOption::new("banana".to_string(), "Banana").disabled(),
            SelectOption::new("cherry".to_string(), "Cherry"),
            SelectOption::new("date".to_string(), "Date").disabled(),
        ])
    }

    #[test]
    fn arrow_keys_skip_disabled_and_wrap() {
        let select = fruit();
        assert!(select.handle_key("ArrowDown"));
        assert!(select.is_open());
        assert_eq!(select.highlighted(), Some(0));

        select.handle_key("ArrowDown");
        assert_eq!(select.highlighted(), Some(2));
        select.handle_key("ArrowDown");
        assert_eq!(select.highlighted(), Some(0));
        select.handle_key("ArrowUp");
        assert_eq!(select.highlighted(), Some(2));

        select.handle_key("Home");
        assert_eq!(select.highlighted(), Some(0));
        select.handle_key("End");
        assert_eq!(select.highlighted(), Some(2));
        assert_eq!(select.active_descendant(), Some(select.option_id(2)));
    }

    #[test]
    fn enter_selects_highlighted_closes_and_writes_field() {
        let form = Form::new(
            "order",
            FieldMap::from([("fruit".to_string(), "apple".to_string())]),
            FormConfig::default(),
        );
        let field = form.field("fruit");
        let select = fruit();
        select.bind_field(field.clone());
        assert_eq!(select.selected(), Some(0));

        select.handle_key("Enter");
        assert_eq!(select.highlighted(), Some(0));
        select.handle_key("ArrowDown");
        select.handle_key("Enter");

        assert!(!select.is_open());
        assert_eq!(select.selected(), Some(2));
        assert_eq!(form.get("fruit").as_deref(), Some("cherry"));
        assert!(field.dirty());
        assert_eq!(select.active_descendant(), None);
    }

    #[test]
    fn field_changes_move_selection() {
        let form = Form::new(
            "order",
            FieldMap::from([("fruit".to_string(), "apple".to_string())]),
            FormConfig::default(),
        );
        let select = fruit();
        select.bind_field(form.field("fruit"));

        form.set_field("fruit", "cherry".to_string());
        assert_eq!(select.selected_value().as_deref(), Some("cherry"));
        form.set_field("fruit", "kiwi".to_string());
        assert_eq!(select.selected(), None);
    }

    #[test]
    fn disabled_and_missing_options_are_rejected() {
        let select = fruit();
        assert_eq!(select.select(1), Err(UiError::OptionDisabled(1)));
        assert_eq!(
            select.select(9),
            Err(UiError::OptionOutOfRange { index: 9, len: 4 })
        );
        assert!(!select.select_value(&"banana".to_string()));
        assert!(select.select_value(&"cherry".to_string()));
        assert_eq!(select.selected(), Some(2));
    }

    #[test]
    fn escape_closes_and_trigger_toggles() {
        let select = fruit();
        select.trigger_props().activate();
        assert!(select.is_open());
        assert!(!select.content_props().hidden);
        assert!(select.handle_key("Escape"));
        assert!(!select.is_open());
        assert!(!select.handle_key("Escape"));

        let trigger = select.trigger_props();
        assert_eq!(trigger.aria_haspopup, Some("listbox"));
        assert_eq!(trigger.aria_controls, select.listbox_id());
    }

    #[test]
    fn all_disabled_has_no_highlight() {
        let select = SelectState::new(vec![SelectOption::new(1_u8, "One").disabled()]);
        select.open();
        select.highlight_next();
        assert_eq!(select.highlighted(), None);
        assert!(select.handle_key("Enter"));
        assert!(!select.is_open());
    }
}
