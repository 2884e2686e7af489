//! Bridges from state-handle subscriptions to Leptos signals.
//!
//! Each bridge keeps its [`Subscription`](crate::Subscription) in the current reactive owner, so
//! the listener is removed when the owning view is disposed.

use leptos::{create_rw_signal, store_value, ReadSignal, SignalSet};

use crate::{
    accordion::Accordion,
    dialog::Dialog,
    field::{Field, FieldChange},
    form::{FieldValue, Form, FormEvent, FormStatus},
    modal_stack::ModalStack,
    select::{SelectEvent, SelectState},
    toggle::Toggle,
};

/// Signal mirroring [`Toggle::is_active`].
pub fn active_signal(toggle: &Toggle) -> ReadSignal<bool> {
    let signal = create_rw_signal(toggle.is_active());
    store_value(toggle.subscribe(move |active| signal.set(*active)));
    signal.read_only()
}

/// Signal mirroring [`Dialog::is_active`].
pub fn dialog_active_signal(dialog: &Dialog) -> ReadSignal<bool> {
    let signal = create_rw_signal(dialog.is_active());
    store_value(dialog.subscribe(move |active| signal.set(*active)));
    signal.read_only()
}

/// Signal mirroring the modal stack depth.
pub fn modal_depth_signal(stack: &ModalStack) -> ReadSignal<usize> {
    let signal = create_rw_signal(stack.len());
    store_value(stack.subscribe(move |depth| signal.set(*depth)));
    signal.read_only()
}

/// Signal mirroring [`Form::status`].
pub fn form_status_signal<T: FieldValue>(form: &Form<T>) -> ReadSignal<FormStatus> {
    let signal = create_rw_signal(form.status());
    store_value(form.subscribe(move |event| {
        if let FormEvent::StatusChanged(status) = event {
            signal.set(*status);
        }
    }));
    signal.read_only()
}

/// Signal mirroring [`Field::value`].
pub fn field_value_signal<T: FieldValue>(field: &Field<T>) -> ReadSignal<Option<T>> {
    let signal = create_rw_signal(field.value());
    let form = field.form().clone();
    let name = field.name().to_string();
    store_value(field.subscribe(move |change| {
        if *change == FieldChange::Value {
            signal.set(form.get(&name));
        }
    }));
    signal.read_only()
}

/// Signal mirroring [`Accordion::expanded`].
pub fn accordion_signal(accordion: &Accordion) -> ReadSignal<Vec<String>> {
    let signal = create_rw_signal(accordion.expanded());
    store_value(accordion.subscribe(move |expanded| signal.set(expanded.clone())));
    signal.read_only()
}

/// Signal mirroring [`SelectState::selected`].
pub fn select_selected_signal<T: FieldValue>(select: &SelectState<T>) -> ReadSignal<Option<usize>> {
    let signal = create_rw_signal(select.selected());
    store_value(select.subscribe(move |event| {
        if let SelectEvent::Selected(selected) = event {
            signal.set(*selected);
        }
    }));
    signal.read_only()
}

#[cfg(target_arch = "wasm32")]
/// Routes window `keydown` and `pointerdown` events into `dialog` while the current view lives.
///
/// Escape and outside clicks close the dialog when its options allow it, and Tab is trapped
/// inside the content element.
pub fn install_dismiss_listeners(dialog: Dialog) {
    use leptos::{ev, on_cleanup, window_event_listener};

    use crate::{
        dialog::{KeyInput, KeyOutcome},
        dom,
    };

    let keyboard_dialog = dialog.clone();
    let key_listener = window_event_listener(ev::keydown, move |ev| {
        if ev.default_prevented() {
            return;
        }
        let input = KeyInput::new(ev.key()).with_shift(ev.shift_key());
        let stops = dom::tab_stops_within(keyboard_dialog.id());
        let focused = dom::active_element_id();
        match keyboard_dialog.handle_key(&input, &stops, focused.as_deref()) {
            KeyOutcome::Ignored => {}
            KeyOutcome::Closed => {
                ev.prevent_default();
                ev.stop_propagation();
            }
            KeyOutcome::MoveFocus(id) => {
                ev.prevent_default();
                if !dom::focus_element_by_id(&id) {
                    leptos::logging::debug_warn!("focus trap could not move focus to `{id}`");
                }
            }
        }
    });
    on_cleanup(move || key_listener.remove());

    let pointer_listener = window_event_listener(ev::pointerdown, move |ev| {
        let inside = dom::event_within(&ev, dialog.id());
        dialog.handle_pointer_down(inside);
    });
    on_cleanup(move || pointer_listener.remove());
}
