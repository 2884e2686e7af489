//! Dialog state: a [`Toggle`] with accessibility ids, dismissal rules, and focus/scroll restore.
//!
//! Plain dialogs open and close like a toggle. Modal dialogs also register with a
//! [`ModalStack`] so only the topmost modal is interactive.

use std::{cell::RefCell, fmt, rc::Rc};

use leptos::logging::debug_warn;
use serde::{Deserialize, Serialize};

use crate::{
    focus::{wrap_tab_stop, DialogHost, RestorePoint},
    id::next_id,
    modal_stack::{ModalStack, StackRemoval, WeakModalStack},
    observer::Subscription,
    props::{ContentProps, DataState, TriggerProps},
    toggle::{Toggle, ToggleCallbacks},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Dialog behavior switches.
pub struct DialogOptions {
    /// Start open.
    pub default_open: bool,
    /// Close on `Escape` while active.
    pub close_on_escape: bool,
    /// Close on pointer-down outside the content while active.
    pub close_on_outside_click: bool,
    /// Render as `alertdialog`.
    pub alert: bool,
}

impl Default for DialogOptions {
    fn default() -> Self {
        Self {
            default_open: false,
            close_on_escape: true,
            close_on_outside_click: true,
            alert: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A keyboard event as seen by a dialog.
pub struct KeyInput {
    /// `KeyboardEvent.key` value.
    pub key: String,
    /// Whether Shift was held.
    pub shift: bool,
}

impl KeyInput {
    /// Key without modifiers.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            shift: false,
        }
    }

    /// Sets the Shift modifier.
    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// What a dialog did with a key.
pub enum KeyOutcome {
    /// Not handled; let the event through.
    Ignored,
    /// The dialog closed.
    Closed,
    /// Focus must move to this id and the default Tab behavior be prevented.
    MoveFocus(String),
}

struct DialogInner {
    id: String,
    state: Toggle,
    options: DialogOptions,
    stack: Option<WeakModalStack>,
    host: RefCell<Option<Rc<dyn DialogHost>>>,
    restore: RefCell<Option<RestorePoint>>,
}

#[derive(Clone)]
/// Shared dialog handle. Clones refer to the same dialog.
pub struct Dialog {
    inner: Rc<DialogInner>,
}

impl Dialog {
    /// Creates a plain (non-modal) dialog.
    pub fn new(options: DialogOptions) -> Self {
        Self::build(options, ToggleCallbacks::default(), None)
    }

    /// Creates a plain dialog with lifecycle callbacks.
    pub fn with_callbacks(options: DialogOptions, callbacks: ToggleCallbacks) -> Self {
        Self::build(options, callbacks, None)
    }

    /// Creates a modal dialog registered with `stack`.
    pub fn modal(stack: &ModalStack, options: DialogOptions) -> Self {
        Self::build(options, ToggleCallbacks::default(), Some(stack.downgrade()))
    }

    /// Creates a modal dialog with lifecycle callbacks.
    pub fn modal_with_callbacks(
        stack: &ModalStack,
        options: DialogOptions,
        callbacks: ToggleCallbacks,
    ) -> Self {
        Self::build(options, callbacks, Some(stack.downgrade()))
    }

    fn build(
        options: DialogOptions,
        callbacks: ToggleCallbacks,
        stack: Option<WeakModalStack>,
    ) -> Self {
        let dialog = Self {
            inner: Rc::new(DialogInner {
                id: next_id("dialog"),
                state: Toggle::with_callbacks(false, callbacks),
                options,
                stack,
                host: RefCell::new(None),
                restore: RefCell::new(None),
            }),
        };
        if options.default_open {
            if let Some(stack) = dialog.stack() {
                stack.push(&dialog);
            }
            dialog.inner.state.set_active(true);
        }
        dialog
    }

    /// Attaches the environment used to save and restore focus and scroll.
    ///
    /// A modal that is already open (for example through `default_open`) takes the scroll lock
    /// and records its restore point now.
    pub fn with_host(self, host: Rc<dyn DialogHost>) -> Self {
        *self.inner.host.borrow_mut() = Some(Rc::clone(&host));
        if self.is_open() && self.inner.restore.borrow().is_none() {
            self.capture_restore_point();
        }
        if let Some(stack) = self.stack().filter(|stack| stack.contains(&self)) {
            stack.lock_scroll(host);
        }
        self
    }

    /// Stable instance id, also the content element id.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Id for the element labelling the dialog.
    pub fn title_id(&self) -> String {
        format!("{}-title", self.inner.id)
    }

    /// Id for the element describing the dialog.
    pub fn description_id(&self) -> String {
        format!("{}-description", self.inner.id)
    }

    /// Id for the trigger element.
    pub fn trigger_id(&self) -> String {
        format!("{}-trigger", self.inner.id)
    }

    /// Behavior switches.
    pub fn options(&self) -> DialogOptions {
        self.inner.options
    }

    /// Whether the dialog is registered with a live modal stack.
    pub fn is_modal(&self) -> bool {
        self.stack().is_some()
    }

    /// Whether the dialog is open and interactive.
    pub fn is_active(&self) -> bool {
        self.inner.state.is_active()
    }

    /// Whether the dialog is open, including a modal covered by another modal.
    pub fn is_open(&self) -> bool {
        self.is_active()
            || self
                .stack()
                .is_some_and(|stack| stack.contains(self))
    }

    /// Opens the dialog. A modal becomes the stack top and covers the previous top.
    pub fn open(&self) {
        let newly_opened = !self.is_open();
        let stack = self.stack();
        if newly_opened {
            self.capture_restore_point();
        }
        if let Some(stack) = stack {
            stack.push(self);
        }
        self.inner.state.show();
    }

    /// Closes the dialog. A modal leaves the stack; if it was the top, the modal below it is
    /// reactivated.
    pub fn close(&self) {
        match self.stack() {
            Some(stack) => {
                let removal = stack.remove(self);
                self.inner.state.hide();
                match removal {
                    StackRemoval::Top => self.restore(),
                    StackRemoval::Covered => self.discard_restore_point(),
                    StackRemoval::NotPresent => {}
                }
            }
            None => {
                let was_active = self.is_active();
                self.inner.state.hide();
                if was_active {
                    self.restore();
                }
            }
        }
    }

    /// Closes when active, opens otherwise.
    pub fn toggle(&self) {
        if self.is_active() {
            self.close();
        } else {
            self.open();
        }
    }

    /// Applies the Escape and focus-trap rules to a key pressed while the dialog is active.
    ///
    /// `tab_stops` are the focusable ids inside the content in DOM order and `focused` is the
    /// currently focused id.
    pub fn handle_key(
        &self,
        input: &KeyInput,
        tab_stops: &[String],
        focused: Option<&str>,
    ) -> KeyOutcome {
        if !self.is_active() {
            return KeyOutcome::Ignored;
        }
        match input.key.as_str() {
            "Escape" if self.inner.options.close_on_escape => {
                self.close();
                KeyOutcome::Closed
            }
            "Tab" => wrap_tab_stop(tab_stops, focused, input.shift)
                .map(|id| KeyOutcome::MoveFocus(id.to_string()))
                .unwrap_or(KeyOutcome::Ignored),
            _ => KeyOutcome::Ignored,
        }
    }

    /// Closes on a pointer-down outside the content while active. Returns whether it closed.
    pub fn handle_pointer_down(&self, target_inside_content: bool) -> bool {
        if target_inside_content
            || !self.is_active()
            || !self.inner.options.close_on_outside_click
        {
            return false;
        }
        self.close();
        true
    }

    /// Subscribes to active-flag changes.
    pub fn subscribe(&self, listener: impl Fn(&bool) + 'static) -> Subscription {
        self.inner.state.subscribe(listener)
    }

    /// Trigger attributes; clicking toggles the dialog.
    pub fn trigger_props(&self) -> TriggerProps {
        let dialog = self.clone();
        TriggerProps::new(
            self.trigger_id(),
            self.inner.id.clone(),
            self.is_open(),
            Some("dialog"),
            move || dialog.toggle(),
        )
    }

    /// Content attributes.
    pub fn content_props(&self) -> ContentProps {
        let open = self.is_open();
        ContentProps {
            id: self.inner.id.clone(),
            role: Some(if self.inner.options.alert {
                "alertdialog"
            } else {
                "dialog"
            }),
            aria_modal: Some(self.is_modal()),
            aria_labelledby: Some(self.title_id()),
            aria_describedby: Some(self.description_id()),
            hidden: !open,
            inert: open && !self.is_active(),
            data_state: DataState::from_open(open),
        }
    }

    /// Passes [`Dialog::trigger_props`] to a caller-supplied render function.
    pub fn render_trigger<R>(&self, render: impl FnOnce(TriggerProps) -> R) -> R {
        render(self.trigger_props())
    }

    /// Passes [`Dialog::content_props`] to a caller-supplied render function.
    pub fn render_content<R>(&self, render: impl FnOnce(ContentProps) -> R) -> R {
        render(self.content_props())
    }

    /// Returns `true` when both handles point at the same dialog.
    pub fn same(&self, other: &Dialog) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn set_active_silently(&self, active: bool) {
        self.inner.state.set_active(active);
    }

    /// Final step for a dialog drained by [`ModalStack::close_all`].
    pub(crate) fn finish_drained(&self, bottom: bool) {
        self.inner.state.hide();
        if bottom {
            self.restore();
        } else {
            self.discard_restore_point();
        }
    }

    fn stack(&self) -> Option<ModalStack> {
        self.inner.stack.as_ref().and_then(WeakModalStack::upgrade)
    }

    pub(crate) fn host(&self) -> Option<Rc<dyn DialogHost>> {
        self.inner.host.borrow().clone()
    }

    fn capture_restore_point(&self) {
        let Some(host) = self.host() else {
            return;
        };
        let point = RestorePoint::capture(host.as_ref());
        *self.inner.restore.borrow_mut() = Some(point);
    }

    fn discard_restore_point(&self) {
        self.inner.restore.borrow_mut().take();
    }

    /// The scroll lock is released by the stack before this runs.
    fn restore(&self) {
        let Some(host) = self.host() else {
            return;
        };
        let Some(point) = self.inner.restore.borrow_mut().take() else {
            return;
        };
        host.scroll_to(point.scroll);
        if let Some(id) = point.focused_id.as_deref() {
            if !host.focus_element(id) {
                debug_warn!("dialog {} could not restore focus to `{id}`", self.inner.id);
            }
        }
    }
}

impl fmt::Debug for Dialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialog")
            .field("id", &self.inner.id)
            .field("active", &self.is_active())
            .field("modal", &self.is_modal())
            .field("options", &self.inner.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::focus::ScrollPosition;

    #[derive(Default)]
    struct RecordingHost {
        focused: RefCell<Option<String>>,
        scroll: Cell<(f64, f64)>,
        locked: Cell<bool>,
        log: RefCell<Vec<String>>,
    }

    impl RecordingHost {
        fn focus(&self, id: &str) {
            *self.focused.borrow_mut() = Some(id.to_string());
        }
    }

    impl DialogHost for RecordingHost {
        fn active_element_id(&self) -> Option<String> {
            self.focused.borrow().clone()
        }

        fn focus_element(&self, id: &str) -> bool {
            self.log.borrow_mut().push(format!("focus:{id}"));
            self.focus(id);
            true
        }

        fn scroll_position(&self) -> ScrollPosition {
            let (x, y) = self.scroll.get();
            ScrollPosition { x, y }
        }

        fn scroll_to(&self, position: ScrollPosition) {
            self.log
                .borrow_mut()
                .push(format!("scroll:{}", position.y));
            self.scroll.set((position.x, position.y));
        }

        fn set_scroll_locked(&self, locked: bool) {
            self.log.borrow_mut().push(format!("lock:{locked}"));
            self.locked.set(locked);
        }
    }

    #[test]
    fn plain_dialog_open_close_and_derived_ids() {
        let dialog = Dialog::new(DialogOptions::default());
        assert!(!dialog.is_active());

        dialog.open();
        assert!(dialog.is_active());
        assert_eq!(dialog.title_id(), format!("{}-title", dialog.id()));
        assert_eq!(dialog.description_id(), format!("{}-description", dialog.id()));

        dialog.close();
        assert!(!dialog.is_active());
        assert!(!dialog.is_modal());
    }

    #[test]
    fn default_open_starts_active_without_callbacks() {
        let shows = Rc::new(Cell::new(0));
        let counter = Rc::clone(&shows);
        let stack = ModalStack::new();
        let dialog = Dialog::modal_with_callbacks(
            &stack,
            DialogOptions {
                default_open: true,
                ..DialogOptions::default()
            },
            ToggleCallbacks::default().on_show(move || counter.set(counter.get() + 1)),
        );

        assert!(dialog.is_active());
        assert_eq!(stack.len(), 1);
        assert_eq!(shows.get(), 0);
    }

    #[test]
    fn escape_closes_only_when_enabled_and_active() {
        let dialog = Dialog::new(DialogOptions::default());
        let escape = KeyInput::new("Escape");
        assert_eq!(dialog.handle_key(&escape, &[], None), KeyOutcome::Ignored);

        dialog.open();
        assert_eq!(dialog.handle_key(&escape, &[], None), KeyOutcome::Closed);
        assert!(!dialog.is_active());

        let sticky = Dialog::new(DialogOptions {
            close_on_escape: false,
            ..DialogOptions::default()
        });
        sticky.open();
        assert_eq!(sticky.handle_key(&escape, &[], None), KeyOutcome::Ignored);
        assert!(sticky.is_active());
    }

    #[test]
    fn tab_wraps_inside_active_dialog() {
        let dialog = Dialog::new(DialogOptions::default());
        dialog.open();
        let stops = vec!["cancel".to_string(), "confirm".to_string()];

        assert_eq!(
            dialog.handle_key(&KeyInput::new("Tab"), &stops, Some("confirm")),
            KeyOutcome::MoveFocus("cancel".to_string())
        );
        assert_eq!(
            dialog.handle_key(&KeyInput::new("Tab").with_shift(true), &stops, Some("cancel")),
            KeyOutcome::MoveFocus("confirm".to_string())
        );
        assert_eq!(
            dialog.handle_key(&KeyInput::new("Tab"), &stops, Some("cancel")),
            KeyOutcome::Ignored
        );
    }

    #[test]
    fn outside_pointer_down_closes_active_dialog() {
        let dialog = Dialog::new(DialogOptions::default());
        dialog.open();
        assert!(!dialog.handle_pointer_down(true));
        assert!(dialog.is_active());
        assert!(dialog.handle_pointer_down(false));
        assert!(!dialog.is_active());
        assert!(!dialog.handle_pointer_down(false));
    }

    #[test]
    fn only_top_modal_reacts_to_escape() {
        let stack = ModalStack::new();
        let lower = Dialog::modal(&stack, DialogOptions::default());
        let upper = Dialog::modal(&stack, DialogOptions::default());
        lower.open();
        upper.open();

        let escape = KeyInput::new("Escape");
        assert_eq!(lower.handle_key(&escape, &[], None), KeyOutcome::Ignored);
        assert_eq!(upper.handle_key(&escape, &[], None), KeyOutcome::Closed);
        assert!(lower.is_active());
    }

    #[test]
    fn modal_restores_focus_and_scroll_on_close() {
        let host = Rc::new(RecordingHost::default());
        host.focus("open-settings");
        host.scroll.set((0.0, 480.0));

        let stack = ModalStack::new();
        let dialog = Dialog::modal(&stack, DialogOptions::default()).with_host(host.clone());
        dialog.open();
        assert!(host.locked.get());

        host.focus("settings-name");
        host.scroll.set((0.0, 0.0));
        dialog.close();

        assert!(!host.locked.get());
        assert_eq!(host.active_element_id().as_deref(), Some("open-settings"));
        assert_eq!(host.scroll_position().y, 480.0);
        assert_eq!(
            *host.log.borrow(),
            vec!["lock:true", "lock:false", "scroll:480", "focus:open-settings"]
        );
    }

    #[test]
    fn nested_modal_keeps_scroll_locked_until_last_closes() {
        let host = Rc::new(RecordingHost::default());
        host.focus("page-button");
        let stack = ModalStack::new();
        let outer = Dialog::modal(&stack, DialogOptions::default()).with_host(host.clone());
        let inner = Dialog::modal(&stack, DialogOptions::default()).with_host(host.clone());

        outer.open();
        host.focus("outer-button");
        inner.open();
        inner.close();
        assert!(host.locked.get());
        assert_eq!(host.active_element_id().as_deref(), Some("outer-button"));

        outer.close();
        assert!(!host.locked.get());
        assert_eq!(host.active_element_id().as_deref(), Some("page-button"));
    }

    #[test]
    fn default_open_modal_releases_scroll_lock_after_nested_modal() {
        let host = Rc::new(RecordingHost::default());
        let stack = ModalStack::new();
        let bottom = Dialog::modal(
            &stack,
            DialogOptions {
                default_open: true,
                ..DialogOptions::default()
            },
        )
        .with_host(host.clone());
        assert!(host.locked.get());
        assert!(stack.is_scroll_locked());

        let top = Dialog::modal(&stack, DialogOptions::default()).with_host(host.clone());
        top.open();
        top.close();
        assert!(host.locked.get());

        bottom.close();
        assert!(stack.is_empty());
        assert!(!host.locked.get());
        assert!(!stack.is_scroll_locked());
    }

    #[test]
    fn hostless_bottom_modal_still_releases_lock_taken_above_it() {
        let host = Rc::new(RecordingHost::default());
        let stack = ModalStack::new();
        let bottom = Dialog::modal(&stack, DialogOptions::default());
        let top = Dialog::modal(&stack, DialogOptions::default()).with_host(host.clone());

        bottom.open();
        assert!(!stack.is_scroll_locked());
        top.open();
        assert!(host.locked.get());
        top.close();
        assert!(host.locked.get());

        bottom.close();
        assert!(!host.locked.get());

        bottom.open();
        top.open();
        stack.close_all();
        assert!(!host.locked.get());
    }

    #[test]
    fn plain_dialog_restores_scroll_and_focus_without_locking() {
        let host = Rc::new(RecordingHost::default());
        host.focus("help-button");
        host.scroll.set((0.0, 120.0));
        let dialog = Dialog::new(DialogOptions::default()).with_host(host.clone());

        dialog.open();
        assert!(!host.locked.get());
        host.scroll.set((0.0, 0.0));
        dialog.close();

        assert_eq!(host.scroll_position().y, 120.0);
        assert_eq!(host.active_element_id().as_deref(), Some("help-button"));
        assert_eq!(*host.log.borrow(), vec!["scroll:120", "focus:help-button"]);
    }

    #[test]
    fn close_all_restores_focus_from_bottom_modal() {
        let host = Rc::new(RecordingHost::default());
        host.focus("page-button");
        let stack = ModalStack::new();
        let outer = Dialog::modal(&stack, DialogOptions::default()).with_host(host.clone());
        let inner = Dialog::modal(&stack, DialogOptions::default()).with_host(host.clone());
        outer.open();
        host.focus("outer-button");
        inner.open();

        stack.close_all();
        assert!(!host.locked.get());
        assert_eq!(host.active_element_id().as_deref(), Some("page-button"));
    }

    #[test]
    fn props_reflect_modal_and_covered_state() {
        let stack = ModalStack::new();
        let lower = Dialog::modal(
            &stack,
            DialogOptions {
                alert: true,
                ..DialogOptions::default()
            },
        );
        let upper = Dialog::modal(&stack, DialogOptions::default());

        let closed = lower.content_props();
        assert!(closed.hidden);
        assert_eq!(closed.data_state, DataState::Closed);

        lower.render_trigger(|props| props.activate());
        upper.open();

        let covered = lower.content_props();
        assert_eq!(covered.role, Some("alertdialog"));
        assert_eq!(covered.aria_modal, Some(true));
        assert!(!covered.hidden);
        assert!(covered.inert);
        assert_eq!(covered.aria_labelledby, Some(lower.title_id()));

        let trigger = upper.trigger_props();
        assert_eq!(trigger.aria_haspopup, Some("dialog"));
        assert_eq!(trigger.aria_controls, upper.id());
        assert!(trigger.aria_expanded);
        assert!(!upper.render_content(|props| props.inert));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: DialogOptions =
            serde_json::from_str(r#"{"close_on_outside_click": false}"#).expect("options");
        assert_eq!(
            options,
            DialogOptions {
                close_on_outside_click: false,
                ..DialogOptions::default()
            }
        );
    }
}
