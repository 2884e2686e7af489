//! Disclosure state for a single collapsible region.

use std::{fmt, rc::Rc};

use crate::{
    id::next_id,
    observer::Subscription,
    props::{ContentProps, DataState, TriggerProps},
    toggle::{Toggle, ToggleCallbacks},
};

#[derive(Clone)]
/// A [`Toggle`] with stable trigger/content ids.
pub struct Collapsible {
    id: Rc<str>,
    state: Toggle,
}

impl Collapsible {
    /// Creates a collapsible, open when `default_open` is set.
    pub fn new(default_open: bool) -> Self {
        Self::with_callbacks(default_open, ToggleCallbacks::default())
    }

    /// Creates a collapsible with lifecycle callbacks.
    pub fn with_callbacks(default_open: bool, callbacks: ToggleCallbacks) -> Self {
        Self {
            id: next_id("collapsible").into(),
            state: Toggle::with_callbacks(default_open, callbacks),
        }
    }

    /// Instance id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Id of the trigger element.
    pub fn trigger_id(&self) -> String {
        format!("{}-trigger", self.id)
    }

    /// Id of the content region.
    pub fn content_id(&self) -> String {
        format!("{}-content", self.id)
    }

    /// Opens the region.
    pub fn expand(&self) {
        self.state.show();
    }

    /// Closes the region.
    pub fn collapse(&self) {
        self.state.hide();
    }

    /// Flips the region.
    pub fn toggle(&self) {
        self.state.toggle();
    }

    /// Whether the region is open.
    pub fn is_open(&self) -> bool {
        self.state.is_active()
    }

    /// Underlying toggle state.
    pub fn state(&self) -> &Toggle {
        &self.state
    }

    /// Subscribes to open/closed changes.
    pub fn subscribe(&self, listener: impl Fn(&bool) + 'static) -> Subscription {
        self.state.subscribe(listener)
    }

    /// Trigger attributes; clicking toggles the region.
    pub fn trigger_props(&self) -> TriggerProps {
        let target = self.clone();
        self.trigger_props_with(move || target.toggle())
    }

    pub(crate) fn trigger_props_with(&self, on_click: impl Fn() + 'static) -> TriggerProps {
        TriggerProps::new(
            self.trigger_id(),
            self.content_id(),
            self.is_open(),
            None,
            on_click,
        )
    }

    /// Content region attributes.
    pub fn content_props(&self) -> ContentProps {
        let open = self.is_open();
        ContentProps {
            id: self.content_id(),
            role: Some("region"),
            aria_modal: None,
            aria_labelledby: Some(self.trigger_id()),
            aria_describedby: None,
            hidden: !open,
            inert: false,
            data_state: DataState::from_open(open),
        }
    }
}

impl fmt::Debug for Collapsible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collapsible")
            .field("id", &self.id)
            .field("open", &self.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_click_flips_region_and_props_follow() {
        let region = Collapsible::new(false);
        assert!(region.content_props().hidden);

        region.trigger_props().activate();
        assert!(region.is_open());

        let trigger = region.trigger_props();
        let content = region.content_props();
        assert!(trigger.aria_expanded);
        assert_eq!(trigger.aria_controls, content.id);
        assert_eq!(content.aria_labelledby.as_deref(), Some(trigger.id.as_str()));
        assert_eq!(content.data_state, DataState::Open);
        assert!(!content.hidden);
    }

    #[test]
    fn default_open_and_explicit_transitions() {
        let region = Collapsible::new(true);
        assert!(region.is_open());
        region.collapse();
        assert!(!region.is_open());
        region.expand();
        region.expand();
        assert!(region.is_open());
        assert!(region.content_id().starts_with(region.id()));
    }
}
