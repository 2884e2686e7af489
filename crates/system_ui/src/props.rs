//! Plain attribute bags handed to caller-supplied render functions.
//!
//! State handles never render. They describe the ids, ARIA attributes, and `data-state` tokens
//! a trigger or content element needs, plus the click handler a trigger should call.

use std::{fmt, rc::Rc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Open/closed token rendered as `data-state`.
pub enum DataState {
    /// The controlled content is shown.
    Open,
    /// The controlled content is hidden.
    Closed,
}

impl DataState {
    /// Maps an open flag to its token.
    pub fn from_open(open: bool) -> Self {
        if open {
            Self::Open
        } else {
            Self::Closed
        }
    }

    /// Stable DOM token.
    pub fn token(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

#[derive(Clone)]
/// Attributes and click handler for an element that opens or closes controlled content.
pub struct TriggerProps {
    /// Trigger element id.
    pub id: String,
    /// `aria-controls`: id of the controlled content.
    pub aria_controls: String,
    /// `aria-expanded`.
    pub aria_expanded: bool,
    /// `aria-haspopup`, when the content is a popup (`dialog`, `listbox`).
    pub aria_haspopup: Option<&'static str>,
    /// `data-state`.
    pub data_state: DataState,
    on_click: Rc<dyn Fn()>,
}

impl TriggerProps {
    pub(crate) fn new(
        id: String,
        aria_controls: String,
        open: bool,
        aria_haspopup: Option<&'static str>,
        on_click: impl Fn() + 'static,
    ) -> Self {
        Self {
            id,
            aria_controls,
            aria_expanded: open,
            aria_haspopup,
            data_state: DataState::from_open(open),
            on_click: Rc::new(on_click),
        }
    }

    /// Runs the trigger's click behavior.
    pub fn activate(&self) {
        (self.on_click)();
    }

    /// Returns the click handler for wiring into a view layer event.
    pub fn on_click(&self) -> Rc<dyn Fn()> {
        Rc::clone(&self.on_click)
    }
}

impl fmt::Debug for TriggerProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerProps")
            .field("id", &self.id)
            .field("aria_controls", &self.aria_controls)
            .field("aria_expanded", &self.aria_expanded)
            .field("aria_haspopup", &self.aria_haspopup)
            .field("data_state", &self.data_state)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Attributes for the element a trigger controls.
pub struct ContentProps {
    /// Content element id.
    pub id: String,
    /// `role`, when the content has one (`dialog`, `alertdialog`, `listbox`, `region`).
    pub role: Option<&'static str>,
    /// `aria-modal`, for dialogs.
    pub aria_modal: Option<bool>,
    /// `aria-labelledby`.
    pub aria_labelledby: Option<String>,
    /// `aria-describedby`.
    pub aria_describedby: Option<String>,
    /// Whether the content should not be rendered or should be `hidden`.
    pub hidden: bool,
    /// Whether the content is shown but must not receive interaction (a covered modal).
    pub inert: bool,
    /// `data-state`.
    pub data_state: DataState,
}
