//! A set of collapsible items with single or multiple expansion.

use std::{cell::RefCell, fmt, rc::Rc};

use serde::{Deserialize, Serialize};

use crate::{
    collapsible::Collapsible,
    observer::{Observers, Subscription},
    props::TriggerProps,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// How many items may be open at once.
pub enum AccordionMode {
    /// Opening an item closes every other item.
    #[default]
    Single,
    /// Items open and close independently.
    Multiple,
}

struct AccordionInner {
    mode: AccordionMode,
    collapsible: bool,
    items: RefCell<Vec<(String, Collapsible)>>,
    observers: Observers<Vec<String>>,
}

#[derive(Clone)]
/// Ordered accordion items keyed by value.
///
/// Item transitions should go through the accordion so the expansion mode holds.
pub struct Accordion {
    inner: Rc<AccordionInner>,
}

impl Accordion {
    /// Creates an accordion. With `collapsible == false` in [`AccordionMode::Single`] the last
    /// open item cannot be closed.
    pub fn new(mode: AccordionMode, collapsible: bool) -> Self {
        Self {
            inner: Rc::new(AccordionInner {
                mode,
                collapsible,
                items: RefCell::new(Vec::new()),
                observers: Observers::new(),
            }),
        }
    }

    /// Expansion mode.
    pub fn mode(&self) -> AccordionMode {
        self.inner.mode
    }

    /// Returns the item for `value`, registering a closed item on first use.
    pub fn item(&self, value: &str) -> Collapsible {
        if let Some(existing) = self.find(value) {
            return existing;
        }
        let item = Collapsible::new(false);
        self.inner
            .items
            .borrow_mut()
            .push((value.to_string(), item.clone()));
        item
    }

    /// Opens `value`. Returns `false` for unknown values.
    pub fn expand(&self, value: &str) -> bool {
        let Some(target) = self.find(value) else {
            return false;
        };
        if self.inner.mode == AccordionMode::Single {
            for (_, other) in self.others(value) {
                if other.is_open() {
                    other.collapse();
                }
            }
        }
        target.expand();
        self.notify();
        true
    }

    /// Closes `value`. Returns `false` when the value is unknown or the close is refused.
    pub fn collapse(&self, value: &str) -> bool {
        let Some(target) = self.find(value) else {
            return false;
        };
        let keeps_last_open = self.inner.mode == AccordionMode::Single
            && !self.inner.collapsible
            && target.is_open()
            && self.others(value).iter().all(|(_, other)| !other.is_open());
        if keeps_last_open {
            return false;
        }
        target.collapse();
        self.notify();
        true
    }

    /// Flips `value`, honoring the expansion mode.
    pub fn toggle_item(&self, value: &str) -> bool {
        if self.is_expanded(value) {
            self.collapse(value)
        } else {
            self.expand(value)
        }
    }

    /// Whether `value` is open.
    pub fn is_expanded(&self, value: &str) -> bool {
        self.find(value).is_some_and(|item| item.is_open())
    }

    /// Open item values in registration order.
    pub fn expanded(&self) -> Vec<String> {
        self.inner
            .items
            .borrow()
            .iter()
            .filter(|(_, item)| item.is_open())
            .map(|(value, _)| value.clone())
            .collect()
    }

    /// Trigger attributes for `value`; clicking routes through [`Accordion::toggle_item`].
    pub fn trigger_props(&self, value: &str) -> TriggerProps {
        let accordion = self.clone();
        let owned = value.to_string();
        self.item(value)
            .trigger_props_with(move || {
                accordion.toggle_item(&owned);
            })
    }

    /// Subscribes to changes of the open item list.
    pub fn subscribe(&self, listener: impl Fn(&Vec<String>) + 'static) -> Subscription {
        self.inner.observers.subscribe(listener)
    }

    fn find(&self, value: &str) -> Option<Collapsible> {
        self.inner
            .items
            .borrow()
            .iter()
            .find(|(candidate, _)| candidate == value)
            .map(|(_, item)| item.clone())
    }

    fn others(&self, value: &str) -> Vec<(String, Collapsible)> {
        self.inner
            .items
            .borrow()
            .iter()
            .filter(|(candidate, _)| candidate != value)
            .cloned()
            .collect()
    }

    fn notify(&self) {
        self.inner.observers.notify(&self.expanded());
    }
}

impl fmt::Debug for Accordion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accordion")
            .field("mode", &self.inner.mode)
            .field("collapsible", &self.inner.collapsible)
            .field("expanded", &self.expanded())
            .finish()
    }
}
