//! Browser DOM helpers backing dialog focus, scroll lock, and dismissal.

use wasm_bindgen::JsCast;

use crate::focus::{DialogHost, ScrollPosition};

/// Attribute set on `<body>` while a modal holds the scroll lock.
pub const SCROLL_LOCK_ATTRIBUTE: &str = "data-ui-scroll-locked";

const TABBABLE_SELECTOR: &str = concat!(
    "a[href], button:not([disabled]), input:not([disabled]), select:not([disabled]), ",
    "textarea:not([disabled]), [tabindex]:not([tabindex=\"-1\"])"
);

fn document() -> Option<web_sys::Document> {
    web_sys::window().and_then(|window| window.document())
}

/// Returns the id of the focused element, if it has a non-empty one.
pub fn active_element_id() -> Option<String> {
    document()
        .and_then(|document| document.active_element())
        .map(|element| element.id())
        .filter(|id| !id.is_empty())
}

/// Focuses an element by id and reports whether a focusable HTML element was found.
pub fn focus_element_by_id(id: &str) -> bool {
    let Some(element) = document().and_then(|document| document.get_element_by_id(id)) else {
        return false;
    };
    let Ok(element) = element.dyn_into::<web_sys::HtmlElement>() else {
        return false;
    };
    element.focus().is_ok()
}

/// Ids of the tabbable elements inside `container_id`, in DOM order.
///
/// Elements without an id cannot be targeted by the focus trap and are left out.
pub fn tab_stops_within(container_id: &str) -> Vec<String> {
    let Some(container) = document().and_then(|document| document.get_element_by_id(container_id))
    else {
        return Vec::new();
    };
    let Ok(nodes) = container.query_selector_all(TABBABLE_SELECTOR) else {
        return Vec::new();
    };

    let mut stops = Vec::new();
    for index in 0..nodes.length() {
        let Some(node) = nodes.item(index) else {
            continue;
        };
        let Ok(element) = node.dyn_into::<web_sys::Element>() else {
            continue;
        };
        if element.get_attribute("aria-disabled").as_deref() == Some("true") {
            continue;
        }
        let id = element.id();
        if !id.is_empty() {
            stops.push(id);
        }
    }
    stops
}

/// Whether the event target sits inside the element with `container_id`.
pub fn event_within(event: &web_sys::Event, container_id: &str) -> bool {
    let Some(container) = document().and_then(|document| document.get_element_by_id(container_id))
    else {
        return false;
    };
    let Some(target) = event
        .target()
        .and_then(|target| target.dyn_into::<web_sys::Node>().ok())
    else {
        return false;
    };
    container.contains(Some(&target))
}

#[derive(Debug, Clone, Copy, Default)]
/// [`DialogHost`] backed by the browser document.
pub struct WebDialogHost;

impl DialogHost for WebDialogHost {
    fn active_element_id(&self) -> Option<String> {
        active_element_id()
    }

    fn focus_element(&self, id: &str) -> bool {
        focus_element_by_id(id)
    }

    fn scroll_position(&self) -> ScrollPosition {
        let Some(window) = web_sys::window() else {
            return ScrollPosition::default();
        };
        ScrollPosition {
            x: window.scroll_x().unwrap_or_default(),
            y: window.scroll_y().unwrap_or_default(),
        }
    }

    fn scroll_to(&self, position: ScrollPosition) {
        if let Some(window) = web_sys::window() {
            window.scroll_to_with_x_and_y(position.x, position.y);
        }
    }

    fn set_scroll_locked(&self, locked: bool) {
        let Some(body) = document().and_then(|document| document.body()) else {
            return;
        };
        let result = if locked {
            body.set_attribute(SCROLL_LOCK_ATTRIBUTE, "true")
        } else {
            body.remove_attribute(SCROLL_LOCK_ATTRIBUTE)
        };
        if let Err(err) = result {
            leptos::logging::warn!("scroll lock update failed: {err:?}");
        }
    }
}
