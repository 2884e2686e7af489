//! Focus-trap and focus/scroll restore contract for dialogs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
/// Document scroll offset.
pub struct ScrollPosition {
    /// Horizontal offset in CSS pixels.
    pub x: f64,
    /// Vertical offset in CSS pixels.
    pub y: f64,
}

/// Environment a dialog uses to save and restore focus and scroll around open/close.
///
/// The browser implementation is `WebDialogHost`; tests supply recording hosts.
pub trait DialogHost {
    /// Id of the currently focused element, if it has one.
    fn active_element_id(&self) -> Option<String>;

    /// Focuses the element with `id`. Returns `false` when nothing focusable was found.
    fn focus_element(&self, id: &str) -> bool;

    /// Current document scroll offset.
    fn scroll_position(&self) -> ScrollPosition;

    /// Scrolls the document to `position`.
    fn scroll_to(&self, position: ScrollPosition);

    /// Locks or unlocks document scrolling behind a modal.
    fn set_scroll_locked(&self, locked: bool);
}

#[derive(Debug, Clone, PartialEq, Default)]
/// State captured when a dialog opens and restored when it closes.
pub(crate) struct RestorePoint {
    pub(crate) focused_id: Option<String>,
    pub(crate) scroll: ScrollPosition,
}

impl RestorePoint {
    pub(crate) fn capture(host: &dyn DialogHost) -> Self {
        Self {
            focused_id: host.active_element_id(),
            scroll: host.scroll_position(),
        }
    }
}

/// Returns the tab stop that should receive focus when Tab would leave a trapped region.
///
/// `None` means the browser's default move stays inside the region. Focus outside the region
/// (or no focus) is pulled back to the first stop, or the last one when moving backwards.
pub fn wrap_tab_stop<'a>(
    tab_stops: &'a [String],
    focused: Option<&str>,
    backwards: bool,
) -> Option<&'a str> {
    let first = tab_stops.first()?;
    let last = tab_stops.last()?;
    let position = focused.and_then(|id| tab_stops.iter().position(|stop| stop == id));
    match position {
        None if backwards => Some(last),
        None => Some(first),
        Some(0) if backwards => Some(last),
        Some(index) if !backwards && index + 1 == tab_stops.len() => Some(first),
        Some(_) => None,
    }
    .map(String::as_str)
}
