//! Interaction-state core for disclosure widgets, dialogs, selects, and forms.
//!
//! State lives in cheap clonable handles ([`Toggle`], [`Dialog`], [`ModalStack`], [`Form`], ...)
//! that notify subscribers after every mutation. Views render from plain attribute bags
//! ([`TriggerProps`], [`ContentProps`]) and never own state. The Leptos bridge in this crate
//! provides context helpers and signal mirrors; the core does not depend on a rendering runtime.
//!
//! Modal dialogs register with an application-owned [`ModalStack`] that keeps exactly one modal
//! interactive. Forms persist snapshots through a host
//! [`KeyValueStore`](platform_host::KeyValueStore) when created with [`Form::persisted`].

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod accordion;
mod collapsible;
mod context;
mod dialog;
#[cfg(target_arch = "wasm32")]
mod dom;
mod error;
mod field;
mod focus;
mod form;
mod id;
mod modal_stack;
mod observer;
mod persistence;
mod props;
mod reactive;
mod select;
mod toggle;

pub use accordion::{Accordion, AccordionMode};
pub use collapsible::Collapsible;
pub use context::{
    provide_accordion, provide_dialog, provide_form, provide_modal_stack, provide_toggle,
    use_accordion, use_dialog, use_form, use_modal_stack, use_toggle,
};
pub use dialog::{Dialog, DialogOptions, KeyInput, KeyOutcome};
#[cfg(target_arch = "wasm32")]
pub use dom::{
    active_element_id, event_within, focus_element_by_id, tab_stops_within, WebDialogHost,
    SCROLL_LOCK_ATTRIBUTE,
};
pub use error::UiError;
pub use field::{Field, FieldChange};
pub use focus::{wrap_tab_stop, DialogHost, ScrollPosition};
pub use form::{
    ErrorMap, FieldMap, FieldValue, Form, FormConfig, FormEvent, FormOptions, FormStatus,
    SkipReason, SubmitOutcome,
};
pub use id::next_id;
pub use modal_stack::ModalStack;
pub use observer::{Observers, Subscription};
pub use persistence::{form_storage_key, FORM_STORAGE_PREFIX};
pub use props::{ContentProps, DataState, TriggerProps};
#[cfg(target_arch = "wasm32")]
pub use reactive::install_dismiss_listeners;
pub use reactive::{
    accordion_signal, active_signal, dialog_active_signal, field_value_signal, form_status_signal,
    modal_depth_signal, select_selected_signal,
};
pub use select::{SelectEvent, SelectOption, SelectState};
pub use toggle::{Toggle, ToggleCallbacks};

/// Convenience imports for view code consuming the state handles.
pub mod prelude {
    pub use crate::{
        Accordion, AccordionMode, Collapsible, ContentProps, DataState, Dialog, DialogOptions,
        Field, Form, FormConfig, FormStatus, ModalStack, SelectOption, SelectState, SubmitOutcome,
        Toggle, ToggleCallbacks, TriggerProps, UiError,
    };
}
