//! Leptos context helpers for sharing state handles with descendant views.
//!
//! Handles can always be passed explicitly. These helpers only save prop drilling.

use leptos::{provide_context, use_context};

use crate::{
    accordion::Accordion,
    dialog::Dialog,
    error::UiError,
    form::{FieldValue, Form},
    modal_stack::ModalStack,
    toggle::Toggle,
};

/// Provides a [`Toggle`] to descendants.
pub fn provide_toggle(toggle: Toggle) {
    provide_context(toggle);
}

/// Returns the nearest provided [`Toggle`].
///
/// # Errors
///
/// Returns [`UiError::MissingContext`] outside a provider.
pub fn use_toggle() -> Result<Toggle, UiError> {
    use_context::<Toggle>().ok_or(UiError::MissingContext("Toggle"))
}

/// Provides a [`Dialog`] to descendants.
pub fn provide_dialog(dialog: Dialog) {
    provide_context(dialog);
}

/// Returns the nearest provided [`Dialog`].
///
/// # Errors
///
/// Returns [`UiError::MissingContext`] outside a provider.
pub fn use_dialog() -> Result<Dialog, UiError> {
    use_context::<Dialog>().ok_or(UiError::MissingContext("Dialog"))
}

/// Provides the application's [`ModalStack`], usually once at the root.
pub fn provide_modal_stack(stack: ModalStack) {
    provide_context(stack);
}

/// Returns the provided [`ModalStack`].
///
/// # Errors
///
/// Returns [`UiError::MissingContext`] outside a provider.
pub fn use_modal_stack() -> Result<ModalStack, UiError> {
    use_context::<ModalStack>().ok_or(UiError::MissingContext("ModalStack"))
}

/// Provides an [`Accordion`] to its items.
pub fn provide_accordion(accordion: Accordion) {
    provide_context(accordion);
}

/// Returns the nearest provided [`Accordion`].
///
/// # Errors
///
/// Returns [`UiError::MissingContext`] outside a provider.
pub fn use_accordion() -> Result<Accordion, UiError> {
    use_context::<Accordion>().ok_or(UiError::MissingContext("Accordion"))
}

/// Provides a [`Form`] to its inputs.
pub fn provide_form<T: FieldValue>(form: Form<T>) {
    provide_context(form);
}

/// Returns the nearest provided [`Form`] holding `T` values.
///
/// # Errors
///
/// Returns [`UiError::MissingContext`] outside a provider.
pub fn use_form<T: FieldValue>() -> Result<Form<T>, UiError> {
    use_context::<Form<T>>().ok_or(UiError::MissingContext("Form"))
}
