//! Form store: named field values, an error map, status transitions, and async submission.
//!
//! `submit` never validates on its own. Callers run [`Form::validate`] first and submission is
//! skipped while the error map is non-empty.

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, BTreeSet},
    fmt,
    future::Future,
    rc::Rc,
};

use futures::future::{self, Either, FutureExt, LocalBoxFuture};
use platform_host::KeyValueStore;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    error::UiError,
    field::Field,
    observer::{Observers, Subscription},
    persistence,
};

/// Value types a form can hold.
pub trait FieldValue: Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + 'static {}

impl<T> FieldValue for T where
    T: Clone + PartialEq + fmt::Debug + Serialize + DeserializeOwned + 'static
{
}

/// Field values keyed by input name.
pub type FieldMap<T> = BTreeMap<String, T>;

/// Validation messages keyed by input name. Empty messages never appear.
pub type ErrorMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Lifecycle position of a form.
pub enum FormStatus {
    /// Untouched by validation or submission, or last validated clean.
    #[default]
    Initial,
    /// The validator is running.
    Validating,
    /// The last validation produced errors.
    Error,
    /// A submission is in flight.
    Submitting,
    /// The last submission succeeded.
    Success,
    /// The last submission failed or timed out.
    Failure,
}

impl FormStatus {
    /// Stable lowercase token.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Validating => "validating",
            Self::Error => "error",
            Self::Submitting => "submitting",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }

    fn is_busy(self) -> bool {
        matches!(self, Self::Validating | Self::Submitting)
    }
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Change notifications published by a [`Form`].
pub enum FormEvent {
    /// The named value changed.
    FieldChanged(String),
    /// The error map changed.
    ErrorsChanged,
    /// The status changed.
    StatusChanged(FormStatus),
    /// [`Form::reset`] completed.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Persistence switches for a form created with [`Form::persisted`].
pub struct FormOptions {
    /// Hydrate from and write snapshots to the store.
    pub persist: bool,
    /// Remove the stored snapshot on [`Form::reset`].
    pub clear_persisted_on_reset: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            persist: true,
            clear_persisted_on_reset: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Why a submission did not run.
pub enum SkipReason {
    /// Another validation or submission was in progress.
    InFlight,
    /// The error map was not empty.
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Result of [`Form::submit`] and [`Form::submit_with_deadline`].
pub enum SubmitOutcome {
    /// The handler resolved successfully, or no handler was configured.
    Succeeded,
    /// The handler reported an error. The detail is logged, not kept.
    Failed,
    /// The deadline resolved before the handler.
    TimedOut,
    /// Nothing ran.
    Skipped(SkipReason),
}

type Validator<T> = Rc<dyn Fn(&FieldMap<T>) -> ErrorMap>;
type SubmitHandler<T> = Rc<dyn Fn(FieldMap<T>) -> LocalBoxFuture<'static, Result<(), String>>>;

/// Closures and options for a [`Form`].
pub struct FormConfig<T> {
    validate: Option<Validator<T>>,
    submit: Option<SubmitHandler<T>>,
    reset: Option<Rc<dyn Fn()>>,
    options: FormOptions,
}

impl<T> Default for FormConfig<T> {
    fn default() -> Self {
        Self {
            validate: None,
            submit: None,
            reset: None,
            options: FormOptions::default(),
        }
    }
}

impl<T: FieldValue> FormConfig<T> {
    /// Validator returning messages keyed by field name.
    pub fn on_validate(mut self, validate: impl Fn(&FieldMap<T>) -> ErrorMap + 'static) -> Self {
        self.validate = Some(Rc::new(validate));
        self
    }

    /// Async submission handler receiving a copy of the field map.
    pub fn on_submit<F, Fut>(mut self, submit: F) -> Self
    where
        F: Fn(FieldMap<T>) -> Fut + 'static,
        Fut: Future<Output = Result<(), String>> + 'static,
    {
        self.submit = Some(Rc::new(move |fields| submit(fields).boxed_local()));
        self
    }

    /// Called after every [`Form::reset`].
    pub fn on_reset(mut self, reset: impl Fn() + 'static) -> Self {
        self.reset = Some(Rc::new(reset));
        self
    }

    /// Persistence switches.
    pub fn options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }
}

impl<T> fmt::Debug for FormConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormConfig")
            .field("on_validate", &self.validate.is_some())
            .field("on_submit", &self.submit.is_some())
            .field("on_reset", &self.reset.is_some())
            .field("options", &self.options)
            .finish()
    }
}

struct FormInner<T> {
    name: String,
    initial: FieldMap<T>,
    fields: RefCell<FieldMap<T>>,
    errors: RefCell<ErrorMap>,
    status: Cell<FormStatus>,
    generation: Cell<u64>,
    in_flight: Cell<bool>,
    config: FormConfig<T>,
    store: Option<Rc<dyn KeyValueStore>>,
    observers: Observers<FormEvent>,
}

/// Shared form handle. Clones refer to the same form.
pub struct Form<T> {
    inner: Rc<FormInner<T>>,
}

impl<T> Clone for Form<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: FieldValue> Form<T> {
    /// Creates an in-memory form starting from `initial`.
    pub fn new(name: impl Into<String>, initial: FieldMap<T>, config: FormConfig<T>) -> Self {
        Self::build(name.into(), initial, config, None)
    }

    /// Creates a form backed by `store`.
    ///
    /// With [`FormOptions::persist`] set, a snapshot stored under `"form-" + name` replaces
    /// `initial` as the starting values, and every later change rewrites it.
    pub fn persisted(
        name: impl Into<String>,
        initial: FieldMap<T>,
        config: FormConfig<T>,
        store: Rc<dyn KeyValueStore>,
    ) -> Self {
        let store = config.options.persist.then_some(store);
        Self::build(name.into(), initial, config, store)
    }

    fn build(
        name: String,
        initial: FieldMap<T>,
        config: FormConfig<T>,
        store: Option<Rc<dyn KeyValueStore>>,
    ) -> Self {
        let fields = store
            .as_deref()
            .and_then(|store| persistence::hydrate_fields(store, &name))
            .unwrap_or_else(|| initial.clone());
        Self {
            inner: Rc::new(FormInner {
                name,
                initial,
                fields: RefCell::new(fields),
                errors: RefCell::new(ErrorMap::new()),
                status: Cell::new(FormStatus::Initial),
                generation: Cell::new(0),
                in_flight: Cell::new(false),
                config,
                store,
                observers: Observers::new(),
            }),
        }
    }

    /// Form name, also the persistence key suffix.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Current status.
    pub fn status(&self) -> FormStatus {
        self.inner.status.get()
    }

    /// Copy of the field map.
    pub fn state(&self) -> FieldMap<T> {
        self.inner.fields.borrow().clone()
    }

    /// Current value for `name`.
    pub fn get(&self, name: &str) -> Option<T> {
        self.inner.fields.borrow().get(name).cloned()
    }

    /// Declared initial value for `name`.
    pub fn initial(&self, name: &str) -> Option<T> {
        self.inner.initial.get(name).cloned()
    }

    /// Copy of the error map.
    pub fn errors(&self) -> ErrorMap {
        self.inner.errors.borrow().clone()
    }

    /// Error message for `name`, empty when there is none.
    pub fn error(&self, name: &str) -> String {
        self.inner
            .errors
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Sets the error for `name`. An empty message clears it.
    pub fn set_error(&self, name: &str, message: impl Into<String>) {
        let message = message.into();
        let changed = {
            let mut errors = self.inner.errors.borrow_mut();
            if message.is_empty() {
                errors.remove(name).is_some()
            } else if errors.get(name) == Some(&message) {
                false
            } else {
                errors.insert(name.to_string(), message);
                true
            }
        };
        if changed {
            self.inner.observers.notify(&FormEvent::ErrorsChanged);
        }
    }

    /// Whether the error map is empty.
    pub fn is_valid(&self) -> bool {
        self.inner.errors.borrow().is_empty()
    }

    /// Writes `value` under `name`. Bound fields see the change as touched.
    pub fn set_field(&self, name: &str, value: T) {
        self.write_value(name, Some(value));
    }

    /// Removes `name` from the field map.
    pub fn remove_field(&self, name: &str) {
        self.write_value(name, None);
    }

    /// Runs the validator and replaces the error map with its result.
    ///
    /// Status moves through `Validating` to `Error` or `Initial`, except during a submission,
    /// where only the error map changes.
    pub fn validate(&self) -> bool {
        let submitting = self.status() == FormStatus::Submitting;
        if !submitting {
            self.set_status(FormStatus::Validating);
        }
        let mut errors = match self.inner.config.validate.clone() {
            Some(validate) => validate(&self.state()),
            None => ErrorMap::new(),
        };
        errors.retain(|_, message| !message.is_empty());
        let valid = errors.is_empty();
        self.replace_errors(errors);
        if !submitting {
            self.set_status(if valid {
                FormStatus::Initial
            } else {
                FormStatus::Error
            });
        }
        valid
    }

    /// Submits the current values.
    ///
    /// Skipped while another validation or submission runs, or while the error map is not
    /// empty. Status ends in `Success` or `Failure` unless the form was reset meanwhile.
    pub async fn submit(&self) -> SubmitOutcome {
        let (slot, generation, pending) = match self.begin_submit() {
            Ok(started) => started,
            Err(reason) => return SubmitOutcome::Skipped(reason),
        };
        let result = run_handler(pending).await;
        drop(slot);
        self.finish_submit(generation, result)
    }

    /// Like [`Form::submit`], but gives up when `deadline` resolves first.
    ///
    /// A timed-out submission ends in `Failure`. The handler future is dropped.
    pub async fn submit_with_deadline<D>(&self, deadline: D) -> SubmitOutcome
    where
        D: Future<Output = ()>,
    {
        let (slot, generation, pending) = match self.begin_submit() {
            Ok(started) => started,
            Err(reason) => return SubmitOutcome::Skipped(reason),
        };
        let work = run_handler(pending);
        futures::pin_mut!(work);
        futures::pin_mut!(deadline);
        let raced = future::select(work, deadline).await;
        drop(slot);
        match raced {
            Either::Left((result, _)) => self.finish_submit(generation, result),
            Either::Right(((), _)) => {
                leptos::logging::warn!("form `{}` submission timed out", self.inner.name);
                if self.inner.generation.get() == generation {
                    self.set_status(FormStatus::Failure);
                }
                SubmitOutcome::TimedOut
            }
        }
    }

    /// Restores the declared initial values, clears errors, and returns to `Initial`.
    ///
    /// An in-flight submission keeps running and still blocks new submissions until it settles.
    pub fn reset(&self) {
        self.inner.generation.set(self.inner.generation.get() + 1);
        let changed = {
            let mut fields = self.inner.fields.borrow_mut();
            let previous = std::mem::replace(&mut *fields, self.inner.initial.clone());
            let changed: BTreeSet<String> = previous
                .keys()
                .chain(fields.keys())
                .filter(|name| previous.get(*name) != fields.get(*name))
                .cloned()
                .collect();
            changed
        };
        if let Some(store) = self.inner.store.as_deref() {
            if self.inner.config.options.clear_persisted_on_reset {
                persistence::clear_fields(store, &self.inner.name);
            } else if !changed.is_empty() {
                persistence::write_fields(store, &self.inner.name, &self.state());
            }
        }
        for name in changed {
            self.inner.observers.notify(&FormEvent::FieldChanged(name));
        }
        self.replace_errors(ErrorMap::new());
        self.set_status(FormStatus::Initial);
        self.inner.observers.notify(&FormEvent::Reset);
        if let Some(on_reset) = self.inner.config.reset.clone() {
            on_reset();
        }
    }

    /// Binds a field handle for `name`.
    pub fn field(&self, name: &str) -> Field<T> {
        Field::bind(self.clone(), name)
    }

    /// Binds one field per input name, rejecting repeated names.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::DuplicateFieldName`] for the first repeated name.
    pub fn register_inputs(&self, names: &[&str]) -> Result<Vec<Field<T>>, UiError> {
        let mut seen = BTreeSet::new();
        for name in names {
            if !seen.insert(*name) {
                return Err(UiError::DuplicateFieldName {
                    form: self.inner.name.clone(),
                    field: (*name).to_string(),
                });
            }
        }
        Ok(names.iter().map(|name| self.field(name)).collect())
    }

    /// Subscribes to form events.
    pub fn subscribe(&self, listener: impl Fn(&FormEvent) + 'static) -> Subscription {
        self.inner.observers.subscribe(listener)
    }

    /// Returns `true` when both handles point at the same form.
    pub fn same(&self, other: &Form<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Stores `value` (or removes the entry for `None`). Returns whether anything changed.
    pub(crate) fn write_value(&self, name: &str, value: Option<T>) -> bool {
        {
            let mut fields = self.inner.fields.borrow_mut();
            if fields.get(name) == value.as_ref() {
                return false;
            }
            match value {
                Some(value) => fields.insert(name.to_string(), value),
                None => fields.remove(name),
            };
        }
        if let Some(store) = self.inner.store.as_deref() {
            persistence::write_fields(store, &self.inner.name, &self.state());
        }
        self.inner
            .observers
            .notify(&FormEvent::FieldChanged(name.to_string()));
        true
    }

    fn begin_submit(&self) -> Result<StartedSubmit<'_>, SkipReason> {
        if self.inner.in_flight.get() || self.status().is_busy() {
            leptos::logging::warn!(
                "form `{}` submit ignored: {} in progress",
                self.inner.name,
                self.status()
            );
            return Err(SkipReason::InFlight);
        }
        if !self.is_valid() {
            return Err(SkipReason::Invalid);
        }
        self.inner.in_flight.set(true);
        let slot = SubmitSlot(&self.inner.in_flight);
        self.set_status(FormStatus::Submitting);
        let pending = self
            .inner
            .config
            .submit
            .clone()
            .map(|submit| submit(self.state()));
        Ok((slot, self.inner.generation.get(), pending))
    }

    fn finish_submit(&self, generation: u64, result: Result<(), String>) -> SubmitOutcome {
        let current = self.inner.generation.get() == generation;
        match result {
            Ok(()) => {
                if current {
                    self.set_status(FormStatus::Success);
                }
                SubmitOutcome::Succeeded
            }
            Err(err) => {
                leptos::logging::warn!("form `{}` submission failed: {err}", self.inner.name);
                if current {
                    self.set_status(FormStatus::Failure);
                }
                SubmitOutcome::Failed
            }
        }
    }

    fn set_status(&self, status: FormStatus) {
        if self.inner.status.replace(status) != status {
            self.inner
                .observers
                .notify(&FormEvent::StatusChanged(status));
        }
    }

    fn replace_errors(&self, errors: ErrorMap) {
        let changed = *self.inner.errors.borrow() != errors;
        if changed {
            *self.inner.errors.borrow_mut() = errors;
            self.inner.observers.notify(&FormEvent::ErrorsChanged);
        }
    }
}

type StartedSubmit<'a> = (
    SubmitSlot<'a>,
    u64,
    Option<LocalBoxFuture<'static, Result<(), String>>>,
);

/// The form's single submission slot. Released on drop, so a cancelled submit frees it too.
struct SubmitSlot<'a>(&'a Cell<bool>);

impl Drop for SubmitSlot<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

async fn run_handler(
    pending: Option<LocalBoxFuture<'static, Result<(), String>>>,
) -> Result<(), String> {
    match pending {
        Some(pending) => pending.await,
        None => Ok(()),
    }
}

impl<T: fmt::Debug> fmt::Debug for Form<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("name", &self.inner.name)
            .field("status", &self.inner.status.get())
            .field("fields", &self.inner.fields.borrow())
            .field("errors", &self.inner.errors.borrow())
            .finish()
    }
}
