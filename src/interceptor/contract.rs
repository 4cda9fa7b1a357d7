use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{json, Value};

use super::context::InterceptorContext;
use super::hooks::{HookKind, HookResult, LifecycleHook, LIFECYCLE_HOOKS};

/// Validation schema handed through `extendSchema`.
pub type Schema = Arc<Value>;

/// An error shared between the failing stage and `onError`.
pub type SharedError = Arc<anyhow::Error>;

pub type HookFuture = BoxFuture<'static, anyhow::Result<HookResult>>;

/// Async before/after hook.
pub type LifecycleFn = Arc<dyn Fn(Value, InterceptorContext) -> HookFuture + Send + Sync>;

/// Sync `extendSchema` hook.
pub type SchemaFn = Arc<dyn Fn(Schema) -> Schema + Send + Sync>;

/// Async `onError` hook.
///
/// `Ok` with recovery data handles the error. Declining is either `Ok` with
/// the default `{ "error": .. }` payload or rethrowing the original through
/// [`rethrow`]. Any other `Err` is a failure of the handler itself.
pub type ErrorFn = Arc<dyn Fn(SharedError, InterceptorContext) -> HookFuture + Send + Sync>;

/// The original stage error, re-raised by an `onError` hook that declines.
#[derive(Debug, Clone)]
pub struct Rethrown(pub SharedError);

impl fmt::Display for Rethrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for Rethrown {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

/// Re-raise `error` from `onError`, leaving it unhandled.
///
/// ```
/// use msgen::interceptor::{rethrow, HookResult, InterceptorHooks};
///
/// let hooks = InterceptorHooks::new()
///     .on_error(|error, _ctx| async move { Err::<HookResult, _>(rethrow(error)) });
/// assert!(hooks.on_error.is_some());
/// ```
#[must_use]
pub fn rethrow(error: SharedError) -> anyhow::Error {
    anyhow::Error::new(Rethrown(error))
}

/// Box an async closure as a [`LifecycleFn`].
pub fn lifecycle_fn<F, Fut>(f: F) -> LifecycleFn
where
    F: Fn(Value, InterceptorContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<HookResult>> + Send + 'static,
{
    Arc::new(move |data, ctx| f(data, ctx).boxed())
}

pub fn schema_fn<F>(f: F) -> SchemaFn
where
    F: Fn(Schema) -> Schema + Send + Sync + 'static,
{
    Arc::new(f)
}

pub fn error_fn<F, Fut>(f: F) -> ErrorFn
where
    F: Fn(SharedError, InterceptorContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<HookResult>> + Send + 'static,
{
    Arc::new(move |error, ctx| f(error, ctx).boxed())
}

fn passthrough() -> LifecycleFn {
    lifecycle_fn(|data, _ctx| async move { Ok(HookResult::pass(data)) })
}

fn identity_schema() -> SchemaFn {
    schema_fn(|schema| schema)
}

fn report_error() -> ErrorFn {
    error_fn(|error, _ctx| {
        let message = format!("{error:#}");
        async move { Ok(HookResult::pass(json!({ "error": message }))) }
    })
}

macro_rules! interceptor_types {
    ($($field:ident => $hook:ident),* $(,)?) => {
        /// A model's hooks as supplied by custom code; any hook may be absent.
        ///
        /// Build one with the setter methods and hand it to
        /// [`InterceptorRegistry::register`](super::InterceptorRegistry::register):
        ///
        /// ```
        /// use msgen::interceptor::{HookResult, InterceptorHooks};
        /// use serde_json::json;
        ///
        /// let hooks = InterceptorHooks::new().before_create(|mut data, _ctx| async move {
        ///     data["source"] = json!("api");
        ///     Ok(HookResult::pass(data))
        /// });
        /// assert!(hooks.has(msgen::interceptor::LifecycleHook::BeforeCreate));
        /// ```
        #[derive(Clone, Default)]
        pub struct InterceptorHooks {
            $(pub $field: Option<LifecycleFn>,)*
            pub extend_schema: Option<SchemaFn>,
            pub on_error: Option<ErrorFn>,
        }

        impl InterceptorHooks {
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            $(
                #[must_use]
                pub fn $field<F, Fut>(mut self, f: F) -> Self
                where
                    F: Fn(Value, InterceptorContext) -> Fut + Send + Sync + 'static,
                    Fut: Future<Output = anyhow::Result<HookResult>> + Send + 'static,
                {
                    self.$field = Some(lifecycle_fn(f));
                    self
                }
            )*

            #[must_use]
            pub fn extend_schema<F>(mut self, f: F) -> Self
            where
                F: Fn(Schema) -> Schema + Send + Sync + 'static,
            {
                self.extend_schema = Some(schema_fn(f));
                self
            }

            #[must_use]
            pub fn on_error<F, Fut>(mut self, f: F) -> Self
            where
                F: Fn(SharedError, InterceptorContext) -> Fut + Send + Sync + 'static,
                Fut: Future<Output = anyhow::Result<HookResult>> + Send + 'static,
            {
                self.on_error = Some(error_fn(f));
                self
            }

            /// Whether custom code supplied `hook`.
            #[must_use]
            pub fn has(&self, hook: LifecycleHook) -> bool {
                match hook {
                    $(LifecycleHook::$hook => self.$field.is_some(),)*
                    LifecycleHook::ExtendSchema => self.extend_schema.is_some(),
                    LifecycleHook::OnError => self.on_error.is_some(),
                }
            }

            fn set(&mut self, hook: LifecycleHook, value: HookValue) -> Result<(), InterceptorError> {
                match (hook, value) {
                    $((LifecycleHook::$hook, HookValue::Lifecycle(f)) => self.$field = Some(f),)*
                    (LifecycleHook::ExtendSchema, HookValue::Schema(f)) => self.extend_schema = Some(f),
                    (LifecycleHook::OnError, HookValue::Error(f)) => self.on_error = Some(f),
                    (hook, other) => {
                        return Err(InterceptorError::InvalidHook {
                            hook: hook.name(),
                            found: other.describe(),
                        })
                    }
                }
                Ok(())
            }
        }

        /// A fully populated interceptor: every hook is present, either the
        /// custom implementation or the no-op default.
        #[derive(Clone)]
        pub struct Interceptor {
            $(pub $field: LifecycleFn,)*
            pub extend_schema: SchemaFn,
            pub on_error: ErrorFn,
        }

        impl Interceptor {
            /// The async before/after hook for `hook`; `None` for
            /// `extendSchema` and `onError`, which have their own shapes.
            #[must_use]
            pub fn lifecycle(&self, hook: LifecycleHook) -> Option<&LifecycleFn> {
                match hook {
                    $(LifecycleHook::$hook => Some(&self.$field),)*
                    LifecycleHook::ExtendSchema | LifecycleHook::OnError => None,
                }
            }
        }

        /// Interceptor whose before/after hooks pass data through unchanged,
        /// whose `extendSchema` returns its input, and whose `onError`
        /// answers `{ "error": <message> }`.
        #[must_use]
        pub fn create_noop_interceptor() -> Interceptor {
            Interceptor {
                $($field: passthrough(),)*
                extend_schema: identity_schema(),
                on_error: report_error(),
            }
        }

        /// Fill every hook `partial` lacks with the no-op implementation.
        #[must_use]
        pub fn merge_with_defaults(partial: &InterceptorHooks) -> Interceptor {
            let defaults = create_noop_interceptor();
            Interceptor {
                $($field: partial.$field.clone().unwrap_or(defaults.$field),)*
                extend_schema: partial.extend_schema.clone().unwrap_or(defaults.extend_schema),
                on_error: partial.on_error.clone().unwrap_or(defaults.on_error),
            }
        }
    };
}

interceptor_types! {
    before_validate => BeforeValidate,
    after_validate => AfterValidate,
    before_create => BeforeCreate,
    after_create => AfterCreate,
    before_update => BeforeUpdate,
    after_update => AfterUpdate,
    before_delete => BeforeDelete,
    after_delete => AfterDelete,
    before_list => BeforeList,
    after_list => AfterList,
    before_read => BeforeRead,
    after_read => AfterRead,
}

impl fmt::Debug for InterceptorHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present: Vec<&str> = LIFECYCLE_HOOKS
            .into_iter()
            .filter(|h| self.has(*h))
            .map(LifecycleHook::name)
            .collect();
        f.debug_struct("InterceptorHooks")
            .field("present", &present)
            .finish()
    }
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor").finish_non_exhaustive()
    }
}

impl Interceptor {
    /// Run the before/after hook `hook`. Passes `data` through for the two
    /// hooks that are not lifecycle-shaped.
    pub async fn run(
        &self,
        hook: LifecycleHook,
        data: Value,
        ctx: InterceptorContext,
    ) -> anyhow::Result<HookResult> {
        match self.lifecycle(hook) {
            Some(f) => f(data, ctx).await,
            None => Ok(HookResult::pass(data)),
        }
    }
}

/// A single entry of a dynamically assembled hook table.
#[derive(Clone)]
pub enum HookValue {
    Lifecycle(LifecycleFn),
    Schema(SchemaFn),
    Error(ErrorFn),
    /// Plain data where a function may have been expected.
    Value(Value),
}

impl HookValue {
    fn kind(&self) -> Option<HookKind> {
        match self {
            HookValue::Lifecycle(_) => Some(HookKind::Lifecycle),
            HookValue::Schema(_) => Some(HookKind::Schema),
            HookValue::Error(_) => Some(HookKind::Error),
            HookValue::Value(_) => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            HookValue::Lifecycle(_) => "a lifecycle function".to_string(),
            HookValue::Schema(_) => "a schema function".to_string(),
            HookValue::Error(_) => "an error handler".to_string(),
            HookValue::Value(v) => format!("the value {v}"),
        }
    }
}

/// Anything offered to the registry as an interceptor.
///
/// Typed [`InterceptorHooks`] are always valid. Tables keyed by hook name and
/// raw JSON values come from loosely typed custom modules and are checked by
/// [`validate_interceptor`].
#[derive(Clone)]
pub enum InterceptorCandidate {
    Hooks(InterceptorHooks),
    Table(BTreeMap<String, HookValue>),
    Value(Value),
}

impl From<InterceptorHooks> for InterceptorCandidate {
    fn from(hooks: InterceptorHooks) -> Self {
        InterceptorCandidate::Hooks(hooks)
    }
}

impl From<Value> for InterceptorCandidate {
    fn from(value: Value) -> Self {
        InterceptorCandidate::Value(value)
    }
}

impl FromIterator<(String, HookValue)> for InterceptorCandidate {
    fn from_iter<I: IntoIterator<Item = (String, HookValue)>>(iter: I) -> Self {
        InterceptorCandidate::Table(iter.into_iter().collect())
    }
}

/// Rejection of an interceptor candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptorError {
    /// The candidate is `null` or not an object.
    NotAnObject {
        /// JSON type that was offered
        found: &'static str,
    },
    /// A recognised hook name holds something other than the right kind of
    /// function.
    InvalidHook { hook: &'static str, found: String },
}

impl fmt::Display for InterceptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterceptorError::NotAnObject { found } => {
                write!(f, "interceptor must be an object, got {found}")
            }
            InterceptorError::InvalidHook { hook, found } => {
                write!(f, "interceptor hook '{hook}' must be a function, got {found}")
            }
        }
    }
}

impl std::error::Error for InterceptorError {}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl InterceptorCandidate {
    /// Convert to typed hooks, rejecting anything
    /// [`validate_interceptor`] would reject. Unrecognised keys are ignored.
    pub fn into_hooks(self) -> Result<InterceptorHooks, InterceptorError> {
        match self {
            InterceptorCandidate::Hooks(hooks) => Ok(hooks),
            InterceptorCandidate::Value(Value::Object(map)) => {
                for (key, value) in &map {
                    if let Some(hook) = LifecycleHook::from_name(key) {
                        return Err(InterceptorError::InvalidHook {
                            hook: hook.name(),
                            found: format!("the value {value}"),
                        });
                    }
                }
                Ok(InterceptorHooks::default())
            }
            InterceptorCandidate::Value(other) => Err(InterceptorError::NotAnObject {
                found: json_type(&other),
            }),
            InterceptorCandidate::Table(table) => {
                let mut hooks = InterceptorHooks::default();
                for (key, value) in table {
                    if let Some(hook) = LifecycleHook::from_name(&key) {
                        hooks.set(hook, value)?;
                    }
                }
                Ok(hooks)
            }
        }
    }
}

/// `true` iff `candidate` is an object whose every recognised hook key holds
/// a function of that hook's kind. An empty object is valid; `null` and
/// non-objects are not.
#[must_use]
pub fn validate_interceptor(candidate: &InterceptorCandidate) -> bool {
    match candidate {
        InterceptorCandidate::Hooks(_) => true,
        InterceptorCandidate::Value(Value::Object(map)) => {
            map.keys().all(|k| LifecycleHook::from_name(k).is_none())
        }
        InterceptorCandidate::Value(_) => false,
        InterceptorCandidate::Table(table) => table.iter().all(|(key, value)| {
            LifecycleHook::from_name(key).is_none_or(|hook| value.kind() == Some(hook.kind()))
        }),
    }
}
