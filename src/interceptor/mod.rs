//! # Interceptor Module
//!
//! Per-model extension points for generated CRUD handlers.
//!
//! Generated controllers never contain business logic. Instead, each model
//! may have a custom interceptor (kept under the protected `src/domain/`
//! tree so regeneration never touches it) that hooks into fourteen named
//! points of the request lifecycle:
//!
//! | Stage      | Hooks                                                  |
//! |------------|--------------------------------------------------------|
//! | validation | `beforeValidate`, `extendSchema`, `afterValidate`      |
//! | create     | `beforeCreate`, `afterCreate`                          |
//! | update     | `beforeUpdate`, `afterUpdate`                          |
//! | delete     | `beforeDelete`, `afterDelete`                          |
//! | list       | `beforeList`, `afterList`                              |
//! | read       | `beforeRead`, `afterRead`                              |
//! | errors     | `onError`                                              |
//!
//! ## Flow
//!
//! 1. At startup each custom module registers its [`InterceptorHooks`] with
//!    the [`InterceptorRegistry`]. Missing hooks are filled with no-op
//!    defaults so every resolved [`Interceptor`] is complete.
//! 2. Per request, the handler builds an [`InterceptorContext`] and asks the
//!    registry (or a [`LifecyclePipeline`]) for the model's interceptor.
//! 3. The pipeline runs the before hook, the operation, then the after hook,
//!    routing failures to `onError`.
//!
//! ## Halting
//!
//! A before-hook that returns `halt: true` short-circuits the stage: its
//! `response` is returned and the database write never happens. An
//! after-hook halt only reshapes the response.
//!
//! ## Example
//!
//! ```
//! use msgen::interceptor::{HookResult, InterceptorHooks, InterceptorRegistry};
//! use serde_json::json;
//!
//! let registry = InterceptorRegistry::new();
//! registry
//!     .register(
//!         "Invoice",
//!         InterceptorHooks::new().before_create(|mut data, ctx| async move {
//!             data["createdBy"] = ctx.user.as_deref().cloned().unwrap_or(json!(null));
//!             Ok(HookResult::pass(data))
//!         }),
//!     )
//!     .unwrap();
//!
//! assert!(registry.is_registered("Invoice"));
//! // Unknown models resolve to the no-op interceptor.
//! let _noop = registry.resolve("Customer");
//! ```

mod context;
mod contract;
mod hooks;
mod pipeline;
mod registry;

#[cfg(test)]
mod tests;

pub use context::{InterceptorContext, Transaction};
pub use contract::{
    create_noop_interceptor, error_fn, lifecycle_fn, merge_with_defaults, rethrow, schema_fn,
    validate_interceptor, ErrorFn, HookFuture, HookValue, Interceptor, InterceptorCandidate,
    InterceptorError, InterceptorHooks, LifecycleFn, Rethrown, Schema, SchemaFn, SharedError,
};
pub use hooks::{HookKind, HookResult, LifecycleHook, Operation, LIFECYCLE_HOOKS};
pub use pipeline::{LifecyclePipeline, PipelineError, StageOutcome};
pub use registry::InterceptorRegistry;
