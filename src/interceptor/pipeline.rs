//! Controller-side invocation of a model's hooks around one CRUD stage.
//!
//! ```text
//! before hook ──halt──▶ return hook response (nothing else runs)
//!      │
//!      ▼ result.data becomes the working value
//! operation (database write / query)
//!      │
//!      ▼
//! after hook ──halt──▶ reshape response (the write already happened)
//!      │
//!      ▼
//! Completed(data)
//! ```
//!
//! Any error along the way goes to `onError`. If `onError` recovers, its data
//! is the final response. If it declines, by returning the default payload or
//! by rethrowing, the original error is returned. Only a different error from
//! `onError` itself is fatal.
//!
//! For list and read stages the working value is the query: a serialized
//! [`BuiltQuery`](crate::query::BuiltQuery). Hooks typically extend
//! `ctx.query_builder()` and return the merged, built query as their data.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, debug_span, warn, Instrument};

use super::context::InterceptorContext;
use super::contract::{Interceptor, Rethrown, Schema, SharedError};
use super::hooks::{HookResult, LifecycleHook, Operation};
use super::registry::InterceptorRegistry;

/// How a stage finished.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// Every stage ran; the value is the after-hook's data.
    Completed(Value),
    /// `hook` asked to halt and `response` must be returned as-is.
    Halted { hook: LifecycleHook, response: Value },
    /// An error occurred and `onError` supplied this response.
    Recovered(Value),
}

impl StageOutcome {
    /// The value the handler should respond with.
    #[must_use]
    pub fn into_response(self) -> Value {
        match self {
            StageOutcome::Completed(v) | StageOutcome::Recovered(v) => v,
            StageOutcome::Halted { response, .. } => response,
        }
    }
}

/// A stage failed and `onError` did not recover it.
#[derive(Debug)]
pub enum PipelineError {
    /// `onError` declined; re-raise `0` through the standard error path.
    Unrecovered(SharedError),
    /// `onError` itself failed while handling `original`.
    Fatal {
        original: SharedError,
        handler: anyhow::Error,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Unrecovered(error) => write!(f, "{error:#}"),
            PipelineError::Fatal { original, handler } => write!(
                f,
                "onError failed ({handler:#}) while handling: {original:#}"
            ),
        }
    }
}

impl std::error::Error for PipelineError {}

impl PipelineError {
    /// The error raised by the stage itself.
    #[must_use]
    pub fn original(&self) -> &anyhow::Error {
        match self {
            PipelineError::Unrecovered(error) => error,
            PipelineError::Fatal { original, .. } => original,
        }
    }

    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::Fatal { .. })
    }
}

/// The default `onError` answer, `{ "error": .. }` alone, means "not handled";
/// so does a null payload.
fn is_recovery(result: &HookResult) -> bool {
    match &result.data {
        Value::Null => false,
        Value::Object(map) => !(map.len() == 1 && map.contains_key("error")),
        _ => true,
    }
}

/// `onError` re-raised the stage error, either wrapped by
/// [`rethrow`](super::rethrow) or as an error carrying the same message.
fn is_rethrow(handler: &anyhow::Error, original: &SharedError) -> bool {
    let wrapped = handler.chain().any(|cause| {
        cause
            .downcast_ref::<Rethrown>()
            .is_some_and(|rethrown| Arc::ptr_eq(&rethrown.0, original))
    });
    wrapped || handler.to_string() == original.to_string()
}

/// Runs one model's hooks around CRUD stages.
#[derive(Debug, Clone)]
pub struct LifecyclePipeline {
    interceptor: Arc<Interceptor>,
}

impl LifecyclePipeline {
    #[must_use]
    pub fn new(interceptor: Arc<Interceptor>) -> Self {
        Self { interceptor }
    }

    /// Pipeline for `model_name`, falling back to no-op hooks.
    #[must_use]
    pub fn for_model(registry: &InterceptorRegistry, model_name: &str) -> Self {
        Self::new(registry.resolve(model_name))
    }

    /// Run `operation` wrapped in the before/after hooks of `ctx.operation`.
    pub async fn run<F, Fut>(
        &self,
        ctx: InterceptorContext,
        data: Value,
        operation: F,
    ) -> Result<StageOutcome, PipelineError>
    where
        F: FnOnce(Value, InterceptorContext) -> Fut,
        Fut: Future<Output = anyhow::Result<Value>>,
    {
        let span = debug_span!(
            "lifecycle",
            model = %ctx.model_name,
            operation = %ctx.operation
        );
        async {
            match self.stages(ctx.clone(), data, operation).await {
                Ok(outcome) => Ok(outcome),
                Err(error) => self.handle_error(error, ctx).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn stages<F, Fut>(
        &self,
        ctx: InterceptorContext,
        data: Value,
        operation: F,
    ) -> anyhow::Result<StageOutcome>
    where
        F: FnOnce(Value, InterceptorContext) -> Fut,
        Fut: Future<Output = anyhow::Result<Value>>,
    {
        let (before, after) = ctx.operation.hooks();

        let result = self.interceptor.run(before, data, ctx.clone()).await?;
        if result.halt {
            debug!(hook = %before, "before hook halted the pipeline");
            return Ok(StageOutcome::Halted {
                hook: before,
                response: result.response.unwrap_or(Value::Null),
            });
        }

        let written = operation(result.data, ctx.clone()).await?;

        let result = self.interceptor.run(after, written, ctx).await?;
        if result.halt {
            debug!(hook = %after, "after hook reshaped the response");
            return Ok(StageOutcome::Halted {
                hook: after,
                response: result.response.unwrap_or(result.data),
            });
        }
        Ok(StageOutcome::Completed(result.data))
    }

    /// Validation stage: `beforeValidate`, then `validator` against the schema
    /// produced by `extendSchema(base_schema)`, then `afterValidate`.
    pub async fn validate<V>(
        &self,
        ctx: InterceptorContext,
        data: Value,
        base_schema: Schema,
        validator: V,
    ) -> Result<StageOutcome, PipelineError>
    where
        V: FnOnce(&Value, Value) -> anyhow::Result<Value>,
    {
        let schema = (self.interceptor.extend_schema)(base_schema);
        let mut ctx = ctx;
        ctx.operation = Operation::Validate;
        self.run(ctx, data, |data, _ctx| async move { validator(&schema, data) })
            .await
    }

    /// Call `extendSchema` alone, for handlers that validate elsewhere.
    #[must_use]
    pub fn extend_schema(&self, schema: Schema) -> Schema {
        (self.interceptor.extend_schema)(schema)
    }

    async fn handle_error(
        &self,
        error: anyhow::Error,
        ctx: InterceptorContext,
    ) -> Result<StageOutcome, PipelineError> {
        let original: SharedError = Arc::new(error);
        match (self.interceptor.on_error)(Arc::clone(&original), ctx).await {
            Err(handler) if is_rethrow(&handler, &original) => {
                debug!("onError rethrew the original error");
                Err(PipelineError::Unrecovered(original))
            }
            Err(handler) => {
                warn!(error = %format!("{handler:#}"), "onError failed");
                Err(PipelineError::Fatal { original, handler })
            }
            Ok(result) if is_recovery(&result) => {
                debug!("onError recovered");
                let response = if result.halt {
                    result.response.unwrap_or(result.data)
                } else {
                    result.data
                };
                Ok(StageOutcome::Recovered(response))
            }
            Ok(_) => Err(PipelineError::Unrecovered(original)),
        }
    }
}
