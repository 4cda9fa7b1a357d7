use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::hooks::Operation;
use crate::query::QueryBuilder;

/// Handle to the data layer's open transaction, opaque to this crate.
pub type Transaction = Arc<dyn Any + Send + Sync>;

/// Everything a hook may inspect about the request it runs for.
///
/// Cloning is cheap; every hook invocation gets its own copy.
#[derive(Clone)]
pub struct InterceptorContext {
    pub request: Arc<Value>,
    pub user: Option<Arc<Value>>,
    pub model_name: Arc<str>,
    pub operation: Operation,
    query_builder: Option<QueryBuilder>,
    transaction: Option<Transaction>,
}

impl fmt::Debug for InterceptorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorContext")
            .field("request", &self.request)
            .field("user", &self.user)
            .field("model_name", &self.model_name)
            .field("operation", &self.operation)
            .field("query_builder", &self.query_builder)
            .field("transaction", &self.transaction.is_some())
            .finish()
    }
}

impl InterceptorContext {
    /// Context for `operation` on `model_name`. List and read operations
    /// start with an empty query builder for the model; other operations
    /// have none.
    #[must_use]
    pub fn new(model_name: &str, operation: Operation) -> Self {
        Self {
            request: Arc::new(Value::Null),
            user: None,
            model_name: Arc::from(model_name),
            operation,
            query_builder: operation
                .is_read_path()
                .then(|| QueryBuilder::new(model_name)),
            transaction: None,
        }
    }

    #[must_use]
    pub fn with_request(mut self, request: Value) -> Self {
        self.request = Arc::new(request);
        self
    }

    #[must_use]
    pub fn with_user(mut self, user: Value) -> Self {
        self.user = Some(Arc::new(user));
        self
    }

    /// Replace the query builder. Ignored for operations that are not list
    /// or read.
    #[must_use]
    pub fn with_query_builder(mut self, builder: QueryBuilder) -> Self {
        if self.operation.is_read_path() {
            self.query_builder = Some(builder);
        } else {
            tracing::debug!(
                operation = %self.operation,
                "query builder ignored outside list/read"
            );
        }
        self
    }

    /// Attach the transaction the hook executes inside.
    #[must_use]
    pub fn with_transaction(mut self, transaction: Transaction) -> Self {
        self.transaction = Some(transaction);
        self
    }

    #[must_use]
    pub fn query_builder(&self) -> Option<&QueryBuilder> {
        self.query_builder.as_ref()
    }

    #[must_use]
    pub fn transaction(&self) -> Option<&Transaction> {
        self.transaction.as_ref()
    }

    /// The transaction downcast to the data layer's concrete type.
    #[must_use]
    pub fn transaction_as<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.transaction.as_ref()?.downcast_ref::<T>()
    }
}
