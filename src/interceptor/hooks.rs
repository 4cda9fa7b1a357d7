use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The fourteen named extension points of a generated CRUD handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LifecycleHook {
    BeforeValidate,
    ExtendSchema,
    AfterValidate,
    BeforeCreate,
    AfterCreate,
    BeforeUpdate,
    AfterUpdate,
    BeforeDelete,
    AfterDelete,
    BeforeList,
    AfterList,
    BeforeRead,
    AfterRead,
    OnError,
}

/// Every hook, in lifecycle order.
pub const LIFECYCLE_HOOKS: [LifecycleHook; 14] = [
    LifecycleHook::BeforeValidate,
    LifecycleHook::ExtendSchema,
    LifecycleHook::AfterValidate,
    LifecycleHook::BeforeCreate,
    LifecycleHook::AfterCreate,
    LifecycleHook::BeforeUpdate,
    LifecycleHook::AfterUpdate,
    LifecycleHook::BeforeDelete,
    LifecycleHook::AfterDelete,
    LifecycleHook::BeforeList,
    LifecycleHook::AfterList,
    LifecycleHook::BeforeRead,
    LifecycleHook::AfterRead,
    LifecycleHook::OnError,
];

/// Calling convention of a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    /// Async `(data, ctx) -> HookResult`
    Lifecycle,
    /// Sync `schema -> schema`
    Schema,
    /// Async `(error, ctx) -> HookResult`
    Error,
}

impl LifecycleHook {
    /// The hook's name as it appears in custom interceptor modules.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            LifecycleHook::BeforeValidate => "beforeValidate",
            LifecycleHook::ExtendSchema => "extendSchema",
            LifecycleHook::AfterValidate => "afterValidate",
            LifecycleHook::BeforeCreate => "beforeCreate",
            LifecycleHook::AfterCreate => "afterCreate",
            LifecycleHook::BeforeUpdate => "beforeUpdate",
            LifecycleHook::AfterUpdate => "afterUpdate",
            LifecycleHook::BeforeDelete => "beforeDelete",
            LifecycleHook::AfterDelete => "afterDelete",
            LifecycleHook::BeforeList => "beforeList",
            LifecycleHook::AfterList => "afterList",
            LifecycleHook::BeforeRead => "beforeRead",
            LifecycleHook::AfterRead => "afterRead",
            LifecycleHook::OnError => "onError",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        LIFECYCLE_HOOKS.into_iter().find(|h| h.name() == name)
    }

    #[must_use]
    pub fn kind(self) -> HookKind {
        match self {
            LifecycleHook::ExtendSchema => HookKind::Schema,
            LifecycleHook::OnError => HookKind::Error,
            _ => HookKind::Lifecycle,
        }
    }
}

impl fmt::Display for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The CRUD operation a hook runs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Validate,
    Create,
    Update,
    Delete,
    List,
    Read,
}

impl Operation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Validate => "validate",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::List => "list",
            Operation::Read => "read",
        }
    }

    /// The before/after hook pair wrapped around this operation.
    #[must_use]
    pub fn hooks(self) -> (LifecycleHook, LifecycleHook) {
        match self {
            Operation::Validate => (LifecycleHook::BeforeValidate, LifecycleHook::AfterValidate),
            Operation::Create => (LifecycleHook::BeforeCreate, LifecycleHook::AfterCreate),
            Operation::Update => (LifecycleHook::BeforeUpdate, LifecycleHook::AfterUpdate),
            Operation::Delete => (LifecycleHook::BeforeDelete, LifecycleHook::AfterDelete),
            Operation::List => (LifecycleHook::BeforeList, LifecycleHook::AfterList),
            Operation::Read => (LifecycleHook::BeforeRead, LifecycleHook::AfterRead),
        }
    }

    /// List and read operations carry a query builder in their context.
    #[must_use]
    pub fn is_read_path(self) -> bool {
        matches!(self, Operation::List | Operation::Read)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// What a lifecycle hook hands back to the generated handler.
///
/// With `halt` set, a before-hook stops the pipeline and `response` is
/// returned as-is; no later stage (including the database write) runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookResult {
    pub data: Value,
    #[serde(default, skip_serializing_if = "is_false")]
    pub halt: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

impl HookResult {
    /// Continue with `data` as the new working value.
    #[must_use]
    pub fn pass(data: Value) -> Self {
        Self {
            data,
            halt: false,
            response: None,
        }
    }

    /// Stop the pipeline and answer with `response`.
    #[must_use]
    pub fn halt(data: Value, response: Value) -> Self {
        Self {
            data,
            halt: true,
            response: Some(response),
        }
    }
}
