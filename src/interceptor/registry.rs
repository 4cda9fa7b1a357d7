use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{info, warn};

use super::contract::{
    create_noop_interceptor, merge_with_defaults, Interceptor, InterceptorCandidate,
    InterceptorError,
};

type Entries = HashMap<String, Arc<Interceptor>>;

/// Model name → fully merged interceptor.
///
/// Constructed once at startup, populated as each custom module registers,
/// then shared by reference (`Arc<InterceptorRegistry>`) with the request
/// layer. Reads are lock-free snapshots; a registration after requests have
/// started replaces the entry for subsequent resolves (last write wins).
pub struct InterceptorRegistry {
    entries: ArcSwap<Entries>,
    noop: Arc<Interceptor>,
}

impl Default for InterceptorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InterceptorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorRegistry")
            .field("models", &self.models())
            .finish()
    }
}

impl InterceptorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: ArcSwap::from_pointee(Entries::new()),
            noop: Arc::new(create_noop_interceptor()),
        }
    }

    /// Validate `candidate`, fill in the missing hooks and store it under
    /// `model_name`. An invalid candidate is rejected and nothing is stored.
    pub fn register(
        &self,
        model_name: &str,
        candidate: impl Into<InterceptorCandidate>,
    ) -> Result<(), InterceptorError> {
        let hooks = candidate.into().into_hooks()?;
        let merged = Arc::new(merge_with_defaults(&hooks));

        let previous = self.entries.rcu(|current| {
            let mut next = Entries::clone(current);
            next.insert(model_name.to_string(), Arc::clone(&merged));
            next
        });

        if previous.contains_key(model_name) {
            warn!(model = %model_name, "replacing previously registered interceptor");
        } else {
            info!(model = %model_name, hooks = ?hooks, "registered interceptor");
        }
        Ok(())
    }

    /// The interceptor for `model_name`, or the shared no-op interceptor when
    /// none was registered. Never partially populated.
    #[must_use]
    pub fn resolve(&self, model_name: &str) -> Arc<Interceptor> {
        self.entries
            .load()
            .get(model_name)
            .map_or_else(|| Arc::clone(&self.noop), Arc::clone)
    }

    #[must_use]
    pub fn is_registered(&self, model_name: &str) -> bool {
        self.entries.load().contains_key(model_name)
    }

    /// Registered model names, sorted.
    #[must_use]
    pub fn models(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.load().keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.load().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.load().is_empty()
    }

    /// Drop every registration. Intended for test teardown.
    pub fn clear(&self) {
        self.entries.store(Arc::new(Entries::new()));
    }
}
