//! Pick handlers keyed by scene index prefix.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::util::ScenePath;

use super::handler::PickHandler;

#[derive(Default)]
pub struct PickHandlerRegistry {
    handlers: RwLock<BTreeMap<ScenePath, Arc<dyn PickHandler>>>,
}

impl PickHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for prims at or below `prefix`.
    ///
    /// Rejects the empty and root paths, and prefixes that are an ancestor
    /// or descendant of a registered one.
    pub fn register(&self, prefix: &ScenePath, handler: Arc<dyn PickHandler>) -> bool {
        if prefix.is_empty() || prefix.is_absolute_root() {
            return false;
        }
        let mut handlers = self.handlers.write();
        if handlers.keys().any(|k| k.has_prefix(prefix) || prefix.has_prefix(k)) {
            tracing::debug!(target: "fvp::pick", %prefix, "pick handler prefix conflicts with an existing registration");
            return false;
        }
        handlers.insert(prefix.clone(), handler);
        true
    }

    pub fn unregister(&self, prefix: &ScenePath) -> bool {
        self.handlers.write().remove(prefix).is_some()
    }

    /// Handler registered at `path` or its nearest ancestor.
    pub fn get_handler(&self, path: &ScenePath) -> Option<Arc<dyn PickHandler>> {
        let handlers = self.handlers.read();
        path.prefixes().iter().rev().find_map(|p| handlers.get(p).cloned())
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }
}
