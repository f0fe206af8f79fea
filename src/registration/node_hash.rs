//! DCC node hash code → scene index path.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::util::ScenePath;

/// Finds the scene index subtree of a node from its hash code.
#[derive(Debug, Default)]
pub struct NodeHashRegistry {
    paths: RwLock<HashMap<u64, ScenePath>>,
}

impl NodeHashRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` for `hash_code`. Ignored for hash 0 or an empty path.
    pub fn add(&self, hash_code: u64, path: ScenePath) {
        if hash_code == 0 || path.is_empty() {
            return;
        }
        self.paths.write().insert(hash_code, path);
    }

    pub fn remove(&self, hash_code: u64) -> Option<ScenePath> {
        self.paths.write().remove(&hash_code)
    }

    /// Path recorded for `hash_code`, or the empty path.
    pub fn lookup(&self, hash_code: u64) -> ScenePath {
        self.paths.read().get(&hash_code).cloned().unwrap_or_else(ScenePath::empty)
    }

    pub fn contains(&self, hash_code: u64) -> bool {
        self.paths.read().contains_key(&hash_code)
    }

    pub fn len(&self) -> usize {
        self.paths.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_lookup_remove() {
        let registry = NodeHashRegistry::new();
        registry.add(0, "/A".parse().unwrap());
        registry.add(7, ScenePath::empty());
        assert!(registry.is_empty());

        registry.add(7, "/A".parse().unwrap());
        assert_eq!(registry.lookup(7).to_string(), "/A");
        assert!(registry.lookup(8).is_empty());
        assert_eq!(registry.remove(7).map(|p| p.to_string()), Some("/A".to_string()));
        assert!(!registry.contains(7));
    }
}
