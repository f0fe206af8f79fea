//! Retained scene index: a producer that stores its prims.
//!
//! Used for DCC-native style producers that push prims explicitly, for the
//! JSON scene descriptions of the browser, and as a test double for USD
//! stage producers.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::data_source::ContainerHandle;
use super::locator::LocatorSet;
use super::traits::{
    AddedPrimEntry, DirtiedPrimEntry, ObserverHandle, Observers, RemovedPrimEntry, SceneIndex,
    SceneIndexPrim, StageKind,
};
use crate::util::{ScenePath, Token};

/// Prim to add to a [`RetainedSceneIndex`].
#[derive(Clone)]
pub struct RetainedPrim {
    pub path: ScenePath,
    pub prim_type: Token,
    pub data_source: Option<ContainerHandle>,
}

impl RetainedPrim {
    pub fn new(path: ScenePath, prim_type: impl Into<Token>, data_source: Option<ContainerHandle>) -> Self {
        Self { path, prim_type: prim_type.into(), data_source }
    }
}

/// Scene index holding prims in an ordered map.
///
/// Ancestors of added prims exist implicitly as untyped prims.
pub struct RetainedSceneIndex {
    name: String,
    prims: RwLock<BTreeMap<ScenePath, SceneIndexPrim>>,
    observers: Observers,
}

impl RetainedSceneIndex {
    pub fn new(name: impl Into<String>) -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self {
            name: name.into(),
            prims: RwLock::new(BTreeMap::new()),
            observers: Observers::new(),
        })
    }

    /// Add or replace prims, then notify.
    pub fn add_prims(&self, prims: Vec<RetainedPrim>) {
        let mut entries = Vec::with_capacity(prims.len());
        {
            let mut map = self.prims.write();
            for prim in prims {
                if prim.path.is_empty() || prim.path.is_absolute_root() {
                    continue;
                }
                for ancestor in prim.path.parent().prefixes() {
                    map.entry(ancestor).or_default();
                }
                entries.push(AddedPrimEntry::new(prim.path.clone(), prim.prim_type.clone()));
                map.insert(prim.path, SceneIndexPrim::new(prim.prim_type, prim.data_source));
            }
        }
        self.observers.send_added(self, &entries);
    }

    /// Remove prims and their subtrees, then notify.
    pub fn remove_prims(&self, paths: &[ScenePath]) {
        let mut entries = Vec::with_capacity(paths.len());
        {
            let mut map = self.prims.write();
            for path in paths {
                let doomed: Vec<ScenePath> = map
                    .range(path.clone()..)
                    .take_while(|(p, _)| p.has_prefix(path))
                    .map(|(p, _)| p.clone())
                    .collect();
                if doomed.is_empty() {
                    continue;
                }
                for p in doomed {
                    map.remove(&p);
                }
                entries.push(RemovedPrimEntry::new(path.clone()));
            }
        }
        self.observers.send_removed(self, &entries);
    }

    /// Notify that fields of existing prims changed.
    pub fn dirty_prims(&self, entries: Vec<(ScenePath, LocatorSet)>) {
        let entries: Vec<DirtiedPrimEntry> = {
            let map = self.prims.read();
            entries
                .into_iter()
                .filter(|(p, _)| map.contains_key(p))
                .map(|(p, l)| DirtiedPrimEntry::new(p, l))
                .collect()
        };
        self.observers.send_dirtied(self, &entries);
    }

    /// Number of stored prims, implicit ancestors included.
    pub fn len(&self) -> usize {
        self.prims.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.prims.read().is_empty()
    }
}

impl SceneIndex for RetainedSceneIndex {
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim {
        self.prims.read().get(path).cloned().unwrap_or_default()
    }

    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath> {
        if path.is_empty() {
            return Vec::new();
        }
        let depth = path.element_count() + 1;
        self.prims
            .read()
            .range(path.clone()..)
            .take_while(|(p, _)| p.has_prefix(path))
            .filter(|(p, _)| p.element_count() == depth)
            .map(|(p, _)| p.clone())
            .collect()
    }

    fn add_observer(&self, observer: ObserverHandle) {
        self.observers.add(observer);
    }

    fn remove_observer(&self, observer: &ObserverHandle) {
        self.observers.remove(observer);
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn stage_kind(&self) -> StageKind {
        StageKind::Retained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::container::RetainedContainer;
    use crate::core::traversal::all_prim_paths;

    fn p(s: &str) -> ScenePath {
        s.parse().unwrap()
    }

    #[test]
    fn test_add_creates_ancestors() {
        let si = RetainedSceneIndex::new("test");
        si.add_prims(vec![RetainedPrim::new(p("/A/B/Cube"), "mesh", Some(RetainedContainer::new().into_handle()))]);
        assert_eq!(si.get_child_prim_paths(&ScenePath::absolute_root()), vec![p("/A")]);
        assert_eq!(si.get_child_prim_paths(&p("/A")), vec![p("/A/B")]);
        assert!(!si.get_prim(&p("/A")).is_defined());
        assert_eq!(si.get_prim(&p("/A/B/Cube")).prim_type, "mesh");
    }

    #[test]
    fn test_remove_subtree() {
        let si = RetainedSceneIndex::new("test");
        si.add_prims(vec![
            RetainedPrim::new(p("/A/Cube"), "mesh", None),
            RetainedPrim::new(p("/A/Cube/Sub"), "geomSubset", None),
            RetainedPrim::new(p("/A2"), "xform", None),
        ]);
        si.remove_prims(&[p("/A/Cube")]);
        assert_eq!(all_prim_paths(si.as_ref()), vec![p("/A"), p("/A2")]);
    }
}
