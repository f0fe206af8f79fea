//! Merging scene index: composes producer scene indices into one namespace.
//!
//! Each input contributes the prims at and below its root path. Ancestors
//! of input roots exist implicitly. Inputs are not expected to overlap
//! below their roots; when they do, the first input providing a type wins
//! and data sources are overlaid in input order.

use std::collections::HashSet;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::core::container::OverlayContainer;
use crate::core::data_source::ContainerHandle;
use crate::core::traversal::PrimView;
use crate::core::{
    same_scene, AddedPrimEntry, DirtiedPrimEntry, ObserverHandle, Observers, RemovedPrimEntry,
    RenamedPrimEntry, SceneIndex, SceneIndexHandle, SceneIndexObserver, SceneIndexPrim, StageKind,
};
use crate::selection::{AppPath, PathInterface, PathMapperRegistry, PrimSelections};
use crate::util::ScenePath;

#[derive(Clone)]
struct InputEntry {
    scene: SceneIndexHandle,
    root: ScenePath,
}

pub struct MergingSceneIndex {
    me: Weak<MergingSceneIndex>,
    inputs: RwLock<Vec<InputEntry>>,
    path_mappers: RwLock<Option<Arc<PathMapperRegistry>>>,
    observers: Observers,
}

impl MergingSceneIndex {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            inputs: RwLock::new(Vec::new()),
            path_mappers: RwLock::new(None),
            observers: Observers::new(),
        })
    }

    fn observer(&self) -> ObserverHandle {
        let weak: Weak<dyn SceneIndexObserver> = self.me.clone();
        weak
    }

    /// Registry consulted for path translation when no input answers.
    pub fn set_path_mapper_registry(&self, registry: Option<Arc<PathMapperRegistry>>) {
        *self.path_mappers.write() = registry;
    }

    /// Compose `scene` under `root` and announce its prims.
    pub fn add_input_scene(&self, scene: SceneIndexHandle, root: ScenePath) {
        scene.add_observer(self.observer());
        self.inputs.write().push(InputEntry { scene: scene.clone(), root: root.clone() });

        if !self.observers.is_observed() {
            return;
        }
        let mut entries: Vec<AddedPrimEntry> = root
            .parent()
            .prefixes()
            .into_iter()
            .map(|a| AddedPrimEntry::new(a.clone(), self.get_prim(&a).prim_type))
            .collect();
        for path in PrimView::new(scene.as_ref(), &root) {
            if path.is_absolute_root() {
                continue;
            }
            let prim_type = self.get_prim(&path).prim_type;
            entries.push(AddedPrimEntry::new(path, prim_type));
        }
        self.observers.send_added(self, &entries);
    }

    /// Remove a previously added input.
    ///
    /// Returns false, and logs an error, if `scene` was never added.
    pub fn remove_input_scene(&self, scene: &SceneIndexHandle) -> bool {
        let removed = {
            let mut inputs = self.inputs.write();
            match inputs.iter().position(|i| same_scene(i.scene.as_ref(), scene.as_ref())) {
                Some(pos) => inputs.remove(pos),
                None => {
                    tracing::error!(
                        target: "fvp::chain",
                        scene = %scene.display_name(),
                        "removing an input scene that was never added"
                    );
                    return false;
                }
            }
        };
        scene.remove_observer(&self.observer());

        if self.observers.is_observed() {
            let root = removed.root;
            self.observers.send_removed(self, &[RemovedPrimEntry::new(root.clone())]);
            // Re-announce what the remaining inputs still provide there.
            let still_present =
                self.get_prim(&root).is_defined() || !self.get_child_prim_paths(&root).is_empty();
            if still_present {
                let remaining: Vec<ScenePath> = PrimView::new(self, &root)
                    .filter(|p| !p.is_absolute_root())
                    .collect();
                let entries: Vec<AddedPrimEntry> = remaining
                    .into_iter()
                    .map(|p| {
                        let t = self.get_prim(&p).prim_type;
                        AddedPrimEntry::new(p, t)
                    })
                    .collect();
                self.observers.send_added(self, &entries);
            }
        }
        true
    }

    /// Input scenes, in composition order.
    pub fn input_scenes(&self) -> Vec<SceneIndexHandle> {
        self.inputs.read().iter().map(|i| i.scene.clone()).collect()
    }

    fn snapshot(&self) -> Vec<InputEntry> {
        self.inputs.read().clone()
    }
}

impl SceneIndex for MergingSceneIndex {
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim {
        let mut prim_type = None;
        let mut sources: Vec<ContainerHandle> = Vec::new();
        for input in self.snapshot() {
            if !path.has_prefix(&input.root) {
                continue;
            }
            let prim = input.scene.get_prim(path);
            if prim_type.is_none() && !prim.prim_type.is_empty() {
                prim_type = Some(prim.prim_type);
            }
            if let Some(ds) = prim.data_source {
                sources.push(ds);
            }
        }
        let data_source = match sources.len() {
            0 => None,
            1 => sources.pop(),
            _ => Some(OverlayContainer::new(sources)),
        };
        SceneIndexPrim { prim_type: prim_type.unwrap_or_default(), data_source }
    }

    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath> {
        let mut seen = HashSet::new();
        let mut children = Vec::new();
        for input in self.snapshot() {
            let contributed = if path.has_prefix(&input.root) {
                input.scene.get_child_prim_paths(path)
            } else if input.root.has_prefix(path) {
                vec![input.root.truncate(path.element_count() + 1)]
            } else {
                Vec::new()
            };
            for c in contributed {
                if seen.insert(c.clone()) {
                    children.push(c);
                }
            }
        }
        children
    }

    fn add_observer(&self, observer: ObserverHandle) {
        self.observers.add(observer);
    }

    fn remove_observer(&self, observer: &ObserverHandle) {
        self.observers.remove(observer);
    }

    fn display_name(&self) -> String {
        "Flow Viewport Merging Scene Index".to_string()
    }

    fn stage_kind(&self) -> StageKind {
        StageKind::Merging
    }

    fn as_path_interface(&self) -> Option<&dyn PathInterface> {
        Some(self)
    }
}

impl PathInterface for MergingSceneIndex {
    /// First non-empty answer from the inputs' path interfaces, then the
    /// path mapper registry.
    fn app_path_to_prim_selections(&self, app_path: &AppPath) -> PrimSelections {
        for input in self.snapshot() {
            if let Some(pi) = input.scene.as_path_interface() {
                let selections = pi.app_path_to_prim_selections(app_path);
                if !selections.is_empty() {
                    return selections;
                }
            }
        }
        let registry = self.path_mappers.read().clone();
        match registry {
            Some(r) => r.app_path_to_prim_selections(app_path),
            None => PrimSelections::new(),
        }
    }
}

impl SceneIndexObserver for MergingSceneIndex {
    fn prims_added(&self, _sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
        self.observers.send_added(self, entries);
    }

    fn prims_removed(&self, _sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
        self.observers.send_removed(self, entries);
    }

    fn prims_dirtied(&self, _sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]) {
        self.observers.send_dirtied(self, entries);
    }

    fn prims_renamed(&self, _sender: &dyn SceneIndex, entries: &[RenamedPrimEntry]) {
        self.observers.send_renamed(self, entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::container::RetainedContainer;
    use crate::core::retained::{RetainedPrim, RetainedSceneIndex};

    fn p(s: &str) -> ScenePath {
        s.parse().unwrap()
    }

    fn producer(paths: &[&str]) -> Arc<RetainedSceneIndex> {
        let si = RetainedSceneIndex::new("producer");
        si.add_prims(
            paths
                .iter()
                .map(|s| RetainedPrim::new(p(s), "mesh", Some(RetainedContainer::new().into_handle())))
                .collect(),
        );
        si
    }

    #[test]
    fn test_add_remove_symmetry() {
        let merging = MergingSceneIndex::new();
        let s: SceneIndexHandle = producer(&["/A/Cube"]);
        merging.add_input_scene(s.clone(), p("/A"));
        assert_eq!(merging.get_child_prim_paths(&p("/A")), vec![p("/A/Cube")]);
        assert!(merging.get_prim(&p("/A/Cube")).is_defined());

        assert!(merging.remove_input_scene(&s));
        assert!(merging.get_child_prim_paths(&p("/A")).is_empty());
        assert!(!merging.get_prim(&p("/A/Cube")).is_defined());
        assert!(!merging.remove_input_scene(&s));
    }

    #[test]
    fn test_union_of_children() {
        let merging = MergingSceneIndex::new();
        merging.add_input_scene(producer(&["/A/Cube"]), p("/A"));
        merging.add_input_scene(producer(&["/B/Sphere"]), p("/B"));
        let mut roots = merging.get_child_prim_paths(&ScenePath::absolute_root());
        roots.sort();
        assert_eq!(roots, vec![p("/A"), p("/B")]);
    }

    #[test]
    fn test_root_restricts_input() {
        let merging = MergingSceneIndex::new();
        merging.add_input_scene(producer(&["/A/Cube", "/B/Other"]), p("/A"));
        assert!(!merging.get_prim(&p("/B/Other")).is_defined());
        assert_eq!(merging.get_child_prim_paths(&ScenePath::absolute_root()), vec![p("/A")]);
    }
}
