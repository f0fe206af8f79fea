//! Terminal scene index: the stable end of the filtering chain.
//!
//! The render index observes this stage for the whole session. When the
//! chain is rebuilt the terminal switches to the new tail and reconciles
//! its observers: prims gone from the new chain are removed, then every
//! prim of the new chain is (re-)added so its data is pulled again.

use std::collections::HashSet;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::core::{
    all_prim_paths, same_scene, AddedPrimEntry, DirtiedPrimEntry, ObserverHandle, Observers, RemovedPrimEntry,
    RenamedPrimEntry, SceneIndex, SceneIndexHandle, SceneIndexObserver, SceneIndexPrim, StageKind,
};
use crate::selection::PathInterface;
use crate::util::ScenePath;

pub struct TerminalSceneIndex {
    me: Weak<TerminalSceneIndex>,
    input: RwLock<SceneIndexHandle>,
    observers: Observers,
}

impl TerminalSceneIndex {
    pub fn new(input: SceneIndexHandle) -> Arc<Self> {
        let this = Arc::new_cyclic(|me| Self {
            me: me.clone(),
            input: RwLock::new(input.clone()),
            observers: Observers::new(),
        });
        input.add_observer(this.observer());
        this
    }

    fn observer(&self) -> ObserverHandle {
        let weak: Weak<dyn SceneIndexObserver> = self.me.clone();
        weak
    }

    /// Current chain tail.
    pub fn input(&self) -> SceneIndexHandle {
        self.input.read().clone()
    }

    /// Switch to a new chain tail.
    pub fn set_input(&self, input: SceneIndexHandle) {
        let old = std::mem::replace(&mut *self.input.write(), input.clone());
        if same_scene(old.as_ref(), input.as_ref()) {
            return;
        }
        old.remove_observer(&self.observer());
        input.add_observer(self.observer());

        if !self.observers.is_observed() {
            return;
        }
        let new_paths = all_prim_paths(input.as_ref());
        let kept: HashSet<&ScenePath> = new_paths.iter().collect();
        let gone: HashSet<ScenePath> =
            all_prim_paths(old.as_ref()).into_iter().filter(|p| !kept.contains(p)).collect();
        // Only subtree roots: removal covers descendants.
        let mut removed: Vec<RemovedPrimEntry> = gone
            .iter()
            .filter(|p| !gone.contains(&p.parent()))
            .map(|p| RemovedPrimEntry::new(p.clone()))
            .collect();
        removed.sort_by(|a, b| a.prim_path.cmp(&b.prim_path));
        let added: Vec<AddedPrimEntry> = new_paths
            .into_iter()
            .map(|p| {
                let prim_type = input.get_prim(&p).prim_type;
                AddedPrimEntry::new(p, prim_type)
            })
            .collect();
        tracing::debug!(
            target: "fvp::chain",
            removed = removed.len(),
            added = added.len(),
            "terminal switched to {}",
            input.display_name()
        );
        self.observers.send_removed(self, &removed);
        self.observers.send_added(self, &added);
    }

    fn is_current(&self, sender: &dyn SceneIndex) -> bool {
        same_scene(self.input.read().as_ref(), sender)
    }
}

impl SceneIndex for TerminalSceneIndex {
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim {
        self.input().get_prim(path)
    }

    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath> {
        self.input().get_child_prim_paths(path)
    }

    fn add_observer(&self, observer: ObserverHandle) {
        self.observers.add(observer);
    }

    fn remove_observer(&self, observer: &ObserverHandle) {
        self.observers.remove(observer);
    }

    fn display_name(&self) -> String {
        "Flow Viewport Terminal Scene Index".to_string()
    }

    fn stage_kind(&self) -> StageKind {
        StageKind::Terminal
    }

    fn input_scene(&self) -> Option<SceneIndexHandle> {
        Some(self.input())
    }

    fn as_path_interface(&self) -> Option<&dyn PathInterface> {
        // The input is behind a lock; translation goes through the chain.
        None
    }
}

// Notifications from a chain that was switched away from are dropped.
impl SceneIndexObserver for TerminalSceneIndex {
    fn prims_added(&self, sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
        if self.is_current(sender) {
            self.observers.send_added(self, entries);
        }
    }

    fn prims_removed(&self, sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
        if self.is_current(sender) {
            self.observers.send_removed(self, entries);
        }
    }

    fn prims_dirtied(&self, sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]) {
        if self.is_current(sender) {
            self.observers.send_dirtied(self, entries);
        }
    }

    fn prims_renamed(&self, sender: &dyn SceneIndex, entries: &[RenamedPrimEntry]) {
        if self.is_current(sender) {
            self.observers.send_renamed(self, entries);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RetainedPrim, RetainedSceneIndex};

    #[derive(Default)]
    struct Counts {
        added: parking_lot::Mutex<Vec<ScenePath>>,
        removed: parking_lot::Mutex<Vec<ScenePath>>,
    }

    impl SceneIndexObserver for Counts {
        fn prims_added(&self, _sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
            self.added.lock().extend(entries.iter().map(|e| e.prim_path.clone()));
        }
        fn prims_removed(&self, _sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
            self.removed.lock().extend(entries.iter().map(|e| e.prim_path.clone()));
        }
        fn prims_dirtied(&self, _sender: &dyn SceneIndex, _entries: &[DirtiedPrimEntry]) {}
        fn prims_renamed(&self, _sender: &dyn SceneIndex, _entries: &[RenamedPrimEntry]) {}
    }

    fn p(s: &str) -> ScenePath {
        s.parse().unwrap()
    }

    #[test]
    fn test_switch_reconciles() {
        let a = RetainedSceneIndex::new("a");
        a.add_prims(vec![RetainedPrim::new(p("/A/Cube"), "mesh", None), RetainedPrim::new(p("/B/X"), "mesh", None)]);
        let b = RetainedSceneIndex::new("b");
        b.add_prims(vec![RetainedPrim::new(p("/A/Cube"), "mesh", None)]);

        let terminal = TerminalSceneIndex::new(a.clone());
        let counts = Arc::new(Counts::default());
        terminal.add_observer(crate::core::observer_handle(&counts));

        terminal.set_input(b.clone());
        assert_eq!(*counts.removed.lock(), vec![p("/B")]);
        assert_eq!(*counts.added.lock(), vec![p("/A"), p("/A/Cube")]);

        // The old input no longer reaches the terminal's observers.
        counts.added.lock().clear();
        a.add_prims(vec![RetainedPrim::new(p("/C"), "mesh", None)]);
        assert!(counts.added.lock().is_empty());
        b.add_prims(vec![RetainedPrim::new(p("/D"), "mesh", None)]);
        assert_eq!(*counts.added.lock(), vec![p("/D")]);
    }
}
