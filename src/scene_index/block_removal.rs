//! Withholds prim removals while a multi-step chain update is in progress.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::{
    observer_handle, AddedPrimEntry, DirtiedPrimEntry, Observers, RemovedPrimEntry, RenamedPrimEntry,
    SceneIndex, SceneIndexHandle, SceneIndexObserver, SceneIndexPrim, StageKind,
};
use crate::util::ScenePath;

#[derive(Default)]
struct BlockState {
    blocked: bool,
    pending: Vec<ScenePath>,
}

/// Pass-through stage that can hold back removal notifications.
///
/// Reads always see the input's current state. Only the removal
/// notifications are delayed, so observers keep their view of the tree
/// until [`set_prim_removal_blocked(false)`](Self::set_prim_removal_blocked).
pub struct BlockPrimRemovalSceneIndex {
    input: SceneIndexHandle,
    state: Mutex<BlockState>,
    observers: Observers,
}

impl BlockPrimRemovalSceneIndex {
    pub fn new(input: SceneIndexHandle) -> Arc<Self> {
        let this = Arc::new(Self { input: input.clone(), state: Mutex::new(BlockState::default()), observers: Observers::new() });
        input.add_observer(observer_handle(&this));
        this
    }

    pub fn is_prim_removal_blocked(&self) -> bool {
        self.state.lock().blocked
    }

    /// Block or unblock removals. Unblocking flushes the withheld removals
    /// of paths that are still absent upstream.
    pub fn set_prim_removal_blocked(&self, blocked: bool) {
        let pending = {
            let mut state = self.state.lock();
            if state.blocked == blocked {
                return;
            }
            state.blocked = blocked;
            if blocked {
                return;
            }
            std::mem::take(&mut state.pending)
        };
        let flushed: Vec<RemovedPrimEntry> = pending
            .into_iter()
            .filter(|p| !self.exists_upstream(p))
            .map(RemovedPrimEntry::new)
            .collect();
        if !flushed.is_empty() {
            tracing::debug!(target: "fvp::chain", count = flushed.len(), "flushing withheld prim removals");
        }
        self.observers.send_removed(self, &flushed);
    }

    fn exists_upstream(&self, path: &ScenePath) -> bool {
        self.input.get_prim(path).is_defined() || self.input.get_child_prim_paths(&path.parent()).contains(path)
    }

    /// Number of removals currently withheld.
    pub fn pending_removals(&self) -> usize {
        self.state.lock().pending.len()
    }
}

impl SceneIndex for BlockPrimRemovalSceneIndex {
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim {
        self.input.get_prim(path)
    }

    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath> {
        self.input.get_child_prim_paths(path)
    }

    fn display_name(&self) -> String {
        "Flow Viewport Block Prim Removal Scene Index".to_string()
    }

    fn stage_kind(&self) -> StageKind {
        StageKind::BlockPrimRemoval
    }

    filtering_plumbing!();
}

impl SceneIndexObserver for BlockPrimRemovalSceneIndex {
    fn prims_added(&self, _sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
        self.observers.send_added(self, entries);
    }

    fn prims_removed(&self, _sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
        {
            let mut state = self.state.lock();
            if state.blocked {
                state.pending.extend(entries.iter().map(|e| e.prim_path.clone()));
                return;
            }
        }
        self.observers.send_removed(self, entries);
    }

    fn prims_dirtied(&self, _sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]) {
        self.observers.send_dirtied(self, entries);
    }

    fn prims_renamed(&self, _sender: &dyn SceneIndex, entries: &[RenamedPrimEntry]) {
        self.observers.send_renamed(self, entries);
    }
}
