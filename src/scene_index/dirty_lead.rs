//! Tracks the lead object and dirties its wireframe color on change.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::schema::{self, tokens};
use crate::core::{
    observer_handle, DirtiedPrimEntry, LocatorSet, Observers, SceneIndex, SceneIndexHandle, SceneIndexPrim,
    StageKind,
};
use crate::util::ScenePath;

/// Pass-through stage holding the lead object path.
///
/// Moving the lead dirties the wireframe color primvars of the old and
/// the new lead so the stages computing colors downstream re-read them.
pub struct DirtyLeadObjectSceneIndex {
    input: SceneIndexHandle,
    lead: RwLock<ScenePath>,
    observers: Observers,
}

fn color_locators() -> LocatorSet {
    [
        schema::primvar_locator(tokens::OVERRIDE_WIREFRAME_COLOR),
        schema::primvar_locator(tokens::DISPLAY_COLOR),
    ]
    .into_iter()
    .collect()
}

impl DirtyLeadObjectSceneIndex {
    pub fn new(input: SceneIndexHandle) -> Arc<Self> {
        let this = Arc::new(Self { input: input.clone(), lead: RwLock::new(ScenePath::empty()), observers: Observers::new() });
        input.add_observer(observer_handle(&this));
        this
    }

    /// Current lead, empty when nothing leads.
    pub fn lead_object_path(&self) -> ScenePath {
        self.lead.read().clone()
    }

    #[inline]
    pub fn is_lead_object(&self, path: &ScenePath) -> bool {
        !path.is_empty() && *self.lead.read() == *path
    }

    /// Move the lead to `path` (empty to clear it).
    pub fn set_lead_object_path(&self, path: ScenePath) {
        let old = {
            let mut lead = self.lead.write();
            if *lead == path {
                return;
            }
            std::mem::replace(&mut *lead, path.clone())
        };
        let locators = color_locators();
        let entries: Vec<DirtiedPrimEntry> = [old, path]
            .into_iter()
            .filter(|p| !p.is_empty())
            .map(|p| DirtiedPrimEntry::new(p, locators.clone()))
            .collect();
        self.observers.send_dirtied(self, &entries);
    }
}

impl SceneIndex for DirtyLeadObjectSceneIndex {
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim {
        self.input.get_prim(path)
    }

    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath> {
        self.input.get_child_prim_paths(path)
    }

    fn display_name(&self) -> String {
        "Flow Viewport Dirty Lead Object Scene Index".to_string()
    }

    fn stage_kind(&self) -> StageKind {
        StageKind::DirtyLeadObject
    }

    filtering_plumbing!();
}

forward_notifications!(DirtyLeadObjectSceneIndex);
