//! Global mesh refinement level override.

use std::sync::Arc;

use parking_lot::RwLock;

use super::is_excluded;
use crate::core::container::OverlayContainer;
use crate::core::schema::{self, tokens};
use crate::core::{
    all_prim_paths, observer_handle, ContainerHandle, DataSource, DirtiedPrimEntry, LocatorSet, Observers,
    RetainedContainer, SceneIndex, SceneIndexHandle, SceneIndexPrim, StageKind,
};
use crate::util::ScenePath;

/// Overlays `displayStyle/refineLevel` on meshes.
///
/// Prims under the excluded roots (natively refined geometry) are left
/// untouched.
pub struct DisplayStyleOverrideSceneIndex {
    input: SceneIndexHandle,
    excluded_roots: Vec<ScenePath>,
    refine_level: RwLock<Option<i32>>,
    overlay: RwLock<Option<ContainerHandle>>,
    observers: Observers,
}

impl DisplayStyleOverrideSceneIndex {
    pub fn new(input: SceneIndexHandle, excluded_roots: Vec<ScenePath>) -> Arc<Self> {
        let this = Arc::new(Self {
            input: input.clone(),
            excluded_roots,
            refine_level: RwLock::new(None),
            overlay: RwLock::new(None),
            observers: Observers::new(),
        });
        input.add_observer(observer_handle(&this));
        this
    }

    pub fn refine_level(&self) -> Option<i32> {
        *self.refine_level.read()
    }

    /// Set the forced refine level, `None` to stop overriding.
    pub fn set_refine_level(&self, level: Option<i32>) {
        {
            let mut current = self.refine_level.write();
            if *current == level {
                return;
            }
            *current = level;
            *self.overlay.write() = level.map(|l| {
                RetainedContainer::new()
                    .with(
                        tokens::DISPLAY_STYLE,
                        RetainedContainer::new().with(tokens::REFINE_LEVEL, DataSource::value(l)).into_data_source(),
                    )
                    .into_handle()
            });
        }
        if !self.observers.is_observed() {
            return;
        }
        let locators = LocatorSet::from_locator(schema::refine_level_locator());
        let entries: Vec<DirtiedPrimEntry> = all_prim_paths(self.input.as_ref())
            .into_iter()
            .map(|p| DirtiedPrimEntry::new(p, locators.clone()))
            .collect();
        self.observers.send_dirtied(self, &entries);
    }
}

impl SceneIndex for DisplayStyleOverrideSceneIndex {
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim {
        let mut prim = self.input.get_prim(path);
        if prim.prim_type != tokens::MESH || is_excluded(path, &self.excluded_roots) {
            return prim;
        }
        let overlay = self.overlay.read().clone();
        if let (Some(overlay), Some(ds)) = (overlay, prim.data_source.take()) {
            prim.data_source = Some(OverlayContainer::pair(overlay, ds));
        }
        prim
    }

    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath> {
        self.input.get_child_prim_paths(path)
    }

    fn display_name(&self) -> String {
        "Flow Viewport Display Style Override Scene Index".to_string()
    }

    fn stage_kind(&self) -> StageKind {
        StageKind::DisplayStyleOverride
    }

    filtering_plumbing!();
}

forward_notifications!(DisplayStyleOverrideSceneIndex);
