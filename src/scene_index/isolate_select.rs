//! Isolate select: hides everything outside a set of isolated paths.
//!
//! Inactive (no isolate selection) the stage passes everything through.
//! Active, prims that are neither an ancestor nor a descendant of an
//! isolated path (inclusive) get `visibility = false`.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::container::OverlayContainer;
use crate::core::schema::{self, tokens};
use crate::core::{
    all_prim_paths, observer_handle, DataSource, DirtiedPrimEntry, LocatorSet, Observers, RetainedContainer,
    SceneIndex, SceneIndexHandle, SceneIndexPrim, StageKind,
};
use crate::util::ScenePath;

pub struct IsolateSelectSceneIndex {
    input: SceneIndexHandle,
    isolated: RwLock<Option<Vec<ScenePath>>>,
    observers: Observers,
}

impl IsolateSelectSceneIndex {
    pub fn new(input: SceneIndexHandle, isolated: Option<Vec<ScenePath>>) -> Arc<Self> {
        let this = Arc::new(Self { input: input.clone(), isolated: RwLock::new(isolated), observers: Observers::new() });
        input.add_observer(observer_handle(&this));
        this
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.isolated.read().is_some()
    }

    pub fn isolate_selection(&self) -> Option<Vec<ScenePath>> {
        self.isolated.read().clone()
    }

    /// Replace the isolate selection, `None` to leave isolate mode.
    pub fn set_isolate_selection(&self, isolated: Option<Vec<ScenePath>>) {
        let mut before: Vec<ScenePath> = all_prim_paths(self.input.as_ref())
            .into_iter()
            .filter(|p| self.is_hidden(p))
            .collect();
        before.sort();
        *self.isolated.write() = isolated;
        let paths = all_prim_paths(self.input.as_ref());
        let locators = LocatorSet::from_locator(schema::visibility_locator());
        let entries: Vec<DirtiedPrimEntry> = paths
            .into_iter()
            .filter(|p| self.is_hidden(p) != before.binary_search(p).is_ok())
            .map(|p| DirtiedPrimEntry::new(p, locators.clone()))
            .collect();
        self.observers.send_dirtied(self, &entries);
    }

    /// Add one path to the isolate selection, entering isolate mode.
    pub fn add_isolate_path(&self, path: ScenePath) {
        let mut next = self.isolate_selection().unwrap_or_default();
        if !next.contains(&path) {
            next.push(path);
        }
        self.set_isolate_selection(Some(next));
    }

    /// True if `path` is hidden by the current isolate selection.
    pub fn is_hidden(&self, path: &ScenePath) -> bool {
        match &*self.isolated.read() {
            None => false,
            Some(isolated) => !isolated.iter().any(|i| path.has_prefix(i) || i.has_prefix(path)),
        }
    }
}

impl SceneIndex for IsolateSelectSceneIndex {
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim {
        let mut prim = self.input.get_prim(path);
        if !self.is_hidden(path) {
            return prim;
        }
        if let Some(ds) = prim.data_source.take() {
            let hidden = RetainedContainer::new()
                .with(
                    tokens::VISIBILITY,
                    RetainedContainer::new().with(tokens::VISIBILITY, DataSource::value(false)).into_data_source(),
                )
                .into_handle();
            prim.data_source = Some(OverlayContainer::pair(hidden, ds));
        }
        prim
    }

    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath> {
        self.input.get_child_prim_paths(path)
    }

    fn display_name(&self) -> String {
        "Flow Viewport Isolate Select Scene Index".to_string()
    }

    fn stage_kind(&self) -> StageKind {
        StageKind::IsolateSelect
    }

    filtering_plumbing!();
}

forward_notifications!(IsolateSelectSceneIndex);
