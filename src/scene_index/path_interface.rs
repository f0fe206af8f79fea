//! Attaches a path interface to a producer's scene index.

use std::sync::Arc;

use crate::core::{
    observer_handle, Observers, SceneIndex, SceneIndexHandle, SceneIndexPrim, StageKind,
};
use crate::selection::PathInterface;
use crate::util::ScenePath;

/// Pass-through stage answering application path queries for its input.
pub struct PathInterfaceSceneIndex {
    input: SceneIndexHandle,
    path_interface: Arc<dyn PathInterface>,
    observers: Observers,
}

impl PathInterfaceSceneIndex {
    pub fn new(input: SceneIndexHandle, path_interface: Arc<dyn PathInterface>) -> Arc<Self> {
        let this = Arc::new(Self { input: input.clone(), path_interface, observers: Observers::new() });
        input.add_observer(observer_handle(&this));
        this
    }
}

impl SceneIndex for PathInterfaceSceneIndex {
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim {
        self.input.get_prim(path)
    }

    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath> {
        self.input.get_child_prim_paths(path)
    }

    fn add_observer(&self, observer: crate::core::ObserverHandle) {
        self.observers.add(observer);
    }

    fn remove_observer(&self, observer: &crate::core::ObserverHandle) {
        self.observers.remove(observer);
    }

    fn display_name(&self) -> String {
        "Path Interface Scene Index".to_string()
    }

    fn stage_kind(&self) -> StageKind {
        StageKind::PathInterface
    }

    fn input_scene(&self) -> Option<SceneIndexHandle> {
        Some(self.input.clone())
    }

    fn as_path_interface(&self) -> Option<&dyn PathInterface> {
        Some(self.path_interface.as_ref())
    }
}

forward_notifications!(PathInterfaceSceneIndex);
