//! Substitutes a flat default material on meshes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::schema::{self, tokens};
use crate::core::{
    observer_handle, prim_value, ContainerEditor, DataSource, DirtiedPrimEntry, LocatorSet, Observers,
    RetainedContainer, SceneIndex, SceneIndexHandle, SceneIndexPrim, StageKind, PrimView,
};
use crate::util::ScenePath;

/// Scene index path of the default material prim.
pub const DEFAULT_MATERIAL_PATH: &str = "/_FlowViewport/DefaultMaterial";

/// Rebinds meshes to the default material while enabled.
///
/// Meshes bound to a material of the exclusion list keep their binding.
/// Meshes with no binding get the default material too.
pub struct DefaultMaterialSceneIndex {
    input: SceneIndexHandle,
    material_path: ScenePath,
    exclusions: Vec<ScenePath>,
    enabled: AtomicBool,
    observers: Observers,
}

impl DefaultMaterialSceneIndex {
    pub fn new(input: SceneIndexHandle, material_path: ScenePath, exclusions: Vec<ScenePath>) -> Arc<Self> {
        let this = Arc::new(Self {
            input: input.clone(),
            material_path,
            exclusions,
            enabled: AtomicBool::new(false),
            observers: Observers::new(),
        });
        input.add_observer(observer_handle(&this));
        this
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Turn substitution on or off, dirtying the bindings of the affected
    /// meshes.
    pub fn enable(&self, enable: bool) {
        if self.enabled.swap(enable, Ordering::AcqRel) == enable {
            return;
        }
        let locators = LocatorSet::from_locator(schema::material_bindings_locator());
        let entries: Vec<DirtiedPrimEntry> = PrimView::new(self.input.as_ref(), &ScenePath::absolute_root())
            .filter(|p| self.applies_to(&self.input.get_prim(p)))
            .map(|p| DirtiedPrimEntry::new(p, locators.clone()))
            .collect();
        self.observers.send_dirtied(self, &entries);
    }

    fn applies_to(&self, prim: &SceneIndexPrim) -> bool {
        if prim.prim_type != tokens::MESH || prim.data_source.is_none() {
            return false;
        }
        let bound = prim_value(prim.data_source.as_ref(), &schema::material_binding_path_locator());
        match bound.as_ref().and_then(|v| v.as_path()) {
            Some(path) => !self.exclusions.contains(path),
            None => true,
        }
    }
}

impl SceneIndex for DefaultMaterialSceneIndex {
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim {
        let mut prim = self.input.get_prim(path);
        if !self.is_enabled() || !self.applies_to(&prim) {
            return prim;
        }
        let bindings = RetainedContainer::new()
            .with(
                tokens::ALL_PURPOSE,
                RetainedContainer::new()
                    .with(tokens::PATH, DataSource::value(self.material_path.clone()))
                    .into_data_source(),
            )
            .into_data_source();
        prim.data_source = Some(
            ContainerEditor::new(prim.data_source.take())
                .set(&schema::material_bindings_locator(), Some(bindings))
                .finish(),
        );
        prim
    }

    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath> {
        self.input.get_child_prim_paths(path)
    }

    fn display_name(&self) -> String {
        "Flow Viewport Default Material Scene Index".to_string()
    }

    fn stage_kind(&self) -> StageKind {
        StageKind::DefaultMaterial
    }

    filtering_plumbing!();
}

forward_notifications!(DefaultMaterialSceneIndex);
