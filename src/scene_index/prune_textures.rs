//! Strips texture inputs from surface shaders when textures are off.
//!
//! Material networks live under `material/nodes/<node>` with a
//! `nodeIdentifier`, `parameters` and `inputConnections`. While textures
//! are off, every input connection of a surface shader node is removed,
//! leaving its constant parameters.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::schema::{self, tokens};
use crate::core::{
    all_prim_paths, get_at, observer_handle, ContainerEditor, DataSourceLocator, DirtiedPrimEntry, LocatorSet,
    Observers, SceneIndex, SceneIndexHandle, SceneIndexPrim, StageKind,
};
use crate::util::ScenePath;

const SURFACE_SHADERS: [&str; 2] = [tokens::USD_PREVIEW_SURFACE, tokens::ND_STANDARD_SURFACE];

pub struct PruneTexturesSceneIndex {
    input: SceneIndexHandle,
    prune: AtomicBool,
    observers: Observers,
}

impl PruneTexturesSceneIndex {
    pub fn new(input: SceneIndexHandle) -> Arc<Self> {
        let this = Arc::new(Self { input: input.clone(), prune: AtomicBool::new(false), observers: Observers::new() });
        input.add_observer(observer_handle(&this));
        this
    }

    /// True while texture inputs are being stripped.
    #[inline]
    pub fn is_pruning(&self) -> bool {
        self.prune.load(Ordering::Acquire)
    }

    /// Set whether textured display is on and dirty every material.
    pub fn mark_textures_dirty(&self, textured: bool) {
        self.prune.store(!textured, Ordering::Release);
        let locators = LocatorSet::from_locator(schema::material_locator());
        let entries: Vec<DirtiedPrimEntry> = all_prim_paths(self.input.as_ref())
            .into_iter()
            .map(|p| DirtiedPrimEntry::new(p, locators.clone()))
            .collect();
        self.observers.send_dirtied(self, &entries);
    }
}

/// Locators of the input connections to remove from a material.
fn texture_connections(material: &crate::core::ContainerHandle) -> Vec<DataSourceLocator> {
    let nodes_locator = DataSourceLocator::new([tokens::MATERIAL, tokens::NODES]);
    let Some(nodes) = get_at(material, &nodes_locator).and_then(|d| d.as_container().cloned()) else {
        return Vec::new();
    };
    let mut doomed = Vec::new();
    for name in nodes.names() {
        let Some(node) = nodes.get(&name).and_then(|d| d.as_container().cloned()) else {
            continue;
        };
        let identifier = node
            .get(tokens::NODE_IDENTIFIER)
            .and_then(|d| d.sampled_value())
            .and_then(|v| v.as_token().cloned());
        if !identifier.is_some_and(|id| SURFACE_SHADERS.iter().any(|s| id == *s)) {
            continue;
        }
        if node.get(tokens::INPUT_CONNECTIONS).is_some() {
            doomed.push(nodes_locator.append(name).append(tokens::INPUT_CONNECTIONS));
        }
    }
    doomed
}

impl SceneIndex for PruneTexturesSceneIndex {
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim {
        let mut prim = self.input.get_prim(path);
        if !self.is_pruning() || prim.prim_type != tokens::MATERIAL {
            return prim;
        }
        let Some(ds) = prim.data_source.take() else {
            return prim;
        };
        let doomed = texture_connections(&ds);
        if doomed.is_empty() {
            prim.data_source = Some(ds);
            return prim;
        }
        let editor = doomed.iter().fold(ContainerEditor::new(Some(ds)), |e, l| e.set(l, None));
        prim.data_source = Some(editor.finish());
        prim
    }

    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath> {
        self.input.get_child_prim_paths(path)
    }

    fn display_name(&self) -> String {
        "Flow Viewport Prune Textures Scene Index".to_string()
    }

    fn stage_kind(&self) -> StageKind {
        StageKind::PruneTextures
    }

    filtering_plumbing!();
}

forward_notifications!(PruneTexturesSceneIndex);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataSource, RetainedContainer, RetainedPrim, RetainedSceneIndex};

    #[test]
    fn test_prunes_surface_shader_connections() {
        let shader = RetainedContainer::new()
            .with(tokens::NODE_IDENTIFIER, DataSource::value(tokens::USD_PREVIEW_SURFACE))
            .with(
                tokens::INPUT_CONNECTIONS,
                RetainedContainer::new().with("diffuseColor", DataSource::value("/Looks/Tex.rgb")).into_data_source(),
            )
            .into_data_source();
        let material = RetainedContainer::new()
            .with(
                tokens::MATERIAL,
                RetainedContainer::new()
                    .with(tokens::NODES, RetainedContainer::new().with("surface", shader).into_data_source())
                    .into_data_source(),
            )
            .into_handle();
        let producer = RetainedSceneIndex::new("producer");
        let path: ScenePath = "/Looks/Mat".parse().unwrap();
        producer.add_prims(vec![RetainedPrim::new(path.clone(), tokens::MATERIAL, Some(material))]);
        let si = PruneTexturesSceneIndex::new(producer);
        let connections = DataSourceLocator::new([tokens::MATERIAL, tokens::NODES, "surface", tokens::INPUT_CONNECTIONS]);

        let prim = si.get_prim(&path);
        assert!(get_at(prim.data_source.as_ref().unwrap(), &connections).is_some());

        si.mark_textures_dirty(false);
        let prim = si.get_prim(&path);
        assert!(get_at(prim.data_source.as_ref().unwrap(), &connections).is_none());
        let id_locator = DataSourceLocator::new([tokens::MATERIAL, tokens::NODES, "surface", tokens::NODE_IDENTIFIER]);
        assert!(get_at(prim.data_source.as_ref().unwrap(), &id_locator).is_some());
    }
}
