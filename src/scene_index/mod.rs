//! Scene index stages: composition, path translation, and the filtering
//! stages of the viewport chain.

/// Forward every notification of the input unchanged.
macro_rules! forward_notifications {
    ($ty:ty) => {
        impl $crate::core::SceneIndexObserver for $ty {
            fn prims_added(&self, _sender: &dyn $crate::core::SceneIndex, entries: &[$crate::core::AddedPrimEntry]) {
                self.observers.send_added(self, entries);
            }

            fn prims_removed(&self, _sender: &dyn $crate::core::SceneIndex, entries: &[$crate::core::RemovedPrimEntry]) {
                self.observers.send_removed(self, entries);
            }

            fn prims_dirtied(&self, _sender: &dyn $crate::core::SceneIndex, entries: &[$crate::core::DirtiedPrimEntry]) {
                self.observers.send_dirtied(self, entries);
            }

            fn prims_renamed(&self, _sender: &dyn $crate::core::SceneIndex, entries: &[$crate::core::RenamedPrimEntry]) {
                self.observers.send_renamed(self, entries);
            }
        }
    };
}

/// Observer registration and input plumbing shared by single-input stages.
macro_rules! filtering_plumbing {
    () => {
        fn add_observer(&self, observer: $crate::core::ObserverHandle) {
            self.observers.add(observer);
        }

        fn remove_observer(&self, observer: &$crate::core::ObserverHandle) {
            self.observers.remove(observer);
        }

        fn input_scene(&self) -> Option<$crate::core::SceneIndexHandle> {
            Some(self.input.clone())
        }

        fn as_path_interface(&self) -> Option<&dyn $crate::selection::PathInterface> {
            self.input.as_path_interface()
        }
    };
}

/// True if `path` is at or below one of `roots`.
pub(crate) fn is_excluded(path: &crate::util::ScenePath, roots: &[crate::util::ScenePath]) -> bool {
    roots.iter().any(|r| path.has_prefix(r))
}

mod bbox;
mod block_removal;
mod default_material;
mod dirty_lead;
mod display_style;
mod isolate_select;
mod merging;
mod path_interface;
mod prune_textures;
mod repr_selector;
mod selection;
mod wireframe_highlight;

pub use bbox::BoundingBoxSceneIndex;
pub use block_removal::BlockPrimRemovalSceneIndex;
pub use default_material::{DefaultMaterialSceneIndex, DEFAULT_MATERIAL_PATH};
pub use dirty_lead::DirtyLeadObjectSceneIndex;
pub use display_style::DisplayStyleOverrideSceneIndex;
pub use isolate_select::IsolateSelectSceneIndex;
pub use merging::MergingSceneIndex;
pub use path_interface::PathInterfaceSceneIndex;
pub use prune_textures::PruneTexturesSceneIndex;
pub use repr_selector::{ReprSelectorSceneIndex, ReprVariant};
pub use selection::SelectionSceneIndex;
pub(crate) use wireframe_highlight::mirror_original;
pub use wireframe_highlight::{mirror_path, WireframeHighlightSceneIndex, MIRROR_SUFFIX};
