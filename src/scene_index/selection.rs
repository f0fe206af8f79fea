//! Selection scene index: keeps the selection set and exposes it on prims.
//!
//! Application paths are translated through the path interface of the
//! input (ultimately the merging scene index). Selected prims get a
//! `selections` vector data source. A mutation dirties the `selections`
//! locator of exactly the paths whose selection changed.

use std::sync::Arc;

use crate::core::container::OverlayContainer;
use crate::core::schema::{self, tokens};
use crate::core::{
    observer_handle, AddedPrimEntry, DirtiedPrimEntry, LocatorSet, Observers, RemovedPrimEntry, RenamedPrimEntry,
    RetainedContainer, SceneIndex, SceneIndexHandle, SceneIndexObserver, SceneIndexPrim, StageKind,
};
use crate::selection::{AppPath, AppSelection, PrimSelection, PrimSelections, Selection, SelectionHandle};
use crate::util::{Error, Result, ScenePath};

pub struct SelectionSceneIndex {
    input: SceneIndexHandle,
    selection: SelectionHandle,
    observers: Observers,
}

impl SelectionSceneIndex {
    /// Wrap `input`, which must provide a path interface.
    pub fn new(input: SceneIndexHandle, selection: SelectionHandle) -> Result<Arc<Self>> {
        if input.as_path_interface().is_none() {
            return Err(Error::MissingPathInterface(input.display_name()));
        }
        let this = Arc::new(Self { input: input.clone(), selection, observers: Observers::new() });
        input.add_observer(observer_handle(&this));
        Ok(this)
    }

    /// The shared selection set.
    pub fn selection(&self) -> SelectionHandle {
        self.selection.clone()
    }

    // ========================================================================
    // Application path mutations
    // ========================================================================

    /// Prim selections for an application path, empty if it does not
    /// translate.
    pub fn translate(&self, app_path: &AppPath) -> PrimSelections {
        let Some(pi) = self.input.as_path_interface() else {
            return PrimSelections::new();
        };
        let selections = pi.app_path_to_prim_selections(app_path);
        if selections.is_empty() {
            tracing::debug!(target: "fvp::selection", %app_path, "application path has no scene index path");
        }
        selections
    }

    /// Scene index paths of an application path.
    pub fn scene_index_paths(&self, app_path: &AppPath) -> Vec<ScenePath> {
        self.translate(app_path).into_iter().map(|s| s.prim_path).collect()
    }

    pub fn add_selection(&self, app_path: &AppPath) {
        let selections = self.translate(app_path);
        self.add_prim_selections(&selections);
    }

    pub fn remove_selection(&self, app_path: &AppPath) {
        let selections = self.translate(app_path);
        self.remove_prim_selections(&selections);
    }

    /// Rebuild the selection from a whole application selection.
    pub fn replace_selection(&self, app_selection: &AppSelection) {
        let selections: PrimSelections = app_selection.iter().flat_map(|a| self.translate(a)).collect();
        self.replace_prim_selections(&selections);
    }

    pub fn clear_selection(&self) {
        self.mutate(Selection::clear);
    }

    // ========================================================================
    // Scene index path mutations
    // ========================================================================

    pub fn add_prim_selections(&self, selections: &[PrimSelection]) {
        self.mutate(|s| {
            for sel in selections {
                s.add(sel);
            }
        });
    }

    pub fn remove_prim_selections(&self, selections: &[PrimSelection]) {
        self.mutate(|s| {
            for sel in selections {
                s.remove(sel);
            }
        });
    }

    pub fn replace_prim_selections(&self, selections: &[PrimSelection]) {
        self.mutate(|s| s.replace(selections));
    }

    fn mutate(&self, f: impl FnOnce(&mut Selection)) {
        let changed = {
            let mut selection = self.selection.write();
            let before = selection.clone();
            f(&mut selection);
            before.changed_paths(&selection)
        };
        if changed.is_empty() {
            return;
        }
        tracing::debug!(target: "fvp::selection", count = changed.len(), "selection changed");
        let locators = LocatorSet::from_locator(schema::selections_locator());
        let entries: Vec<DirtiedPrimEntry> =
            changed.into_iter().map(|p| DirtiedPrimEntry::new(p, locators.clone())).collect();
        self.observers.send_dirtied(self, &entries);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn is_fully_selected(&self, path: &ScenePath) -> bool {
        self.selection.read().is_fully_selected(path)
    }

    pub fn has_fully_selected_ancestor_inclusive(&self, path: &ScenePath) -> bool {
        self.selection.read().has_fully_selected_ancestor_inclusive(path, None)
    }

    pub fn fully_selected_paths(&self) -> Vec<ScenePath> {
        self.selection.read().fully_selected_paths()
    }
}

impl SceneIndex for SelectionSceneIndex {
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim {
        let mut prim = self.input.get_prim(path);
        let Some(ds) = prim.data_source.take() else {
            return prim;
        };
        let selections = self.selection.read().vector_data_source(path);
        prim.data_source = Some(match selections {
            Some(sel) => OverlayContainer::pair(RetainedContainer::new().with(tokens::SELECTIONS, sel).into_handle(), ds),
            None => ds,
        });
        prim
    }

    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath> {
        self.input.get_child_prim_paths(path)
    }

    fn display_name(&self) -> String {
        "Flow Viewport Selection Scene Index".to_string()
    }

    fn stage_kind(&self) -> StageKind {
        StageKind::Selection
    }

    filtering_plumbing!();
}

impl SceneIndexObserver for SelectionSceneIndex {
    fn prims_added(&self, _sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
        self.observers.send_added(self, entries);
    }

    fn prims_removed(&self, _sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
        {
            let mut selection = self.selection.write();
            for e in entries {
                selection.remove_hierarchy(&e.prim_path);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RetainedPrim, RetainedSceneIndex};
    use crate::scene_index::MergingSceneIndex;
    use crate::selection::new_selection;

    fn p(s: &str) -> ScenePath {
        s.parse().unwrap()
    }

    fn cube_scene() -> Arc<MergingSceneIndex> {
        let producer = RetainedSceneIndex::new("producer");
        producer.add_prims(vec![RetainedPrim::new(p("/A/Cube"), tokens::MESH, Some(RetainedContainer::new().into_handle()))]);
        let merging = MergingSceneIndex::new();
        merging.add_input_scene(producer, p("/A"));
        merging
    }

    #[test]
    fn test_requires_path_interface() {
        let producer = RetainedSceneIndex::new("producer");
        assert!(SelectionSceneIndex::new(producer, new_selection()).is_err());
    }

    #[test]
    fn test_selections_data_source() {
        let si = SelectionSceneIndex::new(cube_scene(), new_selection()).unwrap();
        si.add_prim_selections(&[PrimSelection::new(p("/A/Cube"))]);
        assert!(si.is_fully_selected(&p("/A/Cube")));
        assert!(si.has_fully_selected_ancestor_inclusive(&p("/A/Cube")));
        assert!(!si.has_fully_selected_ancestor_inclusive(&p("/A")));

        let prim = si.get_prim(&p("/A/Cube"));
        let ds = prim.data_source.unwrap();
        let sel = crate::core::get_at(&ds, &schema::selections_locator()).unwrap();
        assert_eq!(sel.as_vector().map(|v| v.len()), Some(1));

        si.clear_selection();
        let prim = si.get_prim(&p("/A/Cube"));
        assert!(crate::core::get_at(&prim.data_source.unwrap(), &schema::selections_locator()).is_none());
    }

    #[test]
    fn test_replace_is_idempotent() {
        let si = SelectionSceneIndex::new(cube_scene(), new_selection()).unwrap();
        let s = [PrimSelection::new(p("/A/Cube"))];
        si.replace_prim_selections(&s);
        let once = si.fully_selected_paths();
        si.replace_prim_selections(&s);
        assert_eq!(si.fully_selected_paths(), once);
    }
}
