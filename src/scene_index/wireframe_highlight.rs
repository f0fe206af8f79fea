//! Wireframe selection highlight through mirror prims.
//!
//! Every highlighted prim gets a sibling named `<name>_SelectionHighlight`
//! that carries the original's data with a forced wireframe repr. The
//! original prim is never modified. A prim is highlighted when it is a
//! mesh, basis curves or instancer outside the excluded roots and it, or
//! an ancestor, is selected. Prototypes drawn by a highlighted instancer
//! are highlighted too, and the instancer mirror only shows the selected
//! instances through its mask.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::RwLock;

use super::is_excluded;
use crate::core::schema::{self, tokens};
use crate::core::{
    get_at, observer_handle, AddedPrimEntry, ContainerEditor, ContainerHandle, DataSource, DirtiedPrimEntry,
    LocatorSet, Observers, PrimView, RemovedPrimEntry, RenamedPrimEntry, SceneIndex, SceneIndexHandle,
    SceneIndexObserver, SceneIndexPrim, StageKind, Value,
};
use crate::selection::{Selection, SelectionHandle};
use crate::util::ScenePath;

/// Name suffix of mirror prims.
pub const MIRROR_SUFFIX: &str = "_SelectionHighlight";

// Nested instancing deeper than this is not followed.
const MAX_INSTANCING_DEPTH: usize = 8;

/// Path of the mirror of `path`.
pub fn mirror_path(path: &ScenePath) -> ScenePath {
    path.replace_name(format!("{}{}", path.name(), MIRROR_SUFFIX))
}

pub(crate) fn mirror_original(path: &ScenePath) -> Option<ScenePath> {
    let name = path.name().strip_suffix(MIRROR_SUFFIX)?;
    if name.is_empty() {
        return None;
    }
    Some(path.replace_name(name))
}

#[inline]
fn is_supported_type(prim_type: &str) -> bool {
    prim_type == tokens::MESH || prim_type == tokens::BASIS_CURVES || prim_type == tokens::INSTANCER
}

/// Instance count of an instancer: one past the largest instance index.
fn instance_count(ds: &ContainerHandle) -> usize {
    let indices = match get_at(ds, &schema::instancer_instance_indices_locator()) {
        Some(DataSource::Vector(per_prototype)) => per_prototype
            .iter()
            .filter_map(|d| d.sampled_value())
            .filter_map(|v| v.as_int_array().map(<[i32]>::to_vec))
            .flatten()
            .collect(),
        Some(d) => d.sampled_value().and_then(|v| v.as_int_array().map(<[i32]>::to_vec)).unwrap_or_default(),
        None => Vec::new(),
    };
    indices.into_iter().filter(|i| *i >= 0).max().map_or(0, |m| m as usize + 1)
}

/// Visibility mask showing exactly `selected`.
pub(crate) fn instance_mask(count: usize, selected: &[i32]) -> Vec<bool> {
    let len = selected.iter().copied().max().map_or(count, |m| count.max(m as usize + 1));
    let mut mask = vec![false; len];
    for &i in selected.iter().filter(|i| **i >= 0) {
        mask[i as usize] = true;
    }
    mask
}

#[derive(Default)]
struct Transitions {
    added: Vec<ScenePath>,
    removed: Vec<ScenePath>,
    kept: Vec<ScenePath>,
}

pub struct WireframeHighlightSceneIndex {
    input: SceneIndexHandle,
    selection: SelectionHandle,
    excluded_roots: Vec<ScenePath>,
    highlighted: RwLock<BTreeSet<ScenePath>>,
    observers: Observers,
}

impl WireframeHighlightSceneIndex {
    pub fn new(input: SceneIndexHandle, selection: SelectionHandle, excluded_roots: Vec<ScenePath>) -> Arc<Self> {
        let this = Arc::new(Self {
            input: input.clone(),
            selection,
            excluded_roots,
            highlighted: RwLock::new(BTreeSet::new()),
            observers: Observers::new(),
        });
        let roots = this.selection.read().fully_selected_paths();
        let mut initial = Transitions::default();
        for root in &roots {
            this.refresh_subtree(root, &mut initial, &mut BTreeSet::new());
        }
        tracing::debug!(target: "fvp::selection", count = initial.added.len(), "initial wireframe highlights");
        input.add_observer(observer_handle(&this));
        this
    }

    /// True if `path` currently has a mirror.
    pub fn is_highlighted(&self, path: &ScenePath) -> bool {
        self.highlighted.read().contains(path)
    }

    /// Every highlighted original path, sorted.
    pub fn highlighted_paths(&self) -> Vec<ScenePath> {
        self.highlighted.read().iter().cloned().collect()
    }

    fn should_highlight(&self, selection: &Selection, path: &ScenePath, prim: &SceneIndexPrim, depth: usize) -> bool {
        if !prim.is_defined()
            || !is_supported_type(&prim.prim_type)
            || mirror_original(path).is_some()
            || is_excluded(path, &self.excluded_roots)
        {
            return false;
        }
        if selection.has_fully_selected_ancestor_inclusive(path, None) {
            return true;
        }
        if depth >= MAX_INSTANCING_DEPTH {
            return false;
        }
        let Some(ds) = &prim.data_source else {
            return false;
        };
        schema::instanced_by_paths(ds).iter().any(|instancer| {
            let instancer_prim = self.input.get_prim(instancer);
            self.should_highlight(selection, instancer, &instancer_prim, depth + 1)
        })
    }

    /// Re-evaluate `root`, its descendants and the prototypes of instancers
    /// found there, recording transitions and updating the tracked set.
    fn refresh_subtree(&self, root: &ScenePath, out: &mut Transitions, visited: &mut BTreeSet<ScenePath>) {
        let mut prototypes = Vec::new();
        {
            let selection = self.selection.read();
            for path in PrimView::new(self.input.as_ref(), root) {
                if !visited.insert(path.clone()) {
                    continue;
                }
                let prim = self.input.get_prim(&path);
                let now = self.should_highlight(&selection, &path, &prim, 0);
                let was = self.highlighted.read().contains(&path);
                match (was, now) {
                    (false, true) => {
                        self.highlighted.write().insert(path.clone());
                        out.added.push(path.clone());
                    }
                    (true, false) => {
                        self.highlighted.write().remove(&path);
                        out.removed.push(path.clone());
                    }
                    (true, true) => out.kept.push(path.clone()),
                    (false, false) => {}
                }
                if prim.prim_type == tokens::INSTANCER {
                    if let Some(ds) = &prim.data_source {
                        prototypes.extend(
                            get_at(ds, &schema::instancer_prototypes_locator())
                                .and_then(|d| d.sampled_value())
                                .and_then(|v| v.as_path_array().map(<[ScenePath]>::to_vec))
                                .unwrap_or_default(),
                        );
                    }
                }
            }
        }
        for proto in prototypes {
            self.refresh_subtree(&proto, out, visited);
        }
    }

    fn mirror_prim(&self, original: &ScenePath) -> SceneIndexPrim {
        let prim = self.input.get_prim(original);
        let Some(ds) = prim.data_source else {
            return SceneIndexPrim::empty();
        };
        let is_instancer = prim.prim_type == tokens::INSTANCER;
        let instanced_by = schema::instanced_by_paths(&ds);
        let repr = if is_instancer || !instanced_by.is_empty() {
            tokens::REFINED_WIRE
        } else {
            tokens::REFINED_WIRE_ON_SURF
        };
        let mut editor = ContainerEditor::new(Some(ds.clone()))
            .set(&schema::repr_selector_locator(), Some(DataSource::value(schema::repr_selector(repr))));

        if !instanced_by.is_empty() {
            let highlighted = self.highlighted.read();
            let redirected: Vec<ScenePath> = instanced_by
                .iter()
                .map(|i| if highlighted.contains(i) { mirror_path(i) } else { i.clone() })
                .collect();
            editor = editor.set(&schema::instanced_by_paths_locator(), Some(DataSource::value(redirected)));
        }
        if is_instancer {
            let prototypes = get_at(&ds, &schema::instancer_prototypes_locator())
                .and_then(|d| d.sampled_value())
                .and_then(|v| v.as_path_array().map(<[ScenePath]>::to_vec));
            if let Some(prototypes) = prototypes {
                let highlighted = self.highlighted.read();
                let redirected: Vec<ScenePath> = prototypes
                    .iter()
                    .map(|p| if highlighted.contains(p) { mirror_path(p) } else { p.clone() })
                    .collect();
                editor = editor.set(&schema::instancer_prototypes_locator(), Some(DataSource::value(redirected)));
            }
            if let Some(selected) = self.selection.read().selected_instances(original) {
                let mask = instance_mask(instance_count(&ds), &selected);
                editor = editor.set(&schema::instancer_mask_locator(), Some(DataSource::value(Value::BoolArray(mask))));
            }
        }
        SceneIndexPrim { prim_type: prim.prim_type, data_source: Some(editor.finish()) }
    }

    fn mirror_locators() -> LocatorSet {
        [
            schema::repr_selector_locator(),
            schema::instancer_mask_locator(),
            schema::instancer_prototypes_locator(),
            schema::instanced_by_paths_locator(),
        ]
        .into_iter()
        .collect()
    }

    fn send_transitions(&self, t: Transitions) {
        let added: Vec<AddedPrimEntry> = t
            .added
            .iter()
            .map(|p| {
                let prim_type = self.input.get_prim(p).prim_type;
                AddedPrimEntry::new(mirror_path(p), prim_type)
            })
            .collect();
        let removed: Vec<RemovedPrimEntry> = t.removed.iter().map(|p| RemovedPrimEntry::new(mirror_path(p))).collect();
        let locators = Self::mirror_locators();
        let dirtied: Vec<DirtiedPrimEntry> =
            t.kept.iter().map(|p| DirtiedPrimEntry::new(mirror_path(p), locators.clone())).collect();
        self.observers.send_removed(self, &removed);
        self.observers.send_added(self, &added);
        self.observers.send_dirtied(self, &dirtied);
    }
}

impl SceneIndex for WireframeHighlightSceneIndex {
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim {
        if let Some(original) = mirror_original(path) {
            if self.is_highlighted(&original) {
                return self.mirror_prim(&original);
            }
        }
        self.input.get_prim(path)
    }

    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath> {
        let children = self.input.get_child_prim_paths(path);
        let highlighted = self.highlighted.read();
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            let mirrored = highlighted.contains(&child);
            if mirrored {
                let mirror = mirror_path(&child);
                out.push(child);
                out.push(mirror);
            } else {
                out.push(child);
            }
        }
        out
    }

    fn display_name(&self) -> String {
        "Flow Viewport Wireframe Selection Highlight Scene Index".to_string()
    }

    fn stage_kind(&self) -> StageKind {
        StageKind::WireframeHighlight
    }

    filtering_plumbing!();
}

impl SceneIndexObserver for WireframeHighlightSceneIndex {
    fn prims_added(&self, _sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
        self.observers.send_added(self, entries);
        let mut t = Transitions::default();
        {
            let selection = self.selection.read();
            for e in entries {
                let prim = self.input.get_prim(&e.prim_path);
                let now = self.should_highlight(&selection, &e.prim_path, &prim, 0);
                let was = self.highlighted.read().contains(&e.prim_path);
                if now {
                    self.highlighted.write().insert(e.prim_path.clone());
                    // A re-added prim gets its mirror re-added too.
                    t.added.push(e.prim_path.clone());
                } else if was {
                    self.highlighted.write().remove(&e.prim_path);
                    t.removed.push(e.prim_path.clone());
                }
            }
        }
        self.send_transitions(t);
    }

    fn prims_removed(&self, _sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
        let mut mirrors = Vec::new();
        {
            let mut highlighted = self.highlighted.write();
            for e in entries {
                if highlighted.contains(&e.prim_path) {
                    mirrors.push(RemovedPrimEntry::new(mirror_path(&e.prim_path)));
                }
                let doomed: Vec<ScenePath> = highlighted
                    .range(e.prim_path.clone()..)
                    .take_while(|p| p.has_prefix(&e.prim_path))
                    .cloned()
                    .collect();
                for p in doomed {
                    highlighted.remove(&p);
                }
            }
        }
        let mut out = entries.to_vec();
        out.extend(mirrors);
        self.observers.send_removed(self, &out);
    }

    fn prims_dirtied(&self, _sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]) {
        self.observers.send_dirtied(self, entries);

        let selections = schema::selections_locator();
        let mut t = Transitions::default();
        let mut visited = BTreeSet::new();
        let mut mirrored = Vec::new();
        for e in entries {
            if e.dirty_locators.intersects(&selections) {
                self.refresh_subtree(&e.prim_path, &mut t, &mut visited);
            } else if self.is_highlighted(&e.prim_path) {
                mirrored.push(DirtiedPrimEntry::new(mirror_path(&e.prim_path), e.dirty_locators.clone()));
            }
        }
        if !t.added.is_empty() || !t.removed.is_empty() {
            tracing::debug!(
                target: "fvp::selection",
                added = t.added.len(),
                removed = t.removed.len(),
                "wireframe highlight changed"
            );
        }
        self.send_transitions(t);
        self.observers.send_dirtied(self, &mirrored);
    }

    fn prims_renamed(&self, _sender: &dyn SceneIndex, entries: &[RenamedPrimEntry]) {
        self.observers.send_renamed(self, entries);
    }
}
