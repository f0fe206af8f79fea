//! The selection set shared by the selection-aware stages.
//!
//! Maps scene index paths to the prim selections that target them. The
//! selection scene index mutates it; wireframe highlighting, isolate
//! select and wireframe color resolution read it. Ancestor closure is
//! computed on query, never cached.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use smallvec::SmallVec;

use super::types::{PrimSelection, PrimSelections};
use crate::core::container::RetainedContainer;
use crate::core::data_source::DataSource;
use crate::core::schema::tokens;
use crate::util::ScenePath;

/// Shared selection handle.
pub type SelectionHandle = Arc<RwLock<Selection>>;

/// Create an empty shared selection.
pub fn new_selection() -> SelectionHandle {
    Arc::new(RwLock::new(Selection::new()))
}

#[derive(Clone, Debug, Default)]
pub struct Selection {
    entries: BTreeMap<ScenePath, SmallVec<[PrimSelection; 1]>>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a prim selection. Returns false for an empty path or a
    /// duplicate.
    pub fn add(&mut self, selection: &PrimSelection) -> bool {
        if selection.prim_path.is_empty() {
            return false;
        }
        let entry = self.entries.entry(selection.prim_path.clone()).or_default();
        if entry.contains(selection) {
            return false;
        }
        entry.push(selection.clone());
        true
    }

    /// Remove a prim selection. The path stays selected while other
    /// selections target it.
    pub fn remove(&mut self, selection: &PrimSelection) -> bool {
        let Some(entry) = self.entries.get_mut(&selection.prim_path) else {
            return false;
        };
        let before = entry.len();
        entry.retain(|s| s != selection);
        let removed = before != entry.len();
        if entry.is_empty() {
            self.entries.remove(&selection.prim_path);
        }
        removed
    }

    /// Remove every selection of `path`.
    pub fn remove_path(&mut self, path: &ScenePath) -> bool {
        self.entries.remove(path).is_some()
    }

    /// Replace the whole selection.
    pub fn replace(&mut self, selections: &[PrimSelection]) {
        self.entries.clear();
        for s in selections {
            self.add(s);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop `path` and every selected descendant.
    pub fn remove_hierarchy(&mut self, path: &ScenePath) {
        let doomed: Vec<ScenePath> = self.descendants_inclusive(path).cloned().collect();
        for p in doomed {
            self.entries.remove(&p);
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_fully_selected(&self, path: &ScenePath) -> bool {
        self.entries.contains_key(path)
    }

    /// True if `path` or one of its ancestors is selected. With `topmost`
    /// the search stops at that ancestor.
    pub fn has_fully_selected_ancestor_inclusive(&self, path: &ScenePath, topmost: Option<&ScenePath>) -> bool {
        let mut p = path.clone();
        while !p.is_empty() && !p.is_absolute_root() {
            if self.entries.contains_key(&p) {
                return true;
            }
            if topmost == Some(&p) {
                break;
            }
            p = p.parent();
        }
        false
    }

    /// Selected paths among `path` and its ancestors, deepest first.
    pub fn find_fully_selected_ancestors_inclusive(&self, path: &ScenePath, topmost: Option<&ScenePath>) -> Vec<ScenePath> {
        let mut found = Vec::new();
        let mut p = path.clone();
        while !p.is_empty() && !p.is_absolute_root() {
            if self.entries.contains_key(&p) {
                found.push(p.clone());
            }
            if topmost == Some(&p) {
                break;
            }
            p = p.parent();
        }
        found
    }

    /// True if `path` or one of its descendants is selected.
    pub fn has_descendant_inclusive(&self, path: &ScenePath) -> bool {
        self.descendants_inclusive(path).next().is_some()
    }

    pub fn has_ancestor_or_descendant_inclusive(&self, path: &ScenePath) -> bool {
        self.has_descendant_inclusive(path) || self.has_fully_selected_ancestor_inclusive(path, None)
    }

    /// Every selected path, sorted.
    pub fn fully_selected_paths(&self) -> Vec<ScenePath> {
        self.entries.keys().cloned().collect()
    }

    /// Prim selections targeting `path`.
    pub fn prim_selections(&self, path: &ScenePath) -> PrimSelections {
        self.entries.get(path).map(|e| e.to_vec()).unwrap_or_default()
    }

    /// Selected instance indices of the instancer at `path`.
    ///
    /// `None` when the instancer is selected as a whole (or not at all).
    pub fn selected_instances(&self, path: &ScenePath) -> Option<Vec<i32>> {
        let entry = self.entries.get(path)?;
        let mut indices = Vec::new();
        for s in entry {
            if s.nested_instance_indices.is_empty() {
                return None;
            }
            for nested in s.nested_instance_indices.iter().filter(|n| &n.instancer_path == path) {
                indices.extend_from_slice(&nested.instance_indices);
            }
        }
        indices.sort_unstable();
        indices.dedup();
        Some(indices)
    }

    /// The `selections` vector data source for `path`: a single element
    /// with `fullySelected = true`, plus `nestedInstanceIndices` when
    /// instances are selected.
    pub fn vector_data_source(&self, path: &ScenePath) -> Option<DataSource> {
        let entry = self.entries.get(path)?;
        let mut element = RetainedContainer::new().with(tokens::FULLY_SELECTED, DataSource::value(true));
        let nested: Vec<DataSource> = entry
            .iter()
            .flat_map(|s| s.nested_instance_indices.iter())
            .map(|n| {
                RetainedContainer::new()
                    .with(tokens::INSTANCER_PATH, DataSource::value(n.instancer_path.clone()))
                    .with(tokens::PROTOTYPE_INDEX, DataSource::value(n.prototype_index))
                    .with(tokens::INSTANCE_INDICES, DataSource::value(n.instance_indices.clone()))
                    .into_data_source()
            })
            .collect();
        if !nested.is_empty() {
            element.set(tokens::NESTED_INSTANCE_INDICES, DataSource::vector(nested));
        }
        Some(DataSource::vector(vec![element.into_data_source()]))
    }

    /// Paths whose prim selections differ between `self` and `other`.
    pub fn changed_paths(&self, other: &Selection) -> Vec<ScenePath> {
        let mut changed: Vec<ScenePath> = self
            .entries
            .iter()
            .filter(|(p, e)| other.entries.get(*p) != Some(*e))
            .map(|(p, _)| p.clone())
            .collect();
        changed.extend(other.entries.keys().filter(|p| !self.entries.contains_key(*p)).cloned());
        changed.sort();
        changed
    }

    fn descendants_inclusive<'a>(&'a self, path: &'a ScenePath) -> impl Iterator<Item = &'a ScenePath> + 'a {
        self.entries
            .range(path.clone()..)
            .map(|(p, _)| p)
            .take_while(move |p| p.has_prefix(path))
    }
}
