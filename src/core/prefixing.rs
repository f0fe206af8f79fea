//! Relocates an input scene index under a path prefix.
//!
//! Path-valued fields are relocated too, except inside `primOrigin`, which
//! records data-model paths that must stay local to the producer.

use std::sync::Arc;

use super::data_source::{ContainerDataSource, ContainerHandle, DataSource, SampledDataSource, Value};
use super::schema::tokens;
use super::traits::{
    observer_handle, AddedPrimEntry, DirtiedPrimEntry, ObserverHandle, Observers, RemovedPrimEntry,
    RenamedPrimEntry, SceneIndex, SceneIndexHandle, SceneIndexObserver, SceneIndexPrim, StageKind,
};
use crate::selection::PathInterface;
use crate::util::{ScenePath, Token};

pub struct PrefixingSceneIndex {
    input: SceneIndexHandle,
    prefix: ScenePath,
    observers: Observers,
}

impl PrefixingSceneIndex {
    pub fn new(input: SceneIndexHandle, prefix: ScenePath) -> Arc<Self> {
        let this = Arc::new(Self { input: input.clone(), prefix, observers: Observers::new() });
        input.add_observer(observer_handle(&this));
        this
    }

    #[inline]
    pub fn prefix(&self) -> &ScenePath {
        &self.prefix
    }

    fn to_input(&self, path: &ScenePath) -> Option<ScenePath> {
        path.strip_prefix(&self.prefix).map(|rest| ScenePath::absolute_root().append_components(rest))
    }

    fn to_output(&self, path: &ScenePath) -> ScenePath {
        self.prefix.append_path(path)
    }
}

impl SceneIndex for PrefixingSceneIndex {
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim {
        match self.to_input(path) {
            Some(input_path) => {
                let prim = self.input.get_prim(&input_path);
                SceneIndexPrim {
                    prim_type: prim.prim_type,
                    data_source: prim.data_source.map(|ds| -> ContainerHandle {
                        Arc::new(PrefixedContainer { input: ds, prefix: self.prefix.clone() })
                    }),
                }
            }
            None => SceneIndexPrim::empty(),
        }
    }

    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath> {
        if let Some(input_path) = self.to_input(path) {
            return self
                .input
                .get_child_prim_paths(&input_path)
                .iter()
                .map(|c| self.to_output(c))
                .collect();
        }
        if self.prefix.has_prefix(path) {
            return vec![self.prefix.truncate(path.element_count() + 1)];
        }
        Vec::new()
    }

    fn add_observer(&self, observer: ObserverHandle) {
        self.observers.add(observer);
    }

    fn remove_observer(&self, observer: &ObserverHandle) {
        self.observers.remove(observer);
    }

    fn display_name(&self) -> String {
        format!("Prefixing Scene Index ({})", self.prefix)
    }

    fn stage_kind(&self) -> StageKind {
        StageKind::Prefixing
    }

    fn input_scene(&self) -> Option<SceneIndexHandle> {
        Some(self.input.clone())
    }

    fn as_path_interface(&self) -> Option<&dyn PathInterface> {
        self.input.as_path_interface()
    }
}

impl SceneIndexObserver for PrefixingSceneIndex {
    fn prims_added(&self, _sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
        let out: Vec<_> = entries
            .iter()
            .map(|e| AddedPrimEntry::new(self.to_output(&e.prim_path), e.prim_type.clone()))
            .collect();
        self.observers.send_added(self, &out);
    }

    fn prims_removed(&self, _sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
        let out: Vec<_> = entries.iter().map(|e| RemovedPrimEntry::new(self.to_output(&e.prim_path))).collect();
        self.observers.send_removed(self, &out);
    }

    fn prims_dirtied(&self, _sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]) {
        let out: Vec<_> = entries
            .iter()
            .map(|e| DirtiedPrimEntry::new(self.to_output(&e.prim_path), e.dirty_locators.clone()))
            .collect();
        self.observers.send_dirtied(self, &out);
    }

    fn prims_renamed(&self, _sender: &dyn SceneIndex, entries: &[RenamedPrimEntry]) {
        let out: Vec<_> = entries
            .iter()
            .map(|e| RenamedPrimEntry {
                old_prim_path: self.to_output(&e.old_prim_path),
                new_prim_path: self.to_output(&e.new_prim_path),
            })
            .collect();
        self.observers.send_renamed(self, &out);
    }
}

fn prefix_data_source(ds: DataSource, prefix: &ScenePath) -> DataSource {
    match ds {
        DataSource::Container(c) => DataSource::Container(Arc::new(PrefixedContainer { input: c, prefix: prefix.clone() })),
        DataSource::Vector(v) => DataSource::vector(v.iter().map(|d| prefix_data_source(d.clone(), prefix)).collect()),
        DataSource::Sampled(s) => DataSource::Sampled(Arc::new(PrefixedSampled { input: s, prefix: prefix.clone() })),
    }
}

struct PrefixedContainer {
    input: Arc<dyn ContainerDataSource>,
    prefix: ScenePath,
}

impl ContainerDataSource for PrefixedContainer {
    fn names(&self) -> Vec<Token> {
        self.input.names()
    }

    fn get(&self, name: &str) -> Option<DataSource> {
        let ds = self.input.get(name)?;
        if name == tokens::PRIM_ORIGIN {
            return Some(ds);
        }
        Some(prefix_data_source(ds, &self.prefix))
    }
}

struct PrefixedSampled {
    input: Arc<dyn SampledDataSource>,
    prefix: ScenePath,
}

impl SampledDataSource for PrefixedSampled {
    fn value(&self, shutter_offset: f32) -> Value {
        match self.input.value(shutter_offset) {
            Value::Path(p) if !p.is_empty() => Value::Path(self.prefix.append_path(&p)),
            Value::PathArray(paths) => Value::PathArray(
                paths.iter().map(|p| if p.is_empty() { p.clone() } else { self.prefix.append_path(p) }).collect(),
            ),
            other => other,
        }
    }
}
