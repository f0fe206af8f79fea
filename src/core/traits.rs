//! Scene index and observer traits.
//!
//! A scene index is an observable view of a prim tree. Producers own prims,
//! filtering stages wrap exactly one input and compute overlays on demand,
//! and the merging stage composes several inputs into one namespace.
//! Changes travel downstream as added / removed / dirtied / renamed
//! notifications.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::data_source::ContainerHandle;
use super::locator::LocatorSet;
use crate::selection::PathInterface;
use crate::util::{ScenePath, Token};

/// Shared scene index handle.
pub type SceneIndexHandle = Arc<dyn SceneIndex>;

/// Registered observer. Scene indices never keep their observers alive.
pub type ObserverHandle = Weak<dyn SceneIndexObserver>;

// ============================================================================
// Prims and notification entries
// ============================================================================

/// Snapshot of one prim: its type tag and data source.
///
/// A prim without a data source does not exist (or only exists as an
/// implicit ancestor of other prims).
#[derive(Clone, Default)]
pub struct SceneIndexPrim {
    pub prim_type: Token,
    pub data_source: Option<ContainerHandle>,
}

impl SceneIndexPrim {
    pub fn new(prim_type: impl Into<Token>, data_source: Option<ContainerHandle>) -> Self {
        Self { prim_type: prim_type.into(), data_source }
    }

    /// Prim with no type and no data.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True if the prim carries a data source.
    #[inline]
    pub fn is_defined(&self) -> bool {
        self.data_source.is_some()
    }
}

impl fmt::Debug for SceneIndexPrim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneIndexPrim")
            .field("prim_type", &self.prim_type)
            .field("has_data_source", &self.data_source.is_some())
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AddedPrimEntry {
    pub prim_path: ScenePath,
    pub prim_type: Token,
}

impl AddedPrimEntry {
    pub fn new(prim_path: ScenePath, prim_type: impl Into<Token>) -> Self {
        Self { prim_path, prim_type: prim_type.into() }
    }
}

/// Removal of a prim and its whole subtree.
#[derive(Clone, Debug, PartialEq)]
pub struct RemovedPrimEntry {
    pub prim_path: ScenePath,
}

impl RemovedPrimEntry {
    pub fn new(prim_path: ScenePath) -> Self {
        Self { prim_path }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DirtiedPrimEntry {
    pub prim_path: ScenePath,
    pub dirty_locators: LocatorSet,
}

impl DirtiedPrimEntry {
    pub fn new(prim_path: ScenePath, dirty_locators: LocatorSet) -> Self {
        Self { prim_path, dirty_locators }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenamedPrimEntry {
    pub old_prim_path: ScenePath,
    pub new_prim_path: ScenePath,
}

// ============================================================================
// Traits
// ============================================================================

/// What a scene index is, for chain inspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
    Retained,
    Prefixing,
    Merging,
    PathInterface,
    BlockPrimRemoval,
    Selection,
    DirtyLeadObject,
    IsolateSelect,
    DisplayStyleOverride,
    PruneTextures,
    DefaultMaterial,
    BoundingBox,
    ReprSelector,
    WireframeHighlight,
    Terminal,
    Custom,
}

/// Receives change notifications from a scene index.
pub trait SceneIndexObserver: Send + Sync {
    fn prims_added(&self, sender: &dyn SceneIndex, entries: &[AddedPrimEntry]);

    fn prims_removed(&self, sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]);

    fn prims_dirtied(&self, sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]);

    fn prims_renamed(&self, sender: &dyn SceneIndex, entries: &[RenamedPrimEntry]);
}

/// Observable prim tree.
pub trait SceneIndex: Send + Sync {
    /// Prim at `path`. Unknown paths return an empty prim.
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim;

    /// Paths of the direct children of `path`.
    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath>;

    fn add_observer(&self, observer: ObserverHandle);

    fn remove_observer(&self, observer: &ObserverHandle);

    /// Human-readable name for inspection tools.
    fn display_name(&self) -> String;

    /// Capability query: what kind of stage this is.
    fn stage_kind(&self) -> StageKind;

    /// The wrapped input, for filtering stages.
    fn input_scene(&self) -> Option<SceneIndexHandle> {
        None
    }

    /// Capability query: application path translation.
    fn as_path_interface(&self) -> Option<&dyn PathInterface> {
        None
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Weak observer handle for a stage that observes its input.
pub fn observer_handle<T: SceneIndexObserver + 'static>(this: &Arc<T>) -> ObserverHandle {
    let weak: Weak<dyn SceneIndexObserver> = Arc::downgrade(this) as Weak<T>;
    weak
}

/// True if both references point at the same scene index object.
#[inline]
pub fn same_scene(a: &dyn SceneIndex, b: &dyn SceneIndex) -> bool {
    std::ptr::eq(a as *const dyn SceneIndex as *const (), b as *const dyn SceneIndex as *const ())
}

#[inline]
fn same_observer(a: &ObserverHandle, b: &ObserverHandle) -> bool {
    std::ptr::eq(Weak::as_ptr(a) as *const (), Weak::as_ptr(b) as *const ())
}

/// Observer list shared by every scene index implementation.
///
/// Delivery works on a snapshot, so observers may add or remove observers
/// while being notified.
#[derive(Default)]
pub struct Observers {
    list: Mutex<Vec<ObserverHandle>>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, observer: ObserverHandle) {
        let mut list = self.list.lock();
        if !list.iter().any(|o| same_observer(o, &observer)) {
            list.push(observer);
        }
    }

    pub fn remove(&self, observer: &ObserverHandle) {
        self.list.lock().retain(|o| !same_observer(o, observer));
    }

    /// True if at least one live observer is registered.
    pub fn is_observed(&self) -> bool {
        self.list.lock().iter().any(|o| o.strong_count() > 0)
    }

    fn snapshot(&self) -> Vec<Arc<dyn SceneIndexObserver>> {
        let mut list = self.list.lock();
        list.retain(|o| o.strong_count() > 0);
        list.iter().filter_map(Weak::upgrade).collect()
    }

    pub fn send_added(&self, sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
        if entries.is_empty() {
            return;
        }
        for o in self.snapshot() {
            o.prims_added(sender, entries);
        }
    }

    pub fn send_removed(&self, sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
        if entries.is_empty() {
            return;
        }
        for o in self.snapshot() {
            o.prims_removed(sender, entries);
        }
    }

    pub fn send_dirtied(&self, sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]) {
        if entries.is_empty() {
            return;
        }
        for o in self.snapshot() {
            o.prims_dirtied(sender, entries);
        }
    }

    pub fn send_renamed(&self, sender: &dyn SceneIndex, entries: &[RenamedPrimEntry]) {
        if entries.is_empty() {
            return;
        }
        for o in self.snapshot() {
            o.prims_renamed(sender, entries);
        }
    }
}

/// Walk from `scene` through its inputs, terminal stage first.
pub fn chain_kinds(scene: &SceneIndexHandle) -> Vec<StageKind> {
    let mut kinds = vec![scene.stage_kind()];
    let mut current = scene.input_scene();
    while let Some(s) = current {
        kinds.push(s.stage_kind());
        current = s.input_scene();
    }
    kinds
}
