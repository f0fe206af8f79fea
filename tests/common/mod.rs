//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;

use flow_viewport::core::{
    observer_handle, AddedPrimEntry, DirtiedPrimEntry, PrimDescription, RemovedPrimEntry, RenamedPrimEntry,
    RetainedSceneIndex, SceneDescription, SceneIndex, SceneIndexHandle, SceneIndexObserver,
};
use flow_viewport::chain::FilteringChain;
use flow_viewport::config::{SharedOptions, ViewportOptions};
use flow_viewport::registration::{
    DccNode, ProducedScene, ProducerContext, ProducerFactory, SceneIndexRegistry, SimpleNode,
};
use flow_viewport::scene_index::{MergingSceneIndex, PathInterfaceSceneIndex, SelectionSceneIndex};
use flow_viewport::selection::{
    new_selection, AppPath, AppSelection, PathSegment, PrefixPathMapper, RunTimeId, SelectionChanged, SelectionHandle,
    SelectionOp,
};
use flow_viewport::ScenePath;

pub fn p(s: &str) -> ScenePath {
    s.parse().expect("valid path")
}

/// Single-segment USD application path.
pub fn usd(s: &str) -> AppPath {
    AppPath::new([PathSegment::parse(RunTimeId::USD, '/', s)])
}

/// Records every notification it receives.
#[derive(Default)]
pub struct RecordingObserver {
    pub added: Mutex<Vec<AddedPrimEntry>>,
    pub removed: Mutex<Vec<RemovedPrimEntry>>,
    pub dirtied: Mutex<Vec<DirtiedPrimEntry>>,
    pub renamed: Mutex<Vec<RenamedPrimEntry>>,
}

impl RecordingObserver {
    /// New observer attached to `scene`. Keep the returned Arc alive.
    pub fn attach(scene: &dyn SceneIndex) -> Arc<Self> {
        let observer = Arc::new(Self::default());
        scene.add_observer(observer_handle(&observer));
        observer
    }

    pub fn clear(&self) {
        self.added.lock().clear();
        self.removed.lock().clear();
        self.dirtied.lock().clear();
        self.renamed.lock().clear();
    }

    pub fn added_paths(&self) -> Vec<ScenePath> {
        self.added.lock().iter().map(|e| e.prim_path.clone()).collect()
    }

    pub fn removed_paths(&self) -> Vec<ScenePath> {
        self.removed.lock().iter().map(|e| e.prim_path.clone()).collect()
    }

    pub fn dirtied_paths(&self) -> Vec<ScenePath> {
        self.dirtied.lock().iter().map(|e| e.prim_path.clone()).collect()
    }
}

impl SceneIndexObserver for RecordingObserver {
    fn prims_added(&self, _sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
        self.added.lock().extend_from_slice(entries);
    }

    fn prims_removed(&self, _sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
        self.removed.lock().extend_from_slice(entries);
    }

    fn prims_dirtied(&self, _sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]) {
        self.dirtied.lock().extend_from_slice(entries);
    }

    fn prims_renamed(&self, _sender: &dyn SceneIndex, entries: &[RenamedPrimEntry]) {
        self.renamed.lock().extend_from_slice(entries);
    }
}

pub fn build(prims: Vec<PrimDescription>) -> Arc<RetainedSceneIndex> {
    SceneDescription { name: "test".into(), prims }.build().expect("valid scene")
}

/// `/A` holding the mesh `/A/Cube`.
pub fn cube_scene() -> Arc<RetainedSceneIndex> {
    let mut cube = PrimDescription::new("/A/Cube", "mesh");
    cube.origin = Some("/A/Cube".into());
    cube.extent = Some([[-1.0, -1.0, -1.0], [1.0, 1.0, 1.0]]);
    build(vec![PrimDescription::new("/A", "xform"), cube])
}

/// Point instancer `/I` drawing `/I/Proto` four times.
pub fn instancer_scene() -> Arc<RetainedSceneIndex> {
    let mut instancer = PrimDescription::new("/I", "instancer");
    instancer.origin = Some("/I".into());
    instancer.prototypes = vec!["/I/Proto".into()];
    instancer.instance_indices = vec![vec![0, 1, 2, 3]];
    let mut proto = PrimDescription::new("/I/Proto", "mesh");
    proto.origin = Some("/I/Proto".into());
    proto.instanced_by = vec!["/I".into()];
    build(vec![instancer, proto])
}

/// Selection stage over `scene`, mapping USD paths one to one.
pub fn selection_over(scene: SceneIndexHandle) -> (Arc<SelectionSceneIndex>, SelectionHandle) {
    let mapper = Arc::new(PrefixPathMapper::new(RunTimeId::USD, AppPath::empty(), ScenePath::absolute_root()));
    let with_paths: SceneIndexHandle = PathInterfaceSceneIndex::new(scene, mapper);
    let selection = new_selection();
    let stage = SelectionSceneIndex::new(with_paths, selection.clone()).expect("input has a path interface");
    (stage, selection)
}

pub const STAGE_TYPE: &str = "usdStage";

/// A USD stage registered under `/stage` and filtered by a chain.
pub struct Viewport {
    pub merging: Arc<MergingSceneIndex>,
    pub registry: Arc<SceneIndexRegistry>,
    pub chain: FilteringChain,
    pub node: Arc<dyn DccNode>,
    pub options: SharedOptions,
}

impl Viewport {
    pub fn new(stage: SceneIndexHandle) -> Self {
        Self::with_options(stage, ViewportOptions::default())
    }

    pub fn with_options(stage: SceneIndexHandle, options: ViewportOptions) -> Self {
        let merging = MergingSceneIndex::new();
        let registry = Arc::new(SceneIndexRegistry::new(merging.clone()));
        let factory: ProducerFactory =
            Arc::new(move |ctx: &ProducerContext<'_>| Ok(ProducedScene::usd(stage.clone(), ctx.node.app_path())));
        assert!(registry.register_producer(STAGE_TYPE, factory));
        let node: Arc<dyn DccNode> = Arc::new(SimpleNode::new("stage", STAGE_TYPE));
        registry.node_added(&node).expect("stage registers");
        let options = options.into_shared();
        let chain = FilteringChain::new(merging.clone(), options.clone()).expect("chain builds");
        Self { merging, registry, chain, node, options }
    }

    /// Application path of a stage prim.
    pub fn app_path(&self, usd_path: &str) -> AppPath {
        self.node.app_path().append_segment(PathSegment::parse(RunTimeId::USD, '/', usd_path))
    }

    /// Select stage prims, replacing the selection.
    pub fn select(&self, usd_paths: &[&str]) {
        let global: AppSelection = usd_paths.iter().map(|u| self.app_path(u)).collect();
        self.chain.on_selection_changed(&SelectionChanged::from(SelectionOp::ReplaceWith), &global);
    }
}
