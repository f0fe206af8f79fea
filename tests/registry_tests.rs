//! Node registration tests.

mod common;

use std::sync::Arc;

use common::{cube_scene, p, RecordingObserver};

use flow_viewport::core::{SceneIndex, SceneIndexHandle};
use flow_viewport::registration::{
    DccNode, ProducedScene, ProducerContext, ProducerFactory, SceneIndexRegistry, SimpleNode,
};
use flow_viewport::scene_index::MergingSceneIndex;
use flow_viewport::selection::{AppPath, PathSegment, RunTimeId};
use flow_viewport::Error;

const STAGE: &str = "usdStage";
const NATIVE: &str = "dccScene";

fn registry() -> (Arc<MergingSceneIndex>, SceneIndexRegistry) {
    let merging = MergingSceneIndex::new();
    let registry = SceneIndexRegistry::new(merging.clone());
    let stage: ProducerFactory = Arc::new(|ctx: &ProducerContext<'_>| {
        let scene: SceneIndexHandle = cube_scene();
        Ok(ProducedScene::usd(scene, ctx.node.app_path()))
    });
    let native: ProducerFactory = Arc::new(|ctx: &ProducerContext<'_>| {
        let scene: SceneIndexHandle = cube_scene();
        Ok(ProducedScene::native(scene, ctx.prefix.clone()))
    });
    assert!(registry.register_producer(STAGE, stage));
    assert!(registry.register_producer(NATIVE, native));
    (merging, registry)
}

fn node(name: &str) -> Arc<dyn DccNode> {
    Arc::new(SimpleNode::new(name, STAGE))
}

fn dcc(components: &[&str]) -> AppPath {
    AppPath::new([PathSegment::new(RunTimeId::DCC, '|', components.iter().copied())])
}

#[test]
fn test_duplicate_producer_is_refused() {
    let (_merging, registry) = registry();
    let again: ProducerFactory = Arc::new(|ctx: &ProducerContext<'_>| {
        let scene: SceneIndexHandle = cube_scene();
        Ok(ProducedScene::usd(scene, ctx.node.app_path()))
    });
    assert!(!registry.register_producer(STAGE, again));
    assert!(registry.has_producer(STAGE));
    assert!(!registry.has_producer("camera"));
}

#[test]
fn test_node_added_composes_under_prefix() {
    let (merging, registry) = registry();
    let stage = node("stage");
    let registration = registry.node_added(&stage).unwrap();

    assert_eq!(registration.prefix(), &p("/stage"));
    assert_eq!(registration.node_name(), "stage");
    assert!(registration.is_alive());
    assert!(merging.get_prim(&p("/stage/A/Cube")).is_defined());
    assert_eq!(registry.path_for_hash(stage.hash_code()), p("/stage"));
    assert_eq!(registry.registration_for_node(stage.as_ref()).unwrap().prefix(), &p("/stage"));
    assert_eq!(registry.pick_handlers().len(), 1);
}

#[test]
fn test_prefixes_are_unique_and_sanitized() {
    let (_merging, registry) = registry();
    let first = registry.node_added(&node("my-stage")).unwrap();
    assert_eq!(first.prefix(), &p("/my_stage"));

    // Same name at another place in the DCC hierarchy.
    let twin: Arc<dyn DccNode> = Arc::new(
        SimpleNode::new("my-stage", STAGE).with_app_path(dcc(&["group", "my-stage"])).with_unique_name(false),
    );
    let second = registry.node_added(&twin).unwrap();
    assert_eq!(second.prefix(), &p("/my_stage__1"));
    assert_eq!(registry.registrations().len(), 2);
}

#[test]
fn test_registration_errors() {
    let (_merging, registry) = registry();
    let stage = node("stage");
    registry.node_added(&stage).unwrap();
    assert!(matches!(registry.node_added(&stage), Err(Error::AlreadyRegistered(_))));

    let camera: Arc<dyn DccNode> = Arc::new(SimpleNode::new("cam", "camera"));
    assert!(matches!(registry.node_added(&camera), Err(Error::UnknownNodeType(t)) if t == "camera"));
    assert_eq!(registry.registrations().len(), 1);
}

#[test]
fn test_node_removed_retracts_scene() {
    let (merging, registry) = registry();
    let stage = node("stage");
    registry.node_added(&stage).unwrap();
    let observer = RecordingObserver::attach(merging.as_ref());

    assert!(registry.node_removed(stage.as_ref()));
    assert_eq!(observer.removed_paths(), vec![p("/stage")]);
    assert!(!merging.get_prim(&p("/stage/A/Cube")).is_defined());
    assert!(registry.pick_handlers().is_empty());
    assert!(registry.path_for_hash(stage.hash_code()).is_empty());
    assert!(!registry.node_removed(stage.as_ref()));
}

#[test]
fn test_expired_nodes_are_collected() {
    let (merging, registry) = registry();
    let kept = node("kept");
    let dropped = node("dropped");
    registry.node_added(&kept).unwrap();
    let registration = registry.node_added(&dropped).unwrap();

    drop(dropped);
    assert!(!registration.is_alive());
    assert!(registration.node().is_none());
    assert_eq!(registry.remove_expired(), 1);
    assert_eq!(registry.remove_expired(), 0);
    assert!(merging.get_prim(&p("/kept/A/Cube")).is_defined());
    assert!(!merging.get_prim(&p("/dropped/A/Cube")).is_defined());
}

#[test]
fn test_rprim_lookup_and_interpretation() {
    let (_merging, registry) = registry();
    registry.node_added(&node("stage")).unwrap();
    let native: Arc<dyn DccNode> = Arc::new(SimpleNode::new("maya", NATIVE));
    registry.node_added(&native).unwrap();

    let usd = registry.registration_for_rprim(&p("/stage/A/Cube")).unwrap();
    let expected = dcc(&["stage"]).append_segment(PathSegment::parse(RunTimeId::USD, '/', "/A/Cube"));
    assert_eq!(usd.interpret_rprim_path(&p("/A/Cube")), expected);

    let dcc_reg = registry.registration_for_rprim(&p("/maya/A/Cube")).unwrap();
    assert_eq!(dcc_reg.interpret_rprim_path(&p("/maya/A/Cube")), dcc(&["A", "Cube"]));
    assert!(dcc_reg.interpret_rprim_path(&p("/maya")).is_empty());

    assert!(registry.registration_for_rprim(&p("/elsewhere/A")).is_none());
    assert!(registry.registration_for_rprim(&p("/")).is_none());
}
