//! Pick resolution tests.

mod common;

use std::sync::Arc;

use common::{build, p, Viewport};

use flow_viewport::config::{GeomSubsetsPickMode, PointInstancesPickMode, ViewportOptions};
use flow_viewport::core::{PrimDescription, RetainedSceneIndex, SceneIndexHandle};
use flow_viewport::pick::{PickHit, PickResolver};
use flow_viewport::registration::{DccNode, ProducedScene, ProducerContext, ProducerFactory, SimpleNode};
use flow_viewport::scene_index::mirror_path;
use flow_viewport::selection::{AppPath, PathSegment, RunTimeId};
use flow_viewport::util::DVec3;

fn prim(path: &str, prim_type: &str) -> PrimDescription {
    PrimDescription { origin: Some(path.into()), ..PrimDescription::new(path, prim_type) }
}

fn subset_scene() -> Arc<RetainedSceneIndex> {
    let mut top = prim("/A/Cube/Top", "geomSubset");
    top.subset_type = Some("typeFaceSet".into());
    top.subset_indices = vec![0, 1];
    let mut side = prim("/A/Cube/Side", "geomSubset");
    side.subset_type = Some("typeFaceSet".into());
    side.subset_indices = vec![1, 2];
    let mut group = prim("/A", "xform");
    group.kind = Some("component".into());
    build(vec![group, prim("/A/Cube", "mesh"), top, side, prim("/B", "xform"), prim("/B/Cube", "mesh")])
}

fn instancer_scene() -> Arc<RetainedSceneIndex> {
    let mut instancer = prim("/I", "instancer");
    instancer.prototypes = vec!["/I/Proto".into()];
    instancer.instance_indices = vec![vec![0, 1, 2, 3]];
    let mut proto = prim("/I/Proto", "mesh");
    proto.instanced_by = vec!["/I".into()];
    build(vec![instancer, proto])
}

fn resolver(viewport: &Viewport) -> PickResolver {
    PickResolver::new(viewport.registry.clone(), viewport.options.clone())
}

fn picked(viewport: &Viewport, hits: &[PickHit]) -> Vec<AppPath> {
    let scene = viewport.chain.terminal_scene();
    let result = resolver(viewport).resolve(scene.as_ref(), hits);
    result.output.selection.iter().cloned().collect()
}

#[test]
fn test_sole_hit_round_trip() {
    let viewport = Viewport::new(subset_scene());
    let hits = [PickHit::prim(p("/stage/A/Cube"))];
    assert_eq!(picked(&viewport, &hits), vec![viewport.app_path("/A/Cube")]);
}

#[test]
fn test_geom_subset_picking() {
    let options = ViewportOptions { geom_subsets_pick_mode: GeomSubsetsPickMode::Faces, ..Default::default() };
    let viewport = Viewport::with_options(subset_scene(), options);

    let face0 = PickHit::prim(p("/stage/A/Cube")).with_element(0);
    assert_eq!(picked(&viewport, &[face0]), vec![viewport.app_path("/A/Cube/Top")]);

    // Face 1 is in both subsets.
    let face1 = PickHit::prim(p("/stage/A/Cube")).with_element(1);
    let both = picked(&viewport, &[face1]);
    assert_eq!(both.len(), 2);
    assert!(both.contains(&viewport.app_path("/A/Cube/Top")));
    assert!(both.contains(&viewport.app_path("/A/Cube/Side")));
}

#[test]
fn test_geom_subset_fallback() {
    let options = ViewportOptions { geom_subsets_pick_mode: GeomSubsetsPickMode::Faces, ..Default::default() };
    let viewport = Viewport::with_options(subset_scene(), options);
    let miss = PickHit::prim(p("/stage/A/Cube")).with_element(7);

    // Sole hit: the whole mesh.
    assert_eq!(picked(&viewport, &[miss.clone()]), vec![viewport.app_path("/A/Cube")]);

    // One of several hits: nothing for the miss.
    let other = PickHit::prim(p("/stage/B/Cube"));
    let scene = viewport.chain.terminal_scene();
    let result = resolver(&viewport).resolve(scene.as_ref(), &[miss, other]);
    assert!(result.is_success());
    assert_eq!(result.resolved, 1);
    assert_eq!(result.skipped, 1);
    let items: Vec<AppPath> = result.output.selection.iter().cloned().collect();
    assert_eq!(items, vec![viewport.app_path("/B/Cube")]);
}

#[test]
fn test_point_instance_pick_modes() {
    let hit = PickHit::instance(p("/stage/I/Proto"), p("/stage/I"), 2);
    let expect = [
        (PointInstancesPickMode::PointInstancer, "/I", None),
        (PointInstancesPickMode::Instances, "/I", Some("2")),
        (PointInstancesPickMode::Prototypes, "/I/Proto", None),
    ];
    for (mode, path, instance) in expect {
        let options = ViewportOptions { point_instances_pick_mode: mode, ..Default::default() };
        let viewport = Viewport::with_options(instancer_scene(), options);
        let mut expected = viewport.app_path(path);
        if let Some(instance) = instance {
            expected = expected.append_component(instance);
        }
        assert_eq!(picked(&viewport, &[hit.clone()]), vec![expected], "{mode:?}");
    }
}

#[test]
fn test_selection_kind_walk() {
    let options = ViewportOptions { selection_kind: "model".into(), ..Default::default() };
    let viewport = Viewport::with_options(subset_scene(), options);
    // `/A` is a component, hence a model.
    assert_eq!(picked(&viewport, &[PickHit::prim(p("/stage/A/Cube"))]), vec![viewport.app_path("/A")]);
    // No model above `/B/Cube`: the picked prim itself.
    assert_eq!(picked(&viewport, &[PickHit::prim(p("/stage/B/Cube"))]), vec![viewport.app_path("/B/Cube")]);
}

#[test]
fn test_unregistered_hits_are_skipped() {
    let viewport = Viewport::new(subset_scene());
    let scene = viewport.chain.terminal_scene();
    let result = resolver(&viewport).resolve(scene.as_ref(), &[PickHit::prim(p("/elsewhere/Cube"))]);
    assert!(!result.is_success());
    assert!(result.output.is_empty());
}

#[test]
fn test_highlight_mirror_picks_original() {
    let viewport = Viewport::new(subset_scene());
    viewport.select(&["/A/Cube"]);
    let hit = PickHit::prim(mirror_path(&p("/stage/A/Cube")));
    assert_eq!(picked(&viewport, &[hit]), vec![viewport.app_path("/A/Cube")]);
}

#[test]
fn test_native_producer_pick() {
    let viewport = Viewport::new(subset_scene());
    let native: SceneIndexHandle = build(vec![prim("/world", "xform"), prim("/world/cube", "mesh")]);
    let factory: ProducerFactory =
        Arc::new(move |ctx: &ProducerContext<'_>| Ok(ProducedScene::native(native.clone(), ctx.prefix.clone())));
    assert!(viewport.registry.register_producer("dccScene", factory));
    let node: Arc<dyn DccNode> = Arc::new(SimpleNode::new("dcc", "dccScene"));
    viewport.registry.node_added(&node).unwrap();

    let point = DVec3::new(1.0, 2.0, 3.0);
    let hit = PickHit::prim(p("/dcc/world/cube")).with_world_hit_point(point);
    let scene = viewport.chain.terminal_scene();
    let result = resolver(&viewport).resolve(scene.as_ref(), &[hit]);
    assert!(result.is_success());
    assert!(result.output.selection.is_empty());
    assert_eq!(result.output.native.len(), 1);
    assert_eq!(
        result.output.native[0].path,
        AppPath::new([PathSegment::new(RunTimeId::DCC, '|', ["world", "cube"])])
    );
    assert_eq!(result.output.native[0].world_hit_point, point);
}
