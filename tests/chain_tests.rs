//! Filtering chain and composition tests.

mod common;

use std::sync::Arc;

use common::{build, cube_scene, p, RecordingObserver, Viewport};

use flow_viewport::chain::{DisplayStyle, FnFilteringClient};
use flow_viewport::core::schema::{self, tokens};
use flow_viewport::core::{value_at, PrimDescription, SceneIndex, SceneIndexHandle, StageKind};
use flow_viewport::scene_index::{mirror_path, DisplayStyleOverrideSceneIndex, MergingSceneIndex};

fn two_cubes() -> SceneIndexHandle {
    build(vec![
        PrimDescription::new("/A", "xform"),
        PrimDescription { origin: Some("/A/Cube".into()), ..PrimDescription::new("/A/Cube", "mesh") },
        PrimDescription::new("/B", "xform"),
        PrimDescription { origin: Some("/B/Cube".into()), ..PrimDescription::new("/B/Cube", "mesh") },
    ])
}

#[test]
fn test_chain_order() {
    let viewport = Viewport::new(cube_scene());
    let kinds = viewport.chain.stage_kinds();
    assert_eq!(
        kinds,
        vec![
            StageKind::Terminal,
            StageKind::WireframeHighlight,
            StageKind::DefaultMaterial,
            StageKind::PruneTextures,
            StageKind::DisplayStyleOverride,
            StageKind::IsolateSelect,
            StageKind::DirtyLeadObject,
            StageKind::Selection,
            StageKind::BlockPrimRemoval,
            StageKind::Merging,
        ]
    );
}

#[test]
fn test_wireframe_and_bbox_rebuild() {
    let viewport = Viewport::new(cube_scene());
    let terminal = viewport.chain.terminal_scene();
    let observer = RecordingObserver::attach(terminal.as_ref());

    assert!(viewport.chain.update_display_style(DisplayStyle::SHADED | DisplayStyle::WIREFRAME).unwrap());
    assert!(viewport.chain.stage_kinds().contains(&StageKind::ReprSelector));
    // Rebuilding re-adds every prim and removes nothing that still exists.
    assert!(observer.removed_paths().is_empty());
    assert!(observer.added_paths().contains(&p("/stage/A/Cube")));

    assert!(viewport.chain.update_display_style(DisplayStyle::BOUNDING_BOX).unwrap());
    let kinds = viewport.chain.stage_kinds();
    assert!(kinds.contains(&StageKind::BoundingBox));
    assert!(!kinds.contains(&StageKind::ReprSelector));
    assert_eq!(terminal.get_prim(&p("/stage/A/Cube")).prim_type, tokens::BASIS_CURVES);
}

#[test]
fn test_texture_toggle_only_dirties() {
    let viewport = Viewport::new(cube_scene());
    let terminal = viewport.chain.terminal_scene();
    let observer = RecordingObserver::attach(terminal.as_ref());

    let rebuilt = viewport.chain.update_display_style(DisplayStyle::SHADED).unwrap();
    assert!(!rebuilt);
    assert!(observer.added_paths().is_empty());
    assert!(observer.removed_paths().is_empty());
    let dirtied = observer.dirtied.lock().clone();
    assert!(!dirtied.is_empty());
    assert!(dirtied.iter().all(|e| e.dirty_locators.intersects(&schema::material_locator())));

    observer.clear();
    assert!(!viewport.chain.update_display_style(DisplayStyle::SHADED | DisplayStyle::TEXTURED).unwrap());
    assert!(observer.added_paths().is_empty());
    assert!(observer.removed_paths().is_empty());
}

#[test]
fn test_selection_through_chain() {
    let viewport = Viewport::new(two_cubes());
    let terminal = viewport.chain.terminal_scene();
    let _observer = RecordingObserver::attach(terminal.as_ref());

    viewport.select(&["/A/Cube"]);
    assert_eq!(viewport.chain.fully_selected_paths(), vec![p("/stage/A/Cube")]);
    assert!(terminal.get_prim(&mirror_path(&p("/stage/A/Cube"))).is_defined());
    assert!(!terminal.get_prim(&mirror_path(&p("/stage/B/Cube"))).is_defined());
    assert_eq!(viewport.chain.lead_tracker().lead_app_path(), viewport.app_path("/A/Cube"));

    // The selection and its highlight survive a rebuild.
    viewport.chain.update_display_style(DisplayStyle::SHADED | DisplayStyle::WIREFRAME).unwrap();
    let terminal = viewport.chain.terminal_scene();
    assert!(terminal.get_prim(&mirror_path(&p("/stage/A/Cube"))).is_defined());
}

#[test]
fn test_excluded_root_opts_out_of_highlight() {
    let viewport = Viewport::new(two_cubes());
    viewport.chain.add_excluded_scene_root(p("/stage/B")).unwrap();
    viewport.select(&["/A/Cube", "/B/Cube"]);
    let terminal = viewport.chain.terminal_scene();
    assert!(terminal.get_prim(&mirror_path(&p("/stage/A/Cube"))).is_defined());
    assert!(!terminal.get_prim(&mirror_path(&p("/stage/B/Cube"))).is_defined());
}

#[test]
fn test_isolate_select_hides_others() {
    let viewport = Viewport::new(two_cubes());
    let terminal = viewport.chain.terminal_scene();
    let observer = RecordingObserver::attach(terminal.as_ref());

    viewport.chain.set_isolate_selection(Some(vec![p("/stage/A/Cube")]));
    let visible = |path: &str| {
        terminal
            .get_prim(&p(path))
            .data_source
            .and_then(|ds| value_at(&ds, &schema::visibility_locator()))
            .and_then(|v| v.as_bool())
            .unwrap_or(true)
    };
    assert!(visible("/stage/A/Cube"));
    assert!(visible("/stage/A"));
    assert!(!visible("/stage/B/Cube"));
    assert!(observer.dirtied_paths().contains(&p("/stage/B/Cube")));

    viewport.chain.clear_isolate_selection();
    assert!(visible("/stage/B/Cube"));
}

#[test]
fn test_clients_append_after_highlight() {
    let viewport = Viewport::new(cube_scene());
    let client = FnFilteringClient::new("extra", |input: SceneIndexHandle| -> SceneIndexHandle {
        DisplayStyleOverrideSceneIndex::new(input, Vec::new())
    });
    viewport.chain.add_client(Arc::new(client)).unwrap();
    let kinds = viewport.chain.stage_kinds();
    assert_eq!(&kinds[..3], &[StageKind::Terminal, StageKind::DisplayStyleOverride, StageKind::WireframeHighlight]);

    assert!(viewport.chain.set_client_enabled("extra", false).unwrap());
    assert_eq!(viewport.chain.stage_kinds()[1], StageKind::WireframeHighlight);
    assert!(viewport.chain.remove_client("extra").unwrap());
    assert!(!viewport.chain.remove_client("extra").unwrap());
}

#[test]
fn test_merging_add_remove_symmetry() {
    let merging = MergingSceneIndex::new();
    let observer = RecordingObserver::attach(merging.as_ref());
    let scene: SceneIndexHandle = cube_scene();
    let root = p("/A");

    merging.add_input_scene(scene.clone(), root.clone());
    assert!(merging.get_prim(&p("/A/Cube")).data_source.is_some());
    assert!(observer.added_paths().contains(&p("/A/Cube")));

    assert!(merging.remove_input_scene(&scene));
    assert!(merging.get_child_prim_paths(&root).is_empty());
    assert!(merging.get_prim(&p("/A/Cube")).data_source.is_none());
    assert_eq!(observer.removed_paths(), vec![root]);

    // Unknown inputs are refused.
    assert!(!merging.remove_input_scene(&scene));
}
