//! Selection and wireframe highlight tests.

mod common;

use common::{cube_scene, instancer_scene, p, selection_over, usd, RecordingObserver};

use flow_viewport::core::schema::{self, tokens};
use flow_viewport::core::{value_at, SceneIndex, SceneIndexHandle};
use flow_viewport::scene_index::{mirror_path, WireframeHighlightSceneIndex};
use flow_viewport::selection::{AppSelection, SelectionChanged, SelectionOp};

#[test]
fn test_select_cube_adds_one_mirror() {
    let scene = cube_scene();
    let (stage, selection) = selection_over(scene.clone());
    let highlight = WireframeHighlightSceneIndex::new(stage.clone(), selection, Vec::new());
    let observer = RecordingObserver::attach(highlight.as_ref());

    let cube = p("/A/Cube");
    let mirror = mirror_path(&cube);
    assert_eq!(mirror, p("/A/Cube_SelectionHighlight"));
    assert!(!stage.is_fully_selected(&cube));
    assert!(!highlight.get_prim(&mirror).is_defined());

    stage.add_selection(&usd("/A/Cube"));
    assert!(stage.is_fully_selected(&cube));

    let dirtied = observer.dirtied.lock().clone();
    assert_eq!(dirtied.len(), 1);
    assert_eq!(dirtied[0].prim_path, cube);
    assert!(dirtied[0].dirty_locators.contains(&schema::selections_locator()));
    assert_eq!(observer.added_paths(), vec![mirror.clone()]);
    assert!(observer.removed_paths().is_empty());

    let prim = highlight.get_prim(&mirror);
    assert_eq!(prim.prim_type, tokens::MESH);
    let repr = value_at(prim.data_source.as_ref().unwrap(), &schema::repr_selector_locator()).unwrap();
    let repr: Vec<String> = repr.as_token_array().unwrap().iter().map(|t| t.to_string()).collect();
    assert_eq!(repr, vec![tokens::REFINED_WIRE_ON_SURF.to_string(), String::new(), String::new()]);

    // The mirror is listed right after the original.
    assert_eq!(highlight.get_child_prim_paths(&p("/A")), vec![cube.clone(), mirror.clone()]);

    observer.clear();
    stage.remove_selection(&usd("/A/Cube"));
    assert_eq!(observer.removed_paths(), vec![mirror.clone()]);
    assert!(!highlight.get_prim(&mirror).is_defined());
}

#[test]
fn test_replace_is_idempotent() {
    let scene = cube_scene();
    let (stage, _selection) = selection_over(scene);
    let observer = RecordingObserver::attach(stage.as_ref());
    let snapshot: AppSelection = [usd("/A/Cube"), usd("/A")].into_iter().collect();

    stage.replace_selection(&snapshot);
    let once = stage.fully_selected_paths();
    assert_eq!(once, vec![p("/A"), p("/A/Cube")]);
    let dirty_count = observer.dirtied.lock().len();

    stage.replace_selection(&snapshot);
    assert_eq!(stage.fully_selected_paths(), once);
    // Nothing changed, nothing dirtied.
    assert_eq!(observer.dirtied.lock().len(), dirty_count);
}

#[test]
fn test_ancestor_closure_is_monotonic() {
    let scene = cube_scene();
    let (stage, _selection) = selection_over(scene);
    stage.add_selection(&usd("/A"));
    for path in ["/A", "/A/Cube", "/A/Cube/Deep/Down"] {
        assert!(stage.has_fully_selected_ancestor_inclusive(&p(path)), "{path}");
    }
    assert!(!stage.has_fully_selected_ancestor_inclusive(&p("/B")));
    assert!(!stage.is_fully_selected(&p("/A/Cube")));
}

#[test]
fn test_descendants_of_selected_group_are_highlighted() {
    let scene = cube_scene();
    let (stage, selection) = selection_over(scene);
    let highlight = WireframeHighlightSceneIndex::new(stage.clone(), selection, Vec::new());
    let _observer = RecordingObserver::attach(highlight.as_ref());

    stage.add_selection(&usd("/A"));
    // `/A` is an xform: only its mesh gets a mirror.
    assert_eq!(highlight.highlighted_paths(), vec![p("/A/Cube")]);
    assert!(!highlight.get_prim(&mirror_path(&p("/A"))).is_defined());
}

#[test]
fn test_excluded_roots_are_not_highlighted() {
    let scene = cube_scene();
    let (stage, selection) = selection_over(scene);
    let highlight = WireframeHighlightSceneIndex::new(stage.clone(), selection, vec![p("/A")]);
    let observer = RecordingObserver::attach(highlight.as_ref());

    stage.add_selection(&usd("/A/Cube"));
    assert!(highlight.highlighted_paths().is_empty());
    assert!(observer.added_paths().is_empty());
}

#[test]
fn test_instance_mask_exclusivity() {
    let scene = instancer_scene();
    let (stage, selection) = selection_over(scene);
    let highlight = WireframeHighlightSceneIndex::new(stage.clone(), selection, Vec::new());
    let _observer = RecordingObserver::attach(highlight.as_ref());

    stage.add_selection(&usd("/I").append_component("1"));
    stage.add_selection(&usd("/I").append_component("3"));

    let mirror = highlight.get_prim(&mirror_path(&p("/I")));
    let ds = mirror.data_source.expect("instancer mirror");
    let mask = value_at(&ds, &schema::instancer_mask_locator()).unwrap();
    let mask = mask.as_bool_array().unwrap();
    assert_eq!(mask.len(), 4);
    for (k, on) in mask.iter().enumerate() {
        assert_eq!(*on, k == 1 || k == 3, "instance {k}");
    }
    let repr = value_at(&ds, &schema::repr_selector_locator()).unwrap();
    assert_eq!(repr.as_token_array().unwrap()[0], tokens::REFINED_WIRE);

    // The prototype mirror is drawn by the instancer mirror.
    let proto = highlight.get_prim(&mirror_path(&p("/I/Proto"))).data_source.expect("prototype mirror");
    assert_eq!(schema::instanced_by_paths(&proto), vec![mirror_path(&p("/I"))]);
}

#[test]
fn test_notification_ops() {
    let scene = cube_scene();
    let (stage, _selection) = selection_over(scene);

    let mut global = AppSelection::new();
    global.append(usd("/A/Cube"));
    SelectionChanged::from(SelectionOp::Append(usd("/A/Cube"))).apply(&global, &stage);
    assert_eq!(stage.fully_selected_paths(), vec![p("/A/Cube")]);

    // Insert is not supported and leaves the selection alone.
    SelectionChanged::from(SelectionOp::Insert(usd("/A"))).apply(&global, &stage);
    assert_eq!(stage.fully_selected_paths(), vec![p("/A/Cube")]);

    global.append(usd("/A"));
    SelectionChanged::from(SelectionOp::ReplaceWith).apply(&global, &stage);
    assert_eq!(stage.fully_selected_paths(), vec![p("/A"), p("/A/Cube")]);

    SelectionChanged::Composite(vec![SelectionOp::Remove(usd("/A")), SelectionOp::Clear]).apply(&global, &stage);
    assert!(stage.fully_selected_paths().is_empty());
}

#[test]
fn test_removed_prims_leave_the_selection() {
    let scene = cube_scene();
    let input: SceneIndexHandle = scene.clone();
    let (stage, _selection) = selection_over(input);
    stage.add_selection(&usd("/A/Cube"));
    scene.remove_prims(&[p("/A")]);
    assert!(stage.fully_selected_paths().is_empty());
}
