//! Depth-first traversal of a scene index.

use super::traits::SceneIndex;
use crate::util::ScenePath;

/// Depth-first, pre-order iterator over the paths below (and including) a
/// root path.
pub struct PrimView<'a> {
    scene: &'a dyn SceneIndex,
    stack: Vec<ScenePath>,
}

impl<'a> PrimView<'a> {
    pub fn new(scene: &'a dyn SceneIndex, root: &ScenePath) -> Self {
        let stack = if root.is_empty() { Vec::new() } else { vec![root.clone()] };
        Self { scene, stack }
    }
}

impl Iterator for PrimView<'_> {
    type Item = ScenePath;

    fn next(&mut self) -> Option<ScenePath> {
        let path = self.stack.pop()?;
        let mut children = self.scene.get_child_prim_paths(&path);
        children.reverse();
        self.stack.extend(children);
        Some(path)
    }
}

/// Every prim path in the scene, root excluded.
pub fn all_prim_paths(scene: &dyn SceneIndex) -> Vec<ScenePath> {
    PrimView::new(scene, &ScenePath::absolute_root())
        .filter(|p| !p.is_absolute_root())
        .collect()
}
