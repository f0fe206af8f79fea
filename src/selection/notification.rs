//! Selection-changed notifications from the host.
//!
//! The host reports each selection edit as one operation, or as a
//! composite of several applied in order. By the time a notification is
//! dispatched the host's global selection is already settled, so
//! `ReplaceWith` rebuilds from that global selection rather than carrying
//! the items itself.

use super::app_path::{AppPath, AppSelection};
use crate::scene_index::SelectionSceneIndex;

/// One selection edit.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectionOp {
    Append(AppPath),
    Remove(AppPath),
    /// Insertion at a position. Ordering carries no meaning for the
    /// viewport, so this is not supported.
    Insert(AppPath),
    Clear,
    /// Replace everything with the current global selection.
    ReplaceWith,
}

impl SelectionOp {
    fn apply(&self, global: &AppSelection, stage: &SelectionSceneIndex) {
        match self {
            SelectionOp::Append(path) => stage.add_selection(path),
            SelectionOp::Remove(path) => stage.remove_selection(path),
            SelectionOp::Insert(path) => {
                tracing::warn!(target: "fvp::selection", %path, "selection insert is not supported, ignored");
            }
            SelectionOp::Clear => stage.clear_selection(),
            SelectionOp::ReplaceWith => stage.replace_selection(global),
        }
    }
}

/// A selection-changed notification.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectionChanged {
    Single(SelectionOp),
    Composite(Vec<SelectionOp>),
}

impl SelectionChanged {
    /// Operations in application order.
    pub fn ops(&self) -> &[SelectionOp] {
        match self {
            SelectionChanged::Single(op) => std::slice::from_ref(op),
            SelectionChanged::Composite(ops) => ops,
        }
    }

    /// Apply every operation to the selection stage.
    pub fn apply(&self, global: &AppSelection, stage: &SelectionSceneIndex) {
        tracing::trace!(target: "fvp::selection", ops = self.ops().len(), "selection changed notification");
        for op in self.ops() {
            op.apply(global, stage);
        }
    }
}

impl From<SelectionOp> for SelectionChanged {
    fn from(op: SelectionOp) -> Self {
        SelectionChanged::Single(op)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::schema::tokens;
    use crate::core::{RetainedPrim, RetainedSceneIndex};
    use crate::scene_index::PathInterfaceSceneIndex;
    use crate::selection::{new_selection, PathSegment, PrefixPathMapper, RunTimeId};
    use crate::util::ScenePath;

    fn usd(s: &str) -> AppPath {
        AppPath::new([PathSegment::parse(RunTimeId::USD, '/', s)])
    }

    fn p(s: &str) -> ScenePath {
        s.parse().unwrap()
    }

    fn stage() -> Arc<SelectionSceneIndex> {
        let producer = RetainedSceneIndex::new("producer");
        producer.add_prims(vec![
            RetainedPrim::new(p("/A"), "", None),
            RetainedPrim::new(p("/A/Cube"), tokens::MESH, None),
            RetainedPrim::new(p("/A/Sphere"), tokens::MESH, None),
        ]);
        let mapper = Arc::new(PrefixPathMapper::new(RunTimeId::USD, AppPath::empty(), ScenePath::absolute_root()));
        let with_paths = PathInterfaceSceneIndex::new(producer, mapper);
        SelectionSceneIndex::new(with_paths, new_selection()).unwrap()
    }

    #[test]
    fn test_composite_ops_in_order() {
        let si = stage();
        let global = AppSelection::new();
        SelectionChanged::Composite(vec![
            SelectionOp::Append(usd("/A/Cube")),
            SelectionOp::Append(usd("/A/Sphere")),
            SelectionOp::Remove(usd("/A/Cube")),
        ])
        .apply(&global, &si);
        assert_eq!(si.fully_selected_paths(), vec![p("/A/Sphere")]);
    }

    #[test]
    fn test_insert_is_ignored() {
        let si = stage();
        SelectionChanged::from(SelectionOp::Insert(usd("/A/Cube"))).apply(&AppSelection::new(), &si);
        assert!(si.fully_selected_paths().is_empty());
    }

    #[test]
    fn test_replace_with_global() {
        let si = stage();
        SelectionChanged::from(SelectionOp::Append(usd("/A/Cube"))).apply(&AppSelection::new(), &si);
        let global: AppSelection = [usd("/A/Sphere")].into_iter().collect();
        SelectionChanged::from(SelectionOp::ReplaceWith).apply(&global, &si);
        assert_eq!(si.fully_selected_paths(), vec![p("/A/Sphere")]);
        SelectionChanged::from(SelectionOp::Clear).apply(&global, &si);
        assert!(si.fully_selected_paths().is_empty());
    }
}
