//! Path mappers: application path → scene index prim selections.
//!
//! The [`PathMapperRegistry`] holds mappers keyed by application path
//! prefix. Registered prefixes never nest: registering an ancestor or a
//! descendant of an existing prefix is refused, siblings are fine. Paths
//! with no registered prefix go to the optional fallback mapper.

use std::sync::Arc;

use parking_lot::RwLock;

use super::app_path::{AppPath, RunTimeId};
use super::trie::AppPathTrie;
use super::types::{PathInterface, PrimSelection, PrimSelections};
use crate::util::{is_valid_identifier, ScenePath, Token};

/// Selections for `components` relative to `prefix`.
///
/// A trailing numeric component is a point instance index and selects
/// that instance of the instancer path it follows.
pub(crate) fn map_components(prefix: &ScenePath, components: &[Token]) -> PrimSelections {
    let (instance, names) = match components.split_last() {
        Some((last, rest)) if !is_valid_identifier(last) => match last.parse::<i32>() {
            Ok(index) if index >= 0 => (Some(index), rest),
            _ => return PrimSelections::new(),
        },
        _ => (None, components),
    };
    if names.iter().any(|c| !is_valid_identifier(c)) {
        return PrimSelections::new();
    }
    let path = prefix.append_components(names);
    match instance {
        Some(index) => vec![PrimSelection::instances(path, vec![index])],
        None => vec![PrimSelection::new(path)],
    }
}

// ============================================================================
// Mappers
// ============================================================================

/// Maps application paths under `app_prefix` to scene index paths under
/// `scene_index_prefix`, appending the components past the prefix.
pub struct PrefixPathMapper {
    rtid: RunTimeId,
    app_prefix: AppPath,
    scene_index_prefix: ScenePath,
}

impl PrefixPathMapper {
    pub fn new(rtid: RunTimeId, app_prefix: AppPath, scene_index_prefix: ScenePath) -> Self {
        Self { rtid, app_prefix, scene_index_prefix }
    }
}

impl PathInterface for PrefixPathMapper {
    fn app_path_to_prim_selections(&self, app_path: &AppPath) -> PrimSelections {
        if app_path.run_time_id() != self.rtid || !app_path.starts_with(&self.app_prefix) {
            return PrimSelections::new();
        }
        let skip = self.app_prefix.keyed_components().count();
        let rest: Vec<Token> = app_path.keyed_components().skip(skip).map(|(_, c)| c.clone()).collect();
        map_components(&self.scene_index_prefix, &rest)
    }
}

/// Path interface of one registered producer node.
///
/// Accepts two-segment USD paths whose first segment ends with the node's
/// name and maps the second segment under the producer's prefix.
pub struct NodeNamePathMapper {
    node_name: String,
    scene_index_prefix: ScenePath,
}

impl NodeNamePathMapper {
    pub fn new(node_name: impl Into<String>, scene_index_prefix: ScenePath) -> Self {
        Self { node_name: node_name.into(), scene_index_prefix }
    }
}

impl PathInterface for NodeNamePathMapper {
    fn app_path_to_prim_selections(&self, app_path: &AppPath) -> PrimSelections {
        if app_path.run_time_id() != RunTimeId::USD || app_path.nb_segments() != 2 {
            return PrimSelections::new();
        }
        let segments = app_path.segments();
        if segments[0].components().last().map(Token::as_str) != Some(self.node_name.as_str()) {
            return PrimSelections::new();
        }
        map_components(&self.scene_index_prefix, segments[1].components())
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Prefix-keyed mapper registry with a fallback mapper.
#[derive(Default)]
pub struct PathMapperRegistry {
    mappers: RwLock<AppPathTrie<Arc<dyn PathInterface>>>,
    fallback: RwLock<Option<Arc<dyn PathInterface>>>,
}

impl PathMapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `mapper` for `prefix`.
    ///
    /// Returns false for an empty prefix or one nested with an existing
    /// registration.
    pub fn register(&self, prefix: &AppPath, mapper: Arc<dyn PathInterface>) -> bool {
        if prefix.is_empty() {
            return false;
        }
        let mut mappers = self.mappers.write();
        if mappers.contains_descendant_inclusive(prefix) || mappers.contains_ancestor(prefix) {
            tracing::debug!(target: "fvp::selection", %prefix, "path mapper prefix conflicts with an existing registration");
            return false;
        }
        mappers.insert(prefix, mapper);
        true
    }

    /// Unregister the mapper for `prefix`. Returns false if none was registered.
    pub fn unregister(&self, prefix: &AppPath) -> bool {
        if prefix.is_empty() {
            return false;
        }
        self.mappers.write().remove(prefix).is_some()
    }

    pub fn set_fallback_mapper(&self, mapper: Option<Arc<dyn PathInterface>>) {
        *self.fallback.write() = mapper;
    }

    pub fn fallback_mapper(&self) -> Option<Arc<dyn PathInterface>> {
        self.fallback.read().clone()
    }

    /// Mapper registered for `path` or one of its ancestors, else the
    /// fallback mapper.
    pub fn get_mapper(&self, path: &AppPath) -> Option<Arc<dyn PathInterface>> {
        if path.is_empty() {
            return None;
        }
        if let Some(m) = self.mappers.read().find_ancestor_inclusive(path) {
            return Some(m.clone());
        }
        self.fallback_mapper()
    }
}

impl PathInterface for PathMapperRegistry {
    fn app_path_to_prim_selections(&self, app_path: &AppPath) -> PrimSelections {
        match self.get_mapper(app_path) {
            Some(mapper) => mapper.app_path_to_prim_selections(app_path),
            None => {
                tracing::warn!(target: "fvp::selection", %app_path, "no path mapper for application path");
                PrimSelections::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::app_path::PathSegment;

    fn dag(s: &str) -> AppPath {
        AppPath::new([PathSegment::parse(RunTimeId::DCC, '|', s)])
    }

    fn p(s: &str) -> ScenePath {
        s.parse().unwrap()
    }

    fn mapper(prefix: &str) -> Arc<dyn PathInterface> {
        Arc::new(PrefixPathMapper::new(RunTimeId::DCC, dag(prefix), p("/native")))
    }

    #[test]
    fn test_register_rejects_nesting() {
        let r = PathMapperRegistry::new();
        assert!(r.register(&dag("|world|a"), mapper("|world|a")));
        assert!(!r.register(&dag("|world|a"), mapper("|world|a")));
        assert!(!r.register(&dag("|world"), mapper("|world")));
        assert!(!r.register(&dag("|world|a|b"), mapper("|world|a|b")));
        assert!(r.register(&dag("|world|b"), mapper("|world|b")));
        assert!(!r.register(&AppPath::empty(), mapper("|x")));
        assert!(r.unregister(&dag("|world|a")));
        assert!(!r.unregister(&dag("|world|a")));
        assert!(!r.register(&dag("|world"), mapper("|world")));
    }

    #[test]
    fn test_get_mapper_and_fallback() {
        let r = PathMapperRegistry::new();
        r.register(&dag("|world|a"), mapper("|world|a"));
        assert!(r.get_mapper(&dag("|world|a|shape")).is_some());
        assert!(r.get_mapper(&dag("|world|z")).is_none());
        r.set_fallback_mapper(Some(mapper("|world")));
        assert!(r.get_mapper(&dag("|world|z")).is_some());
    }

    #[test]
    fn test_prefix_mapper_maps_rest() {
        let m = PrefixPathMapper::new(RunTimeId::DCC, dag("|world|a"), p("/native/a"));
        let sel = m.app_path_to_prim_selections(&dag("|world|a|shape"));
        assert_eq!(sel, vec![PrimSelection::new(p("/native/a/shape"))]);
        assert!(m.app_path_to_prim_selections(&dag("|world|b")).is_empty());
    }

    #[test]
    fn test_node_name_mapper_instances() {
        let m = NodeNamePathMapper::new("stageShape", p("/stageShape"));
        let app = dag("|world|stage|stageShape").append_segment(PathSegment::parse(RunTimeId::USD, '/', "/Inst/3"));
        let sel = m.app_path_to_prim_selections(&app);
        assert_eq!(sel, vec![PrimSelection::instances(p("/stageShape/Inst"), vec![3])]);
        assert_eq!(m.scene_index_path(&app).unwrap(), p("/stageShape/Inst"));
    }
}
