//! Pick handler for USD stage producers.
//!
//! A hit is first resolved to a `(data-model path, instance index)` pair:
//!
//! - no instancer: the prim's origin path,
//! - native (implicit) instancing: the instance's origin path, or the
//!   instance path composed with the prototype origin in `Prototypes` mode,
//! - point (explicit) instancing: the top-level instancer, the instance
//!   under the cursor, or the prototype, following the point instances
//!   pick mode.
//!
//! With geometry subset picking on, face sets of the hit mesh containing
//! the hit face are selected instead. Point instances become a trailing
//! numeric component of the application path. Other paths may be moved up
//! to the nearest ancestor of the configured selection kind.

use crate::config::{GeomSubsetsPickMode, PointInstancesPickMode};
use crate::core::schema::{self, tokens};
use crate::core::{get_at, prim_value};
use crate::util::ScenePath;

use super::handler::{PickHandler, PickInput, PickOutput};
use super::hit::{is_face_subset, PrimOriginInfo};
use super::kind::KindRegistry;

#[derive(Clone, Debug, Default)]
pub struct UsdPickHandler {
    kinds: KindRegistry,
}

impl UsdPickHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kinds(kinds: KindRegistry) -> Self {
        Self { kinds }
    }

    /// Face sets under the hit mesh containing the hit face.
    fn geom_subset_hits(input: &PickInput<'_>) -> Vec<(ScenePath, i32)> {
        let element = input.hit.element_index;
        if element < 0 {
            return Vec::new();
        }
        input
            .scene
            .get_child_prim_paths(&input.hit.object_id)
            .into_iter()
            .filter(|child| is_face_subset(input.scene, child))
            .filter_map(|child| {
                let ds = input.scene.get_prim(&child).data_source?;
                let indices = get_at(&ds, &schema::geom_subset_indices_locator())?.sampled_value()?;
                if !indices.as_int_array()?.contains(&element) {
                    return None;
                }
                schema::prim_origin_path(&ds).filter(|p| !p.is_empty())
            })
            .map(|p| (p, -1))
            .collect()
    }

    /// Nearest ancestor (inclusive) of `path` whose kind is `kind`, else
    /// `path` itself.
    fn kind_ancestor(&self, input: &PickInput<'_>, path: &ScenePath, kind: &str) -> ScenePath {
        let prefix = input.registration.prefix();
        for candidate in path.prefixes().into_iter().rev() {
            let prim = input.scene.get_prim(&prefix.append_path(&candidate));
            let authored = prim_value(prim.data_source.as_ref(), &schema::model_kind_locator());
            if let Some(authored) = authored.as_ref().and_then(|v| v.as_token()) {
                if self.kinds.is_a(authored, kind) {
                    return candidate;
                }
            }
        }
        path.clone()
    }
}

/// Resolve the instancing of a hit to a data-model path and instance index.
pub(crate) fn resolve_instancing(info: &PrimOriginInfo, mode: PointInstancesPickMode) -> Option<(ScenePath, i32)> {
    let resolved = match info.instancer_contexts.first() {
        None => (info.full_path(), -1),
        Some(top) if top.is_implicit() => match mode {
            PointInstancesPickMode::Prototypes => (info.full_path(), -1),
            _ => (top.instance_origin.clone()?, -1),
        },
        Some(top) => match mode {
            PointInstancesPickMode::PointInstancer => (top.instancer_origin.clone()?, -1),
            PointInstancesPickMode::Instances => (top.instancer_origin.clone()?, top.instance_id),
            PointInstancesPickMode::Prototypes => (info.full_path(), -1),
        },
    };
    (!resolved.0.is_empty()).then_some(resolved)
}

impl PickHandler for UsdPickHandler {
    fn handle_pick_hit(&self, input: &PickInput<'_>, output: &mut PickOutput) -> bool {
        let hit = input.hit;
        let prim = input.scene.get_prim(&hit.object_id);
        if !prim.is_defined() {
            tracing::debug!(target: "fvp::pick", path = %hit.object_id, "hit prim not in scene");
            return false;
        }

        let subsets_mode = input.options.geom_subsets_pick_mode == GeomSubsetsPickMode::Faces
            && prim.prim_type == tokens::MESH;
        let mut resolved = if subsets_mode { Self::geom_subset_hits(input) } else { Vec::new() };
        // A face outside every subset only selects the mesh on a sole hit.
        if resolved.is_empty() && (!subsets_mode || input.is_sole_hit) {
            let info = PrimOriginInfo::from_pick_hit(input.scene, hit);
            resolved.extend(resolve_instancing(&info, input.options.point_instances_pick_mode));
        }

        let kind = input.options.selection_kind.as_str();
        let mut any = false;
        for (path, instance) in resolved {
            let path = if instance < 0 && !kind.is_empty() { self.kind_ancestor(input, &path, kind) } else { path };
            let mut app_path = input.registration.interpret_rprim_path(&path);
            if app_path.is_empty() {
                tracing::warn!(target: "fvp::pick", %path, "no application path for picked prim");
                continue;
            }
            if instance >= 0 {
                app_path = app_path.append_component(instance.to_string());
            }
            tracing::debug!(target: "fvp::pick", %app_path, "picked");
            output.selection.append(app_path);
            any = true;
        }
        any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pick::InstancerContext;

    fn p(s: &str) -> ScenePath {
        s.parse().unwrap()
    }

    fn point_instanced() -> PrimOriginInfo {
        PrimOriginInfo {
            instancer_contexts: vec![InstancerContext {
                instancer_path: p("/Stage/Instancer"),
                instance_id: 3,
                instancer_origin: Some(p("/Instancer")),
                instance_origin: None,
            }],
            prim_origin: Some(p("/Instancer/Protos/Ball")),
        }
    }

    #[test]
    fn test_no_instancer() {
        let info = PrimOriginInfo { instancer_contexts: Vec::new(), prim_origin: Some(p("/A/Cube")) };
        assert_eq!(resolve_instancing(&info, PointInstancesPickMode::Instances), Some((p("/A/Cube"), -1)));
        assert_eq!(resolve_instancing(&PrimOriginInfo::default(), PointInstancesPickMode::Instances), None);
    }

    #[test]
    fn test_point_instance_modes() {
        let info = point_instanced();
        assert_eq!(resolve_instancing(&info, PointInstancesPickMode::PointInstancer), Some((p("/Instancer"), -1)));
        assert_eq!(resolve_instancing(&info, PointInstancesPickMode::Instances), Some((p("/Instancer"), 3)));
        assert_eq!(
            resolve_instancing(&info, PointInstancesPickMode::Prototypes),
            Some((p("/Instancer/Protos/Ball"), -1))
        );
    }

    #[test]
    fn test_native_instance_modes() {
        let info = PrimOriginInfo {
            instancer_contexts: vec![InstancerContext {
                instancer_path: p("/Stage/Instancer"),
                instance_id: 0,
                instancer_origin: None,
                instance_origin: Some(p("/Set/A")),
            }],
            prim_origin: Some(p("/Geom")),
        };
        assert_eq!(resolve_instancing(&info, PointInstancesPickMode::Instances), Some((p("/Set/A"), -1)));
        assert_eq!(resolve_instancing(&info, PointInstancesPickMode::Prototypes), Some((p("/Set/A/Geom"), -1)));
    }
}
