//! Pick hits, pick parameters and prim origin information.

use crate::config::{GeomSubsetsPickMode, ViewportOptions};
use crate::core::schema::{self, tokens};
use crate::core::{get_at, SceneIndex};
use crate::util::{DVec3, ScenePath};

/// One hit of a render pick.
#[derive(Clone, Debug, PartialEq)]
pub struct PickHit {
    /// Scene index path of the hit prim.
    pub object_id: ScenePath,
    /// Innermost instancer drawing the prim, if instanced.
    pub instancer_id: Option<ScenePath>,
    /// Instance of `instancer_id` hit, -1 when not instanced.
    pub instance_index: i32,
    /// Face (or other element) hit, -1 when unknown.
    pub element_index: i32,
    pub normalized_depth: f32,
    pub world_hit_point: DVec3,
}

impl PickHit {
    /// Hit on a non-instanced prim.
    pub fn prim(object_id: ScenePath) -> Self {
        Self {
            object_id,
            instancer_id: None,
            instance_index: -1,
            element_index: -1,
            normalized_depth: 0.0,
            world_hit_point: DVec3::ZERO,
        }
    }

    /// Hit on instance `instance_index` of `instancer_id`.
    pub fn instance(object_id: ScenePath, instancer_id: ScenePath, instance_index: i32) -> Self {
        Self { instancer_id: Some(instancer_id), instance_index, ..Self::prim(object_id) }
    }

    pub fn with_element(mut self, element_index: i32) -> Self {
        self.element_index = element_index;
        self
    }

    pub fn with_world_hit_point(mut self, point: DVec3) -> Self {
        self.world_hit_point = point;
        self
    }
}

/// How the pick task reduces candidate hits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveMode {
    /// One hit, the nearest to the pick region center. Used for clicks.
    NearestToCenter,
    /// Every distinct prim in the region. Used for marquee picks.
    Unique,
}

/// What the pick task reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickTarget {
    PrimsAndInstances,
    /// Also reports the face hit, for geometry subset picking.
    PrimsAndFaces,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PickParams {
    pub resolve_mode: ResolveMode,
    pub pick_target: PickTarget,
}

impl PickParams {
    /// Parameters for a click (`single`) or marquee pick.
    pub fn new(single: bool, options: &ViewportOptions) -> Self {
        Self {
            resolve_mode: if single { ResolveMode::NearestToCenter } else { ResolveMode::Unique },
            pick_target: match options.geom_subsets_pick_mode {
                GeomSubsetsPickMode::Faces => PickTarget::PrimsAndFaces,
                GeomSubsetsPickMode::None => PickTarget::PrimsAndInstances,
            },
        }
    }
}

/// One level of instancing above a hit prim.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstancerContext {
    pub instancer_path: ScenePath,
    /// Instance drawn at this level, -1 when unknown.
    pub instance_id: i32,
    /// Data-model path of the instancer. Set for explicit (point)
    /// instancing.
    pub instancer_origin: Option<ScenePath>,
    /// Data-model path of the instance. Set for implicit (native)
    /// instancing.
    pub instance_origin: Option<ScenePath>,
}

impl InstancerContext {
    #[inline]
    pub fn is_implicit(&self) -> bool {
        self.instance_origin.is_some()
    }
}

/// Where a hit prim came from in the data model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrimOriginInfo {
    /// Outermost instancer first.
    pub instancer_contexts: Vec<InstancerContext>,
    /// Data-model path of the hit prim itself.
    pub prim_origin: Option<ScenePath>,
}

// Nested instancing deeper than this is not followed.
const MAX_INSTANCER_DEPTH: usize = 16;

impl PrimOriginInfo {
    pub fn from_pick_hit(scene: &dyn SceneIndex, hit: &PickHit) -> Self {
        let prim = scene.get_prim(&hit.object_id);
        let prim_origin = prim.data_source.as_ref().and_then(schema::prim_origin_path);

        let mut contexts = Vec::new();
        let mut instancer = hit.instancer_id.clone();
        let mut instance_id = hit.instance_index;
        while let Some(path) = instancer.take() {
            if contexts.len() >= MAX_INSTANCER_DEPTH {
                tracing::warn!(target: "fvp::pick", %path, "instancer nesting too deep");
                break;
            }
            let ds = scene.get_prim(&path).data_source;
            let instancer_origin = ds.as_ref().and_then(schema::prim_origin_path);
            let instance_origin = ds.as_ref().and_then(|ds| {
                let locations = get_at(ds, &schema::instance_locations_locator())?.sampled_value()?;
                let locations = locations.as_path_array()?;
                usize::try_from(instance_id).ok().and_then(|i| locations.get(i).cloned())
            });
            let (instancer_origin, instance_origin) = match instance_origin {
                Some(origin) => (None, Some(origin)),
                None => (instancer_origin, None),
            };
            contexts.push(InstancerContext { instancer_path: path, instance_id, instancer_origin, instance_origin });
            instancer = ds.as_ref().and_then(|ds| schema::instanced_by_paths(ds).into_iter().next());
            // The hit does not say which instance of an outer instancer drew it.
            instance_id = -1;
        }
        contexts.reverse();
        Self { instancer_contexts: contexts, prim_origin }
    }

    /// Data-model path of the hit, composed through native instances.
    ///
    /// Under native instancing the prim origin is relative to its
    /// prototype, so it is appended to the innermost instance path.
    pub fn full_path(&self) -> ScenePath {
        let origin = self.prim_origin.clone().unwrap_or_else(ScenePath::empty);
        let instance = self.instancer_contexts.iter().rev().find_map(|c| c.instance_origin.clone());
        match instance {
            Some(instance) if !origin.is_empty() => instance.append_components(origin.components()),
            Some(instance) => instance,
            None => origin,
        }
    }
}

/// True if the prim is a face set subset.
pub(crate) fn is_face_subset(scene: &dyn SceneIndex, path: &ScenePath) -> bool {
    let prim = scene.get_prim(path);
    prim.prim_type == tokens::GEOM_SUBSET
        && prim
            .data_source
            .as_ref()
            .and_then(|ds| get_at(ds, &schema::geom_subset_type_locator()))
            .and_then(|d| d.sampled_value())
            .and_then(|v| v.as_token().map(|t| *t == tokens::TYPE_FACE_SET))
            .unwrap_or(false)
}
