//! Selection value types and the path interface contract.

use crate::util::{Error, Result, ScenePath};

use super::app_path::AppPath;

/// Selected instances of one instancer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstancesSelection {
    pub instancer_path: ScenePath,
    /// Prototype the instances draw, -1 for all prototypes.
    pub prototype_index: i32,
    pub instance_indices: Vec<i32>,
}

/// One scene index path selection, optionally restricted to instances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimSelection {
    pub prim_path: ScenePath,
    pub nested_instance_indices: Vec<InstancesSelection>,
}

impl PrimSelection {
    /// Whole-prim selection.
    pub fn new(prim_path: ScenePath) -> Self {
        Self { prim_path, nested_instance_indices: Vec::new() }
    }

    /// Selection of `instance_indices` of the instancer at `prim_path`.
    pub fn instances(prim_path: ScenePath, instance_indices: Vec<i32>) -> Self {
        Self {
            nested_instance_indices: vec![InstancesSelection {
                instancer_path: prim_path.clone(),
                prototype_index: -1,
                instance_indices,
            }],
            prim_path,
        }
    }
}

pub type PrimSelections = Vec<PrimSelection>;

/// Translates application paths into scene index prim selections.
///
/// One application path may fan out into several selections (prototype
/// propagation), or none when the path belongs to another producer.
pub trait PathInterface: Send + Sync {
    fn app_path_to_prim_selections(&self, app_path: &AppPath) -> PrimSelections;

    /// Scene index paths of the selections, instance restrictions dropped.
    fn scene_index_paths(&self, app_path: &AppPath) -> Vec<ScenePath> {
        self.app_path_to_prim_selections(app_path).into_iter().map(|s| s.prim_path).collect()
    }

    /// The single scene index path for `app_path`, or the empty path.
    ///
    /// Fails if the path fans out.
    fn scene_index_path(&self, app_path: &AppPath) -> Result<ScenePath> {
        let mut paths = self.scene_index_paths(app_path);
        match paths.len() {
            0 => Ok(ScenePath::empty()),
            1 => Ok(paths.swap_remove(0)),
            count => Err(Error::PrimPathsCountOutOfRange { app_path: app_path.to_string(), count }),
        }
    }
}
