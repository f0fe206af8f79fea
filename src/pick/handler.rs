//! Pick handler interface.

use crate::config::ViewportOptions;
use crate::core::SceneIndex;
use crate::registration::Registration;
use crate::selection::{AppPath, AppSelection};
use crate::util::DVec3;

use super::hit::PickHit;

/// Everything a handler needs to resolve one hit.
pub struct PickInput<'a> {
    pub hit: &'a PickHit,
    /// True if this is the only hit of the pick.
    pub is_sole_hit: bool,
    /// Scene the hit was rendered from.
    pub scene: &'a dyn SceneIndex,
    /// Producer owning the hit prim.
    pub registration: &'a Registration,
    pub options: &'a ViewportOptions,
}

/// A DCC-native object picked, with the world-space point hit.
#[derive(Clone, Debug, PartialEq)]
pub struct NativePick {
    pub path: AppPath,
    pub world_hit_point: DVec3,
}

/// Accumulated result of a pick.
#[derive(Clone, Debug, Default)]
pub struct PickOutput {
    /// Application selection built from data-model picks.
    pub selection: AppSelection,
    /// DCC-native picks, kept apart so the host can add them to its own
    /// selection list with their hit points.
    pub native: Vec<NativePick>,
}

impl PickOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty() && self.native.is_empty()
    }
}

/// Resolves hits on one producer's prims into application paths.
pub trait PickHandler: Send + Sync {
    /// Add the items `input.hit` resolves to. Returns false if nothing
    /// could be resolved.
    fn handle_pick_hit(&self, input: &PickInput<'_>, output: &mut PickOutput) -> bool;
}
