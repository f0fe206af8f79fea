//! Batch pick resolution.

use std::sync::Arc;

use crate::config::SharedOptions;
use crate::core::SceneIndex;
use crate::registration::SceneIndexRegistry;
use crate::scene_index::mirror_original;

use super::handler::{PickInput, PickOutput};
use super::hit::{PickHit, PickParams};

/// Outcome of resolving a batch of hits.
#[derive(Clone, Debug, Default)]
pub struct PickResult {
    pub output: PickOutput,
    /// Hits that resolved to at least one item.
    pub resolved: usize,
    /// Hits skipped: no producer, no handler, or nothing resolved.
    pub skipped: usize,
}

impl PickResult {
    /// A pick succeeds if at least one hit resolved.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.resolved > 0
    }
}

/// Routes pick hits to the handler of the producer owning each hit prim.
pub struct PickResolver {
    registry: Arc<SceneIndexRegistry>,
    options: SharedOptions,
}

impl PickResolver {
    pub fn new(registry: Arc<SceneIndexRegistry>, options: SharedOptions) -> Self {
        Self { registry, options }
    }

    /// Parameters the pick task should use.
    pub fn pick_params(&self, single: bool) -> PickParams {
        PickParams::new(single, &self.options.read())
    }

    /// Resolve `hits` rendered from `scene`.
    ///
    /// Failures are per hit; the batch goes on with the remaining hits.
    pub fn resolve(&self, scene: &dyn SceneIndex, hits: &[PickHit]) -> PickResult {
        let options = self.options.read().clone();
        let handlers = self.registry.pick_handlers();
        let is_sole_hit = hits.len() == 1;
        let mut result = PickResult::default();

        for hit in hits {
            // Highlight mirrors pick as the prim they mirror.
            let mirrored;
            let hit = match mirror_original(&hit.object_id) {
                Some(original) => {
                    mirrored = PickHit { object_id: original, ..hit.clone() };
                    &mirrored
                }
                None => hit,
            };

            let Some(registration) = self.registry.registration_for_rprim(&hit.object_id) else {
                tracing::debug!(target: "fvp::pick", path = %hit.object_id, "no registration for hit");
                result.skipped += 1;
                continue;
            };
            let Some(handler) = handlers.get_handler(&hit.object_id) else {
                tracing::debug!(target: "fvp::pick", path = %hit.object_id, "no pick handler for hit");
                result.skipped += 1;
                continue;
            };
            let input = PickInput { hit, is_sole_hit, scene, registration: &registration, options: &options };
            if handler.handle_pick_hit(&input, &mut result.output) {
                result.resolved += 1;
            } else {
                result.skipped += 1;
            }
        }
        tracing::debug!(target: "fvp::pick", resolved = result.resolved, skipped = result.skipped, "pick resolved");
        result
    }
}
