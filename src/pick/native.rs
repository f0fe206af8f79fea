//! Pick handler for the DCC's own scene index.

use super::handler::{NativePick, PickHandler, PickInput, PickOutput};

/// Maps hits straight to DCC objects through the producer's rprim path
/// interpretation. Results go to [`PickOutput::native`] with the hit point.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativePickHandler;

impl PickHandler for NativePickHandler {
    fn handle_pick_hit(&self, input: &PickInput<'_>, output: &mut PickOutput) -> bool {
        let path = input.registration.interpret_rprim_path(&input.hit.object_id);
        if path.is_empty() {
            tracing::warn!(target: "fvp::pick", path = %input.hit.object_id, "no DCC object for picked prim");
            return false;
        }
        output.native.push(NativePick { path, world_hit_point: input.hit.world_hit_point });
        true
    }
}
