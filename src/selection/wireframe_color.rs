//! Wireframe colors of prims: lead, active (selected) or dormant.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::selection::SelectionHandle;
use crate::scene_index::DirtyLeadObjectSceneIndex;
use crate::util::{Color, ScenePath};

/// Provides the wireframe color of a prim.
pub trait WireframeColorInterface: Send + Sync {
    fn wireframe_color(&self, prim_path: &ScenePath) -> Color;
}

/// The three wireframe colors, RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireframeColorSet {
    pub lead: [f32; 4],
    pub active: [f32; 4],
    pub dormant: [f32; 4],
}

impl Default for WireframeColorSet {
    fn default() -> Self {
        Self {
            lead: [0.263, 1.0, 0.639, 1.0],
            active: [1.0, 1.0, 1.0, 1.0],
            dormant: [0.0, 0.016, 0.376, 1.0],
        }
    }
}

/// Colors from the selection state: the lead object gets the lead color,
/// prims with a selected ancestor (inclusive) the active color, everything
/// else the dormant color.
pub struct SelectionWireframeColors {
    selection: SelectionHandle,
    lead: Arc<DirtyLeadObjectSceneIndex>,
    colors: WireframeColorSet,
}

impl SelectionWireframeColors {
    pub fn new(selection: SelectionHandle, lead: Arc<DirtyLeadObjectSceneIndex>, colors: WireframeColorSet) -> Self {
        Self { selection, lead, colors }
    }
}

impl WireframeColorInterface for SelectionWireframeColors {
    fn wireframe_color(&self, prim_path: &ScenePath) -> Color {
        let rgba = if self.lead.is_lead_object(prim_path) {
            self.colors.lead
        } else if self.selection.read().has_fully_selected_ancestor_inclusive(prim_path, None) {
            self.colors.active
        } else {
            self.colors.dormant
        };
        Color::from_array(rgba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RetainedSceneIndex;
    use crate::selection::{new_selection, PrimSelection};

    fn p(s: &str) -> ScenePath {
        s.parse().unwrap()
    }

    #[test]
    fn test_lead_active_dormant() {
        let selection = new_selection();
        let lead = DirtyLeadObjectSceneIndex::new(RetainedSceneIndex::new("producer"));
        let colors = WireframeColorSet::default();
        let wc = SelectionWireframeColors::new(selection.clone(), lead.clone(), colors);

        selection.write().add(&PrimSelection::new(p("/A")));
        selection.write().add(&PrimSelection::new(p("/B")));
        lead.set_lead_object_path(p("/B"));

        assert_eq!(wc.wireframe_color(&p("/A/Cube")), Color::from_array(colors.active));
        assert_eq!(wc.wireframe_color(&p("/B")), Color::from_array(colors.lead));
        assert_eq!(wc.wireframe_color(&p("/C")), Color::from_array(colors.dormant));
    }
}
