//! Lead object: the most recently selected application path.

use parking_lot::RwLock;

use super::app_path::{AppPath, AppSelection};
use super::types::PathInterface;
use crate::scene_index::DirtyLeadObjectSceneIndex;
use crate::util::ScenePath;

/// Follows the last item of the global selection and moves the lead of
/// the dirty-lead-object stage accordingly.
#[derive(Default)]
pub struct LeadObjectPathTracker {
    lead: RwLock<AppPath>,
}

impl LeadObjectPathTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lead application path, empty without selection.
    pub fn lead_app_path(&self) -> AppPath {
        self.lead.read().clone()
    }

    /// Make the last item of `global` the lead.
    pub fn update(&self, global: &AppSelection, path_interface: &dyn PathInterface, stage: &DirtyLeadObjectSceneIndex) {
        let app = global.back().cloned().unwrap_or_else(AppPath::empty);
        let scene_path = if app.is_empty() {
            ScenePath::empty()
        } else {
            path_interface.scene_index_paths(&app).into_iter().next().unwrap_or_else(ScenePath::empty)
        };
        tracing::debug!(target: "fvp::selection", lead = %app, scene_path = %scene_path, "lead object");
        *self.lead.write() = app;
        stage.set_lead_object_path(scene_path);
    }

    pub fn clear(&self, stage: &DirtyLeadObjectSceneIndex) {
        *self.lead.write() = AppPath::empty();
        stage.set_lead_object_path(ScenePath::empty());
    }
}
