//! Viewport user preferences.
//!
//! The core only reads these. They are loaded from JSON, can be
//! overridden from the environment, and are shared as [`SharedOptions`].

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::selection::WireframeColorSet;
use crate::util::{Error, Result};

/// Options shared between the chain and the pick resolver.
pub type SharedOptions = Arc<RwLock<ViewportOptions>>;

pub const ENV_GEOM_SUBSETS_PICK_MODE: &str = "FVP_GEOM_SUBSETS_PICK_MODE";
pub const ENV_POINT_INSTANCES_PICK_MODE: &str = "FVP_POINT_INSTANCES_PICK_MODE";
pub const ENV_SELECTION_KIND: &str = "FVP_SELECTION_KIND";

/// Whether a click on a mesh selects the geometry subset under it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeomSubsetsPickMode {
    #[default]
    None,
    Faces,
}

/// What a click on a point instance selects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointInstancesPickMode {
    /// The whole instancer.
    #[default]
    PointInstancer,
    /// The instance under the cursor.
    Instances,
    /// The prototype the instance draws.
    Prototypes,
}

/// Wireframe-on-shaded quality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireframeQuality {
    #[default]
    Full,
    Reduced,
}

impl FromStr for GeomSubsetsPickMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "faces" => Ok(Self::Faces),
            _ => Err(Error::other(format!("unknown geom subsets pick mode '{s}'"))),
        }
    }
}

impl FromStr for PointInstancesPickMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pointinstancer" => Ok(Self::PointInstancer),
            "instances" => Ok(Self::Instances),
            "prototypes" => Ok(Self::Prototypes),
            _ => Err(Error::other(format!("unknown point instances pick mode '{s}'"))),
        }
    }
}

impl fmt::Display for GeomSubsetsPickMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for PointInstancesPickMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportOptions {
    // Picking
    pub geom_subsets_pick_mode: GeomSubsetsPickMode,
    pub point_instances_pick_mode: PointInstancesPickMode,
    /// Model kind a pick walks up to, empty for none.
    pub selection_kind: String,

    // Display
    pub wireframe_on_shaded: WireframeQuality,
    pub colors: WireframeColorSet,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            geom_subsets_pick_mode: GeomSubsetsPickMode::None,
            point_instances_pick_mode: PointInstancesPickMode::PointInstancer,
            selection_kind: String::new(),
            wireframe_on_shaded: WireframeQuality::Full,
            colors: WireframeColorSet::default(),
        }
    }
}

impl ViewportOptions {
    /// Load options from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Apply the `FVP_*` environment overrides. Unknown values fall back
    /// to the defaults.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = var(ENV_GEOM_SUBSETS_PICK_MODE) {
            self.geom_subsets_pick_mode = v.parse().unwrap_or_else(|e| {
                tracing::warn!(target: "fvp::pick", "{e}, using default");
                GeomSubsetsPickMode::default()
            });
        }
        if let Some(v) = var(ENV_POINT_INSTANCES_PICK_MODE) {
            self.point_instances_pick_mode = v.parse().unwrap_or_else(|e| {
                tracing::warn!(target: "fvp::pick", "{e}, using default");
                PointInstancesPickMode::default()
            });
        }
        if let Some(v) = var(ENV_SELECTION_KIND) {
            self.selection_kind = v;
        }
        self
    }

    /// Wrap into a shared handle.
    pub fn into_shared(self) -> SharedOptions {
        Arc::new(RwLock::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        let options = ViewportOptions {
            point_instances_pick_mode: PointInstancesPickMode::Instances,
            selection_kind: "component".into(),
            ..Default::default()
        };
        options.save(&path).unwrap();
        assert_eq!(ViewportOptions::load(&path).unwrap(), options);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{ "geom_subsets_pick_mode": "Faces" }"#).unwrap();
        let options = ViewportOptions::load(&path).unwrap();
        assert_eq!(options.geom_subsets_pick_mode, GeomSubsetsPickMode::Faces);
        assert_eq!(options.point_instances_pick_mode, PointInstancesPickMode::PointInstancer);
        assert!(options.selection_kind.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let options = ViewportOptions::default().with_overrides(|name| match name {
            ENV_GEOM_SUBSETS_PICK_MODE => Some("faces".into()),
            ENV_POINT_INSTANCES_PICK_MODE => Some("bogus".into()),
            ENV_SELECTION_KIND => Some("assembly".into()),
            _ => None,
        });
        assert_eq!(options.geom_subsets_pick_mode, GeomSubsetsPickMode::Faces);
        assert_eq!(options.point_instances_pick_mode, PointInstancesPickMode::PointInstancer);
        assert_eq!(options.selection_kind, "assembly");
    }

    #[test]
    fn test_load_missing() {
        assert!(matches!(ViewportOptions::load("/nonexistent/options.json"), Err(Error::FileNotFound(_))));
    }
}
