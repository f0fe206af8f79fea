//! JSON scene descriptions.
//!
//! A small producer format used by the browser and by tests: a flat list
//! of prims, each with a path, a type and the handful of fields the
//! viewport stages read. Loading builds a [`RetainedSceneIndex`].
//!
//! ```json
//! {
//!   "name": "stage",
//!   "prims": [
//!     { "path": "/A", "type": "xform" },
//!     { "path": "/A/Cube", "type": "mesh", "origin": "/Cube",
//!       "extent": [[-1, -1, -1], [1, 1, 1]] }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::container::ContainerEditor;
use super::data_source::{ContainerHandle, DataSource, Value};
use super::retained::{RetainedPrim, RetainedSceneIndex};
use super::schema::{self, tokens};
use crate::util::{DVec3, Error, Result, ScenePath, Token, Vec3};

/// One shader node of a material network.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderNodeDescription {
    pub identifier: String,
    /// Input name to upstream `node.output`.
    pub connections: BTreeMap<String, String>,
}

/// One prim of a scene description.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimDescription {
    pub path: String,
    #[serde(rename = "type")]
    pub prim_type: String,
    /// Data-model path the prim was produced from.
    pub origin: Option<String>,
    /// Authored model kind.
    pub kind: Option<String>,
    pub extent: Option<[[f64; 3]; 2]>,
    pub display_color: Option<[f32; 3]>,
    pub material_binding: Option<String>,
    pub instanced_by: Vec<String>,
    /// Instancer prototypes.
    pub prototypes: Vec<String>,
    /// Instance indices per prototype.
    pub instance_indices: Vec<Vec<i32>>,
    /// Data-model paths of natively instanced prims, one per instance.
    pub instance_locations: Vec<String>,
    pub subset_type: Option<String>,
    pub subset_indices: Vec<i32>,
    pub material_nodes: BTreeMap<String, ShaderNodeDescription>,
}

fn parse_paths(paths: &[String]) -> Result<Vec<ScenePath>> {
    paths.iter().map(|p| ScenePath::parse(p)).collect()
}

impl PrimDescription {
    pub fn new(path: impl Into<String>, prim_type: impl Into<String>) -> Self {
        Self { path: path.into(), prim_type: prim_type.into(), ..Default::default() }
    }

    /// Prim data source, `None` when the prim carries no fields.
    pub fn data_source(&self) -> Result<Option<ContainerHandle>> {
        let mut edits: Vec<(super::DataSourceLocator, DataSource)> = Vec::new();

        if let Some(origin) = &self.origin {
            edits.push((schema::prim_origin_scene_path_locator(), DataSource::value(ScenePath::parse(origin)?)));
        }
        if let Some(kind) = &self.kind {
            edits.push((schema::model_kind_locator(), DataSource::value(kind.as_str())));
        }
        if let Some([min, max]) = self.extent {
            edits.push((schema::extent_min_locator(), DataSource::value(DVec3::from_array(min))));
            edits.push((schema::extent_max_locator(), DataSource::value(DVec3::from_array(max))));
        }
        if let Some(color) = self.display_color {
            edits.push((
                schema::primvar_locator(tokens::DISPLAY_COLOR),
                schema::primvar(vec![Vec3::from_array(color)], tokens::CONSTANT, tokens::COLOR),
            ));
        }
        if let Some(material) = &self.material_binding {
            edits.push((schema::material_binding_path_locator(), DataSource::value(ScenePath::parse(material)?)));
        }
        if !self.instanced_by.is_empty() {
            edits.push((schema::instanced_by_paths_locator(), DataSource::value(parse_paths(&self.instanced_by)?)));
        }
        if !self.prototypes.is_empty() {
            edits.push((schema::instancer_prototypes_locator(), DataSource::value(parse_paths(&self.prototypes)?)));
        }
        if !self.instance_indices.is_empty() {
            let per_prototype = self.instance_indices.iter().map(|i| DataSource::value(i.clone())).collect();
            edits.push((schema::instancer_instance_indices_locator(), DataSource::vector(per_prototype)));
        }
        if !self.instance_locations.is_empty() {
            edits.push((
                schema::instance_locations_locator(),
                DataSource::value(parse_paths(&self.instance_locations)?),
            ));
        }
        if let Some(subset_type) = &self.subset_type {
            edits.push((schema::geom_subset_type_locator(), DataSource::value(subset_type.as_str())));
            edits.push((schema::geom_subset_indices_locator(), DataSource::value(self.subset_indices.clone())));
        }
        for (name, node) in &self.material_nodes {
            let node_locator = super::DataSourceLocator::new([tokens::MATERIAL, tokens::NODES, name.as_str()]);
            edits.push((
                node_locator.append(tokens::NODE_IDENTIFIER),
                DataSource::value(node.identifier.as_str()),
            ));
            for (input, upstream) in &node.connections {
                edits.push((
                    node_locator.append(tokens::INPUT_CONNECTIONS).append(input.as_str()),
                    DataSource::value(Value::Token(Token::from(upstream.as_str()))),
                ));
            }
        }

        if edits.is_empty() {
            return Ok(None);
        }
        let editor = edits.into_iter().fold(ContainerEditor::new(None), |e, (l, ds)| e.set(&l, Some(ds)));
        Ok(Some(editor.finish()))
    }

    pub fn to_retained_prim(&self) -> Result<RetainedPrim> {
        let path = ScenePath::parse(&self.path)?;
        if path.is_empty() || path.is_absolute_root() {
            return Err(Error::invalid(format!("prim path '{}' does not name a prim", self.path)));
        }
        Ok(RetainedPrim::new(path, self.prim_type.as_str(), self.data_source()?))
    }
}

/// A whole scene: a name and its prims.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub name: String,
    pub prims: Vec<PrimDescription>,
}

impl SceneDescription {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Build a retained scene index holding every prim.
    pub fn build(&self) -> Result<Arc<RetainedSceneIndex>> {
        let prims = self.prims.iter().map(PrimDescription::to_retained_prim).collect::<Result<Vec<_>>>()?;
        let name = if self.name.is_empty() { "scene description" } else { self.name.as_str() };
        let scene = RetainedSceneIndex::new(name);
        scene.add_prims(prims);
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{value_at, SceneIndex};

    const SCENE: &str = r#"{
        "name": "stage",
        "prims": [
            { "path": "/A", "type": "xform" },
            { "path": "/A/Cube", "type": "mesh", "origin": "/Cube", "kind": "component",
              "extent": [[-1, -1, -1], [1, 1, 1]] },
            { "path": "/A/Cube/Top", "type": "geomSubset", "subset_type": "typeFaceSet", "subset_indices": [0, 1] }
        ]
    }"#;

    #[test]
    fn test_build_from_json() {
        let scene = SceneDescription::from_json(SCENE).unwrap().build().unwrap();
        let cube = scene.get_prim(&"/A/Cube".parse().unwrap());
        assert_eq!(cube.prim_type, tokens::MESH);
        let ds = cube.data_source.unwrap();
        assert_eq!(schema::prim_origin_path(&ds), Some("/Cube".parse().unwrap()));
        assert_eq!(
            value_at(&ds, &schema::model_kind_locator()).and_then(|v| v.as_token().cloned()),
            Some(Token::from("component"))
        );

        let subset = scene.get_prim(&"/A/Cube/Top".parse().unwrap()).data_source.unwrap();
        assert_eq!(
            value_at(&subset, &schema::geom_subset_indices_locator()).and_then(|v| v.as_int_array().map(<[i32]>::to_vec)),
            Some(vec![0, 1])
        );
        assert!(scene.get_prim(&"/A".parse().unwrap()).data_source.is_none());
    }

    #[test]
    fn test_rejects_bad_paths() {
        let desc = SceneDescription { name: String::new(), prims: vec![PrimDescription::new("/", "mesh")] };
        assert!(desc.build().is_err());
        assert!(SceneDescription::from_json("{ \"prims\": 3 }").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneDescription::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}
