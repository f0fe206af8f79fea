//! Field names, prim types and locators of the prim schemas the composition
//! core reads or writes, plus small typed accessors.

use super::data_source::{get_at, ContainerHandle, DataSource, Value};
use super::locator::DataSourceLocator;
use crate::util::{ScenePath, Token};
use crate::core::container::RetainedContainer;

/// String constants. Compare with `Token == &str`.
pub mod tokens {
    // Prim types
    pub const MESH: &str = "mesh";
    pub const BASIS_CURVES: &str = "basisCurves";
    pub const INSTANCER: &str = "instancer";
    pub const GEOM_SUBSET: &str = "geomSubset";
    pub const MATERIAL: &str = "material";
    pub const XFORM: &str = "xform";

    // Selection
    pub const SELECTIONS: &str = "selections";
    pub const FULLY_SELECTED: &str = "fullySelected";
    pub const NESTED_INSTANCE_INDICES: &str = "nestedInstanceIndices";
    pub const INSTANCER_PATH: &str = "instancerPath";
    pub const PROTOTYPE_INDEX: &str = "prototypeIndex";
    pub const INSTANCE_INDICES: &str = "instanceIndices";

    // Display style
    pub const DISPLAY_STYLE: &str = "displayStyle";
    pub const REPR_SELECTOR: &str = "reprSelector";
    pub const REFINE_LEVEL: &str = "refineLevel";
    pub const CULL_STYLE: &str = "cullStyle";
    pub const CULL_NOTHING: &str = "nothing";

    // Reprs
    pub const REFINED_WIRE: &str = "refinedWire";
    pub const REFINED_WIRE_ON_SURF: &str = "refinedWireOnSurf";
    pub const WIRE_ON_SURF: &str = "wireOnSurf";

    // Primvars
    pub const PRIMVARS: &str = "primvars";
    pub const PRIMVAR_VALUE: &str = "primvarValue";
    pub const INTERPOLATION: &str = "interpolation";
    pub const ROLE: &str = "role";
    pub const CONSTANT: &str = "constant";
    pub const VERTEX: &str = "vertex";
    pub const COLOR: &str = "color";
    pub const POINT: &str = "point";
    pub const POINTS: &str = "points";
    pub const DISPLAY_COLOR: &str = "displayColor";
    pub const OVERRIDE_WIREFRAME_COLOR: &str = "overrideWireframeColor";

    // Materials
    pub const MATERIAL_BINDINGS: &str = "materialBindings";
    pub const ALL_PURPOSE: &str = "allPurpose";
    pub const PATH: &str = "path";
    pub const NODES: &str = "nodes";
    pub const NODE_IDENTIFIER: &str = "nodeIdentifier";
    pub const INPUT_CONNECTIONS: &str = "inputConnections";
    pub const PARAMETERS: &str = "parameters";
    pub const USD_PREVIEW_SURFACE: &str = "UsdPreviewSurface";
    pub const ND_STANDARD_SURFACE: &str = "ND_standard_surface_surfaceshader";

    // Origins and instancing
    pub const PRIM_ORIGIN: &str = "primOrigin";
    pub const SCENE_PATH: &str = "scenePath";
    pub const INSTANCED_BY: &str = "instancedBy";
    pub const PATHS: &str = "paths";
    pub const INSTANCER_TOPOLOGY: &str = "instancerTopology";
    pub const PROTOTYPES: &str = "prototypes";
    pub const MASK: &str = "mask";
    pub const INSTANCE_LOCATIONS: &str = "instanceLocations";

    // Geom subsets
    pub const TYPE: &str = "type";
    pub const INDICES: &str = "indices";
    pub const TYPE_FACE_SET: &str = "typeFaceSet";

    // Geometry
    pub const EXTENT: &str = "extent";
    pub const MIN: &str = "min";
    pub const MAX: &str = "max";
    pub const XFORM_FIELD: &str = "xform";
    pub const PURPOSE: &str = "purpose";
    pub const VISIBILITY: &str = "visibility";
    pub const TOPOLOGY: &str = "topology";
    pub const CURVE_VERTEX_COUNTS: &str = "curveVertexCounts";
    pub const CURVE_INDICES: &str = "curveIndices";
    pub const BASIS: &str = "basis";
    pub const WRAP: &str = "wrap";
    pub const BEZIER: &str = "bezier";
    pub const LINEAR: &str = "linear";
    pub const SEGMENTED: &str = "segmented";

    // Model
    pub const MODEL: &str = "model";
    pub const KIND: &str = "kind";
}

use tokens as t;

// ============================================================================
// Locators
// ============================================================================

pub fn selections_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::SELECTIONS])
}

pub fn display_style_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::DISPLAY_STYLE])
}

pub fn repr_selector_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::DISPLAY_STYLE, t::REPR_SELECTOR])
}

pub fn refine_level_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::DISPLAY_STYLE, t::REFINE_LEVEL])
}

pub fn cull_style_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::DISPLAY_STYLE, t::CULL_STYLE])
}

pub fn primvar_locator(name: &str) -> DataSourceLocator {
    DataSourceLocator::new([t::PRIMVARS, name])
}

pub fn primvar_value_locator(name: &str) -> DataSourceLocator {
    DataSourceLocator::new([t::PRIMVARS, name, t::PRIMVAR_VALUE])
}

pub fn material_bindings_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::MATERIAL_BINDINGS])
}

pub fn material_binding_path_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::MATERIAL_BINDINGS, t::ALL_PURPOSE, t::PATH])
}

pub fn material_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::MATERIAL])
}

pub fn visibility_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::VISIBILITY, t::VISIBILITY])
}

pub fn prim_origin_scene_path_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::PRIM_ORIGIN, t::SCENE_PATH])
}

pub fn instanced_by_paths_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::INSTANCED_BY, t::PATHS])
}

pub fn instancer_prototypes_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::INSTANCER_TOPOLOGY, t::PROTOTYPES])
}

pub fn instancer_instance_indices_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::INSTANCER_TOPOLOGY, t::INSTANCE_INDICES])
}

pub fn instancer_mask_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::INSTANCER_TOPOLOGY, t::MASK])
}

pub fn instance_locations_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::INSTANCER_TOPOLOGY, t::INSTANCE_LOCATIONS])
}

pub fn geom_subset_type_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::GEOM_SUBSET, t::TYPE])
}

pub fn geom_subset_indices_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::GEOM_SUBSET, t::INDICES])
}

pub fn extent_min_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::EXTENT, t::MIN])
}

pub fn extent_max_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::EXTENT, t::MAX])
}

pub fn model_kind_locator() -> DataSourceLocator {
    DataSourceLocator::new([t::MODEL, t::KIND])
}

// ============================================================================
// Builders and accessors
// ============================================================================

/// Primvar container `{primvarValue, interpolation, role}`.
pub fn primvar(value: impl Into<Value>, interpolation: &str, role: &str) -> DataSource {
    RetainedContainer::new()
        .with(t::PRIMVAR_VALUE, DataSource::value(value))
        .with(t::INTERPOLATION, DataSource::value(interpolation))
        .with(t::ROLE, DataSource::value(role))
        .into_data_source()
}

/// `primOrigin` container pointing at a data-model path.
pub fn prim_origin(path: ScenePath) -> DataSource {
    RetainedContainer::new()
        .with(t::SCENE_PATH, DataSource::value(path))
        .into_data_source()
}

/// Three-slot repr selector value.
pub fn repr_selector(first: &str) -> Value {
    Value::TokenArray(vec![Token::from(first), Token::empty(), Token::empty()])
}

/// Data-model path recorded in a `primOrigin` container.
pub fn origin_path(prim_origin: &ContainerHandle) -> Option<ScenePath> {
    get_at(prim_origin, &DataSourceLocator::new([t::SCENE_PATH]))?
        .sampled_value()?
        .as_path()
        .cloned()
}

/// Data-model path recorded on a prim.
pub fn prim_origin_path(prim_ds: &ContainerHandle) -> Option<ScenePath> {
    let origin = get_at(prim_ds, &DataSourceLocator::new([t::PRIM_ORIGIN]))?;
    origin_path(origin.as_container()?)
}

/// Instancers drawing this prim, empty if not instanced.
pub fn instanced_by_paths(prim_ds: &ContainerHandle) -> Vec<ScenePath> {
    get_at(prim_ds, &instanced_by_paths_locator())
        .and_then(|d| d.sampled_value())
        .and_then(|v| v.as_path_array().map(<[ScenePath]>::to_vec))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prim_origin_roundtrip() {
        let ds = RetainedContainer::new()
            .with(t::PRIM_ORIGIN, prim_origin("/Stage/Cube".parse().unwrap()))
            .into_handle();
        assert_eq!(prim_origin_path(&ds), Some("/Stage/Cube".parse().unwrap()));
        assert!(instanced_by_paths(&ds).is_empty());
    }

    #[test]
    fn test_repr_selector_slots() {
        let v = repr_selector(t::REFINED_WIRE);
        assert_eq!(v.as_token_array().map(|a| a.len()), Some(3));
    }
}
