//! Bounding box display: geometry becomes a box drawn with curves.
//!
//! Meshes and basis curves are replaced by linear segmented basis curves
//! joining the 8 corners of the prim's extent. A prim without an extent
//! draws nothing. Transform, purpose, visibility, instancing and prim
//! origin are kept so the box sits where the geometry was and can still be
//! picked.

use std::sync::Arc;

use crate::core::schema::{self, tokens};
use crate::core::{
    observer_handle, value_at, AddedPrimEntry, ContainerDataSource, ContainerHandle, DataSource, DataSourceLocator,
    DirtiedPrimEntry, Observers, RemovedPrimEntry, RenamedPrimEntry, RetainedContainer, SceneIndex,
    SceneIndexHandle, SceneIndexObserver, SceneIndexPrim, StageKind,
};
use crate::selection::WireframeColorInterface;
use crate::util::{Color, Extent, ScenePath, Token, Vec3, BOX_CURVE_INDICES};

use super::is_excluded;

/// Fields read through from the original prim.
const KEPT_FIELDS: [&str; 6] = [
    tokens::XFORM_FIELD,
    tokens::PURPOSE,
    tokens::VISIBILITY,
    tokens::INSTANCED_BY,
    tokens::PRIM_ORIGIN,
    tokens::EXTENT,
];

fn box_topology() -> DataSource {
    RetainedContainer::new()
        .with(
            tokens::TOPOLOGY,
            RetainedContainer::new()
                .with(tokens::CURVE_VERTEX_COUNTS, DataSource::value(vec![BOX_CURVE_INDICES.len() as i32]))
                .with(tokens::CURVE_INDICES, DataSource::value(BOX_CURVE_INDICES.to_vec()))
                .with(tokens::BASIS, DataSource::value(tokens::BEZIER))
                .with(tokens::TYPE, DataSource::value(tokens::LINEAR))
                .with(tokens::WRAP, DataSource::value(tokens::SEGMENTED))
                .into_data_source(),
        )
        .into_data_source()
}

fn read_extent(prim: &ContainerHandle) -> Option<Extent> {
    let min = value_at(prim, &schema::extent_min_locator())?.as_vec3d()?;
    let max = value_at(prim, &schema::extent_max_locator())?.as_vec3d()?;
    Some(Extent::new(min, max))
}

/// Prim data of a bounding box.
struct BoundsPrimDataSource {
    input: ContainerHandle,
    color: Color,
}

impl BoundsPrimDataSource {
    fn primvars(&self) -> DataSource {
        let points: Vec<Vec3> = read_extent(&self.input).map(|e| e.corners().to_vec()).unwrap_or_default();
        RetainedContainer::new()
            .with(tokens::POINTS, schema::primvar(points, tokens::VERTEX, tokens::POINT))
            .with(
                tokens::DISPLAY_COLOR,
                schema::primvar(vec![self.color.truncate()], tokens::CONSTANT, tokens::COLOR),
            )
            .into_data_source()
    }
}

impl ContainerDataSource for BoundsPrimDataSource {
    fn names(&self) -> Vec<Token> {
        KEPT_FIELDS
            .iter()
            .chain([tokens::DISPLAY_STYLE, tokens::BASIS_CURVES, tokens::PRIMVARS].iter())
            .map(|n| Token::from(*n))
            .collect()
    }

    fn get(&self, name: &str) -> Option<DataSource> {
        if KEPT_FIELDS.iter().any(|f| *f == name) {
            return self.input.get(name);
        }
        match name {
            tokens::DISPLAY_STYLE => Some(
                RetainedContainer::new()
                    .with(tokens::CULL_STYLE, DataSource::value(tokens::CULL_NOTHING))
                    .into_data_source(),
            ),
            tokens::BASIS_CURVES => Some(box_topology()),
            tokens::PRIMVARS => Some(self.primvars()),
            _ => None,
        }
    }
}

pub struct BoundingBoxSceneIndex {
    input: SceneIndexHandle,
    excluded_roots: Vec<ScenePath>,
    colors: Arc<dyn WireframeColorInterface>,
    observers: Observers,
}

impl BoundingBoxSceneIndex {
    pub fn new(
        input: SceneIndexHandle,
        excluded_roots: Vec<ScenePath>,
        colors: Arc<dyn WireframeColorInterface>,
    ) -> Arc<Self> {
        let this = Arc::new(Self { input: input.clone(), excluded_roots, colors, observers: Observers::new() });
        input.add_observer(observer_handle(&this));
        this
    }

    fn converts(&self, path: &ScenePath, prim_type: &Token) -> bool {
        (*prim_type == tokens::MESH || *prim_type == tokens::BASIS_CURVES) && !is_excluded(path, &self.excluded_roots)
    }
}

impl SceneIndex for BoundingBoxSceneIndex {
    fn get_prim(&self, path: &ScenePath) -> SceneIndexPrim {
        let prim = self.input.get_prim(path);
        match prim.data_source {
            Some(ds) if self.converts(path, &prim.prim_type) => {
                let color = self.colors.wireframe_color(path);
                let bounds: ContainerHandle = Arc::new(BoundsPrimDataSource { input: ds, color });
                SceneIndexPrim::new(tokens::BASIS_CURVES, Some(bounds))
            }
            data_source => SceneIndexPrim { prim_type: prim.prim_type, data_source },
        }
    }

    fn get_child_prim_paths(&self, path: &ScenePath) -> Vec<ScenePath> {
        self.input.get_child_prim_paths(path)
    }

    fn display_name(&self) -> String {
        "Flow Viewport Bounding Box Scene Index".to_string()
    }

    fn stage_kind(&self) -> StageKind {
        StageKind::BoundingBox
    }

    filtering_plumbing!();
}

impl SceneIndexObserver for BoundingBoxSceneIndex {
    fn prims_added(&self, _sender: &dyn SceneIndex, entries: &[AddedPrimEntry]) {
        let out: Vec<AddedPrimEntry> = entries
            .iter()
            .map(|e| {
                if self.converts(&e.prim_path, &e.prim_type) {
                    AddedPrimEntry::new(e.prim_path.clone(), tokens::BASIS_CURVES)
                } else {
                    e.clone()
                }
            })
            .collect();
        self.observers.send_added(self, &out);
    }

    fn prims_removed(&self, _sender: &dyn SceneIndex, entries: &[RemovedPrimEntry]) {
        self.observers.send_removed(self, entries);
    }

    fn prims_dirtied(&self, _sender: &dyn SceneIndex, entries: &[DirtiedPrimEntry]) {
        let selections = schema::selections_locator();
        let extent = DataSourceLocator::new([tokens::EXTENT]);
        let out: Vec<DirtiedPrimEntry> = entries
            .iter()
            .map(|e| {
                let mut locators = e.dirty_locators.clone();
                if locators.intersects(&selections) {
                    locators.insert(schema::primvar_locator(tokens::DISPLAY_COLOR));
                }
                if locators.intersects(&extent) {
                    locators.insert(schema::primvar_locator(tokens::POINTS));
                }
                DirtiedPrimEntry::new(e.prim_path.clone(), locators)
            })
            .collect();
        self.observers.send_dirtied(self, &out);
    }

    fn prims_renamed(&self, _sender: &dyn SceneIndex, entries: &[RenamedPrimEntry]) {
        self.observers.send_renamed(self, entries);
    }
}
