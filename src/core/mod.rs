//! Core layer - scene index traits and the data source model.
//!
//! This module provides:
//! - [`SceneIndex`] / [`SceneIndexObserver`] - observable prim trees
//! - [`DataSource`] / [`ContainerDataSource`] - hierarchical prim data
//! - [`DataSourceLocator`] / [`LocatorSet`] - addressing within prim data
//! - Producers: [`RetainedSceneIndex`], [`PrefixingSceneIndex`]
//! - [`SceneDescription`] - JSON scene files for the browser and tests

pub mod container;
pub mod data_source;
pub mod description;
pub mod locator;
pub mod prefixing;
pub mod retained;
pub mod schema;
pub mod traversal;
mod traits;

pub use container::{ContainerEditor, OverlayContainer, RetainedContainer};
pub use data_source::{
    get_at, prim_value, value_at, ContainerDataSource, ContainerHandle, DataSource, SampledDataSource, Value,
};
pub use description::{PrimDescription, SceneDescription};
pub use locator::{DataSourceLocator, LocatorSet};
pub use prefixing::PrefixingSceneIndex;
pub use retained::{RetainedPrim, RetainedSceneIndex};
pub use traits::{
    chain_kinds, observer_handle, same_scene, AddedPrimEntry, DirtiedPrimEntry, ObserverHandle, Observers,
    RemovedPrimEntry, RenamedPrimEntry, SceneIndex, SceneIndexHandle, SceneIndexObserver, SceneIndexPrim,
    StageKind,
};
pub use traversal::{all_prim_paths, PrimView};
