//! # Flow Viewport
//!
//! Scene index composition, selection and pick resolution for a DCC
//! viewport rendering through a scene-index based renderer.
//!
//! Producers (one per DCC node) are composed by a merging scene index and
//! fed through a filtering chain (selection, isolate select, display style,
//! wireframe highlight, ...) whose terminal stage the renderer observes.
//! Pick hits coming back from the renderer are resolved to application
//! paths through the producer that owns them.
//!
//! ## Modules
//!
//! - [`util`] - Paths, tokens, errors, math types
//! - [`core`] - Scene index traits and the data source model
//! - [`scene_index`] - Merging, path interface and filtering stages
//! - [`selection`] - Application paths, selection set, path mappers
//! - [`chain`] - Filtering chain management and display style
//! - [`pick`] - Pick hits and their resolution
//! - [`registration`] - DCC node registration
//! - [`config`] - Viewport options
//!
//! ## Example
//!
//! ```ignore
//! use flow_viewport::prelude::*;
//!
//! let merging = MergingSceneIndex::new();
//! let registry = SceneIndexRegistry::new(merging.clone());
//! let chain = FilteringChain::new(merging, ViewportOptions::default().into_shared())?;
//! chain.update_display_style(DisplayStyle::SHADED | DisplayStyle::WIREFRAME)?;
//! ```

pub mod util;
pub mod core;
pub mod scene_index;
pub mod selection;
pub mod chain;
pub mod pick;
pub mod registration;
pub mod config;
pub mod trace;

// Re-export commonly used types
pub use util::{Error, Result, ScenePath, Token};
pub use config::{SharedOptions, ViewportOptions};

/// Build date, for the browser's version line.
pub const BUILD_DATE: &str = env!("FVP_BUILD_DATE");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result, ScenePath, Token};
    pub use crate::core::{
        DataSource, RetainedPrim, RetainedSceneIndex, SceneDescription, SceneIndex, SceneIndexHandle,
    };
    pub use crate::scene_index::MergingSceneIndex;
    pub use crate::selection::{AppPath, AppSelection, SelectionChanged, SelectionOp};
    pub use crate::chain::{DisplayStyle, FilteringChain};
    pub use crate::pick::{PickHit, PickResolver};
    pub use crate::registration::{DccNode, ProducedScene, SceneIndexRegistry, SimpleNode};
    pub use crate::config::ViewportOptions;
}
