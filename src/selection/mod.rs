//! Selection: application paths, their translation into scene index
//! paths, and the shared selection set.

mod app_path;
mod lead_object;
mod notification;
mod path_mapper;
#[allow(clippy::module_inception)]
mod selection;
mod trie;
mod types;
mod wireframe_color;

pub use app_path::{AppPath, AppSelection, PathSegment, RunTimeId};
pub use lead_object::LeadObjectPathTracker;
pub use notification::{SelectionChanged, SelectionOp};
pub use path_mapper::{NodeNamePathMapper, PathMapperRegistry, PrefixPathMapper};
pub use selection::{new_selection, Selection, SelectionHandle};
pub use trie::AppPathTrie;
pub use types::{InstancesSelection, PathInterface, PrimSelection, PrimSelections};
pub use wireframe_color::{SelectionWireframeColors, WireframeColorInterface, WireframeColorSet};
