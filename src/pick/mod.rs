//! Pick resolution: turning render pick hits into application selections.
//!
//! - [`PickHit`] / [`PickParams`] - what the pick task reports and how it is set up
//! - [`PrimOriginInfo`] - data-model origin of a hit, through instancing
//! - [`PickHandler`] - per-producer resolution ([`UsdPickHandler`], [`NativePickHandler`])
//! - [`PickHandlerRegistry`] - handlers keyed by scene index prefix
//! - [`PickResolver`] - batch resolution over registered producers

mod handler;
mod hit;
pub mod kind;
mod native;
mod registry;
mod resolver;
mod usd;

pub use handler::{NativePick, PickHandler, PickInput, PickOutput};
pub use hit::{InstancerContext, PickHit, PickParams, PickTarget, PrimOriginInfo, ResolveMode};
pub use kind::KindRegistry;
pub use native::NativePickHandler;
pub use registry::PickHandlerRegistry;
pub use resolver::{PickResolver, PickResult};
pub use usd::UsdPickHandler;
