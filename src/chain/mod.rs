//! The viewport filtering chain: display style, stage ordering and
//! rebuilds, the terminal stage and custom clients.

mod client;
mod display_style;
mod manager;
mod terminal;

pub use client::{FilteringClient, FnFilteringClient};
pub use display_style::{DisplayStyle, GeometryMode};
pub use manager::{ChainStages, FilteringChain, GeometryStage};
pub use terminal::TerminalSceneIndex;
