//! Scene index registration of DCC nodes.
//!
//! - [`DccNode`] - the node abstraction the registry consumes
//! - [`SceneIndexRegistry`] - producer factories and node lifecycle
//! - [`NodeHashRegistry`] - node hash code to scene index prefix

mod node;
mod node_hash;
mod registry;

pub use node::{DccNode, SimpleNode};
pub use node_hash::NodeHashRegistry;
pub use registry::{
    InterpretFn, ProducedScene, ProducerContext, ProducerFactory, Registration, SceneIndexRegistry,
};
