//! Utility types shared by every layer.
//!
//! This module contains fundamental types used throughout the library:
//! - [`Token`] - Shared immutable string
//! - [`ScenePath`] - Hierarchical scene / data-model path
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam

mod error;
mod math;
mod path;
mod token;

pub use error::*;
pub use math::*;
pub use path::*;
pub use token::*;
