//! Custom filtering clients appended after the built-in stages.

use std::fmt;
use std::sync::Arc;

use crate::core::SceneIndexHandle;

/// A custom filtering stage provider.
pub trait FilteringClient: Send + Sync {
    fn name(&self) -> &str;

    /// Wrap `input` in the client's stage(s) and return the new tail.
    fn append_scene_index(&self, input: SceneIndexHandle) -> SceneIndexHandle;
}

/// Client built from a closure.
pub struct FnFilteringClient<F> {
    name: String,
    append: F,
}

impl<F> FnFilteringClient<F>
where
    F: Fn(SceneIndexHandle) -> SceneIndexHandle + Send + Sync,
{
    pub fn new(name: impl Into<String>, append: F) -> Self {
        Self { name: name.into(), append }
    }
}

impl<F> FilteringClient for FnFilteringClient<F>
where
    F: Fn(SceneIndexHandle) -> SceneIndexHandle + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn append_scene_index(&self, input: SceneIndexHandle) -> SceneIndexHandle {
        (self.append)(input)
    }
}

/// A registered client and whether it takes part in the chain.
#[derive(Clone)]
pub(crate) struct ClientEntry {
    pub client: Arc<dyn FilteringClient>,
    pub enabled: bool,
}

impl fmt::Debug for ClientEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientEntry").field("name", &self.client.name()).field("enabled", &self.enabled).finish()
    }
}
