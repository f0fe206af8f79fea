//! Container data source implementations.
//!
//! - [`RetainedContainer`] stores its children.
//! - [`OverlayContainer`] layers containers, strongest first.
//! - [`ContainerEditor`] produces a container with fields set or deleted at
//!   arbitrary locators on top of a base container.

use std::collections::BTreeMap;
use std::sync::Arc;

use smallvec::SmallVec;

use super::data_source::{ContainerDataSource, ContainerHandle, DataSource};
use super::locator::DataSourceLocator;
use crate::util::Token;

// ============================================================================
// Retained
// ============================================================================

/// Container storing named children.
#[derive(Clone, Default)]
pub struct RetainedContainer {
    entries: SmallVec<[(Token, DataSource); 4]>,
}

impl RetainedContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, replacing an existing child of the same name.
    pub fn with(mut self, name: impl Into<Token>, ds: DataSource) -> Self {
        self.set(name, ds);
        self
    }

    /// Insert or replace a child.
    pub fn set(&mut self, name: impl Into<Token>, ds: DataSource) {
        let name = name.into();
        for (k, v) in &mut self.entries {
            if *k == name {
                *v = ds;
                return;
            }
        }
        self.entries.push((name, ds));
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wrap into a shared handle.
    pub fn into_handle(self) -> ContainerHandle {
        Arc::new(self)
    }

    /// Wrap into a data source.
    pub fn into_data_source(self) -> DataSource {
        DataSource::Container(Arc::new(self))
    }
}

impl ContainerDataSource for RetainedContainer {
    fn names(&self) -> Vec<Token> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    fn get(&self, name: &str) -> Option<DataSource> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    }
}

// ============================================================================
// Overlay
// ============================================================================

/// Layered container: the first layer that has a field wins.
///
/// When the winning field is a container, every container found for the
/// same name in weaker layers is overlaid beneath it.
pub struct OverlayContainer {
    layers: SmallVec<[ContainerHandle; 3]>,
}

impl OverlayContainer {
    /// Overlay `layers`, strongest first.
    pub fn new(layers: impl IntoIterator<Item = ContainerHandle>) -> ContainerHandle {
        Arc::new(Self { layers: layers.into_iter().collect() })
    }

    /// Overlay `strong` over `weak`.
    pub fn pair(strong: ContainerHandle, weak: ContainerHandle) -> ContainerHandle {
        Self::new([strong, weak])
    }
}

impl ContainerDataSource for OverlayContainer {
    fn names(&self) -> Vec<Token> {
        let mut names: Vec<Token> = Vec::new();
        for layer in &self.layers {
            for n in layer.names() {
                if !names.contains(&n) {
                    names.push(n);
                }
            }
        }
        names
    }

    fn get(&self, name: &str) -> Option<DataSource> {
        let mut containers: SmallVec<[ContainerHandle; 3]> = SmallVec::new();
        for layer in &self.layers {
            match layer.get(name) {
                Some(DataSource::Container(c)) => containers.push(c),
                Some(other) => {
                    if containers.is_empty() {
                        return Some(other);
                    }
                }
                None => {}
            }
        }
        match containers.len() {
            0 => None,
            1 => containers.pop().map(DataSource::Container),
            _ => Some(DataSource::Container(OverlayContainer::new(containers))),
        }
    }
}

// ============================================================================
// Editor
// ============================================================================

#[derive(Clone)]
enum Edit {
    /// Replace (Some) or delete (None) the field.
    Set(Option<DataSource>),
    /// Edit inside the field.
    Nested(Arc<EditNode>),
}

#[derive(Clone, Default)]
struct EditNode {
    // Set when a nested edit landed below a field replaced by `Set`.
    replaced_base: Option<Option<ContainerHandle>>,
    children: BTreeMap<Token, Edit>,
}

/// Builds a container with edits applied at locators.
///
/// ```ignore
/// let edited = ContainerEditor::new(Some(prim_ds))
///     .set(&repr_selector_locator(), Some(DataSource::value(repr)))
///     .finish();
/// ```
pub struct ContainerEditor {
    base: Option<ContainerHandle>,
    root: EditNode,
}

impl ContainerEditor {
    pub fn new(base: Option<ContainerHandle>) -> Self {
        Self { base, root: EditNode::default() }
    }

    /// Set (Some) or delete (None) the field at `locator`.
    ///
    /// The empty locator is ignored.
    pub fn set(mut self, locator: &DataSourceLocator, ds: Option<DataSource>) -> Self {
        let elements = locator.elements();
        if let Some((last, parents)) = elements.split_last() {
            let mut node = &mut self.root;
            for name in parents {
                let entry = node
                    .children
                    .entry(name.clone())
                    .or_insert_with(|| Edit::Nested(Arc::new(EditNode::default())));
                if let Edit::Set(replaced) = entry {
                    let base = replaced.as_ref().and_then(|d| d.as_container().cloned());
                    *entry = Edit::Nested(Arc::new(EditNode {
                        replaced_base: Some(base),
                        children: BTreeMap::new(),
                    }));
                }
                node = match entry {
                    Edit::Nested(n) => Arc::make_mut(n),
                    Edit::Set(_) => unreachable!("converted to nested above"),
                };
            }
            node.children.insert(last.clone(), Edit::Set(ds));
        }
        self
    }

    /// Finish editing.
    pub fn finish(self) -> ContainerHandle {
        Arc::new(EditedContainer { base: self.base, node: Arc::new(self.root) })
    }
}

struct EditedContainer {
    base: Option<ContainerHandle>,
    node: Arc<EditNode>,
}

impl ContainerDataSource for EditedContainer {
    fn names(&self) -> Vec<Token> {
        let mut names: Vec<Token> = match &self.base {
            Some(b) => b
                .names()
                .into_iter()
                .filter(|n| !matches!(self.node.children.get(n), Some(Edit::Set(None))))
                .collect(),
            None => Vec::new(),
        };
        for (name, edit) in &self.node.children {
            if matches!(edit, Edit::Set(None)) {
                continue;
            }
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    fn get(&self, name: &str) -> Option<DataSource> {
        match self.node.children.get(name) {
            Some(Edit::Set(ds)) => ds.clone(),
            Some(Edit::Nested(node)) => {
                let base = match &node.replaced_base {
                    Some(replaced) => replaced.clone(),
                    None => self
                        .base
                        .as_ref()
                        .and_then(|b| b.get(name))
                        .and_then(|d| d.as_container().cloned()),
                };
                Some(DataSource::Container(Arc::new(EditedContainer { base, node: node.clone() })))
            }
            None => self.base.as_ref().and_then(|b| b.get(name)),
        }
    }
}
