//! DCC nodes owning scene index subtrees.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::selection::{AppPath, PathSegment, RunTimeId};

/// A DCC node that produces a scene index subtree.
pub trait DccNode: Send + Sync {
    fn name(&self) -> &str;

    /// Node type tag, used to pick the producer factory.
    fn type_name(&self) -> &str;

    /// False if another DCC node has the same name.
    fn has_unique_name(&self) -> bool {
        true
    }

    /// Stable identity of the node, never 0.
    fn hash_code(&self) -> u64;

    /// Application path of the node itself.
    fn app_path(&self) -> AppPath;
}

/// Plain [`DccNode`] for hosts without their own node type, and for tests.
#[derive(Clone, Debug)]
pub struct SimpleNode {
    name: String,
    type_name: String,
    unique_name: bool,
    hash_code: u64,
    app_path: AppPath,
}

impl SimpleNode {
    /// Node `|name` of type `type_name`.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let name = name.into();
        let app_path = AppPath::new([PathSegment::new(RunTimeId::DCC, '|', [name.as_str()])]);
        Self {
            hash_code: hash_name(&app_path.to_string()),
            type_name: type_name.into(),
            unique_name: true,
            app_path,
            name,
        }
    }

    /// Place the node at `app_path`. The hash code follows the path.
    pub fn with_app_path(mut self, app_path: AppPath) -> Self {
        self.hash_code = hash_name(&app_path.to_string());
        self.app_path = app_path;
        self
    }

    pub fn with_unique_name(mut self, unique: bool) -> Self {
        self.unique_name = unique;
        self
    }
}

fn hash_name(s: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish().max(1)
}

impl DccNode for SimpleNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn has_unique_name(&self) -> bool {
        self.unique_name
    }

    fn hash_code(&self) -> u64 {
        self.hash_code
    }

    fn app_path(&self) -> AppPath {
        self.app_path.clone()
    }
}
