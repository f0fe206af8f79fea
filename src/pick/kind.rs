//! Model kind hierarchy.

use std::collections::HashMap;

use crate::util::Token;

pub const MODEL: &str = "model";
pub const COMPONENT: &str = "component";
pub const GROUP: &str = "group";
pub const ASSEMBLY: &str = "assembly";
pub const SUBCOMPONENT: &str = "subcomponent";

/// Kinds and their base kind.
///
/// `component` and `group` are models, `assembly` is a group.
/// `subcomponent` stands alone.
#[derive(Clone, Debug)]
pub struct KindRegistry {
    bases: HashMap<Token, Option<Token>>,
}

impl Default for KindRegistry {
    fn default() -> Self {
        let mut registry = Self { bases: HashMap::new() };
        registry.register(MODEL, None);
        registry.register(COMPONENT, Some(MODEL));
        registry.register(GROUP, Some(MODEL));
        registry.register(ASSEMBLY, Some(GROUP));
        registry.register(SUBCOMPONENT, None);
        registry
    }
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a kind deriving from `base`.
    pub fn register(&mut self, kind: &str, base: Option<&str>) {
        self.bases.insert(Token::from(kind), base.map(Token::from));
    }

    pub fn has_kind(&self, kind: &str) -> bool {
        self.bases.contains_key(kind)
    }

    /// True if `kind` is `base` or derives from it.
    pub fn is_a(&self, kind: &str, base: &str) -> bool {
        let mut current = Some(Token::from(kind));
        let mut depth = 0;
        while let Some(k) = current {
            if k == base {
                return true;
            }
            depth += 1;
            if depth > self.bases.len() {
                return false;
            }
            current = self.bases.get(k.as_str()).cloned().flatten();
        }
        false
    }
}
