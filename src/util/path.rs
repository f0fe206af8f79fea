//! Hierarchical scene paths.
//!
//! [`ScenePath`] is used both for scene index paths (the composed namespace
//! seen by the renderer) and for data-model paths local to one producer
//! (e.g. one USD stage). Both are absolute, `/`-separated identifier
//! sequences.
//!
//! Ordering is lexicographic over components, so every descendant of a path
//! sorts directly after it and before its next sibling. Ordered maps keyed
//! by `ScenePath` can therefore answer subtree queries with a range scan.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use super::error::{Error, Result};
use super::token::Token;

type Components = SmallVec<[Token; 6]>;

/// Absolute hierarchical path, or the empty path.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScenePath {
    // None is the empty path, Some([]) the absolute root.
    elems: Option<Components>,
}

impl ScenePath {
    /// The empty (invalid) path.
    pub const fn empty() -> Self {
        Self { elems: None }
    }

    /// The absolute root path `/`.
    pub fn absolute_root() -> Self {
        Self { elems: Some(SmallVec::new()) }
    }

    /// Parse an absolute path such as `/World/Cube`.
    ///
    /// The empty string parses to the empty path. Every component must be a
    /// valid identifier (see [`is_valid_identifier`]).
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Self::empty());
        }
        let rest = s
            .strip_prefix('/')
            .ok_or_else(|| Error::invalid(format!("'{s}' is not absolute")))?;
        let mut elems = Components::new();
        if rest.is_empty() {
            return Ok(Self { elems: Some(elems) });
        }
        for component in rest.split('/') {
            if !is_valid_identifier(component) {
                return Err(Error::InvalidIdentifier(component.to_string()));
            }
            elems.push(Token::from(component));
        }
        Ok(Self { elems: Some(elems) })
    }

    /// Build a path from components without validation.
    pub fn from_components<I, T>(components: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        Self { elems: Some(components.into_iter().map(Into::into).collect()) }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elems.is_none()
    }

    #[inline]
    pub fn is_absolute_root(&self) -> bool {
        matches!(&self.elems, Some(e) if e.is_empty())
    }

    /// Number of components below the root (0 for root and empty paths).
    #[inline]
    pub fn element_count(&self) -> usize {
        self.components().len()
    }

    /// Components below the root.
    #[inline]
    pub fn components(&self) -> &[Token] {
        self.elems.as_deref().unwrap_or(&[])
    }

    /// Final component, empty for root and empty paths.
    pub fn name(&self) -> &str {
        self.components().last().map(Token::as_str).unwrap_or("")
    }

    /// Parent path. The root's parent is the empty path.
    pub fn parent(&self) -> Self {
        match &self.elems {
            Some(e) if !e.is_empty() => {
                let mut p = e.clone();
                p.pop();
                Self { elems: Some(p) }
            }
            _ => Self::empty(),
        }
    }

    /// Append one child component. The empty path stays empty.
    pub fn append_child(&self, name: impl Into<Token>) -> Self {
        match &self.elems {
            Some(e) => {
                let mut p = e.clone();
                p.push(name.into());
                Self { elems: Some(p) }
            }
            None => Self::empty(),
        }
    }

    /// Append components (e.g. a path relative to a prefix).
    pub fn append_components(&self, components: &[Token]) -> Self {
        match &self.elems {
            Some(e) => {
                let mut p = e.clone();
                p.extend(components.iter().cloned());
                Self { elems: Some(p) }
            }
            None => Self::empty(),
        }
    }

    /// Append the components of another absolute path, treating it as
    /// relative to `self`.
    pub fn append_path(&self, other: &ScenePath) -> Self {
        self.append_components(other.components())
    }

    /// Replace the final component.
    pub fn replace_name(&self, name: impl Into<Token>) -> Self {
        if self.element_count() == 0 {
            return self.clone();
        }
        self.parent().append_child(name)
    }

    /// True if `prefix` equals this path or is one of its ancestors.
    ///
    /// Empty paths are never prefixes and never have prefixes.
    pub fn has_prefix(&self, prefix: &ScenePath) -> bool {
        match (&self.elems, &prefix.elems) {
            (Some(e), Some(p)) => e.len() >= p.len() && e[..p.len()] == p[..],
            _ => false,
        }
    }

    /// Components of `self` below `prefix`, if `prefix` is an ancestor
    /// (inclusive).
    pub fn strip_prefix(&self, prefix: &ScenePath) -> Option<&[Token]> {
        if self.has_prefix(prefix) {
            Some(&self.components()[prefix.element_count()..])
        } else {
            None
        }
    }

    /// Replace `old` with `new` if `old` is a prefix, else return a copy.
    pub fn replace_prefix(&self, old: &ScenePath, new: &ScenePath) -> Self {
        match self.strip_prefix(old) {
            Some(rest) => new.append_components(rest),
            None => self.clone(),
        }
    }

    /// Path truncated to at most `depth` components.
    pub fn truncate(&self, depth: usize) -> Self {
        match &self.elems {
            Some(e) if e.len() > depth => Self { elems: Some(e[..depth].iter().cloned().collect()) },
            _ => self.clone(),
        }
    }

    /// All ancestor paths from depth 1 down to `self` inclusive.
    pub fn prefixes(&self) -> Vec<ScenePath> {
        (1..=self.element_count()).map(|d| self.truncate(d)).collect()
    }
}

impl FromStr for ScenePath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ScenePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.elems {
            None => Ok(()),
            Some(e) if e.is_empty() => f.write_str("/"),
            Some(e) => {
                for c in e {
                    write!(f, "/{c}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for ScenePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScenePath({:?})", self.to_string())
    }
}

/// True if `s` is a legal path component: a letter or underscore followed
/// by letters, digits or underscores.
///
/// Purely numeric components are therefore illegal in scene paths; they
/// only appear in application paths (point instance indices).
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Turn an arbitrary DCC node name into a legal path component.
pub fn sanitize_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
