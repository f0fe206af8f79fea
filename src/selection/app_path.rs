//! Application (DCC) paths.
//!
//! An application path is a chain of segments, one per runtime the path
//! crosses (e.g. a DAG segment `|world|stage|stageShape` followed by a USD
//! segment `/Cube`). Each segment carries its runtime id and separator.
//! Unlike scene paths, components may be numeric: point instance indices
//! are appended as a trailing numeric component.

use std::fmt;

use smallvec::SmallVec;

use crate::util::Token;

/// Identifies the runtime (data model) a path segment belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunTimeId(pub u32);

impl RunTimeId {
    pub const INVALID: Self = Self(0);
    /// DCC-native objects.
    pub const DCC: Self = Self(1);
    /// USD stage objects.
    pub const USD: Self = Self(2);
}

/// One runtime-local segment of an [`AppPath`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathSegment {
    rtid: RunTimeId,
    separator: char,
    components: SmallVec<[Token; 4]>,
}

impl PathSegment {
    pub fn new<I, T>(rtid: RunTimeId, separator: char, components: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        Self { rtid, separator, components: components.into_iter().map(Into::into).collect() }
    }

    /// Split `s` on `separator`, ignoring empty components.
    pub fn parse(rtid: RunTimeId, separator: char, s: &str) -> Self {
        Self::new(rtid, separator, s.split(separator).filter(|c| !c.is_empty()))
    }

    #[inline]
    pub fn rtid(&self) -> RunTimeId {
        self.rtid
    }

    #[inline]
    pub fn separator(&self) -> char {
        self.separator
    }

    #[inline]
    pub fn components(&self) -> &[Token] {
        &self.components
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn starts_with(&self, prefix: &PathSegment) -> bool {
        self.rtid == prefix.rtid
            && self.separator == prefix.separator
            && self.components.len() >= prefix.components.len()
            && self.components[..prefix.components.len()] == prefix.components[..]
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.components {
            write!(f, "{}{}", self.separator, c)?;
        }
        Ok(())
    }
}

/// Multi-segment application path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AppPath {
    segments: SmallVec<[PathSegment; 2]>,
}

impl AppPath {
    pub fn new(segments: impl IntoIterator<Item = PathSegment>) -> Self {
        Self { segments: segments.into_iter().collect() }
    }

    /// The empty path.
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    pub fn nb_segments(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Runtime of the last segment.
    pub fn run_time_id(&self) -> RunTimeId {
        self.segments.last().map(PathSegment::rtid).unwrap_or(RunTimeId::INVALID)
    }

    /// Last component of the last segment.
    pub fn last_component(&self) -> Option<&Token> {
        self.segments.last().and_then(|s| s.components.last())
    }

    /// Path with an extra segment.
    pub fn append_segment(&self, segment: PathSegment) -> Self {
        let mut out = self.clone();
        out.segments.push(segment);
        out
    }

    /// Path with an extra component in its last segment.
    pub fn append_component(&self, name: impl Into<Token>) -> Self {
        let mut out = self.clone();
        if let Some(last) = out.segments.last_mut() {
            last.components.push(name.into());
        }
        out
    }

    /// Parent path. A segment left empty is dropped.
    pub fn pop(&self) -> Self {
        let mut out = self.clone();
        if let Some(last) = out.segments.last_mut() {
            last.components.pop();
            if last.components.is_empty() {
                out.segments.pop();
            }
        }
        out
    }

    /// True if `prefix` is this path or an ancestor of it.
    ///
    /// The empty path is a prefix of every path.
    pub fn starts_with(&self, prefix: &AppPath) -> bool {
        let n = prefix.segments.len();
        if n == 0 {
            return true;
        }
        if n > self.segments.len() {
            return false;
        }
        self.segments[..n - 1] == prefix.segments[..n - 1] && self.segments[n - 1].starts_with(&prefix.segments[n - 1])
    }

    /// Components of every segment, tagged with their segment index.
    pub fn keyed_components(&self) -> impl Iterator<Item = (usize, &Token)> + '_ {
        self.segments
            .iter()
            .enumerate()
            .flat_map(|(i, s)| s.components.iter().map(move |c| (i, c)))
    }
}

impl fmt::Display for AppPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, s) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{s}")?;
        }
        Ok(())
    }
}

/// Ordered application selection without duplicates.
///
/// The last item is the lead object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppSelection {
    items: Vec<AppPath>,
}

impl AppSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path`, returns false if already present.
    pub fn append(&mut self, path: AppPath) -> bool {
        if self.items.contains(&path) {
            return false;
        }
        self.items.push(path);
        true
    }

    pub fn remove(&mut self, path: &AppPath) -> bool {
        let before = self.items.len();
        self.items.retain(|p| p != path);
        before != self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn contains(&self, path: &AppPath) -> bool {
        self.items.contains(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppPath> {
        self.items.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Most recently appended item.
    pub fn back(&self) -> Option<&AppPath> {
        self.items.last()
    }
}

impl FromIterator<AppPath> for AppSelection {
    fn from_iter<I: IntoIterator<Item = AppPath>>(iter: I) -> Self {
        let mut s = Self::new();
        for p in iter {
            s.append(p);
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dag(s: &str) -> PathSegment {
        PathSegment::parse(RunTimeId::DCC, '|', s)
    }

    fn usd(s: &str) -> PathSegment {
        PathSegment::parse(RunTimeId::USD, '/', s)
    }

    #[test]
    fn test_display() {
        let p = AppPath::new([dag("|world|stage|stageShape"), usd("/Cube")]);
        assert_eq!(p.to_string(), "|world|stage|stageShape,/Cube");
        assert_eq!(p.run_time_id(), RunTimeId::USD);
        assert_eq!(p.append_component("7").to_string(), "|world|stage|stageShape,/Cube/7");
    }

    #[test]
    fn test_starts_with() {
        let stage = AppPath::new([dag("|world|stage|stageShape")]);
        let cube = stage.append_segment(usd("/Cube"));
        assert!(cube.starts_with(&stage));
        assert!(cube.starts_with(&cube));
        assert!(!stage.starts_with(&cube));
        let other = AppPath::new([dag("|world|stage2")]);
        assert!(!cube.starts_with(&other));
        assert_eq!(cube.pop(), stage);
    }

    #[test]
    fn test_selection_order() {
        let a = AppPath::new([dag("|a")]);
        let b = AppPath::new([dag("|b")]);
        let mut s: AppSelection = [a.clone(), b.clone(), a.clone()].into_iter().collect();
        assert_eq!(s.len(), 2);
        assert_eq!(s.back(), Some(&b));
        assert!(s.remove(&b));
        assert_eq!(s.back(), Some(&a));
    }
}
