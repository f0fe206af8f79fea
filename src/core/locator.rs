//! Data source locators and locator sets.
//!
//! A locator addresses a nested field inside a prim's container data source
//! (e.g. `displayStyle/reprSelector`). Dirty notifications carry a
//! [`LocatorSet`] describing which fields changed.

use std::fmt;

use smallvec::SmallVec;

use crate::util::Token;

/// Path of field names into a container data source.
///
/// The empty locator addresses the whole prim.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataSourceLocator(SmallVec<[Token; 4]>);

impl DataSourceLocator {
    /// The empty locator.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a locator from field names.
    pub fn new<I, T>(names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn elements(&self) -> &[Token] {
        &self.0
    }

    #[inline]
    pub fn first(&self) -> Option<&Token> {
        self.0.first()
    }

    /// Locator with `name` appended.
    pub fn append(&self, name: impl Into<Token>) -> Self {
        let mut l = self.0.clone();
        l.push(name.into());
        Self(l)
    }

    /// Locator without its first element.
    pub fn remove_first(&self) -> Self {
        Self(self.0.iter().skip(1).cloned().collect())
    }

    /// True if `prefix` equals this locator or is one of its ancestors.
    pub fn has_prefix(&self, prefix: &DataSourceLocator) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// True if either locator is a prefix of the other.
    pub fn intersects(&self, other: &DataSourceLocator) -> bool {
        self.has_prefix(other) || other.has_prefix(self)
    }
}

impl fmt::Debug for DataSourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.0.iter().map(Token::as_str).collect();
        write!(f, "Locator({})", parts.join("/"))
    }
}

/// Normalized set of locators: no member is a prefix of another.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LocatorSet {
    locators: SmallVec<[DataSourceLocator; 2]>,
}

impl LocatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set containing a single locator.
    pub fn from_locator(locator: DataSourceLocator) -> Self {
        let mut s = Self::new();
        s.insert(locator);
        s
    }

    /// Set addressing the entire prim.
    pub fn universal() -> Self {
        Self::from_locator(DataSourceLocator::empty())
    }

    /// Insert a locator, dropping members it covers.
    pub fn insert(&mut self, locator: DataSourceLocator) {
        if self.contains(&locator) {
            return;
        }
        self.locators.retain(|l| !l.has_prefix(&locator));
        self.locators.push(locator);
        self.locators.sort();
    }

    /// Insert every locator of `other`.
    pub fn union(&mut self, other: &LocatorSet) {
        for l in other.iter() {
            self.insert(l.clone());
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataSourceLocator> {
        self.locators.iter()
    }

    /// True if some member is a prefix of (covers) `locator`.
    pub fn contains(&self, locator: &DataSourceLocator) -> bool {
        self.locators.iter().any(|l| locator.has_prefix(l))
    }

    /// True if some member intersects `locator`.
    pub fn intersects(&self, locator: &DataSourceLocator) -> bool {
        self.locators.iter().any(|l| l.intersects(locator))
    }

    /// True if any member intersects any member of `other`.
    pub fn intersects_set(&self, other: &LocatorSet) -> bool {
        other.iter().any(|l| self.intersects(l))
    }
}

impl FromIterator<DataSourceLocator> for LocatorSet {
    fn from_iter<I: IntoIterator<Item = DataSourceLocator>>(iter: I) -> Self {
        let mut s = Self::new();
        for l in iter {
            s.insert(l);
        }
        s
    }
}

impl fmt::Debug for LocatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.locators.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_set_normalizes() {
        let mut s = LocatorSet::new();
        s.insert(DataSourceLocator::new(["primvars", "displayColor"]));
        s.insert(DataSourceLocator::new(["primvars"]));
        assert_eq!(s.iter().count(), 1);
        s.insert(DataSourceLocator::new(["primvars", "points"]));
        assert_eq!(s.iter().count(), 1);
    }

    #[test]
    fn test_intersects() {
        let s = LocatorSet::from_locator(DataSourceLocator::new(["displayStyle", "reprSelector"]));
        assert!(s.intersects(&DataSourceLocator::new(["displayStyle"])));
        assert!(!s.intersects(&DataSourceLocator::new(["displayStyle", "refineLevel"])));
        assert!(LocatorSet::universal().intersects(&DataSourceLocator::new(["anything"])));
    }
}
