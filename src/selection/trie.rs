//! Prefix tree keyed by application path components.

use std::collections::BTreeMap;

use super::app_path::AppPath;
use crate::util::Token;

type Key = (usize, Token);

struct TrieNode<T> {
    children: BTreeMap<Key, TrieNode<T>>,
    data: Option<T>,
}

impl<T> Default for TrieNode<T> {
    fn default() -> Self {
        Self { children: BTreeMap::new(), data: None }
    }
}

impl<T> TrieNode<T> {
    fn is_prunable(&self) -> bool {
        self.data.is_none() && self.children.is_empty()
    }

    fn remove(&mut self, keys: &[Key]) -> Option<T> {
        match keys.split_first() {
            None => self.data.take(),
            Some((first, rest)) => {
                let child = self.children.get_mut(first)?;
                let removed = child.remove(rest);
                if child.is_prunable() {
                    self.children.remove(first);
                }
                removed
            }
        }
    }
}

/// Maps application path prefixes to values.
///
/// Nodes without data are pruned on removal, so an existing node always
/// has data at or below it.
pub struct AppPathTrie<T> {
    root: TrieNode<T>,
}

impl<T> Default for AppPathTrie<T> {
    fn default() -> Self {
        Self { root: TrieNode::default() }
    }
}

fn keys(path: &AppPath) -> Vec<Key> {
    path.keyed_components().map(|(i, c)| (i, c.clone())).collect()
}

impl<T> AppPathTrie<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, path: &AppPath) -> Option<&TrieNode<T>> {
        let mut node = &self.root;
        for key in keys(path) {
            node = node.children.get(&key)?;
        }
        Some(node)
    }

    pub fn insert(&mut self, path: &AppPath, data: T) {
        let mut node = &mut self.root;
        for key in keys(path) {
            node = node.children.entry(key).or_default();
        }
        node.data = Some(data);
    }

    pub fn remove(&mut self, path: &AppPath) -> Option<T> {
        self.root.remove(&keys(path))
    }

    pub fn get(&self, path: &AppPath) -> Option<&T> {
        self.node(path)?.data.as_ref()
    }

    /// True if `path` or one of its descendants has data.
    pub fn contains_descendant_inclusive(&self, path: &AppPath) -> bool {
        self.node(path).is_some_and(|n| !n.is_prunable())
    }

    /// True if a strict ancestor of `path` has data.
    pub fn contains_ancestor(&self, path: &AppPath) -> bool {
        let keys = keys(path);
        let Some((_, parents)) = keys.split_last() else {
            return false;
        };
        let mut node = &self.root;
        if node.data.is_some() {
            return true;
        }
        for key in parents {
            match node.children.get(key) {
                Some(child) => node = child,
                None => return false,
            }
            if node.data.is_some() {
                return true;
            }
        }
        false
    }

    /// Data of the closest node with data on the walk from the root to
    /// `path`, inclusive.
    pub fn find_ancestor_inclusive(&self, path: &AppPath) -> Option<&T> {
        let mut node = &self.root;
        let mut found = node.data.as_ref();
        for key in keys(path) {
            match node.children.get(&key) {
                Some(child) => node = child,
                None => break,
            }
            if node.data.is_some() {
                found = node.data.as_ref();
            }
        }
        found
    }
}
