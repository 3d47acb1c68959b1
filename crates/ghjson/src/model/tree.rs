//! Path-addressed multi-branch collections.
//!
//! A [`DataTree`] maps [`GhPath`]s to ordered branches of optional items.
//! Branches keep insertion order and item order is positional data.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;

use crate::error::PathParseError;
use crate::limits::MAX_PATH_DEPTH;

/// Ordered tuple of non-negative indices identifying a branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GhPath(Vec<u32>);

impl GhPath {
    /// Creates a path from its indices.
    pub fn new(indices: impl Into<Vec<u32>>) -> Self {
        Self(indices.into())
    }

    /// The empty path `{}`.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn indices(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a copy with `index` appended.
    pub fn append(&self, index: u32) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Key of the item at `index` within this branch, e.g. `{0;1}(2)`.
    pub fn item_key(&self, index: usize) -> String {
        format!("{}({})", self, index)
    }

    /// Splits an item key into its path text and index.
    ///
    /// Returns `None` for the index when the key carries no `(i)` suffix.
    pub fn split_item_key(key: &str) -> (&str, Option<usize>) {
        let trimmed = key.trim_end();
        if let Some(body) = trimmed.strip_suffix(')') {
            if let Some(open) = body.rfind('(') {
                let digits = &body[open + 1..];
                if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                    if let Ok(index) = digits.parse::<usize>() {
                        return (&trimmed[..open], Some(index));
                    }
                }
            }
        }
        (trimmed, None)
    }
}

impl From<Vec<u32>> for GhPath {
    fn from(indices: Vec<u32>) -> Self {
        Self(indices)
    }
}

impl From<&[u32]> for GhPath {
    fn from(indices: &[u32]) -> Self {
        Self(indices.to_vec())
    }
}

impl fmt::Display for GhPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}", index)?;
        }
        f.write_str("}")
    }
}

impl FromStr for GhPath {
    type Err = PathParseError;

    /// Parses `{a;b;c}`, ignoring any `(i)` item suffixes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| PathParseError {
            input: s.to_string(),
            reason,
        };

        // Strip every trailing "(digits)" group
        let mut text = s.trim();
        loop {
            let (head, index) = GhPath::split_item_key(text);
            if index.is_none() {
                break;
            }
            text = head.trim_end();
        }

        let inner = text
            .strip_prefix('{')
            .and_then(|t| t.strip_suffix('}'))
            .ok_or_else(|| err("missing braces"))?
            .trim();

        if inner.is_empty() {
            return Ok(GhPath::empty());
        }

        let mut indices = Vec::new();
        for part in inner.split(';') {
            if indices.len() >= MAX_PATH_DEPTH {
                return Err(err("path too deep"));
            }
            let part = part.trim();
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err("index is not a non-negative integer"));
            }
            let index = part.parse::<u32>().map_err(|_| err("index out of range"))?;
            indices.push(index);
        }
        Ok(GhPath(indices))
    }
}

/// One branch of a data tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch<T> {
    pub path: GhPath,
    pub items: Vec<Option<T>>,
}

/// Sparse, path-addressed collection of ordered branches.
#[derive(Debug, Clone)]
pub struct DataTree<T> {
    branches: Vec<Branch<T>>,
    index: FxHashMap<GhPath, usize>,
}

impl<T> Default for DataTree<T> {
    fn default() -> Self {
        Self {
            branches: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<T: PartialEq> PartialEq for DataTree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.branches == other.branches
    }
}

impl<T> DataTree<T> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a single-branch tree at `{0}` from a flat list.
    pub fn from_list(items: impl IntoIterator<Item = T>) -> Self {
        let mut tree = Self::new();
        tree.insert_branch(GhPath::new(vec![0]), items.into_iter().map(Some).collect());
        tree
    }

    /// Returns the branch at `path`, creating an empty one if missing.
    pub fn branch_mut(&mut self, path: GhPath) -> &mut Vec<Option<T>> {
        let slot = match self.index.get(&path) {
            Some(&slot) => slot,
            None => {
                let slot = self.branches.len();
                self.index.insert(path.clone(), slot);
                self.branches.push(Branch { path, items: Vec::new() });
                slot
            }
        };
        &mut self.branches[slot].items
    }

    /// Replaces (or creates) the branch at `path`.
    pub fn insert_branch(&mut self, path: GhPath, items: Vec<Option<T>>) {
        *self.branch_mut(path) = items;
    }

    /// Appends an item to the branch at `path`.
    pub fn append(&mut self, path: GhPath, item: T) {
        self.branch_mut(path).push(Some(item));
    }

    /// Appends a null placeholder to the branch at `path`.
    pub fn append_null(&mut self, path: GhPath) {
        self.branch_mut(path).push(None);
    }

    /// Returns the items at `path`.
    pub fn branch(&self, path: &GhPath) -> Option<&[Option<T>]> {
        self.index
            .get(path)
            .map(|&slot| self.branches[slot].items.as_slice())
    }

    /// Iterates branches in insertion order.
    pub fn branches(&self) -> impl Iterator<Item = &Branch<T>> {
        self.branches.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &GhPath> {
        self.branches.iter().map(|b| &b.path)
    }

    /// Number of branches.
    pub fn path_count(&self) -> usize {
        self.branches.len()
    }

    /// Number of item slots, nulls included.
    pub fn data_count(&self) -> usize {
        self.branches.iter().map(|b| b.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Iterates all non-null items in branch order.
    pub fn all_items(&self) -> impl Iterator<Item = &T> {
        self.branches
            .iter()
            .flat_map(|b| b.items.iter().filter_map(|i| i.as_ref()))
    }

    /// Maps every item, keeping paths and null placeholders.
    pub fn try_map<U, E>(&self, mut f: impl FnMut(&T) -> Result<U, E>) -> Result<DataTree<U>, E> {
        let mut out = DataTree::new();
        for branch in &self.branches {
            let mut items = Vec::with_capacity(branch.items.len());
            for item in &branch.items {
                items.push(match item {
                    Some(value) => Some(f(value)?),
                    None => None,
                });
            }
            out.insert_branch(branch.path.clone(), items);
        }
        Ok(out)
    }
}
