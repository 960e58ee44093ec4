//! Hierarchical namespace tree
//!
//! A [`QuarkTree`] maps identifier paths such as `a.b.c` to nodes ("quarks").
//! Nodes are created lazily the first time a path is looked up and are never
//! removed. Each node may carry one payload; once set, it is never replaced.
//!
//! Nodes live in an arena and refer to each other by [`QuarkId`], so parent
//! and child links never alias.

use std::collections::HashMap;
use std::fmt;

/// Handle to a node in a [`QuarkTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuarkId(usize);

impl fmt::Display for QuarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct QuarkNode<T> {
    name: String,
    parent: Option<QuarkId>,
    children: HashMap<String, QuarkId>,
    order: Vec<QuarkId>,
    data: Option<T>,
}

impl<T> QuarkNode<T> {
    fn new(name: String, parent: Option<QuarkId>) -> Self {
        Self {
            name,
            parent,
            children: HashMap::new(),
            order: Vec::new(),
            data: None,
        }
    }
}

/// Arena-backed trie of identifier segments
#[derive(Debug, Clone)]
pub struct QuarkTree<T> {
    nodes: Vec<QuarkNode<T>>,
    separator: Option<String>,
}

/// Normalize a raw identifier: trim whitespace and strip one pair of
/// surrounding double quotes
///
/// ```
/// use statescope::core::clean_id;
///
/// assert_eq!(clean_id("  \"Long Name\" "), "Long Name");
/// assert_eq!(clean_id("Idle"), "Idle");
/// ```
pub fn clean_id(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}

impl<T> QuarkTree<T> {
    /// Create a tree with only the root node
    pub fn new(separator: Option<&str>) -> Self {
        Self {
            nodes: vec![QuarkNode::new(String::new(), None)],
            separator: separator.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }

    pub fn root(&self) -> QuarkId {
        QuarkId(0)
    }

    pub fn separator(&self) -> Option<&str> {
        self.separator.as_deref()
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Last path segment of the node (empty for the root)
    pub fn name(&self, id: QuarkId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn parent(&self, id: QuarkId) -> Option<QuarkId> {
        self.nodes[id.0].parent
    }

    /// Children in creation order
    pub fn children(&self, id: QuarkId) -> &[QuarkId] {
        &self.nodes[id.0].order
    }

    pub fn data(&self, id: QuarkId) -> Option<&T> {
        self.nodes[id.0].data.as_ref()
    }

    /// Attach a payload to an empty node
    ///
    /// Returns false and leaves the node untouched if it already carries one.
    pub fn set_data(&mut self, id: QuarkId, data: T) -> bool {
        let node = &mut self.nodes[id.0];
        if node.data.is_some() {
            return false;
        }
        node.data = Some(data);
        true
    }

    /// Split a path into its non-empty segments
    pub fn segments<'a>(&self, path: &'a str) -> Vec<&'a str> {
        match self.separator.as_deref() {
            Some(sep) => path.split(sep).filter(|s| !s.is_empty()).collect(),
            None if path.is_empty() => Vec::new(),
            None => vec![path],
        }
    }

    /// Get or create the direct child named `segment`
    pub fn child(&mut self, parent: QuarkId, segment: &str) -> QuarkId {
        if let Some(&existing) = self.nodes[parent.0].children.get(segment) {
            return existing;
        }
        let id = QuarkId(self.nodes.len());
        self.nodes
            .push(QuarkNode::new(segment.to_string(), Some(parent)));
        let node = &mut self.nodes[parent.0];
        node.children.insert(segment.to_string(), id);
        node.order.push(id);
        id
    }

    /// Get or create every node along `path` below `from`
    pub fn child_path(&mut self, from: QuarkId, path: &str) -> QuarkId {
        let segments: Vec<String> = self.segments(path).into_iter().map(str::to_string).collect();
        segments
            .iter()
            .fold(from, |current, segment| self.child(current, segment))
    }

    /// Look up `path` below `from` without creating anything
    pub fn find_path(&self, from: QuarkId, path: &str) -> Option<QuarkId> {
        self.segments(path)
            .into_iter()
            .try_fold(from, |current, segment| {
                self.nodes[current.0].children.get(segment).copied()
            })
    }

    /// Nodes carrying a payload whose trailing segments equal `path`
    pub fn find_by_tail(&self, path: &str) -> Vec<QuarkId> {
        let segments = self.segments(path);
        if segments.is_empty() {
            return Vec::new();
        }
        (1..self.nodes.len())
            .map(QuarkId)
            .filter(|&id| self.nodes[id.0].data.is_some())
            .filter(|&id| self.ends_with(id, &segments))
            .collect()
    }

    fn ends_with(&self, id: QuarkId, segments: &[&str]) -> bool {
        let mut current = Some(id);
        for segment in segments.iter().rev() {
            match current {
                Some(node) if node != self.root() && self.nodes[node.0].name == *segment => {
                    current = self.nodes[node.0].parent;
                }
                _ => return false,
            }
        }
        true
    }

    /// Ancestors from the direct parent up to the root
    pub fn ancestors(&self, id: QuarkId) -> impl Iterator<Item = QuarkId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Number of edges between the node and the root
    pub fn depth(&self, id: QuarkId) -> usize {
        self.ancestors(id).count()
    }

    /// Full path of the node joined with the separator (empty for the root)
    pub fn qualified_name(&self, id: QuarkId) -> String {
        let mut names: Vec<&str> = std::iter::once(id)
            .chain(self.ancestors(id))
            .filter(|&q| q != self.root())
            .map(|q| self.name(q))
            .collect();
        names.reverse();
        names.join(self.separator.as_deref().unwrap_or(""))
    }
}
