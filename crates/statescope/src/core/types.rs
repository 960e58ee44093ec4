//! Core type definitions for the state model
//!
//! This module contains the fundamental types used throughout statescope:
//! entity handles, leaf and group kinds, entities, links and source locations.

use std::fmt;

use super::quark::QuarkId;

/// Opaque source position attached to builder events for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, PartialOrd, Ord)]
pub struct LineLocation {
    /// 1-based line number
    pub line: usize,
    /// 1-based column number
    pub column: usize,
}

impl LineLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Location at the first column of a line
    pub fn line(line: usize) -> Self {
        Self { line, column: 1 }
    }
}

impl fmt::Display for LineLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Handle to an entity owned by an [`EntityStore`](super::EntityStore)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) usize);

impl EntityId {
    /// Position of the entity in creation order
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Kind of an atomic (non-container) entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum LeafType {
    /// A regular, user-declared state
    #[default]
    State,
    /// Initial pseudo-state `[*]` on the source side of a transition
    Start,
    /// Final pseudo-state `[*]` on the target side of a transition
    End,
    /// Shallow history pseudo-state `[H]`
    History,
    /// Deep history pseudo-state `[H*]`
    DeepHistory,
}

impl fmt::Display for LeafType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafType::State => write!(f, "state"),
            LeafType::Start => write!(f, "start"),
            LeafType::End => write!(f, "end"),
            LeafType::History => write!(f, "history"),
            LeafType::DeepHistory => write!(f, "deep-history"),
        }
    }
}

/// Kind of a container entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupType {
    /// The implicit top-level container of a diagram
    Root,
    /// A composite state
    State,
    /// Synthetic wrapper for one region of a split composite state
    ConcurrentState,
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupType::Root => write!(f, "root"),
            GroupType::State => write!(f, "composite"),
            GroupType::ConcurrentState => write!(f, "concurrent"),
        }
    }
}

/// What an entity is: a leaf with its kind, or a group with its kind and
/// the concurrent separators recorded while it was open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    Leaf(LeafType),
    Group {
        group_type: GroupType,
        concurrent_separators: Vec<char>,
    },
}

impl EntityKind {
    pub fn group(group_type: GroupType) -> Self {
        EntityKind::Group {
            group_type,
            concurrent_separators: Vec::new(),
        }
    }
}

/// A diagram node: a state, a pseudo-state marker, or a container
///
/// The parent container is not stored here; it is derived from the
/// namespace tree by [`StateDatabase::parent_container`](crate::plugins::state::StateDatabase::parent_container).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub(crate) id: EntityId,
    pub(crate) quark: QuarkId,
    pub(crate) name: String,
    pub(crate) kind: EntityKind,
    pub(crate) display: Vec<String>,
    pub(crate) description: Vec<String>,
    pub(crate) location: Option<LineLocation>,
}

impl Entity {
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Namespace node holding this entity
    pub fn quark(&self) -> QuarkId {
        self.quark
    }

    /// Last identifier segment (the short name)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Display lines; empty for pseudo-states and regions
    pub fn display(&self) -> &[String] {
        &self.display
    }

    /// Body lines added with `Id : text`
    pub fn description(&self) -> &[String] {
        &self.description
    }

    /// Where the entity was first created, if known
    pub fn location(&self) -> Option<LineLocation> {
        self.location
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, EntityKind::Group { .. })
    }

    pub fn is_root(&self) -> bool {
        self.group_type() == Some(GroupType::Root)
    }

    pub fn leaf_type(&self) -> Option<LeafType> {
        match self.kind {
            EntityKind::Leaf(leaf_type) => Some(leaf_type),
            EntityKind::Group { .. } => None,
        }
    }

    pub fn group_type(&self) -> Option<GroupType> {
        match self.kind {
            EntityKind::Leaf(_) => None,
            EntityKind::Group { group_type, .. } => Some(group_type),
        }
    }

    /// Returns true for concurrent region wrappers
    pub fn is_concurrent(&self) -> bool {
        self.group_type() == Some(GroupType::ConcurrentState)
    }

    /// Separator characters recorded on a group (always empty for leaves)
    pub fn concurrent_separators(&self) -> &[char] {
        match &self.kind {
            EntityKind::Leaf(_) => &[],
            EntityKind::Group {
                concurrent_separators,
                ..
            } => concurrent_separators,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EntityKind::Leaf(leaf_type) => write!(f, "{} ({})", self.name, leaf_type),
            EntityKind::Group { group_type, .. } => write!(f, "{} ({})", self.name, group_type),
        }
    }
}

/// A transition between two entities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Source entity
    pub entity1: EntityId,
    /// Target entity
    pub entity2: EntityId,
    /// Optional transition label
    pub label: Option<String>,
    /// Where the link was declared
    pub location: Option<LineLocation>,
}

impl Link {
    pub fn new(entity1: EntityId, entity2: EntityId) -> Self {
        Self {
            entity1,
            entity2,
            label: None,
            location: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn at(mut self, location: LineLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Returns true if both ends are the same entity
    pub fn is_self_loop(&self) -> bool {
        self.entity1 == self.entity2
    }
}
