//! Core database trait and entity storage
//!
//! [`Database`] is the read/write surface a diagram model exposes to its
//! driver. [`EntityStore`] is the arena that owns every entity and link of
//! one diagram.

use anyhow::Result;

use super::quark::QuarkId;
use super::types::{Entity, EntityId, EntityKind, LineLocation, Link};

/// Core trait for diagram databases
///
/// Each diagram type implements this with its own node and edge types.
/// Nodes are created by the diagram's own resolution rules, so only edges
/// are added through the trait.
pub trait Database: Send + Sync {
    /// The node data type for this database
    type Node: Clone + Send + Sync;

    /// The edge data type for this database
    type Edge: Clone + Send + Sync;

    /// Add an edge to the database
    fn add_edge(&mut self, edge: Self::Edge) -> Result<()>;

    /// Get a node by its qualified name
    fn get_node(&self, id: &str) -> Option<&Self::Node>;

    /// Iterate over all nodes
    fn nodes(&self) -> impl Iterator<Item = &Self::Node>;

    /// Iterate over all edges
    fn edges(&self) -> impl Iterator<Item = &Self::Edge>;

    /// Clear all data from the database
    fn clear(&mut self);

    /// Get the number of nodes
    fn node_count(&self) -> usize;

    /// Get the number of edges
    fn edge_count(&self) -> usize;
}

/// Arena owning the entities and links of one diagram
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    entities: Vec<Entity>,
    links: Vec<Link>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new entity bound to `quark`
    pub fn create(
        &mut self,
        quark: QuarkId,
        name: impl Into<String>,
        kind: EntityKind,
        display: Vec<String>,
        location: Option<LineLocation>,
    ) -> EntityId {
        let id = EntityId(self.entities.len());
        self.entities.push(Entity {
            id,
            quark,
            name: name.into(),
            kind,
            display,
            description: Vec::new(),
            location,
        });
        id
    }

    pub fn get(&self, id: EntityId) -> &Entity {
        &self.entities[id.0]
    }

    pub fn get_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.0]
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }

    /// Links in insertion order
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Number of entities, the root group included
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}
