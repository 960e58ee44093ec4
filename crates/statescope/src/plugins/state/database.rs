//! State diagram database
//!
//! [`StateDatabase`] is the semantic model of one state diagram. A driver
//! feeds it structural events (resolve an identifier, open or close a group,
//! split into concurrent regions, record a link) and it maintains:
//!
//! - the namespace tree mapping identifier paths to entities,
//! - the entity store holding states, pseudo-states and containers,
//! - the stack of currently open groups.
//!
//! Once every event has been applied, [`StateDatabase::validate_links`]
//! checks that no transition leaves its concurrent region.

use anyhow::{bail, Result};
use tracing::{debug, trace, warn};

use crate::core::{
    clean_id, Database, DiagramError, Entity, EntityId, EntityKind, EntityStore, GroupType,
    LeafType, LineLocation, Link, ModelConfig, QuarkId, QuarkTree, ScopeStack,
};

const START_MARKER: &str = "*start*";
const END_MARKER: &str = "*end*";
const HISTORY_MARKER: &str = "*historical*";
const DEEP_HISTORY_MARKER: &str = "*deephistory*";

/// Semantic model builder for a state diagram
#[derive(Debug, Clone)]
pub struct StateDatabase {
    config: ModelConfig,
    quarks: QuarkTree<EntityId>,
    store: EntityStore,
    scopes: ScopeStack,
    unique_counter: usize,
}

impl Default for StateDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl StateDatabase {
    pub fn new() -> Self {
        Self::with_config(ModelConfig::default())
    }

    pub fn with_config(config: ModelConfig) -> Self {
        let mut quarks = QuarkTree::new(config.separator());
        let mut store = EntityStore::new();
        let root_quark = quarks.root();
        let root = store.create(
            root_quark,
            "",
            EntityKind::group(GroupType::Root),
            Vec::new(),
            None,
        );
        quarks.set_data(root_quark, root);
        Self {
            config,
            quarks,
            store,
            scopes: ScopeStack::new(root),
            unique_counter: 0,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn hide_empty_description(&self) -> bool {
        self.config.hide_empty_description()
    }

    pub fn set_hide_empty_description(&mut self, hide: bool) {
        self.config.set_hide_empty_description(hide);
    }

    /// The root container
    pub fn root(&self) -> EntityId {
        self.scopes.root()
    }

    /// The innermost open group
    pub fn current_group(&self) -> EntityId {
        self.scopes.current()
    }

    /// Number of open groups above the root
    pub fn depth(&self) -> usize {
        self.scopes.depth()
    }

    /// Returns true if [`exit_group`](Self::exit_group) would not underflow
    pub fn can_exit_group(&self) -> bool {
        let needed = if self.entity(self.current_group()).is_concurrent() {
            2
        } else {
            1
        };
        self.depth() >= needed
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        self.store.get(id)
    }

    pub fn quarks(&self) -> &QuarkTree<EntityId> {
        &self.quarks
    }

    /// Entity attached to a namespace node, if any
    pub fn quark_entity(&self, quark: QuarkId) -> Option<EntityId> {
        self.quarks.data(quark).copied()
    }

    pub fn links(&self) -> &[Link] {
        self.store.links()
    }

    /// Full identifier path of an entity
    pub fn qualified_name(&self, id: EntityId) -> String {
        self.quarks.qualified_name(self.entity(id).quark())
    }

    /// Container holding `id`: the entity of its nearest materialized
    /// ancestor in the namespace tree (`None` for the root)
    pub fn parent_container(&self, id: EntityId) -> Option<EntityId> {
        let quark = self.entity(id).quark();
        self.quarks
            .ancestors(quark)
            .find_map(|ancestor| self.quark_entity(ancestor))
    }

    /// Entities directly contained in `group`, in creation order
    pub fn children(&self, group: EntityId) -> Vec<EntityId> {
        self.store
            .entities()
            .iter()
            .map(Entity::id)
            .filter(|&id| id != self.root() && self.parent_container(id) == Some(group))
            .collect()
    }

    /// Nearest enclosing concurrent region of an entity
    pub fn concurrent_ancestor(&self, id: EntityId) -> Option<EntityId> {
        std::iter::successors(self.parent_container(id), |&parent| {
            self.parent_container(parent)
        })
        .find(|&parent| self.entity(parent).is_concurrent())
    }

    fn current_quark(&self) -> QuarkId {
        self.entity(self.current_group()).quark()
    }

    /// Resolve a raw identifier to a namespace node in the current context
    ///
    /// A leading separator anchors the path at the root. Otherwise the
    /// current scope and then its enclosing scopes are searched for an
    /// existing entity; failing that, a unique existing entity anywhere with
    /// the same trailing path is used. If nothing matches, the path is
    /// created below the current scope.
    pub fn quark_in_context(&mut self, id: &str) -> QuarkId {
        let cleaned = clean_id(id);
        let root = self.quarks.root();

        if let Some(absolute) = self
            .config
            .separator()
            .and_then(|sep| cleaned.strip_prefix(sep))
        {
            return self.quarks.child_path(root, absolute);
        }

        let current = self.current_quark();
        let lexical = std::iter::once(current)
            .chain(self.quarks.ancestors(current))
            .filter_map(|scope| self.quarks.find_path(scope, &cleaned))
            .find(|&found| self.quarks.data(found).is_some());
        if let Some(found) = lexical {
            trace!(id = %cleaned, quark = %found, "Resolved identifier in scope");
            return found;
        }

        if let [single] = self.quarks.find_by_tail(&cleaned).as_slice() {
            trace!(id = %cleaned, quark = %single, "Resolved identifier by unique name");
            return *single;
        }

        self.quarks.child_path(current, &cleaned)
    }

    /// Give every payload-less ancestor of `quark` a STATE group
    ///
    /// Walks upwards and stops at the first ancestor that already carries
    /// an entity, or at the namespace root.
    pub fn ensure_ancestors(&mut self, location: LineLocation, quark: QuarkId) {
        let mut current = quark;
        while let Some(parent) = self.quarks.parent(current) {
            if self.quarks.data(parent).is_some() {
                return;
            }
            let name = self.quarks.name(parent).to_string();
            let group = self.store.create(
                parent,
                name.clone(),
                EntityKind::group(GroupType::State),
                vec![name],
                Some(location),
            );
            self.quarks.set_data(parent, group);
            debug!(
                entity = group.index(),
                name = %self.quarks.qualified_name(parent),
                "Created ancestor state"
            );
            current = parent;
        }
    }

    /// Resolve or create a regular state for `id`
    pub fn resolve_state(&mut self, location: LineLocation, id: &str) -> EntityId {
        let quark = self.quark_in_context(id);
        self.resolve_state_at(location, quark)
    }

    /// Resolve or create a regular state at an already resolved node
    pub fn resolve_state_at(&mut self, location: LineLocation, quark: QuarkId) -> EntityId {
        if let Some(existing) = self.quark_entity(quark) {
            return existing;
        }
        self.ensure_ancestors(location, quark);
        let name = self.quarks.name(quark).to_string();
        self.create_leaf(location, quark, LeafType::State, vec![name])
    }

    fn create_leaf(
        &mut self,
        location: LineLocation,
        quark: QuarkId,
        leaf_type: LeafType,
        display: Vec<String>,
    ) -> EntityId {
        let name = self.quarks.name(quark).to_string();
        let leaf = self.store.create(
            quark,
            name,
            EntityKind::Leaf(leaf_type),
            display,
            Some(location),
        );
        self.quarks.set_data(quark, leaf);
        debug!(
            entity = leaf.index(),
            kind = %leaf_type,
            name = %self.quarks.qualified_name(quark),
            "Created leaf"
        );
        leaf
    }

    /// Replace the display lines of an entity
    pub fn set_display(&mut self, id: EntityId, display: Vec<String>) {
        self.store.get_mut(id).display = display;
    }

    /// Append a body line to an entity
    pub fn add_description(&mut self, id: EntityId, line: impl Into<String>) {
        self.store.get_mut(id).description.push(line.into());
    }

    fn resolve_pseudo(&mut self, location: LineLocation, marker: &str, leaf_type: LeafType) -> EntityId {
        let group = self.current_group();
        let sentinel = if self.entity(group).is_root() {
            marker.to_string()
        } else {
            format!("{}{}", marker, self.entity(group).name())
        };
        let scope = self.current_quark();
        let quark = self.quarks.child(scope, &clean_id(&sentinel));
        match self.quark_entity(quark) {
            Some(existing) => existing,
            None => self.create_leaf(location, quark, leaf_type, Vec::new()),
        }
    }

    /// Initial pseudo-state of the current scope
    pub fn resolve_start(&mut self, location: LineLocation) -> EntityId {
        self.resolve_pseudo(location, START_MARKER, LeafType::Start)
    }

    /// Final pseudo-state of the current scope
    pub fn resolve_end(&mut self, location: LineLocation) -> EntityId {
        self.resolve_pseudo(location, END_MARKER, LeafType::End)
    }

    /// Shallow history pseudo-state of the current scope
    pub fn resolve_history(&mut self, location: LineLocation) -> EntityId {
        self.resolve_pseudo(location, HISTORY_MARKER, LeafType::History)
    }

    /// Deep history pseudo-state of the current scope
    pub fn resolve_deep_history(&mut self, location: LineLocation) -> EntityId {
        self.resolve_pseudo(location, DEEP_HISTORY_MARKER, LeafType::DeepHistory)
    }

    /// Shallow history pseudo-state of the state named `id`
    ///
    /// The state is opened as a composite state for the duration of the
    /// lookup and closed again, so the current scope is unchanged.
    pub fn resolve_history_in(&mut self, location: LineLocation, id: &str) -> EntityId {
        self.resolve_pseudo_in(location, id, HISTORY_MARKER, LeafType::History)
    }

    /// Deep history pseudo-state of the state named `id`
    pub fn resolve_deep_history_in(&mut self, location: LineLocation, id: &str) -> EntityId {
        self.resolve_pseudo_in(location, id, DEEP_HISTORY_MARKER, LeafType::DeepHistory)
    }

    fn resolve_pseudo_in(
        &mut self,
        location: LineLocation,
        id: &str,
        marker: &str,
        leaf_type: LeafType,
    ) -> EntityId {
        let quark = self.quark_in_context(id);
        self.enter_group_at(location, quark, None, GroupType::State);
        let result = self.resolve_pseudo(location, marker, leaf_type);
        self.scopes.pop();
        result
    }

    /// Open the group named `id`, creating or promoting it as needed
    pub fn enter_group(
        &mut self,
        location: LineLocation,
        id: &str,
        display: Option<&str>,
        group_type: GroupType,
    ) -> EntityId {
        let quark = self.quark_in_context(id);
        self.enter_group_at(location, quark, display, group_type)
    }

    /// Open the group at an already resolved node
    pub fn enter_group_at(
        &mut self,
        location: LineLocation,
        quark: QuarkId,
        display: Option<&str>,
        group_type: GroupType,
    ) -> EntityId {
        self.ensure_ancestors(location, quark);
        let group = match self.quark_entity(quark) {
            Some(existing) => {
                let entity = self.store.get_mut(existing);
                if !entity.is_group() {
                    entity.kind = EntityKind::group(group_type);
                    debug!(entity = existing.index(), "Promoted state to group");
                }
                existing
            }
            None => {
                let name = self.quarks.name(quark).to_string();
                let default_display = match group_type {
                    GroupType::ConcurrentState => Vec::new(),
                    GroupType::Root | GroupType::State => vec![name.clone()],
                };
                let group = self.store.create(
                    quark,
                    name,
                    EntityKind::group(group_type),
                    default_display,
                    Some(location),
                );
                self.quarks.set_data(quark, group);
                debug!(
                    entity = group.index(),
                    kind = %group_type,
                    name = %self.quarks.qualified_name(quark),
                    "Created group"
                );
                group
            }
        };
        if let Some(display) = display {
            self.set_display(group, vec![display.to_string()]);
        }
        self.scopes.push(group);
        trace!(entity = group.index(), depth = self.depth(), "Entered group");
        group
    }

    fn record_separator(&mut self, group: EntityId, direction: char) {
        if let EntityKind::Group {
            concurrent_separators,
            ..
        } = &mut self.store.get_mut(group).kind
        {
            concurrent_separators.push(direction);
        }
    }

    fn next_concurrent_name(&mut self) -> String {
        let scope = self.current_quark();
        loop {
            self.unique_counter += 1;
            let name = format!("{}{}", self.config.concurrent_prefix(), self.unique_counter);
            let taken = self.quarks.find_path(scope, &name).is_some()
                || !self.quarks.find_by_tail(&name).is_empty();
            if !taken {
                return name;
            }
        }
    }

    /// Start a new concurrent region in the current group
    ///
    /// If the current group is itself a region, it is closed first so the
    /// new region becomes its sibling. The separator character is recorded
    /// on the enclosing group and on the new region.
    pub fn enter_concurrent_split(&mut self, location: LineLocation, direction: char) -> EntityId {
        let current = self.current_group();
        self.record_separator(current, direction);
        if self.entity(current).is_concurrent() {
            self.scopes.pop();
        }

        let name = self.next_concurrent_name();
        let scope = self.current_quark();
        let quark = self.quarks.child(scope, &name);
        let region = self.enter_group_at(location, quark, None, GroupType::ConcurrentState);
        self.record_separator(region, direction);
        debug!(region = %name, direction = %direction, "Entered concurrent region");
        region
    }

    /// Close the current group
    ///
    /// Closing a concurrent region also closes the composite state it
    /// splits.
    ///
    /// # Panics
    ///
    /// Panics if that would close the root. Check
    /// [`can_exit_group`](Self::can_exit_group) first on untrusted input.
    pub fn exit_group(&mut self) {
        let current = self.current_group();
        if self.entity(current).is_concurrent() {
            self.scopes.pop();
        }
        let closed = self.scopes.pop();
        trace!(entity = closed.index(), depth = self.depth(), "Exited group");
    }

    /// Whether the entity already attached to `quark` may be used from the
    /// current scope without crossing a concurrent region boundary
    pub fn is_reuse_compatible(&self, quark: QuarkId) -> bool {
        let Some(existing) = self.quark_entity(quark) else {
            return true;
        };
        let current = self.current_group();
        let parent = self.parent_container(existing);

        if self.entity(current).is_concurrent() && parent != Some(current) {
            return false;
        }

        if let Some(parent) = parent {
            if self.entity(parent).is_concurrent() && parent != current {
                return false;
            }
        }

        true
    }

    /// Record a transition between two entities
    pub fn add_link(
        &mut self,
        location: LineLocation,
        from: EntityId,
        to: EntityId,
        label: Option<&str>,
    ) {
        let mut link = Link::new(from, to).at(location);
        if let Some(label) = label {
            link = link.with_label(label);
        }
        trace!(from = from.index(), to = to.index(), "Added link");
        self.store.add_link(link);
    }

    /// Check every link, in insertion order, for region crossings
    ///
    /// Both ends of a link must share the same nearest concurrent region,
    /// or both must lie outside any region. The first offending link is
    /// reported.
    pub fn validate_links(&self) -> Result<(), DiagramError> {
        for link in self.store.links().iter().filter(|link| !link.is_self_loop()) {
            let region1 = self.concurrent_ancestor(link.entity1);
            let region2 = self.concurrent_ancestor(link.entity2);
            if region1 != region2 {
                let error = DiagramError::cross_region_link(
                    self.entity(link.entity1).name(),
                    self.entity(link.entity2).name(),
                );
                warn!(error = %error, "Link validation failed");
                return Err(error);
            }
        }
        Ok(())
    }

    /// Final model check as a message, `None` when the model is valid
    pub fn check_final_error(&self) -> Option<String> {
        self.validate_links().err().map(|e| e.to_string())
    }
}

impl Database for StateDatabase {
    type Node = Entity;
    type Edge = Link;

    fn add_edge(&mut self, edge: Self::Edge) -> Result<()> {
        let count = self.store.entity_count();
        if edge.entity1.index() >= count || edge.entity2.index() >= count {
            bail!(
                "Link refers to unknown entity ({} -> {})",
                edge.entity1.index(),
                edge.entity2.index()
            );
        }
        self.store.add_link(edge);
        Ok(())
    }

    fn get_node(&self, id: &str) -> Option<&Self::Node> {
        let root = self.quarks.root();
        self.quarks
            .find_path(root, &clean_id(id))
            .filter(|&quark| quark != root)
            .and_then(|quark| self.quark_entity(quark))
            .map(|entity| self.entity(entity))
    }

    fn nodes(&self) -> impl Iterator<Item = &Self::Node> {
        self.store.entities().iter().filter(|e| !e.is_root())
    }

    fn edges(&self) -> impl Iterator<Item = &Self::Edge> {
        self.store.links().iter()
    }

    fn clear(&mut self) {
        *self = Self::with_config(self.config.clone());
    }

    fn node_count(&self) -> usize {
        self.store.entity_count() - 1
    }

    fn edge_count(&self) -> usize {
        self.store.links().len()
    }
}
