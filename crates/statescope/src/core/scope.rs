//! Stack of open groups during model construction

use super::types::EntityId;

/// The groups currently being populated, innermost last
///
/// The root group is always open and can never be popped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeStack {
    root: EntityId,
    open: Vec<EntityId>,
}

impl ScopeStack {
    pub fn new(root: EntityId) -> Self {
        Self {
            root,
            open: Vec::new(),
        }
    }

    /// Innermost open group
    pub fn current(&self) -> EntityId {
        self.open.last().copied().unwrap_or(self.root)
    }

    pub fn root(&self) -> EntityId {
        self.root
    }

    /// Number of open groups above the root
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn push(&mut self, group: EntityId) {
        self.open.push(group);
    }

    /// Close the innermost group
    ///
    /// # Panics
    ///
    /// Panics if only the root is open. Callers must pair every pop with an
    /// earlier push.
    pub fn pop(&mut self) -> EntityId {
        match self.open.pop() {
            Some(closed) => closed,
            None => panic!("scope stack underflow: cannot close the root group"),
        }
    }
}
