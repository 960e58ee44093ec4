//! Serializable view of a built state model

use serde::Serialize;
use statescope::prelude::*;

/// One entity and everything it contains
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StateNode {
    pub name: String,
    pub qualified_name: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub display: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub separators: Vec<char>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<StateNode>,
}

/// A transition between two qualified names
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TransitionSummary {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Whole-model summary printed by `statescope tree`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ModelSummary {
    pub states: Vec<StateNode>,
    pub transitions: Vec<TransitionSummary>,
}

fn kind_label(entity: &Entity) -> String {
    match entity.kind() {
        EntityKind::Leaf(leaf_type) => leaf_type.to_string(),
        EntityKind::Group { group_type, .. } => group_type.to_string(),
    }
}

fn state_node(model: &StateDatabase, id: EntityId) -> StateNode {
    let entity = model.entity(id);
    StateNode {
        name: entity.name().to_string(),
        qualified_name: model.qualified_name(id),
        kind: kind_label(entity),
        display: entity.display().to_vec(),
        description: entity.description().to_vec(),
        separators: entity.concurrent_separators().to_vec(),
        children: model
            .children(id)
            .into_iter()
            .map(|child| state_node(model, child))
            .collect(),
    }
}

impl ModelSummary {
    pub fn from_model(model: &StateDatabase) -> Self {
        let states = model
            .children(model.root())
            .into_iter()
            .map(|id| state_node(model, id))
            .collect();
        let transitions = model
            .links()
            .iter()
            .map(|link| TransitionSummary {
                from: model.qualified_name(link.entity1),
                to: model.qualified_name(link.entity2),
                label: link.label.clone(),
            })
            .collect();
        Self {
            states,
            transitions,
        }
    }

    /// Indented text rendering, two spaces per nesting level
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for state in &self.states {
            write_node(&mut out, state, 0);
        }
        if !self.transitions.is_empty() {
            out.push_str("\nTransitions:\n");
            for transition in &self.transitions {
                out.push_str(&format!("  {} -> {}", transition.from, transition.to));
                if let Some(label) = &transition.label {
                    out.push_str(&format!(" : {}", label));
                }
                out.push('\n');
            }
        }
        out
    }
}

fn write_node(out: &mut String, node: &StateNode, depth: usize) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(&format!("{} ({})", node.name, node.kind));
    if let Some(first) = node.display.first().filter(|d| **d != node.name) {
        out.push_str(&format!(" \"{}\"", first));
    }
    out.push('\n');
    for child in &node.children {
        write_node(out, child, depth + 1);
    }
}
