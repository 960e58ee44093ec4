//! Statescope - Build the semantic model of a state diagram
//!
//! A library for turning state diagram text into a hierarchy of states,
//! pseudo-states, composite and concurrent containers, and transitions,
//! with validation of links across concurrent regions.
//!
//! # Quick Start
//!
//! ```rust
//! use statescope::build;
//! use statescope::prelude::Database;
//!
//! let model = build("[*] --> Idle\nIdle --> Running : start").unwrap();
//! assert_eq!(model.node_count(), 3);
//! assert_eq!(model.edge_count(), 2);
//! ```
//!
//! # Advanced Usage
//!
//! Drive the model directly, without text:
//!
//! ```rust
//! use statescope::prelude::*;
//!
//! let mut model = StateDatabase::new();
//! let at = LineLocation::line(1);
//!
//! model.enter_group(at, "Active", None, GroupType::State);
//! let start = model.resolve_start(at);
//! let working = model.resolve_state(at, "Working");
//! model.add_link(at, start, working, None);
//! model.exit_group();
//!
//! assert_eq!(model.qualified_name(working), "Active.Working");
//! assert!(model.validate_links().is_ok());
//! ```

pub mod core;
pub mod plugins;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Database, DiagramError, Entity, EntityId, EntityKind, GroupType, LeafType, LineLocation,
        Link, ModelConfig, Parser,
    };
    pub use crate::plugins::state::{StateDatabase, StateParser};
}

/// Build a state model from diagram text using the default configuration
///
/// # Example
/// ```rust
/// use statescope::build;
///
/// let model = build("state A {\n  [*] --> x\n}\n").unwrap();
/// assert_eq!(model.depth(), 0);
/// ```
pub fn build(input: &str) -> anyhow::Result<plugins::state::StateDatabase> {
    build_with_config(input, ModelConfig::default())
}

/// Build a state model from diagram text with a specific configuration
///
/// # Example
/// ```rust
/// use statescope::{build_with_config, ModelConfig};
/// use statescope::prelude::Database;
///
/// let config = ModelConfig::new().with_separator(None);
/// let model = build_with_config("a.b --> c", config).unwrap();
/// assert!(model.get_node("a.b").is_some());
/// assert_eq!(model.node_count(), 2);
/// ```
pub fn build_with_config(
    input: &str,
    config: ModelConfig,
) -> anyhow::Result<plugins::state::StateDatabase> {
    use crate::core::Parser as _;
    use crate::plugins::state::{StateDatabase, StateParser};

    let parser = StateParser::for_config(&config);
    let mut database = StateDatabase::with_config(config);
    parser.parse(input, &mut database)?;
    Ok(database)
}

/// Check diagram text, discarding the model
///
/// # Example
/// ```rust
/// use statescope::check;
///
/// assert!(check("[*] --> A\nA --> [*]").is_ok());
/// assert!(check("}").is_err());
/// ```
pub fn check(input: &str) -> anyhow::Result<()> {
    build(input).map(|_| ())
}
