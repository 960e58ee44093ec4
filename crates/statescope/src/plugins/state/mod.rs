//! State diagram plugin
//!
//! Builds the semantic model of a state diagram: states, pseudo-states,
//! composite and concurrent containers, and the transitions between them.
//!
//! Syntax examples:
//! ```text
//! @startuml
//! [*] --> Idle
//! state Active {
//!     [*] --> Working
//!     --
//!     [*] --> Monitoring
//! }
//! Idle --> Active : start
//! Active --> [*]
//! @enduml
//! ```

mod database;
mod parser;

pub use database::StateDatabase;
pub use parser::{Endpoint, StateParser, Statement};
