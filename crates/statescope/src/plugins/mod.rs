//! Plugin implementations for different diagram types
//!
//! Each plugin pairs a database that owns the semantic model with a parser
//! that drives it from diagram text.

pub mod state;

pub use state::*;
