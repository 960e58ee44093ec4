//! Core abstractions for state model construction
//!
//! This module holds the collaborators a diagram builder is made from: the
//! namespace tree, the entity store, the scope stack, shared types, errors,
//! configuration and logging.

pub mod chumsky_utils;
mod config;
mod database;
mod error;
pub mod logging;
mod parser;
mod quark;
mod scope;
mod types;

pub use config::*;
pub use database::*;
pub use error::*;
pub use logging::*;
pub use parser::*;
pub use quark::*;
pub use scope::*;
pub use types::*;
