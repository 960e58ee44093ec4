//! Core parser trait for diagram markup
//!
//! This trait defines the interface for drivers that turn diagram markup
//! into builder events applied to a database.

use anyhow::Result;

use super::Database;

/// Core trait for diagram parsers
///
/// # Example
/// ```
/// use statescope::core::{Database, Parser};
/// use statescope::plugins::state::{StateDatabase, StateParser};
///
/// let parser = StateParser::new();
/// let mut db = StateDatabase::new();
/// parser.parse("[*] --> Idle", &mut db).unwrap();
/// assert_eq!(db.node_count(), 2);
/// ```
pub trait Parser<D: Database>: Send + Sync {
    /// Parse diagram markup into the provided database
    fn parse(&self, input: &str, database: &mut D) -> Result<()>;

    /// Get the name of this parser
    fn name(&self) -> &'static str;

    /// Get the version of this parser
    fn version(&self) -> &'static str;

    /// Check if the input can be parsed by this parser
    fn can_parse(&self, input: &str) -> bool;
}
