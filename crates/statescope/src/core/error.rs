//! Core error types for state model construction
//!
//! This module defines the error types raised while driving and validating
//! a state diagram model.

use thiserror::Error;

/// Core error types for state model construction
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Parse error: {message} at line {line}, column {column}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    #[error(
        "State within concurrent state cannot be linked out of this concurrent state (between {entity1} and {entity2})"
    )]
    CrossRegionLink { entity1: String, entity2: String },

    #[error("Reuse conflict: {id} belongs to another concurrent region (line {line})")]
    ReuseConflict { id: String, line: usize },

    #[error("Unbalanced group: no open group to close at line {line}")]
    UnbalancedGroup { line: usize },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl DiagramError {
    /// Create a new parse error
    pub fn parse_error(message: String, line: usize, column: usize) -> Self {
        Self::ParseError {
            message,
            line,
            column,
        }
    }

    /// Create a new cross-region link error
    pub fn cross_region_link(entity1: impl Into<String>, entity2: impl Into<String>) -> Self {
        Self::CrossRegionLink {
            entity1: entity1.into(),
            entity2: entity2.into(),
        }
    }

    /// Create a new reuse conflict error
    pub fn reuse_conflict(id: impl Into<String>, line: usize) -> Self {
        Self::ReuseConflict {
            id: id.into(),
            line,
        }
    }

    /// Create a new unbalanced group error
    pub fn unbalanced_group(line: usize) -> Self {
        Self::UnbalancedGroup { line }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error() {
        let error = DiagramError::parse_error("Invalid syntax".to_string(), 5, 10);
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Parse error"));
        assert!(error_msg.contains("Invalid syntax"));
        assert!(error_msg.contains("line 5"));
        assert!(error_msg.contains("column 10"));
    }

    #[test]
    fn test_cross_region_link() {
        let error = DiagramError::cross_region_link("x", "y");
        assert_eq!(
            error.to_string(),
            "State within concurrent state cannot be linked out of this concurrent state (between x and y)"
        );
    }

    #[test]
    fn test_reuse_conflict() {
        let error = DiagramError::reuse_conflict("x", 7);
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Reuse conflict"));
        assert!(error_msg.contains("x"));
        assert!(error_msg.contains("line 7"));
    }

    #[test]
    fn test_unbalanced_group() {
        let error = DiagramError::unbalanced_group(3);
        assert!(error.to_string().contains("line 3"));
    }

    #[test]
    fn test_io_error_conversion() {
        use std::io;
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: DiagramError = io_err.into();
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("IO error"));
        assert!(error_msg.contains("File not found"));
    }
}
