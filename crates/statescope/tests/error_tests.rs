//! Tests for error reporting

use statescope::core::DiagramError;
use statescope::{build, check};

fn diagram_error(input: &str) -> DiagramError {
    let err = build(input).unwrap_err();
    match err.downcast::<DiagramError>() {
        Ok(error) => error,
        Err(other) => panic!("expected DiagramError, got {}", other),
    }
}

#[test]
fn test_parse_error_display() {
    let error = DiagramError::parse_error("Invalid syntax".to_string(), 5, 10);
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("Parse error"));
    assert!(error_msg.contains("Invalid syntax"));
    assert!(error_msg.contains("line 5"));
    assert!(error_msg.contains("column 10"));
}

#[test]
fn test_cross_region_link_display() {
    let error = DiagramError::cross_region_link("x", "y");
    assert_eq!(
        error.to_string(),
        "State within concurrent state cannot be linked out of this concurrent state (between x and y)"
    );
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.puml");
    let error: DiagramError = io.into();
    assert!(error.to_string().contains("IO error"));
}

#[test]
fn test_unparseable_line_reports_position() {
    match diagram_error("[*] --> A\nA => B\n") {
        DiagramError::ParseError { line, column, .. } => {
            assert_eq!(line, 2);
            assert!(column >= 1);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_stray_close_brace() {
    assert!(matches!(
        diagram_error("A --> B\n}\n"),
        DiagramError::UnbalancedGroup { line: 2 }
    ));
}

#[test]
fn test_unclosed_group() {
    assert!(matches!(
        diagram_error("state A {\n  x --> y\n"),
        DiagramError::ParseError { .. }
    ));
}

#[test]
fn test_reuse_from_sibling_region() {
    let input = "state A {\n  --\n  x --> x\n  --\n  x --> y\n}\n";
    match diagram_error(input) {
        DiagramError::ReuseConflict { id, line } => {
            assert_eq!(id, "x");
            assert_eq!(line, 5);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_link_out_of_region() {
    match diagram_error("state A {\n  --\n  y --> .z\n}\n") {
        DiagramError::CrossRegionLink { entity1, entity2 } => {
            assert_eq!(entity1, "y");
            assert_eq!(entity2, "z");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_empty_state_name() {
    assert!(matches!(
        diagram_error("[*] --> A\n\"\" --> A\n"),
        DiagramError::ParseError { line: 2, .. }
    ));
    assert!(check(". --> A").is_err());
}

#[test]
fn test_generated_region_name_is_reserved() {
    let input = "state A {\n  --\n  x --> y\n}\nCONC1 --> z\n";
    assert!(matches!(
        diagram_error(input),
        DiagramError::ParseError { line: 5, .. }
    ));
}

#[test]
fn test_check_error_message_is_readable() {
    let err = check("state A {\n").unwrap_err();
    assert!(err.to_string().contains("left open"));
}
