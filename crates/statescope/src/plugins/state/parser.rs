//! State diagram parser using chumsky
//!
//! Parses line-oriented state diagram text and drives a [`StateDatabase`]
//! with the resulting events.

use super::database::StateDatabase;
use crate::core::chumsky_utils::{
    identifier, inline_whitespace, inline_whitespace_required, line_comment, quoted_string,
    rest_of_line, Extra,
};
use crate::core::{
    Database, DiagramError, EntityId, GroupType, LineLocation, ModelConfig, Parser as CoreParser,
    QuarkId,
};
use anyhow::Result;
use chumsky::prelude::*;
use tracing::{info, span, trace, Level};

/// One side of a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `[*]`: start marker as a source, end marker as a target
    Terminal,
    /// `[H]` of the current scope
    History,
    /// `[H*]` of the current scope
    DeepHistory,
    /// `Id[H]`
    HistoryOf(String),
    /// `Id[H*]`
    DeepHistoryOf(String),
    /// A named state
    State(String),
}

/// Parsed state diagram statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `state Id`, `state "Label" as Id`, optionally followed by `{`
    StateDecl {
        id: String,
        label: Option<String>,
        opens_group: bool,
    },
    /// `}`
    CloseGroup,
    /// `--` (horizontal) or `||` (vertical)
    ConcurrentSeparator(char),
    /// `from --> to` or `from --> to : label`
    Transition {
        from: Endpoint,
        to: Endpoint,
        label: Option<String>,
    },
    /// `Id : text`
    Description { id: String, text: String },
    /// `hide empty description`
    HideEmptyDescription,
}

/// Which side of a transition an endpoint is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Source,
    Target,
}

/// State diagram parser
///
/// Bare identifiers are split on the namespace separator the parser was
/// built with, which should match the separator of the target database.
#[derive(Debug, Clone)]
pub struct StateParser {
    separator: Option<String>,
}

impl StateParser {
    /// Parser for `.`-separated identifiers
    pub fn new() -> Self {
        Self::with_separator(Some("."))
    }

    /// Parser for identifiers joined by `separator`, or unsplit with `None`
    pub fn with_separator(separator: Option<&str>) -> Self {
        Self {
            separator: separator.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }

    /// Parser matching the separator of a model configuration
    pub fn for_config(config: &ModelConfig) -> Self {
        Self::with_separator(config.separator())
    }

    pub fn separator(&self) -> Option<&str> {
        self.separator.as_deref()
    }

    /// Parse a transition endpoint
    fn endpoint_parser<'src>(
        separator: Option<&str>,
    ) -> impl chumsky::Parser<'src, &'src str, Endpoint, Extra<'src>> + Clone {
        let history_suffix = choice((just("[H*]").to(true), just("[H]").to(false)));

        let terminal = just("[*]").to(Endpoint::Terminal);
        let bare_history = history_suffix.clone().map(|deep| {
            if deep {
                Endpoint::DeepHistory
            } else {
                Endpoint::History
            }
        });
        let named = identifier(separator)
            .then(history_suffix.or_not())
            .map(|(id, suffix)| match suffix {
                Some(true) => Endpoint::DeepHistoryOf(id),
                Some(false) => Endpoint::HistoryOf(id),
                None => Endpoint::State(id),
            });
        let quoted = quoted_string().map(Endpoint::State);

        choice((terminal, bare_history, named, quoted))
    }

    /// Parse an arrow: `->`, `-->`, `-up->`, `-left-->` ...
    fn arrow_parser<'src>() -> impl chumsky::Parser<'src, &'src str, (), Extra<'src>> + Clone {
        let direction = choice((just("up"), just("down"), just("left"), just("right")));

        just('-')
            .then(direction.or_not())
            .then(just('-').repeated())
            .then(just('>'))
            .ignored()
    }

    /// Parse a transition: `from --> to` or `from --> to : label`
    fn transition_parser<'src>(
        separator: Option<&str>,
    ) -> impl chumsky::Parser<'src, &'src str, Statement, Extra<'src>> + Clone {
        let label = just(':').ignore_then(rest_of_line()).or_not();

        Self::endpoint_parser(separator)
            .then_ignore(inline_whitespace())
            .then_ignore(Self::arrow_parser())
            .then_ignore(inline_whitespace())
            .then(Self::endpoint_parser(separator))
            .then_ignore(inline_whitespace())
            .then(label)
            .map(|((from, to), label)| Statement::Transition {
                from,
                to,
                label: label.filter(|s| !s.is_empty()),
            })
    }

    /// Parse a state declaration
    fn state_decl_parser<'src>(
        separator: Option<&str>,
    ) -> impl chumsky::Parser<'src, &'src str, Statement, Extra<'src>> + Clone {
        let keyword_as = inline_whitespace_required()
            .ignore_then(just("as"))
            .then_ignore(inline_whitespace_required());

        let quoted_as = quoted_string()
            .then_ignore(keyword_as.clone())
            .then(identifier(separator))
            .map(|(label, id)| (id, Some(label)));
        let id_as = identifier(separator).then(keyword_as.ignore_then(quoted_string()).or_not());

        let opens = inline_whitespace()
            .ignore_then(just('{'))
            .or_not()
            .map(|brace| brace.is_some());

        just("state")
            .ignore_then(inline_whitespace_required())
            .ignore_then(choice((quoted_as, id_as)))
            .then(opens)
            .map(|((id, label), opens_group)| Statement::StateDecl {
                id,
                label,
                opens_group,
            })
    }

    /// Parse `Id : text`
    fn description_parser<'src>(
        separator: Option<&str>,
    ) -> impl chumsky::Parser<'src, &'src str, Statement, Extra<'src>> + Clone {
        identifier(separator)
            .then_ignore(inline_whitespace())
            .then_ignore(just(':'))
            .then(rest_of_line())
            .map(|(id, text)| Statement::Description { id, text })
    }

    /// Parse a concurrent separator line
    fn separator_parser<'src>(
    ) -> impl chumsky::Parser<'src, &'src str, Statement, Extra<'src>> + Clone {
        let horizontal = just("--")
            .then(just('-').repeated())
            .to(Statement::ConcurrentSeparator('-'));
        let vertical = just("||")
            .then(just('|').repeated())
            .to(Statement::ConcurrentSeparator('|'));
        horizontal.or(vertical)
    }

    /// Parse `hide empty description`
    fn hide_parser<'src>() -> impl chumsky::Parser<'src, &'src str, Statement, Extra<'src>> + Clone
    {
        just("hide")
            .then(inline_whitespace_required())
            .then(just("empty"))
            .then(inline_whitespace_required())
            .then(just("description"))
            .to(Statement::HideEmptyDescription)
    }

    /// Parse a single statement
    fn statement_parser<'src>(
        separator: Option<&str>,
    ) -> impl chumsky::Parser<'src, &'src str, Statement, Extra<'src>> + Clone {
        choice((
            Self::hide_parser(),
            Self::state_decl_parser(separator),
            just('}').to(Statement::CloseGroup),
            Self::separator_parser(),
            Self::transition_parser(separator),
            Self::description_parser(separator),
        ))
    }

    fn parse_line(&self, input: &str, line: usize) -> Result<Statement, DiagramError> {
        let indent = input.len() - input.trim_start().len();
        let parser = Self::statement_parser(self.separator())
            .then_ignore(inline_whitespace())
            .then_ignore(end());

        parser
            .parse(input.trim())
            .into_result()
            .map_err(|errors| match errors.first() {
                Some(error) => DiagramError::parse_error(
                    error.to_string(),
                    line,
                    indent + error.span().start + 1,
                ),
                None => {
                    DiagramError::parse_error("Invalid statement".to_string(), line, indent + 1)
                }
            })
    }

    /// Parse a statement from input
    pub fn parse_statement(&self, input: &str) -> Result<Statement> {
        Ok(self.parse_line(input, 1)?)
    }

    /// Check if a line is a document directive such as `@startuml`
    fn is_directive(&self, line: &str) -> bool {
        line.starts_with('@')
    }

    /// Check if a line is a comment
    fn is_comment(&self, line: &str) -> bool {
        line_comment().parse(line).into_result().is_ok()
    }

    fn resolve_named(
        &self,
        database: &mut StateDatabase,
        location: LineLocation,
        id: &str,
    ) -> Result<QuarkId, DiagramError> {
        let quark = database.quark_in_context(id);
        if quark == database.quarks().root() {
            return Err(DiagramError::parse_error(
                format!("'{}' does not name a state", id),
                location.line,
                location.column,
            ));
        }
        if let Some(existing) = database.quark_entity(quark) {
            if database.entity(existing).is_concurrent() {
                return Err(DiagramError::parse_error(
                    format!("{} is a reserved region name", id),
                    location.line,
                    location.column,
                ));
            }
            if !database.is_reuse_compatible(quark) {
                return Err(DiagramError::reuse_conflict(id, location.line));
            }
        }
        Ok(quark)
    }

    fn resolve_endpoint(
        &self,
        database: &mut StateDatabase,
        location: LineLocation,
        endpoint: &Endpoint,
        side: Side,
    ) -> Result<EntityId, DiagramError> {
        let entity = match endpoint {
            Endpoint::Terminal => match side {
                Side::Source => database.resolve_start(location),
                Side::Target => database.resolve_end(location),
            },
            Endpoint::History => database.resolve_history(location),
            Endpoint::DeepHistory => database.resolve_deep_history(location),
            Endpoint::HistoryOf(id) => {
                self.resolve_named(database, location, id)?;
                database.resolve_history_in(location, id)
            }
            Endpoint::DeepHistoryOf(id) => {
                self.resolve_named(database, location, id)?;
                database.resolve_deep_history_in(location, id)
            }
            Endpoint::State(id) => {
                let quark = self.resolve_named(database, location, id)?;
                database.resolve_state_at(location, quark)
            }
        };
        Ok(entity)
    }

    fn apply(
        &self,
        statement: Statement,
        location: LineLocation,
        database: &mut StateDatabase,
        open_groups: &mut usize,
    ) -> Result<(), DiagramError> {
        match statement {
            Statement::StateDecl {
                id,
                label,
                opens_group,
            } => {
                let quark = self.resolve_named(database, location, &id)?;
                if opens_group {
                    database.enter_group_at(location, quark, label.as_deref(), GroupType::State);
                    *open_groups += 1;
                } else {
                    let state = database.resolve_state_at(location, quark);
                    if let Some(label) = label {
                        database.set_display(state, vec![label]);
                    }
                }
            }
            Statement::CloseGroup => {
                if *open_groups == 0 || !database.can_exit_group() {
                    return Err(DiagramError::unbalanced_group(location.line));
                }
                database.exit_group();
                *open_groups -= 1;
            }
            Statement::ConcurrentSeparator(direction) => {
                database.enter_concurrent_split(location, direction);
            }
            Statement::Transition { from, to, label } => {
                let source = self.resolve_endpoint(database, location, &from, Side::Source)?;
                let target = self.resolve_endpoint(database, location, &to, Side::Target)?;
                database.add_link(location, source, target, label.as_deref());
            }
            Statement::Description { id, text } => {
                let quark = self.resolve_named(database, location, &id)?;
                let state = database.resolve_state_at(location, quark);
                database.add_description(state, text);
            }
            Statement::HideEmptyDescription => database.set_hide_empty_description(true),
        }
        Ok(())
    }
}

impl Default for StateParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreParser<StateDatabase> for StateParser {
    fn parse(&self, input: &str, database: &mut StateDatabase) -> Result<()> {
        let parse_span = span!(Level::INFO, "parse_state", input_len = input.len());
        let _enter = parse_span.enter();

        let mut open_groups = 0usize;
        let mut last_line = 0usize;

        for (index, line) in input.lines().enumerate() {
            let line_number = index + 1;
            last_line = line_number;
            let trimmed = line.trim();

            // Skip empty lines, comments, and directives
            if trimmed.is_empty() || self.is_comment(trimmed) || self.is_directive(trimmed) {
                continue;
            }

            let statement = self.parse_line(line, line_number)?;
            let indent = line.len() - line.trim_start().len();
            let location = LineLocation::new(line_number, indent + 1);
            trace!(?statement, line = line_number, "Applying statement");
            self.apply(statement, location, database, &mut open_groups)?;
        }

        if open_groups > 0 {
            return Err(DiagramError::parse_error(
                format!("{} group(s) left open", open_groups),
                last_line,
                1,
            )
            .into());
        }

        database.validate_links()?;

        info!(
            states = database.node_count(),
            links = database.edge_count(),
            "Parsing completed"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "state"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn can_parse(&self, input: &str) -> bool {
        let trimmed = input.trim_start().to_lowercase();
        trimmed.starts_with("@startuml") || trimmed.starts_with("state ") || input.contains("[*]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LeafType;

    fn parse(input: &str) -> Result<StateDatabase> {
        let mut db = StateDatabase::new();
        StateParser::new().parse(input, &mut db)?;
        Ok(db)
    }

    #[test]
    fn test_parse_simple_transition() {
        let parser = StateParser::new();
        let result = parser.parse_statement("Idle --> Running").unwrap();
        assert_eq!(
            result,
            Statement::Transition {
                from: Endpoint::State("Idle".to_string()),
                to: Endpoint::State("Running".to_string()),
                label: None,
            }
        );
    }

    #[test]
    fn test_parse_transition_with_label() {
        let parser = StateParser::new();
        let result = parser.parse_statement("Idle -> Running : start").unwrap();
        assert_eq!(
            result,
            Statement::Transition {
                from: Endpoint::State("Idle".to_string()),
                to: Endpoint::State("Running".to_string()),
                label: Some("start".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_directional_arrow() {
        let parser = StateParser::new();
        let result = parser.parse_statement("A -left-> B").unwrap();
        assert!(matches!(result, Statement::Transition { .. }));
        assert!(parser.parse_statement("A-->B").is_ok());
    }

    #[test]
    fn test_parse_pseudo_endpoints() {
        let parser = StateParser::new();
        let result = parser.parse_statement("[*] --> A[H*]").unwrap();
        assert_eq!(
            result,
            Statement::Transition {
                from: Endpoint::Terminal,
                to: Endpoint::DeepHistoryOf("A".to_string()),
                label: None,
            }
        );
        let result = parser.parse_statement("[H] --> B").unwrap();
        assert!(matches!(
            result,
            Statement::Transition {
                from: Endpoint::History,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_state_declarations() {
        let parser = StateParser::new();
        assert_eq!(
            parser
                .parse_statement("state \"Processing data\" as s1 {")
                .unwrap(),
            Statement::StateDecl {
                id: "s1".to_string(),
                label: Some("Processing data".to_string()),
                opens_group: true,
            }
        );
        assert_eq!(
            parser.parse_statement("state Idle").unwrap(),
            Statement::StateDecl {
                id: "Idle".to_string(),
                label: None,
                opens_group: false,
            }
        );
    }

    #[test]
    fn test_parse_separators_and_close() {
        let parser = StateParser::new();
        assert_eq!(
            parser.parse_statement("--").unwrap(),
            Statement::ConcurrentSeparator('-')
        );
        assert_eq!(
            parser.parse_statement("||").unwrap(),
            Statement::ConcurrentSeparator('|')
        );
        assert_eq!(parser.parse_statement("}").unwrap(), Statement::CloseGroup);
    }

    #[test]
    fn test_parse_description_and_hide() {
        let parser = StateParser::new();
        assert_eq!(
            parser.parse_statement("Idle : waiting for input").unwrap(),
            Statement::Description {
                id: "Idle".to_string(),
                text: "waiting for input".to_string(),
            }
        );
        assert_eq!(
            parser.parse_statement("hide empty description").unwrap(),
            Statement::HideEmptyDescription
        );
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = parse("[*] --> A\n  A ==> B\n").unwrap_err();
        match err.downcast_ref::<DiagramError>() {
            Some(DiagramError::ParseError { line, .. }) => assert_eq!(*line, 2),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_full_diagram() {
        let input = r#"
@startuml
' a comment
[*] --> Idle
Idle --> Processing : start
Processing --> Done : complete
Done --> [*]
@enduml
"#;
        let db = parse(input).unwrap();
        assert_eq!(db.node_count(), 5);
        assert_eq!(db.edge_count(), 4);
        let start = db.links()[0].entity1;
        let end = db.links()[3].entity2;
        assert_eq!(db.entity(start).leaf_type(), Some(LeafType::Start));
        assert_eq!(db.entity(end).leaf_type(), Some(LeafType::End));
    }

    #[test]
    fn test_parse_composite_state() {
        let input = "state A {\n  [*] --> x\n  x --> y\n}\nA --> B\n";
        let db = parse(input).unwrap();
        let a = db.get_node("A").unwrap().id();
        let x = db.get_node("A.x").unwrap().id();
        assert_eq!(db.parent_container(x), Some(a));
        assert_eq!(db.depth(), 0);
    }

    #[test]
    fn test_parse_concurrent_regions() {
        let input = "state A {\n  x --> x2\n  --\n  y --> y2\n}\n";
        let db = parse(input).unwrap();
        let a = db.get_node("A").unwrap().id();
        assert_eq!(db.entity(a).concurrent_separators(), &['-']);
        assert_eq!(db.depth(), 0);
    }

    #[test]
    fn test_reuse_from_sibling_region_conflicts() {
        let input = "state A {\n  --\n  x --> x\n  --\n  y --> y\n}\nx --> y\n";
        let err = parse(input).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DiagramError>(),
            Some(DiagramError::ReuseConflict { .. })
        ));
    }

    #[test]
    fn test_link_leaving_region_fails_validation() {
        let input = "state A {\n  --\n  y --> .z\n}\n";
        let err = parse(input).unwrap_err();
        match err.downcast_ref::<DiagramError>() {
            Some(DiagramError::CrossRegionLink { entity1, entity2 }) => {
                assert_eq!(entity1, "y");
                assert_eq!(entity2, "z");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_identifier_is_rejected() {
        for input in ["\"\" --> A\n", "\".\" --> A\n", ". --> A\n", "A --> \"\"\n"] {
            let err = parse(input).unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<DiagramError>(),
                    Some(DiagramError::ParseError { line: 1, .. })
                ),
                "{:?} gave {:?}",
                input,
                err
            );
        }

        let err = parse("A --> B\n\"\" --> B\n").unwrap_err();
        assert!(err.to_string().contains("does not name a state"));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_with_custom_separator() {
        let config = ModelConfig::new().with_separator(Some("::"));
        let parser = StateParser::for_config(&config);
        assert_eq!(parser.separator(), Some("::"));
        assert_eq!(
            parser.parse_statement("a::b --> c").unwrap(),
            Statement::Transition {
                from: Endpoint::State("a::b".to_string()),
                to: Endpoint::State("c".to_string()),
                label: None,
            }
        );
        assert_eq!(
            parser.parse_statement("a::b : waiting").unwrap(),
            Statement::Description {
                id: "a::b".to_string(),
                text: "waiting".to_string(),
            }
        );

        let mut db = StateDatabase::with_config(config);
        parser.parse("a::b --> c\n", &mut db).unwrap();
        let a = db.get_node("a").unwrap().id();
        let b = db.get_node("a::b").unwrap().id();
        assert_eq!(db.parent_container(b), Some(a));
        assert!(db.entity(b).description().is_empty());
        assert_eq!(db.edge_count(), 1);
    }

    #[test]
    fn test_unbalanced_close_fails() {
        let err = parse("A --> B\n}\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DiagramError>(),
            Some(DiagramError::UnbalancedGroup { line: 2 })
        ));
    }

    #[test]
    fn test_unclosed_group_fails() {
        let err = parse("state A {\n  x --> y\n").unwrap_err();
        assert!(err.to_string().contains("left open"));
    }

    #[test]
    fn test_hide_empty_description_sets_flag() {
        let db = parse("hide empty description\n[*] --> A\n").unwrap();
        assert!(db.hide_empty_description());
    }

    #[test]
    fn test_can_parse() {
        let parser = StateParser::new();
        assert!(parser.can_parse("@startuml\n[*] --> Idle"));
        assert!(parser.can_parse("[*] --> Idle"));
        assert!(parser.can_parse("state A {\n}"));
        assert!(!parser.can_parse("graph TD\nA --> B"));
    }
}
