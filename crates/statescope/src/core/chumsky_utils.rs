//! Shared chumsky parser utilities for diagram parsing
//!
//! Common combinators used by the line-oriented diagram parsers. All of
//! them report `Rich` errors so they compose with diagram statement parsers.

use chumsky::prelude::*;

/// Parser extra carrying rich error reports
pub type Extra<'src> = extra::Err<Rich<'src, char>>;

/// Parse inline whitespace only (spaces and tabs, no newlines).
pub fn inline_whitespace<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    one_of(" \t").repeated().ignored()
}

/// Parse required inline whitespace (at least one space or tab).
pub fn inline_whitespace_required<'src>(
) -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    one_of(" \t").repeated().at_least(1).ignored()
}

/// Parse a line comment starting with a single quote.
pub fn line_comment<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    just('\'').ignore_then(any().repeated()).ignored()
}

/// Parse a bare identifier: words of letters, digits and `_` joined by the
/// namespace separator, with an optional leading separator for absolute
/// paths. Without a separator, `.` is an ordinary name character.
pub fn identifier<'src>(
    separator: Option<&str>,
) -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    let joiner_chars: Vec<char> = separator
        .filter(|s| !s.is_empty())
        .unwrap_or(".")
        .chars()
        .collect();
    let joiner_len = joiner_chars.len();

    let word = any()
        .filter(|c: &char| c.is_alphanumeric() || *c == '_')
        .repeated()
        .at_least(1);
    let joiner = any()
        .filter(move |c: &char| joiner_chars.contains(c))
        .repeated()
        .exactly(joiner_len);

    joiner
        .clone()
        .or_not()
        .then(word.clone())
        .then(joiner.then(word).repeated())
        .to_slice()
        .map(|path: &str| path.to_string())
}

/// Parse a double-quoted string, returning its contents.
pub fn quoted_string<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    just('"')
        .ignore_then(none_of('"').repeated().collect::<String>())
        .then_ignore(just('"'))
}

/// Parse the rest of the line, trimmed.
pub fn rest_of_line<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    any()
        .repeated()
        .collect::<String>()
        .map(|s| s.trim().to_string())
}
