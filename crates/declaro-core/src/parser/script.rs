//! Whole-script parsing: splitting, statement parsing and replay.

use super::error::ParseError;
use super::parser::Parser;
use crate::ast::Statement;
use crate::lexer::{split_statements, Span};
use crate::schema::{Schema, SchemaBuilder};

/// Parses every statement of a DDL script.
///
/// Returns each statement with its span in `input`.
///
/// # Errors
///
/// Returns the first `ParseError`, located in `input`.
pub fn parse_statements(input: &str) -> Result<Vec<(Span, Statement)>, ParseError> {
    split_statements(input)
        .into_iter()
        .map(|span| {
            Parser::new(&input[span.start..span.end])
                .parse_statement()
                .map(|statement| (span, statement))
                .map_err(|err| err.in_statement(input, span))
        })
        .collect()
}

/// Parses a DDL script into the schema it declares.
///
/// Statements are replayed in order, so a later `ALTER TABLE` or
/// `DROP TABLE` acts on tables declared earlier in the script. Empty or
/// comment-only input yields an empty schema.
///
/// # Errors
///
/// Returns a `ParseError` naming the offending statement when a statement
/// does not parse or cannot apply; no partial schema is returned.
pub fn parse_schema(input: &str) -> Result<Schema, ParseError> {
    let mut builder = SchemaBuilder::new();
    for (span, statement) in parse_statements(input)? {
        builder.apply(statement).map_err(|message| {
            ParseError::new(message, Span::new(0, span.len())).in_statement(input, span)
        })?;
    }
    Ok(builder.finish())
}
