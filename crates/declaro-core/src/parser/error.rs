//! Parser error types.

use std::fmt;

use crate::lexer::{Span, TokenKind};

/// A parse error.
///
/// `span` points into the full DDL text once the error has been located
/// with [`ParseError::in_statement`]; before that it is relative to the
/// statement being parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// The location of the error.
    pub span: Span,
    /// Expected tokens (if applicable).
    pub expected: Option<String>,
    /// The actual token found.
    pub found: Option<TokenKind>,
    /// Text of the offending statement.
    pub statement: Option<String>,
    /// 1-based line and column of the error in the full text.
    pub location: Option<(usize, usize)>,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            expected: None,
            found: None,
            statement: None,
            location: None,
        }
    }

    /// Creates an "unexpected token" error.
    #[must_use]
    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        let expected_str: String = expected.into();
        let message = match &found {
            TokenKind::Error(msg) => msg.clone(),
            other => format!("Unexpected token: expected {expected_str}, found {other:?}"),
        };
        Self {
            message,
            span,
            expected: Some(expected_str),
            found: Some(found),
            statement: None,
            location: None,
        }
    }

    /// Creates an "unexpected end of input" error.
    #[must_use]
    pub fn unexpected_eof(expected: impl Into<String>, span: Span) -> Self {
        let expected_str: String = expected.into();
        Self {
            message: format!("Unexpected end of input: expected {expected_str}"),
            span,
            expected: Some(expected_str),
            found: Some(TokenKind::Eof),
            statement: None,
            location: None,
        }
    }

    /// Creates an error for a construct that parses but is not supported.
    #[must_use]
    pub fn unsupported(what: impl fmt::Display, span: Span) -> Self {
        Self::new(format!("Unsupported: {what}"), span)
    }

    /// Relocates an error raised while parsing the statement at
    /// `statement` within `source`.
    #[must_use]
    pub fn in_statement(mut self, source: &str, statement: Span) -> Self {
        self.span = self.span.shift(statement.start);
        self.location = Some(self.span.line_column(source));
        self.statement = source
            .get(statement.start..statement.end)
            .map(str::to_string);
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some((line, column)) => write!(f, "{} at line {line}, column {column}", self.message)?,
            None => write!(
                f,
                "{} at position {}..{}",
                self.message, self.span.start, self.span.end
            )?,
        }
        if let Some(statement) = &self.statement {
            write!(f, " in statement: {statement}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn located_error_reports_line_and_statement() {
        let source = "CREATE TABLE a (id int);\nCREATE TABLE b (id nope);";
        let statement = Span::new(25, 49);
        let err = ParseError::new("Unknown type 'nope'", Span::new(19, 23)).in_statement(source, statement);
        assert_eq!(err.span, Span::new(44, 48));
        assert_eq!(err.location, Some((2, 20)));
        assert_eq!(err.statement.as_deref(), Some("CREATE TABLE b (id nope)"));
        assert_eq!(
            err.to_string(),
            "Unknown type 'nope' at line 2, column 20 in statement: CREATE TABLE b (id nope)"
        );
    }

    #[test]
    fn unlocated_error_reports_position() {
        let err = ParseError::unexpected_eof("identifier", Span::new(3, 3));
        assert_eq!(
            err.to_string(),
            "Unexpected end of input: expected identifier at position 3..3"
        );
    }
}
