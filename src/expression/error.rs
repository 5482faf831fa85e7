//! Error types for equation parsing

use std::fmt;
use std::io;
use std::sync::Arc;

/// The specific way an equation failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A character that is not legal at this point of the term
    IllegalCharacter,
    /// A literal negated twice in a row (`a''`)
    DoubleNegation,
    /// Two operators without a literal between them (`a*+b`)
    ConsecutiveOperators,
    /// The term does not begin with a literal
    IllegalStart,
    /// The term ends with an operator (`a*b+`)
    TrailingOperator,
    /// The term is empty or contains only whitespace
    EmptyExpression,
    /// The equation has no `=` separating the output name from the term
    MissingAssignment,
    /// The grammar rejected a token (unbalanced `)`, misplaced `'`, ...)
    UnexpectedToken,
    /// The input ended before the grammar was satisfied (unbalanced `(`)
    UnexpectedEnd,
    /// De Morgan expansion would produce too many product terms
    ExpansionLimit,
}

impl ParseErrorKind {
    fn describe(&self) -> &'static str {
        match self {
            ParseErrorKind::IllegalCharacter => "illegal character",
            ParseErrorKind::DoubleNegation => "double negation",
            ParseErrorKind::ConsecutiveOperators => "two operators in a row",
            ParseErrorKind::IllegalStart => "term must start with a literal",
            ParseErrorKind::TrailingOperator => "term ends with an operator",
            ParseErrorKind::EmptyExpression => "empty expression",
            ParseErrorKind::MissingAssignment => "expected `<name> = <term>`",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::UnexpectedEnd => "unexpected end of input",
            ParseErrorKind::ExpansionLimit => "expression expands to too many product terms",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Error produced when an equation or term cannot be parsed
///
/// Carries the kind of failure, the byte offset in the input where it was
/// detected (when one is meaningful) and the input itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// What went wrong
    pub kind: ParseErrorKind,
    /// Byte offset in `input` where the problem was detected
    pub position: Option<usize>,
    /// The text that failed to parse
    pub input: Arc<str>,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, position: Option<usize>, input: &str) -> Self {
        ParseError {
            kind,
            position,
            input: Arc::from(input),
        }
    }

    pub(crate) fn at(kind: ParseErrorKind, position: usize, input: &str) -> Self {
        Self::new(kind, Some(position), input)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pos) = self.position {
            write!(
                f,
                "Failed to parse equation at position {}: {}. Input: {:?}",
                pos, self.kind, self.input
            )
        } else {
            write!(
                f,
                "Failed to parse equation: {}. Input: {:?}",
                self.kind, self.input
            )
        }
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for io::Error {
    fn from(err: ParseError) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_with_position() {
        let err = ParseError::at(ParseErrorKind::ConsecutiveOperators, 2, "a*+b");
        let msg = err.to_string();
        assert!(msg.contains("position 2"));
        assert!(msg.contains("two operators in a row"));
    }

    #[test]
    fn test_parse_error_without_position() {
        let err = ParseError::new(ParseErrorKind::EmptyExpression, None, "  ");
        let msg = err.to_string();
        assert!(!msg.contains("position"));
        assert!(msg.contains("empty expression"));
    }

    #[test]
    fn test_parse_error_to_io_error() {
        let err = ParseError::at(ParseErrorKind::IllegalStart, 0, "*a");
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidData);
    }
}
