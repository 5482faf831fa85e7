//! Parsing support for parenthesized terms

use super::error::{ParseError, ParseErrorKind};
use super::normalize;
use super::TermList;
use lalrpop_util::ParseError as LalrpopError;

// Lalrpop-generated parser module (generated in OUT_DIR at build time)
#[allow(clippy::all)]
mod parser_impl {
    #![allow(clippy::all)]
    #![allow(dead_code)]
    #![allow(unused_variables)]
    #![allow(unused_imports)]
    #![allow(non_snake_case)]
    #![allow(non_camel_case_types)]
    #![allow(non_upper_case_globals)]
    include!(concat!(env!("OUT_DIR"), "/expression/grouped.rs"));
}

/// Parse a term that may use parentheses and negated groups
///
/// The term is parsed into a tree, negations are pushed down with De Morgan's
/// laws and the result is flattened. A tree that is already a product of sums
/// such as `(a + b) * c` is kept in that form ([`Form::Pos`]); anything else
/// is distributed into a sum of products.
///
/// [`Form::Pos`]: super::Form::Pos
///
/// # Examples
///
/// ```
/// use lut_synth::expression::{parse_normalized, Form};
///
/// let terms = parse_normalized("(x0'*x1')'").unwrap();
/// assert_eq!(terms.form(), Form::Sop);
/// assert_eq!(terms.to_string(), "x0 + x1");
///
/// let pos = parse_normalized("(a + b') * (c + d)").unwrap();
/// assert_eq!(pos.form(), Form::Pos);
/// ```
pub fn parse_normalized(input: &str) -> Result<TermList, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::new(ParseErrorKind::EmptyExpression, None, input));
    }
    let tree = parser_impl::ExprParser::new()
        .parse(input)
        .map_err(|e| grammar_error(input, e))?;
    normalize::normalize(&tree).map_err(|kind| ParseError::new(kind, None, input))
}

fn grammar_error<T>(input: &str, err: LalrpopError<usize, T, &'static str>) -> ParseError {
    match err {
        LalrpopError::InvalidToken { location } => {
            ParseError::at(ParseErrorKind::IllegalCharacter, location, input)
        }
        LalrpopError::UnrecognizedEof { location, .. } => {
            ParseError::at(ParseErrorKind::UnexpectedEnd, location, input)
        }
        LalrpopError::UnrecognizedToken {
            token: (start, _, _),
            ..
        }
        | LalrpopError::ExtraToken {
            token: (start, _, _),
        } => ParseError::at(ParseErrorKind::UnexpectedToken, start, input),
        LalrpopError::User { .. } => {
            ParseError::new(ParseErrorKind::UnexpectedToken, None, input)
        }
    }
}
