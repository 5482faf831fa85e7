//! Single-pass scanner for flat (unparenthesized) terms
//!
//! The scanner walks the term once, left to right, and decides what each
//! character means from the previous significant character. Whitespace and
//! parentheses carry no meaning here and are skipped; use the normalizing
//! parser when parentheses change the meaning of a term.

use super::error::{ParseError, ParseErrorKind};
use super::{Form, Operator, TermList};
use std::sync::Arc;

/// What the previous significant character was
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Literal,
    Negated,
    Operator,
}

fn operator_for(c: char) -> Option<Operator> {
    match c {
        '*' => Some(Operator::And),
        '+' => Some(Operator::Or),
        _ => None,
    }
}

/// Scan a flat sum-of-products term into literals, negation flags and operators
///
/// `*` is AND, `+` is OR and a trailing `'` negates the literal before it.
/// Literal names start with a letter and continue with letters or digits.
///
/// # Examples
///
/// ```
/// use lut_synth::expression::{parse_flat, Operator};
///
/// let terms = parse_flat("a*b' + c").unwrap();
/// let names: Vec<&str> = terms.literals().iter().map(|l| l.as_ref()).collect();
/// assert_eq!(names, vec!["a", "b", "c"]);
/// assert_eq!(terms.negations(), &[false, true, false]);
/// assert_eq!(terms.operators(), &[Operator::And, Operator::Or]);
/// ```
pub fn parse_flat(input: &str) -> Result<TermList, ParseError> {
    let mut literals: Vec<Arc<str>> = Vec::new();
    let mut negations = Vec::new();
    let mut operators = Vec::new();

    let mut state = State::Start;
    let mut current = String::new();

    for (pos, c) in input.char_indices() {
        if c.is_whitespace() || c == '(' || c == ')' {
            continue;
        }
        state = match state {
            State::Start => {
                if c.is_ascii_alphabetic() {
                    current.push(c);
                    State::Literal
                } else {
                    return Err(ParseError::at(ParseErrorKind::IllegalStart, pos, input));
                }
            }
            State::Literal => {
                if c.is_ascii_alphanumeric() {
                    current.push(c);
                    State::Literal
                } else if c == '\'' {
                    literals.push(Arc::from(current.as_str()));
                    negations.push(true);
                    current.clear();
                    State::Negated
                } else if let Some(op) = operator_for(c) {
                    literals.push(Arc::from(current.as_str()));
                    negations.push(false);
                    operators.push(op);
                    current.clear();
                    State::Operator
                } else {
                    return Err(ParseError::at(
                        ParseErrorKind::IllegalCharacter,
                        pos,
                        input,
                    ));
                }
            }
            State::Negated => {
                if let Some(op) = operator_for(c) {
                    operators.push(op);
                    State::Operator
                } else if c == '\'' {
                    return Err(ParseError::at(ParseErrorKind::DoubleNegation, pos, input));
                } else {
                    return Err(ParseError::at(
                        ParseErrorKind::IllegalCharacter,
                        pos,
                        input,
                    ));
                }
            }
            State::Operator => {
                if c.is_ascii_alphabetic() {
                    current.push(c);
                    State::Literal
                } else if operator_for(c).is_some() {
                    return Err(ParseError::at(
                        ParseErrorKind::ConsecutiveOperators,
                        pos,
                        input,
                    ));
                } else {
                    return Err(ParseError::at(
                        ParseErrorKind::IllegalCharacter,
                        pos,
                        input,
                    ));
                }
            }
        };
    }

    match state {
        State::Start => Err(ParseError::new(
            ParseErrorKind::EmptyExpression,
            None,
            input,
        )),
        State::Operator => Err(ParseError::at(
            ParseErrorKind::TrailingOperator,
            input.len(),
            input,
        )),
        State::Literal => {
            literals.push(Arc::from(current.as_str()));
            negations.push(false);
            Ok(TermList::from_parts(literals, negations, operators, Form::Sop))
        }
        State::Negated => Ok(TermList::from_parts(literals, negations, operators, Form::Sop)),
    }
}
