//! Equation parsing and the canonical term representation
//!
//! An equation such as `F = a*b' + c` is parsed into a [`TermList`]: the
//! ordered literal occurrences, one negation flag per occurrence and the
//! operators between them. Two parsers produce term lists:
//!
//! - [`parse_flat`], a single-pass scanner for unparenthesized terms. This is
//!   the common path and reports precise errors such as
//!   [`ParseErrorKind::ConsecutiveOperators`].
//! - [`parse_normalized`], a grammar-based parser that accepts parentheses
//!   and negated groups, applies De Morgan's laws and flattens the result to a
//!   sum of products or a product of sums.
//!
//! [`Equation`] then carries the term list through the rest of the pipeline:
//! truth-table synthesis, minimization and technology mapping.
//!
//! # Examples
//!
//! ```
//! use lut_synth::expression::{Equation, ParseMode};
//!
//! let mut eq = Equation::parse("F = a*b*c + a*b*c'").unwrap();
//! eq.synthesize(16).unwrap();
//! let minimized = eq.minimize().unwrap();
//! assert_eq!(minimized.expression(), "a*b");
//! assert_eq!(eq.to_string(), "F = a*b");
//! ```

mod display;
pub mod error;
mod normalize;
mod parser;
mod scanner;

pub use error::{ParseError, ParseErrorKind};
pub use normalize::MAX_EXPANDED_TERMS;
pub use parser::parse_normalized;
pub use scanner::parse_flat;

use crate::mapping::{map_table, LutArity, Mapping, MappingError, MappingOptions};
use crate::minimize::{self, Minimized};
use crate::truth_table::{TruthTable, WidthError};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;

/// A binary operator between two literal occurrences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Logical AND, written `*`
    And,
    /// Logical OR, written `+`
    Or,
}

impl Operator {
    /// The character used for this operator in equation text
    pub fn symbol(&self) -> char {
        match self {
            Operator::And => '*',
            Operator::Or => '+',
        }
    }
}

/// The two-level shape of a term list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Form {
    /// Sum of products: `+` separates terms, `*` joins literals inside a term
    #[default]
    Sop,
    /// Product of sums: `*` separates clauses, `+` joins literals inside a clause
    Pos,
}

/// Which parser [`Equation::parse_with`] uses for the term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParseMode {
    /// Use the normalizing parser when the term contains parentheses
    #[default]
    Auto,
    /// Always use the flat scanner (parentheses are ignored)
    Flat,
    /// Always use the normalizing parser
    Normalized,
}

/// Parse a term (the right-hand side of an equation) with the given mode
pub fn parse_terms(input: &str, mode: ParseMode) -> Result<TermList, ParseError> {
    let normalized = match mode {
        ParseMode::Auto => input.contains(['(', ')']),
        ParseMode::Flat => false,
        ParseMode::Normalized => true,
    };
    if normalized {
        parse_normalized(input)
    } else {
        parse_flat(input)
    }
}

/// Ordered literal occurrences with their negation flags and operators
///
/// Duplicates are allowed: every occurrence of a literal in the source text
/// is kept. There is always one operator fewer than there are literals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TermList {
    literals: Vec<Arc<str>>,
    negations: Vec<bool>,
    operators: Vec<Operator>,
    form: Form,
}

impl TermList {
    pub(crate) fn from_parts(
        literals: Vec<Arc<str>>,
        negations: Vec<bool>,
        operators: Vec<Operator>,
        form: Form,
    ) -> Self {
        debug_assert_eq!(literals.len(), negations.len());
        debug_assert_eq!(operators.len() + 1, literals.len().max(1));
        TermList {
            literals,
            negations,
            operators,
            form,
        }
    }

    /// An empty list, which denotes the constant of `form` (0 for SOP, 1 for POS)
    pub fn constant(form: Form) -> Self {
        TermList {
            form,
            ..Default::default()
        }
    }

    /// Literal occurrences in source order
    pub fn literals(&self) -> &[Arc<str>] {
        &self.literals
    }

    /// One flag per literal occurrence; `true` means the occurrence is negated
    pub fn negations(&self) -> &[bool] {
        &self.negations
    }

    /// Operators between consecutive literal occurrences
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// Whether the list is a sum of products or a product of sums
    pub fn form(&self) -> Form {
        self.form
    }

    /// Returns `true` if the list has no literals (a constant)
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Unique literals in first-occurrence order
    pub fn unique_literals(&self) -> Vec<Arc<str>> {
        let mut seen: Vec<Arc<str>> = Vec::new();
        for lit in &self.literals {
            if !seen.contains(lit) {
                seen.push(Arc::clone(lit));
            }
        }
        seen
    }

    /// Literal count plus operator count, used to order placement
    pub fn complexity(&self) -> usize {
        self.literals.len() + self.operators.len()
    }

    /// Index ranges of the terms (SOP) or clauses (POS) of this list
    pub fn groups(&self) -> Vec<Range<usize>> {
        if self.literals.is_empty() {
            return Vec::new();
        }
        let separator = match self.form {
            Form::Sop => Operator::Or,
            Form::Pos => Operator::And,
        };
        let mut ranges = Vec::new();
        let mut start = 0;
        for (i, op) in self.operators.iter().enumerate() {
            if *op == separator {
                ranges.push(start..i + 1);
                start = i + 1;
            }
        }
        ranges.push(start..self.literals.len());
        ranges
    }

    pub(crate) fn rename_literal(&mut self, from: &str, to: &Arc<str>) {
        for lit in self.literals.iter_mut() {
            if lit.as_ref() == from {
                *lit = Arc::clone(to);
            }
        }
    }
}

/// Technology-mapping state of an equation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MappingState {
    /// Not yet mapped onto LUTs
    #[default]
    Unmapped,
    /// Mapped onto one or more LUTs
    Mapped(Mapping),
}

/// One `output = term` equation moving through the compilation pipeline
///
/// The term list, truth table and mapping are filled in by
/// [`synthesize`](Equation::synthesize), [`minimize`](Equation::minimize) and
/// [`map`](Equation::map), in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    output: Arc<str>,
    text: Arc<str>,
    terms: TermList,
    table: Option<TruthTable>,
    minimized: Option<Minimized>,
    mapping: MappingState,
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

impl Equation {
    /// Parse `name = term`, choosing the term parser automatically
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Self::parse_with(text, ParseMode::Auto)
    }

    /// Parse `name = term` with an explicit [`ParseMode`]
    ///
    /// Error positions are byte offsets into the whole equation text.
    pub fn parse_with(text: &str, mode: ParseMode) -> Result<Self, ParseError> {
        let Some(split) = text.find('=') else {
            return Err(ParseError::new(ParseErrorKind::MissingAssignment, None, text));
        };
        let name = text[..split].trim();
        if !is_identifier(name) {
            let start = text.len() - text.trim_start().len();
            return Err(ParseError::at(ParseErrorKind::IllegalStart, start, text));
        }
        let offset = split + 1;
        let terms = parse_terms(&text[offset..], mode).map_err(|e| ParseError {
            kind: e.kind,
            position: e.position.map(|p| p + offset),
            input: Arc::from(text),
        })?;
        Ok(Equation {
            output: Arc::from(name),
            text: Arc::from(text),
            terms,
            table: None,
            minimized: None,
            mapping: MappingState::Unmapped,
        })
    }

    /// The output signal this equation drives
    pub fn output(&self) -> &Arc<str> {
        &self.output
    }

    /// The source text as given to [`parse`](Equation::parse)
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The current term list (the minimized one after [`minimize`](Equation::minimize))
    pub fn terms(&self) -> &TermList {
        &self.terms
    }

    /// The synthesized truth table, if any
    pub fn table(&self) -> Option<&TruthTable> {
        self.table.as_ref()
    }

    /// The minimization result, if the equation was minimized
    pub fn minimized(&self) -> Option<&Minimized> {
        self.minimized.as_ref()
    }

    /// The technology-mapping state
    pub fn mapping_state(&self) -> &MappingState {
        &self.mapping
    }

    /// The LUT mapping, if the equation was mapped
    pub fn mapping(&self) -> Option<&Mapping> {
        match &self.mapping {
            MappingState::Mapped(mapping) => Some(mapping),
            MappingState::Unmapped => None,
        }
    }

    /// The current expression text (without the output name)
    pub fn expression(&self) -> String {
        match &self.minimized {
            Some(minimized) => minimized.expression().to_string(),
            None => self.terms.to_string(),
        }
    }

    /// Unique input literals in first-occurrence order
    pub fn inputs(&self) -> Vec<Arc<str>> {
        match &self.table {
            Some(table) => table.literals().to_vec(),
            None => self.terms.unique_literals(),
        }
    }

    /// Literal count plus operator count of the current term list
    pub fn complexity(&self) -> usize {
        self.terms.complexity()
    }

    pub(crate) fn rename_output(&mut self, name: Arc<str>) {
        self.output = name;
    }

    pub(crate) fn rename_literal(&mut self, from: &str, to: &Arc<str>) {
        self.terms.rename_literal(from, to);
    }

    /// Build the truth table of the current term list
    ///
    /// Fails when the equation has more than `max_literals` unique literals.
    pub fn synthesize(&mut self, max_literals: usize) -> Result<&TruthTable, WidthError> {
        let table = TruthTable::synthesize_bounded(&self.terms, max_literals)?;
        Ok(self.table.insert(table))
    }

    /// Minimize the synthesized table with Quine-McCluskey
    ///
    /// The term list is replaced by the minimized one and the table is
    /// restricted to the literals that survive. Returns `None` if the equation
    /// has not been synthesized.
    pub fn minimize(&mut self) -> Option<&Minimized> {
        let table = self.table.as_ref()?;
        let minimized = minimize::minimize(table, self.terms.form);
        let projected = table.project(minimized.literals());
        self.terms = minimized.to_term_list();
        self.table = Some(projected);
        Some(self.minimized.insert(minimized))
    }

    /// Map the synthesized table onto LUTs of the given arity
    pub fn map(
        &mut self,
        arity: LutArity,
        options: &MappingOptions,
    ) -> Result<&Mapping, MappingError> {
        let table = self.table.as_ref().ok_or(MappingError::Unsynthesized)?;
        let mapping = map_table(&self.output, table, arity, options)?;
        self.mapping = MappingState::Mapped(mapping);
        match &self.mapping {
            MappingState::Mapped(mapping) => Ok(mapping),
            MappingState::Unmapped => Err(MappingError::Unsynthesized),
        }
    }
}
