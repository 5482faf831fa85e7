//! Display formatting for term lists and equations

use super::{Equation, Form, TermList};
use std::fmt;

impl TermList {
    fn fmt_literal(&self, f: &mut fmt::Formatter<'_>, index: usize) -> fmt::Result {
        write!(f, "{}", self.literals[index])?;
        if self.negations[index] {
            write!(f, "'")?;
        }
        Ok(())
    }
}

/// Renders text that parses back to the same function
///
/// Sum-of-products lists render as `a*b' + c`; product-of-sums lists render
/// their multi-literal clauses in parentheses, `(a+b') * c`. An empty list is
/// the constant of its form: `0` for SOP, `1` for POS.
impl fmt::Display for TermList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.literals.is_empty() {
            return write!(f, "{}", if self.form == Form::Pos { "1" } else { "0" });
        }
        let (inner, outer) = match self.form {
            Form::Sop => ("*", " + "),
            Form::Pos => ("+", " * "),
        };
        for (g, range) in self.groups().into_iter().enumerate() {
            if g > 0 {
                f.write_str(outer)?;
            }
            let parens = self.form == Form::Pos && range.len() > 1;
            if parens {
                f.write_str("(")?;
            }
            for (i, index) in range.enumerate() {
                if i > 0 {
                    f.write_str(inner)?;
                }
                self.fmt_literal(f, index)?;
            }
            if parens {
                f.write_str(")")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.output, self.expression())
    }
}
