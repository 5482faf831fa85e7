//! Complete truth tables over an ordered set of literals
//!
//! A [`TruthTable`] holds one output bit per minterm. Literal `p` of `n`
//! contributes bit `1 << (n - 1 - p)` to the minterm index, so the first
//! literal is the most significant bit and the rows read in the usual
//! textbook order.
//!
//! Tables are synthesized directly from a [`TermList`]: every product term
//! (SOP) or clause (POS) fixes some literal positions and leaves the rest free,
//! and the free positions are expanded over all their combinations.
//!
//! # Examples
//!
//! ```
//! use lut_synth::expression::parse_flat;
//! use lut_synth::truth_table::TruthTable;
//!
//! let terms = parse_flat("a*b' + b*c").unwrap();
//! let table = TruthTable::synthesize(&terms).unwrap();
//! assert_eq!(table.width(), 3);
//! assert_eq!(table.onset(), vec![3, 4, 5, 7]);
//! ```

use crate::expression::{Form, TermList};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Default limit on the number of unique literals in one equation
pub const DEFAULT_MAX_LITERALS: usize = 16;

/// Hard limit on the number of unique literals; larger limits are clamped
pub const MAX_LITERALS: usize = 24;

/// An equation has more unique literals than the configured limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthError {
    /// Unique literals in the equation
    pub literals: usize,
    /// The limit that was in force
    pub limit: usize,
}

impl fmt::Display for WidthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Function has {} unique literals but at most {} are supported",
            self.literals, self.limit
        )
    }
}

impl std::error::Error for WidthError {}

/// Output bits for every combination of an ordered list of literals
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TruthTable {
    literals: Vec<Arc<str>>,
    bits: Vec<bool>,
}

impl TruthTable {
    /// Synthesize the table of a term list with [`DEFAULT_MAX_LITERALS`]
    pub fn synthesize(terms: &TermList) -> Result<Self, WidthError> {
        Self::synthesize_bounded(terms, DEFAULT_MAX_LITERALS)
    }

    /// Synthesize the table of a term list with an explicit width limit
    ///
    /// The limit is clamped to [`MAX_LITERALS`]. A term that mentions a
    /// literal in both polarities marks nothing: such a product is never true
    /// and such a clause is never false.
    pub fn synthesize_bounded(terms: &TermList, max_literals: usize) -> Result<Self, WidthError> {
        let limit = max_literals.min(MAX_LITERALS);
        let literals = terms.unique_literals();
        let n = literals.len();
        if n > limit {
            return Err(WidthError {
                literals: n,
                limit,
            });
        }

        let positions: HashMap<&str, usize> = literals
            .iter()
            .enumerate()
            .map(|(p, lit)| (lit.as_ref(), p))
            .collect();

        // SOP starts all-zero and products set ones; POS is the dual
        let fill = terms.form() == Form::Pos;
        let all = (1usize << n) - 1;
        let mut bits = vec![fill; 1 << n];

        for range in terms.groups() {
            let mut fixed_mask = 0usize;
            let mut fixed_bits = 0usize;
            let mut contradictory = false;
            for i in range {
                let bit = 1usize << (n - 1 - positions[terms.literals()[i].as_ref()]);
                let negated = terms.negations()[i];
                // Value the literal must take for this term to fire
                let want = match terms.form() {
                    Form::Sop => !negated,
                    Form::Pos => negated,
                };
                if fixed_mask & bit != 0 {
                    if (fixed_bits & bit != 0) != want {
                        contradictory = true;
                        break;
                    }
                } else {
                    fixed_mask |= bit;
                    if want {
                        fixed_bits |= bit;
                    }
                }
            }
            if contradictory {
                continue;
            }

            let free = all & !fixed_mask;
            let mut sub = free;
            loop {
                bits[fixed_bits | sub] = !fill;
                if sub == 0 {
                    break;
                }
                sub = (sub - 1) & free;
            }
        }

        Ok(TruthTable { literals, bits })
    }

    /// Build a table by evaluating `f` on every minterm index
    pub fn from_fn(literals: Vec<Arc<str>>, mut f: impl FnMut(usize) -> bool) -> Self {
        let bits = (0..1usize << literals.len()).map(&mut f).collect();
        TruthTable { literals, bits }
    }

    /// Literals in column order (most significant first)
    pub fn literals(&self) -> &[Arc<str>] {
        &self.literals
    }

    /// Number of literals
    pub fn width(&self) -> usize {
        self.literals.len()
    }

    /// Number of rows, always `2^width`
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Always `false`: a table has at least one row
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Output bits indexed by minterm
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Output for one minterm; out-of-range minterms read as 0
    pub fn get(&self, minterm: usize) -> bool {
        self.bits.get(minterm).copied().unwrap_or(false)
    }

    /// Minterms whose output is 1, ascending
    pub fn onset(&self) -> Vec<usize> {
        (0..self.bits.len()).filter(|&m| self.bits[m]).collect()
    }

    /// Minterms whose output is 0, ascending
    pub fn offset(&self) -> Vec<usize> {
        (0..self.bits.len()).filter(|&m| !self.bits[m]).collect()
    }

    /// The constant value of the function, if it has one
    pub fn constant(&self) -> Option<bool> {
        let first = self.bits[0];
        self.bits.iter().all(|&b| b == first).then_some(first)
    }

    /// Position of a literal in column order
    pub fn position(&self, literal: &str) -> Option<usize> {
        self.literals.iter().position(|l| l.as_ref() == literal)
    }

    /// Minterm index of an assignment given in column order
    pub fn minterm(&self, assignment: &[bool]) -> usize {
        assignment
            .iter()
            .take(self.width())
            .fold(0, |acc, &v| (acc << 1) | usize::from(v))
    }

    /// Evaluate the function on an assignment given in column order
    pub fn evaluate(&self, assignment: &[bool]) -> bool {
        self.get(self.minterm(assignment))
    }

    /// Returns `true` if the output changes with the literal at `position`
    pub fn depends_on(&self, position: usize) -> bool {
        let bit = 1usize << (self.width() - 1 - position);
        (0..self.bits.len())
            .filter(|m| m & bit == 0)
            .any(|m| self.bits[m] != self.bits[m | bit])
    }

    /// Restrict the table to `keep`, in the order given
    ///
    /// Literals that are dropped are read as 0, so the result is only
    /// equivalent when the function does not depend on them. Literals in
    /// `keep` that this table does not have are don't-cares of the result.
    pub fn project(&self, keep: &[Arc<str>]) -> TruthTable {
        let n = self.width();
        let k = keep.len();
        let sources: Vec<Option<usize>> = keep.iter().map(|l| self.position(l)).collect();
        TruthTable::from_fn(keep.to_vec(), |minterm| {
            let mut source = 0usize;
            for (j, pos) in sources.iter().enumerate() {
                if let Some(p) = pos {
                    if minterm & (1 << (k - 1 - j)) != 0 {
                        source |= 1 << (n - 1 - p);
                    }
                }
            }
            self.bits[source]
        })
    }

    /// The output column as a `0`/`1` string in minterm order
    pub fn to_bit_string(&self) -> String {
        self.bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
    }
}

/// Renders one row per minterm under a `a | b | Output` header
impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut header: Vec<&str> = self.literals.iter().map(|l| l.as_ref()).collect();
        header.push("Output");
        let header = header.join(" | ");
        writeln!(f, "{}", header)?;
        writeln!(f, "{}", "-".repeat(header.len()))?;
        let n = self.width();
        for (minterm, &bit) in self.bits.iter().enumerate() {
            let mut cells: Vec<String> = self
                .literals
                .iter()
                .enumerate()
                .map(|(p, lit)| {
                    let value = (minterm >> (n - 1 - p)) & 1;
                    format!("{:<width$}", value, width = lit.len())
                })
                .collect();
            cells.push(u8::from(bit).to_string());
            writeln!(f, "{}", cells.join(" | "))?;
        }
        Ok(())
    }
}

/// Widest table [`TruthTable::karnaugh_map`] renders
pub const MAX_KMAP_LITERALS: usize = 4;

impl TruthTable {
    /// Karnaugh-map view of a table with at most [`MAX_KMAP_LITERALS`]
    /// literals, or `None` when it is wider
    pub fn karnaugh_map(&self) -> Option<KarnaughMap<'_>> {
        (self.width() <= MAX_KMAP_LITERALS).then_some(KarnaughMap { table: self })
    }
}

/// A truth table laid out as a Gray-coded Karnaugh map
///
/// Rows are indexed by the leading half of the literals, columns by the
/// rest; both axes step through Gray code so neighbouring cells differ in
/// one literal.
///
/// ```text
/// a\bc | 00 01 11 10
/// -------------------
/// 0    | 0  0  1  0
/// 1    | 0  1  1  1
/// ```
#[derive(Debug, Clone, Copy)]
pub struct KarnaughMap<'a> {
    table: &'a TruthTable,
}

fn gray_codes(bits: usize) -> impl Iterator<Item = usize> {
    (0..1usize << bits).map(|i| i ^ (i >> 1))
}

fn gray_label(code: usize, bits: usize) -> String {
    (0..bits)
        .map(|p| if (code >> (bits - 1 - p)) & 1 == 1 { '1' } else { '0' })
        .collect()
}

impl fmt::Display for KarnaughMap<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let literals = self.table.literals();
        let row_bits = literals.len() / 2;
        let col_bits = literals.len() - row_bits;
        let names = |range: &[Arc<str>]| range.iter().map(|l| l.as_ref()).collect::<String>();
        let corner = format!(
            "{}\\{}",
            names(&literals[..row_bits]),
            names(&literals[row_bits..])
        );
        let cell_width = col_bits.max(1);

        let columns: Vec<String> = gray_codes(col_bits)
            .map(|c| format!("{:<cell_width$}", gray_label(c, col_bits)))
            .collect();
        let header = format!("{} | {}", corner, columns.join(" "));
        writeln!(f, "{}", header.trim_end())?;
        writeln!(f, "{}", "-".repeat(header.trim_end().len()))?;

        for row in gray_codes(row_bits) {
            let cells: Vec<String> = gray_codes(col_bits)
                .map(|col| {
                    let bit = self.table.get((row << col_bits) | col);
                    format!("{:<cell_width$}", u8::from(bit))
                })
                .collect();
            let line = format!(
                "{:<width$} | {}",
                gray_label(row, row_bits),
                cells.join(" "),
                width = corner.len()
            );
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
