//! Two-level minimization with Quine-McCluskey
//!
//! [`minimize`] reduces a [`TruthTable`] to a minimal sum of products (from
//! the onset) or product of sums (from the offset):
//!
//! 1. [`prime_implicants`] merges cubes that differ in one position, level by
//!    level, until no merge is possible. Cubes that never merge are primes.
//! 2. [`unate_cover`] picks the cheapest set of primes covering every minterm.
//!    Essential primes are taken first; the remaining chart is solved by
//!    branch enumeration with subsumption pruning. Past
//!    [`MAX_CANDIDATE_COVERS`] partial covers the search falls back to a greedy
//!    completion.
//! 3. The chosen cubes are rendered as an expression over the table's literals.
//!
//! The cost of a cover is the number of literal occurrences it renders to;
//! ties go to the cover with fewer cubes, then to the first cover found.
//!
//! # Examples
//!
//! ```
//! use lut_synth::expression::{parse_flat, Form};
//! use lut_synth::minimize::minimize;
//! use lut_synth::truth_table::TruthTable;
//!
//! let table = TruthTable::synthesize(&parse_flat("a*b + a'*b'").unwrap()).unwrap();
//! let result = minimize(&table, Form::Sop);
//! assert_eq!(result.expression(), "a*b + a'*b'");
//! assert_eq!(result.complexity(), 4);
//! ```

use crate::expression::{Form, Operator, TermList};
use crate::truth_table::TruthTable;
use log::{debug, warn};
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Partial covers kept during branch enumeration before going greedy
pub const MAX_CANDIDATE_COVERS: usize = 4096;

/// A product term over `width` literals
///
/// `mask` bits are don't-cares; `bits` holds the required values of the other
/// positions and is zero wherever `mask` is set. Bit positions follow the
/// table convention: literal `p` is bit `width - 1 - p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cube {
    /// Required values of the cared-for positions
    pub bits: u64,
    /// Don't-care positions
    pub mask: u64,
}

impl Cube {
    /// The cube of a single minterm
    pub fn minterm(minterm: u64) -> Self {
        Cube {
            bits: minterm,
            mask: 0,
        }
    }

    /// Merge two cubes that differ in exactly one cared-for position
    pub fn merge(&self, other: &Cube) -> Option<Cube> {
        if self.mask != other.mask {
            return None;
        }
        let diff = self.bits ^ other.bits;
        if diff.count_ones() != 1 {
            return None;
        }
        Some(Cube {
            bits: self.bits & other.bits,
            mask: self.mask | diff,
        })
    }

    /// Returns `true` if `minterm` lies inside this cube
    pub fn covers(&self, minterm: u64) -> bool {
        minterm & !self.mask == self.bits
    }

    /// Number of cared-for positions among the low `width` bits
    pub fn literal_count(&self, width: usize) -> usize {
        (!self.mask & full_mask(width)).count_ones() as usize
    }

    /// Per-literal view in column order: `Some(value)` or `None` for don't-care
    pub fn inputs(&self, width: usize) -> Vec<Option<bool>> {
        (0..width)
            .map(|p| {
                let bit = 1u64 << (width - 1 - p);
                (self.mask & bit == 0).then_some(self.bits & bit != 0)
            })
            .collect()
    }
}

fn full_mask(width: usize) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// A set of cubes covering a function's onset (or offset, for POS)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cover {
    width: usize,
    cubes: Vec<Cube>,
}

impl Cover {
    /// Build a cover; cubes are kept in rendering order
    pub fn new(width: usize, mut cubes: Vec<Cube>) -> Self {
        cubes.sort_by_key(|c| Reverse((c.bits, c.mask)));
        cubes.dedup();
        Cover { width, cubes }
    }

    /// Cubes in rendering order (descending bit pattern, then mask)
    pub fn cubes(&self) -> &[Cube] {
        &self.cubes
    }

    /// Literal width the cubes are defined over
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of cubes
    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    /// Returns `true` if the cover has no cubes
    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    /// Total literal occurrences in the rendered expression
    pub fn complexity(&self) -> usize {
        complexity(self.width, &self.cubes)
    }

    /// Returns `true` if some cube covers `minterm`
    pub fn covers(&self, minterm: u64) -> bool {
        self.cubes.iter().any(|c| c.covers(minterm))
    }
}

fn complexity(width: usize, cubes: &[Cube]) -> usize {
    cubes.iter().map(|c| c.literal_count(width)).sum()
}

/// What a minimization produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Solution {
    /// The function is constant
    Constant(bool),
    /// A cover of the onset (SOP) or offset (POS)
    Cover(Cover),
}

/// Result of [`minimize`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minimized {
    expression: String,
    literals: Vec<Arc<str>>,
    table_literals: Vec<Arc<str>>,
    form: Form,
    solution: Solution,
}

impl Minimized {
    /// The minimized expression, `0`/`1` for constants
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Literals the minimized function still depends on, in table order
    pub fn literals(&self) -> &[Arc<str>] {
        &self.literals
    }

    /// Form of the minimized expression
    pub fn form(&self) -> Form {
        self.form
    }

    /// The constant or the chosen cover
    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    /// Literal occurrences in the expression; 0 for constants
    pub fn complexity(&self) -> usize {
        match &self.solution {
            Solution::Constant(_) => 0,
            Solution::Cover(cover) => cover.complexity(),
        }
    }

    /// The minimized expression as a term list
    ///
    /// Constant 1 becomes an empty product of sums and constant 0 an empty sum
    /// of products, so both evaluate correctly when re-synthesized.
    pub fn to_term_list(&self) -> TermList {
        match &self.solution {
            Solution::Constant(true) => TermList::constant(Form::Pos),
            Solution::Constant(false) => TermList::constant(Form::Sop),
            Solution::Cover(cover) => render(cover, &self.table_literals, self.form),
        }
    }
}

fn render(cover: &Cover, names: &[Arc<str>], form: Form) -> TermList {
    let (inner, outer) = match form {
        Form::Sop => (Operator::And, Operator::Or),
        Form::Pos => (Operator::Or, Operator::And),
    };
    let mut literals = Vec::new();
    let mut negations = Vec::new();
    let mut operators = Vec::new();
    for (c, cube) in cover.cubes().iter().enumerate() {
        if c > 0 {
            operators.push(outer);
        }
        let mut first = true;
        for (p, value) in cube.inputs(cover.width()).into_iter().enumerate() {
            let Some(value) = value else { continue };
            if !first {
                operators.push(inner);
            }
            first = false;
            literals.push(Arc::clone(&names[p]));
            // An offset cube is excluded by a clause that negates its asserted bits
            negations.push(match form {
                Form::Sop => !value,
                Form::Pos => value,
            });
        }
    }
    TermList::from_parts(literals, negations, operators, form)
}

/// Compute all prime implicants of the function whose onset is `minterms`
///
/// Results are sorted, so the output is deterministic.
pub fn prime_implicants(width: usize, minterms: &[u64]) -> Vec<Cube> {
    let mut levels: Vec<BTreeSet<Cube>> = vec![BTreeSet::new(); width + 1];
    for &m in minterms {
        levels[m.count_ones() as usize].insert(Cube::minterm(m));
    }

    let mut primes = BTreeSet::new();
    while !levels.is_empty() {
        let mut next = Vec::with_capacity(levels.len().saturating_sub(1));
        let mut merged = BTreeSet::new();
        for pair in levels.windows(2) {
            let mut level = BTreeSet::new();
            for a in &pair[0] {
                for b in &pair[1] {
                    if let Some(m) = a.merge(b) {
                        level.insert(m);
                        merged.insert(*a);
                        merged.insert(*b);
                    }
                }
            }
            next.push(level);
        }
        for level in &levels {
            primes.extend(level.iter().filter(|c| !merged.contains(c)).copied());
        }
        levels = next;
    }
    primes.into_iter().collect()
}

/// Primes that are the only prime covering some minterm
pub fn essential_primes(primes: &[Cube], minterms: &[u64]) -> Vec<Cube> {
    let mut essential = BTreeSet::new();
    for &m in minterms {
        let mut covering = primes.iter().filter(|p| p.covers(m));
        if let (Some(only), None) = (covering.next(), covering.next()) {
            essential.insert(*only);
        }
    }
    essential.into_iter().collect()
}

/// Choose a minimum-cost subset of `primes` covering every minterm
pub fn unate_cover(width: usize, primes: &[Cube], minterms: &[u64]) -> Vec<Cube> {
    let essential = essential_primes(primes, minterms);
    let remaining: Vec<u64> = minterms
        .iter()
        .copied()
        .filter(|&m| !essential.iter().any(|e| e.covers(m)))
        .collect();
    if remaining.is_empty() {
        return essential;
    }

    let candidates: Vec<Cube> = primes
        .iter()
        .filter(|p| !essential.contains(p))
        .copied()
        .collect();
    let chart: Vec<Vec<usize>> = remaining
        .iter()
        .map(|&m| {
            (0..candidates.len())
                .filter(|&i| candidates[i].covers(m))
                .collect()
        })
        .collect();

    let chosen = match branch_covers(&chart) {
        Some(covers) => cheapest(width, &candidates, &covers),
        None => {
            warn!(
                "Cover search exceeded {} candidates; completing greedily",
                MAX_CANDIDATE_COVERS
            );
            greedy_cover(width, &candidates, &remaining)
        }
    };

    let mut result = essential;
    result.extend(chosen.into_iter().map(|i| candidates[i]));
    result
}

/// Every irredundant choice of one prime per chart column, or `None` past the limit
fn branch_covers(chart: &[Vec<usize>]) -> Option<Vec<BTreeSet<usize>>> {
    let mut covers: Vec<BTreeSet<usize>> = match chart.first() {
        Some(column) => column.iter().map(|&i| BTreeSet::from([i])).collect(),
        None => return Some(Vec::new()),
    };
    for column in &chart[1..] {
        let mut next: Vec<BTreeSet<usize>> = Vec::new();
        for cover in &covers {
            if column.iter().any(|i| cover.contains(i)) {
                // Already covered: extending would only add a superset
                push_minimal(&mut next, cover.clone());
                continue;
            }
            for &i in column {
                let mut extended = cover.clone();
                extended.insert(i);
                push_minimal(&mut next, extended);
            }
        }
        if next.len() > MAX_CANDIDATE_COVERS {
            return None;
        }
        covers = next;
    }
    Some(covers)
}

/// Insert `cover` unless a subset is present, dropping any supersets of it
fn push_minimal(covers: &mut Vec<BTreeSet<usize>>, cover: BTreeSet<usize>) {
    if covers.iter().any(|c| c.is_subset(&cover)) {
        return;
    }
    covers.retain(|c| !cover.is_subset(c));
    covers.push(cover);
}

fn cheapest(width: usize, candidates: &[Cube], covers: &[BTreeSet<usize>]) -> Vec<usize> {
    let mut best: Option<((usize, usize), &BTreeSet<usize>)> = None;
    for cover in covers {
        let cubes: Vec<Cube> = cover.iter().map(|&i| candidates[i]).collect();
        let key = (complexity(width, &cubes), cubes.len());
        if best.as_ref().map_or(true, |(k, _)| key < *k) {
            best = Some((key, cover));
        }
    }
    best.map(|(_, cover)| cover.iter().copied().collect())
        .unwrap_or_default()
}

fn greedy_cover(width: usize, candidates: &[Cube], minterms: &[u64]) -> Vec<usize> {
    let mut uncovered: BTreeSet<u64> = minterms.iter().copied().collect();
    let mut chosen = Vec::new();
    while !uncovered.is_empty() {
        let pick = (0..candidates.len())
            .filter(|i| !chosen.contains(i))
            .map(|i| {
                let gain = uncovered.iter().filter(|&&m| candidates[i].covers(m)).count();
                (i, gain)
            })
            .filter(|&(_, gain)| gain > 0)
            // Largest gain, then fewest literals, then lowest index
            .min_by_key(|&(i, gain)| (Reverse(gain), candidates[i].literal_count(width), i));
        let Some((i, _)) = pick else { break };
        uncovered.retain(|&m| !candidates[i].covers(m));
        chosen.push(i);
    }
    chosen
}

/// Minimize a truth table to a sum of products or a product of sums
///
/// SOP covers the onset; POS covers the offset and renders each cube as the
/// clause that excludes it. A constant function renders as `0` or `1`.
pub fn minimize(table: &TruthTable, form: Form) -> Minimized {
    let width = table.width();
    let minterms: Vec<u64> = match form {
        Form::Sop => table.onset(),
        Form::Pos => table.offset(),
    }
    .into_iter()
    .map(|m| m as u64)
    .collect();

    let solution = if minterms.is_empty() {
        // No onset is constant 0; no offset is constant 1
        Solution::Constant(form == Form::Pos)
    } else if minterms.len() == table.len() {
        Solution::Constant(form == Form::Sop)
    } else {
        let primes = prime_implicants(width, &minterms);
        let cubes = unate_cover(width, &primes, &minterms);
        debug!(
            "{} primes, {} cubes chosen for {} minterms",
            primes.len(),
            cubes.len(),
            minterms.len()
        );
        Solution::Cover(Cover::new(width, cubes))
    };

    let literals = match &solution {
        Solution::Constant(_) => Vec::new(),
        Solution::Cover(cover) => {
            let cared = cover
                .cubes()
                .iter()
                .fold(0u64, |acc, c| acc | !c.mask)
                & full_mask(width);
            (0..width)
                .filter(|p| cared & (1u64 << (width - 1 - p)) != 0)
                .map(|p| Arc::clone(&table.literals()[p]))
                .collect()
        }
    };

    let mut minimized = Minimized {
        expression: String::new(),
        literals,
        table_literals: table.literals().to_vec(),
        form,
        solution,
    };
    minimized.expression = minimized.to_term_list().to_string();
    minimized
}

#[cfg(test)]
mod tests;
