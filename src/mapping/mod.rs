//! Technology mapping of truth tables onto fixed-arity LUTs
//!
//! A function of at most `arity` literals fits one LUT whose configuration is
//! the truth table itself. Wider functions are split with Shannon expansion:
//! `arity` literals become the *data* inputs of first-level LUTs and the rest
//! become *select* literals. Every value of the select literals leaves a
//! cofactor over the data literals; constant cofactors need no LUT and equal
//! cofactors share one. A tree of multiplexer LUTs then picks the right
//! cofactor for the select values.
//!
//! The split with the fewest first-level LUTs wins. Every mapping is checked
//! by simulating the LUT network over all minterms before it is returned.
//!
//! # LUT configuration
//!
//! A LUT with inputs `i0 .. i(m-1)` reads bit `index` of its configuration,
//! where `i0` is the most significant bit of `index`. Configurations always
//! have `2^arity` bits; indices past `2^m` are zero.
//!
//! # Examples
//!
//! ```
//! use lut_synth::expression::parse_flat;
//! use lut_synth::mapping::{map_table, LutArity, MappingOptions};
//! use lut_synth::truth_table::TruthTable;
//!
//! let table = TruthTable::synthesize(&parse_flat("a").unwrap()).unwrap();
//! let mapping = map_table("F", &table, LutArity::Four, &MappingOptions::default()).unwrap();
//! assert_eq!(mapping.lut_count(), 1);
//! assert_eq!(mapping.luts()[0].config, "0100000000000000");
//! ```

pub mod error;

pub use error::MappingError;

use crate::truth_table::TruthTable;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Default bound on data-literal combinations tried for one function
pub const DEFAULT_MAX_COMBINATIONS: usize = 4096;

/// Number of inputs per LUT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LutArity {
    /// 4-input LUTs (16 configuration bits)
    Four,
    /// 6-input LUTs (64 configuration bits)
    Six,
}

impl LutArity {
    /// Number of inputs
    pub fn inputs(&self) -> usize {
        match self {
            LutArity::Four => 4,
            LutArity::Six => 6,
        }
    }

    /// Configuration length, `2^inputs`
    pub fn config_len(&self) -> usize {
        1 << self.inputs()
    }

    /// Select lines per multiplexer LUT: the largest `k` with `k + 2^k <= inputs`
    pub fn mux_selects(&self) -> usize {
        let n = self.inputs();
        (1..n).take_while(|k| k + (1 << k) <= n).last().unwrap_or(1)
    }
}

impl TryFrom<usize> for LutArity {
    type Error = MappingError;

    fn try_from(arity: usize) -> Result<Self, Self::Error> {
        match arity {
            4 => Ok(LutArity::Four),
            6 => Ok(LutArity::Six),
            _ => Err(MappingError::InvalidArity { arity }),
        }
    }
}

/// Tuning knobs for [`map_table`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingOptions {
    /// Upper bound on data-literal combinations evaluated per function
    pub max_combinations: usize,
}

impl MappingOptions {
    /// Options with the given combination bound
    pub fn new(max_combinations: usize) -> Self {
        MappingOptions { max_combinations }
    }
}

impl Default for MappingOptions {
    fn default() -> Self {
        MappingOptions {
            max_combinations: DEFAULT_MAX_COMBINATIONS,
        }
    }
}

/// What a LUT does in its equation's network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LutRole {
    /// Computes a cofactor (or the whole function) from data literals
    Logic,
    /// Selects between cofactors using select literals
    Mux,
}

/// One configured LUT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LutConfig {
    /// Unique LUT name
    pub name: Arc<str>,
    /// Input signals, most significant first
    pub inputs: Vec<Arc<str>>,
    /// Output signal
    pub output: Arc<str>,
    /// `0`/`1` configuration string of `2^arity` characters
    pub config: String,
    /// Logic or multiplexer
    pub role: LutRole,
}

impl LutConfig {
    /// Output for the given input values (most significant first)
    pub fn evaluate(&self, values: &[bool]) -> bool {
        let index = values.iter().fold(0usize, |acc, &v| (acc << 1) | usize::from(v));
        self.config.as_bytes().get(index) == Some(&b'1')
    }
}

/// The LUT network implementing one equation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    luts: Vec<LutConfig>,
    output_lut: Arc<str>,
    select_lines: usize,
}

impl Mapping {
    /// LUTs in evaluation order: first-level LUTs, then multiplexer levels
    pub fn luts(&self) -> &[LutConfig] {
        &self.luts
    }

    /// Name of the LUT driving the equation output
    pub fn output_lut(&self) -> &Arc<str> {
        &self.output_lut
    }

    /// Number of select literals (0 when the function fits one LUT)
    pub fn select_lines(&self) -> usize {
        self.select_lines
    }

    /// Number of LUTs
    pub fn lut_count(&self) -> usize {
        self.luts.len()
    }

    /// Simulate the network; `literals` and `assignment` are parallel
    ///
    /// Returns `None` if a LUT reads a signal that is neither a literal nor
    /// the output of an earlier LUT.
    pub fn simulate(&self, literals: &[Arc<str>], assignment: &[bool]) -> Option<bool> {
        let mut signals: HashMap<&str, bool> = literals
            .iter()
            .zip(assignment)
            .map(|(l, &v)| (l.as_ref(), v))
            .collect();
        let mut last = None;
        for lut in &self.luts {
            let values = lut
                .inputs
                .iter()
                .map(|i| signals.get(i.as_ref()).copied())
                .collect::<Option<Vec<bool>>>()?;
            let out = lut.evaluate(&values);
            signals.insert(lut.output.as_ref(), out);
            if lut.name == self.output_lut {
                last = Some(out);
            }
        }
        last
    }
}

/// A cofactor or multiplexer slot: either a constant or a named signal
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Const(bool),
    Signal(Arc<str>),
}

fn config_string(bits: impl IntoIterator<Item = bool>, len: usize) -> String {
    let mut config: String = bits.into_iter().map(|b| if b { '1' } else { '0' }).collect();
    while config.len() < len {
        config.push('0');
    }
    config
}

/// Next lexicographic `k`-combination of `0..n`, in place
fn next_combination(combo: &mut [usize], n: usize) -> bool {
    let k = combo.len();
    for i in (0..k).rev() {
        if combo[i] < n - k + i {
            combo[i] += 1;
            for j in i + 1..k {
                combo[j] = combo[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

/// Cofactor of one select value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cofactor {
    Const(bool),
    /// Index into the distinct non-constant cofactors
    Lut(usize),
}

/// Cofactors of `table` for every select value, with `data` as LUT inputs
fn cofactors(
    table: &TruthTable,
    data: &[usize],
    selects: &[usize],
) -> (Vec<Cofactor>, Vec<Vec<bool>>) {
    let n = table.width();
    let bit = |p: usize| 1usize << (n - 1 - p);
    let mut distinct: Vec<Vec<bool>> = Vec::new();
    let mut index: HashMap<Vec<bool>, usize> = HashMap::new();
    let mut kinds = Vec::with_capacity(1 << selects.len());

    for s in 0..1usize << selects.len() {
        let mut base = 0usize;
        for (j, &p) in selects.iter().enumerate() {
            if s & (1 << (selects.len() - 1 - j)) != 0 {
                base |= bit(p);
            }
        }
        let cofactor: Vec<bool> = (0..1usize << data.len())
            .map(|d| {
                let mut minterm = base;
                for (j, &p) in data.iter().enumerate() {
                    if d & (1 << (data.len() - 1 - j)) != 0 {
                        minterm |= bit(p);
                    }
                }
                table.get(minterm)
            })
            .collect();
        let first = cofactor[0];
        if cofactor.iter().all(|&b| b == first) {
            kinds.push(Cofactor::Const(first));
        } else {
            let next = distinct.len();
            let id = *index.entry(cofactor.clone()).or_insert(next);
            if id == next {
                distinct.push(cofactor);
            }
            kinds.push(Cofactor::Lut(id));
        }
    }
    (kinds, distinct)
}

/// Map a truth table onto LUTs of the given arity
///
/// `output` names the signal the network drives; intermediate signals are
/// named `<output>.l<i>` (first level) and `<output>.m<i>` (multiplexers).
pub fn map_table(
    output: &str,
    table: &TruthTable,
    arity: LutArity,
    options: &MappingOptions,
) -> Result<Mapping, MappingError> {
    let n = table.width();
    let a = arity.inputs();
    let output: Arc<str> = Arc::from(output);

    if n <= a {
        let lut = LutConfig {
            name: Arc::from(format!("{}.l0", output)),
            inputs: table.literals().to_vec(),
            output: Arc::clone(&output),
            config: config_string(table.bits().iter().copied(), arity.config_len()),
            role: LutRole::Logic,
        };
        let mapping = Mapping {
            output_lut: Arc::clone(&lut.name),
            luts: vec![lut],
            select_lines: 0,
        };
        validate(&mapping, table, arity, &output)?;
        return Ok(mapping);
    }

    // Pick the data literals giving the fewest first-level LUTs
    let mut combo: Vec<usize> = (0..a).collect();
    let mut best: Option<(Vec<usize>, usize)> = None;
    let mut tried = 0;
    loop {
        let selects: Vec<usize> = (0..n).filter(|p| !combo.contains(p)).collect();
        let (_, distinct) = cofactors(table, &combo, &selects);
        if best.as_ref().map_or(true, |(_, count)| distinct.len() < *count) {
            best = Some((combo.clone(), distinct.len()));
        }
        tried += 1;
        if tried >= options.max_combinations.max(1) || !next_combination(&mut combo, n) {
            break;
        }
    }
    let data = best.map(|(combo, _)| combo).unwrap_or_else(|| (0..a).collect());
    let selects: Vec<usize> = (0..n).filter(|p| !data.contains(p)).collect();
    debug!(
        "{}: {} combinations tried, data literals {:?}",
        output, tried, data
    );

    let (kinds, distinct) = cofactors(table, &data, &selects);
    let data_names: Vec<Arc<str>> = data
        .iter()
        .map(|&p| Arc::clone(&table.literals()[p]))
        .collect();
    let mut luts: Vec<LutConfig> = distinct
        .into_iter()
        .enumerate()
        .map(|(i, cofactor)| {
            let name: Arc<str> = Arc::from(format!("{}.l{}", output, i));
            LutConfig {
                output: Arc::clone(&name),
                name,
                inputs: data_names.clone(),
                config: config_string(cofactor, arity.config_len()),
                role: LutRole::Logic,
            }
        })
        .collect();

    let mut slots: Vec<Slot> = kinds
        .iter()
        .map(|kind| match *kind {
            Cofactor::Lut(id) => Slot::Signal(Arc::clone(&luts[id].output)),
            Cofactor::Const(value) => Slot::Const(value),
        })
        .collect();

    // Multiplexer levels consume select literals from the least significant up
    let mut remaining: Vec<Arc<str>> = selects
        .iter()
        .map(|&p| Arc::clone(&table.literals()[p]))
        .collect();
    let mut mux_count = 0;
    while !remaining.is_empty() {
        let k = arity.mux_selects().min(remaining.len());
        let level_selects = remaining.split_off(remaining.len() - k);
        let mut next = Vec::with_capacity(slots.len() >> k);
        for chunk in slots.chunks(1 << k) {
            if chunk.iter().all(|s| *s == chunk[0]) {
                next.push(chunk[0].clone());
                continue;
            }
            let mux = mux_lut(
                Arc::from(format!("{}.m{}", output, mux_count)),
                &level_selects,
                chunk,
                arity,
            );
            mux_count += 1;
            next.push(Slot::Signal(Arc::clone(&mux.output)));
            luts.push(mux);
        }
        slots = next;
    }

    let output_lut = match slots.into_iter().next() {
        Some(Slot::Signal(signal)) => {
            let lut = luts
                .iter_mut()
                .find(|l| l.output == signal)
                .ok_or_else(|| MappingError::Mismatch {
                    output: Arc::clone(&output),
                    minterm: 0,
                })?;
            lut.output = Arc::clone(&output);
            Arc::clone(&lut.name)
        }
        Some(Slot::Const(value)) => {
            // Only reachable for constant functions wider than one LUT
            let lut = LutConfig {
                name: Arc::from(format!("{}.l{}", output, luts.len())),
                inputs: Vec::new(),
                output: Arc::clone(&output),
                config: config_string([value], arity.config_len()),
                role: LutRole::Logic,
            };
            let name = Arc::clone(&lut.name);
            luts.push(lut);
            name
        }
        None => {
            return Err(MappingError::Mismatch {
                output,
                minterm: 0,
            })
        }
    };

    let mapping = Mapping {
        luts,
        output_lut,
        select_lines: selects.len(),
    };
    validate(&mapping, table, arity, &output)?;
    debug!(
        "{}: mapped onto {} LUTs with {} select lines",
        output,
        mapping.lut_count(),
        mapping.select_lines
    );
    Ok(mapping)
}

/// Build a multiplexer LUT choosing between `slots` with `selects`
///
/// Inputs are the select signals (most significant first) followed by the
/// distinct data signals in slot order. For every input combination the
/// select inputs pick a slot; the output is that slot's constant or the value
/// of its data input.
fn mux_lut(name: Arc<str>, selects: &[Arc<str>], slots: &[Slot], arity: LutArity) -> LutConfig {
    let mut data: Vec<Arc<str>> = Vec::new();
    for slot in slots {
        if let Slot::Signal(signal) = slot {
            if !data.contains(signal) {
                data.push(Arc::clone(signal));
            }
        }
    }
    let k = selects.len();
    let m = k + data.len();
    let bits = (0..1usize << m).map(|index| {
        let select = index >> data.len();
        match &slots[select] {
            Slot::Const(value) => *value,
            Slot::Signal(signal) => {
                let d = data.iter().position(|s| s == signal).unwrap_or(0);
                index & (1 << (data.len() - 1 - d)) != 0
            }
        }
    });
    let config = config_string(bits, arity.config_len());
    let mut inputs = selects.to_vec();
    inputs.extend(data);
    LutConfig {
        output: Arc::clone(&name),
        name,
        inputs,
        config,
        role: LutRole::Mux,
    }
}

/// Check configuration lengths and simulate the network against the table
fn validate(
    mapping: &Mapping,
    table: &TruthTable,
    arity: LutArity,
    output: &Arc<str>,
) -> Result<(), MappingError> {
    for lut in &mapping.luts {
        if lut.config.len() != arity.config_len() {
            return Err(MappingError::ConfigLength {
                lut: Arc::clone(&lut.name),
                expected: arity.config_len(),
                actual: lut.config.len(),
            });
        }
    }
    let n = table.width();
    let mut assignment = vec![false; n];
    for minterm in 0..table.len() {
        for (p, value) in assignment.iter_mut().enumerate() {
            *value = minterm & (1 << (n - 1 - p)) != 0;
        }
        if mapping.simulate(table.literals(), &assignment) != Some(table.get(minterm)) {
            return Err(MappingError::Mismatch {
                output: Arc::clone(output),
                minterm,
            });
        }
    }
    Ok(())
}
