//! # LUT Synthesis
//!
//! This crate compiles Boolean equations onto an abstract FPGA-like fabric
//! built from fixed-arity look-up tables (LUTs).
//!
//! ## Overview
//!
//! Every equation of a batch goes through the same pipeline:
//!
//! 1. [`expression`] parses `F = a*b + c'` text into a term list
//! 2. [`names`] keeps redefined outputs apart (`F`, `F_1`, ...)
//! 3. [`truth_table`] evaluates the terms over every input combination
//! 4. [`minimize`] runs Quine-McCluskey on the table
//! 5. [`mapping`] splits the table into 4- or 6-input LUTs, adding
//!    multiplexer LUTs when one LUT is not enough
//!
//! and the mapped batch is then placed on a [`FabricState`] by [`place`],
//! with [`route`] filling in the connection bookkeeping.
//!
//! ## Compiling a batch
//!
//! ```
//! use lut_synth::{compile, PlacementPolicy};
//!
//! # fn main() -> Result<(), lut_synth::CompileError> {
//! let fabric = compile(&["F = a*b*c + a*b*c'", "G = F + d"], 4, 4, None)?;
//!
//! // G reads F, so the batch is placed column by column
//! assert_eq!(fabric.policy, PlacementPolicy::Constrained);
//! assert_eq!(fabric.equations[0].expression, "a*b");
//! assert_eq!(fabric.utilization.luts_used, 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! [`compile_with`] takes a [`CompileConfig`] for the knobs [`compile`]
//! leaves at their defaults:
//!
//! ```
//! use lut_synth::{compile_with, CompileConfig, PlacementPolicy};
//!
//! # fn main() -> Result<(), lut_synth::CompileError> {
//! let mut config = CompileConfig::new(8, 6);
//! config.policy = PlacementPolicy::Free;
//! config.minimize = false;
//!
//! let fabric = compile_with(&["X = a*b + a*b'"], &config)?;
//! assert_eq!(fabric.equations[0].expression, "a*b + a*b'");
//! # Ok(())
//! # }
//! ```
//!
//! ## Persisting results
//!
//! A compiled [`FabricState`] is written and read back as JSON through the
//! [`bitstream`] module, and rendered for people by [`report`].

pub mod bitstream;
pub mod error;
pub mod expression;
pub mod fabric;
pub mod mapping;
pub mod minimize;
pub mod names;
pub mod place;
pub mod report;
pub mod route;
pub mod truth_table;

pub use bitstream::BitstreamError;
pub use error::{CompileError, Resource};
pub use expression::{Equation, Form, ParseError, ParseMode};
pub use fabric::{Cell, Coord, FabricState, LutRecord, PlacementPolicy};
pub use mapping::{LutArity, LutRole};
pub use place::ConnectivityScheme;
pub use truth_table::TruthTable;

use log::{debug, info};
use mapping::{MappingOptions, DEFAULT_MAX_COMBINATIONS};
use names::NameContext;
use std::sync::Arc;
use truth_table::DEFAULT_MAX_LITERALS;

/// Settings for one [`compile_with`] call
///
/// # Examples
///
/// ```
/// use lut_synth::{CompileConfig, PlacementPolicy};
///
/// let config = CompileConfig::new(16, 4);
/// assert_eq!(config.policy, PlacementPolicy::Auto);
/// assert!(config.minimize);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileConfig {
    /// Number of LUTs the fabric provides
    pub lut_count: usize,
    /// LUT input count, 4 or 6
    pub arity: usize,
    /// Placement policy; `Auto` picks one from the batch
    pub policy: PlacementPolicy,
    /// Allowed links between LUT columns (constrained placement only)
    pub connectivity: Option<ConnectivityScheme>,
    /// How equation text is parsed
    pub parse_mode: ParseMode,
    /// Run Quine-McCluskey before mapping
    pub minimize: bool,
    /// Widest equation, in unique literals, that is synthesized
    pub max_literals: usize,
    /// Bound on the mapper's literal-combination search
    pub max_combinations: usize,
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig {
            lut_count: 16,
            arity: 4,
            policy: PlacementPolicy::Auto,
            connectivity: None,
            parse_mode: ParseMode::Auto,
            minimize: true,
            max_literals: DEFAULT_MAX_LITERALS,
            max_combinations: DEFAULT_MAX_COMBINATIONS,
        }
    }
}

impl CompileConfig {
    /// Default settings for a fabric of `lut_count` LUTs of `arity` inputs
    pub fn new(lut_count: usize, arity: usize) -> Self {
        CompileConfig {
            lut_count,
            arity,
            ..Default::default()
        }
    }
}

/// Compile a batch of equations onto a fresh fabric
///
/// Placement is constrained when `connectivity` is given or some equation
/// reads another one's output, and free otherwise.
pub fn compile<S: AsRef<str>>(
    equations: &[S],
    lut_count: usize,
    lut_arity: usize,
    connectivity: Option<&ConnectivityScheme>,
) -> Result<FabricState, CompileError> {
    let config = CompileConfig {
        connectivity: connectivity.cloned(),
        ..CompileConfig::new(lut_count, lut_arity)
    };
    compile_with(equations, &config)
}

/// Compile a batch of equations with explicit settings
///
/// Nothing is returned on failure; the first error aborts the whole batch.
pub fn compile_with<S: AsRef<str>>(
    equations: &[S],
    config: &CompileConfig,
) -> Result<FabricState, CompileError> {
    let arity = LutArity::try_from(config.arity)
        .map_err(|_| CompileError::InvalidArity { arity: config.arity })?;
    if config.lut_count < 1 {
        return Err(CompileError::InsufficientCapacity {
            resource: Resource::Luts,
            required: 1,
            available: config.lut_count,
        });
    }

    let mut batch = equations
        .iter()
        .map(|text| {
            let text = text.as_ref();
            Equation::parse_with(text, config.parse_mode).map_err(|source| {
                CompileError::MalformedExpression {
                    equation: Arc::from(text),
                    source,
                }
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut names = NameContext::new(&batch);
    for eq in batch.iter_mut() {
        names.resolve(eq)?;
    }
    names::check_cycles(&batch)?;

    let options = MappingOptions::new(config.max_combinations);
    let mut total_luts = 0;
    for eq in batch.iter_mut() {
        let text = eq.text().to_string();
        eq.synthesize(config.max_literals)
            .map_err(|e| CompileError::too_wide(&text, e))?;
        if config.minimize {
            eq.minimize();
        }
        let luts = eq
            .map(arity, &options)
            .map_err(|e| CompileError::mapping(&text, e))?
            .lut_count();
        debug!("{} -> {} LUTs", eq, luts);
        total_luts += luts;
    }
    if total_luts > config.lut_count {
        return Err(CompileError::InsufficientCapacity {
            resource: Resource::Luts,
            required: total_luts,
            available: config.lut_count,
        });
    }

    let policy = resolve_policy(config, &batch);
    info!(
        "Compiling {} equations into {} LUTs of arity {} ({} policy)",
        batch.len(),
        total_luts,
        arity.inputs(),
        policy
    );
    let mut fabric = FabricState::new(config.lut_count, arity, policy);
    place::place(&mut fabric, &batch, config.connectivity.as_ref())?;
    Ok(fabric)
}

fn resolve_policy(config: &CompileConfig, batch: &[Equation]) -> PlacementPolicy {
    match config.policy {
        PlacementPolicy::Auto => {
            let chained = batch.iter().any(|eq| {
                eq.inputs()
                    .iter()
                    .any(|lit| batch.iter().any(|other| other.output() == lit))
            });
            if config.connectivity.is_some() || chained {
                PlacementPolicy::Constrained
            } else {
                PlacementPolicy::Free
            }
        }
        policy => policy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_arity() {
        let err = compile(&["F = a"], 4, 5, None).unwrap_err();
        assert_eq!(err, CompileError::InvalidArity { arity: 5 });
    }

    #[test]
    fn test_zero_luts() {
        let err = compile(&["F = a*b"], 0, 4, None).unwrap_err();
        assert!(matches!(
            err,
            CompileError::InsufficientCapacity {
                resource: Resource::Luts,
                available: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_auto_policy() {
        let free = compile(&["F = a*b", "G = c + d"], 4, 4, None).unwrap();
        assert_eq!(free.policy, PlacementPolicy::Free);

        let chained = compile(&["F = a*b", "G = F + d"], 4, 4, None).unwrap();
        assert_eq!(chained.policy, PlacementPolicy::Constrained);

        let scheme = ConnectivityScheme::adjacent(4);
        let linked = compile(&["F = a*b", "G = c + d"], 4, 4, Some(&scheme)).unwrap();
        assert_eq!(linked.policy, PlacementPolicy::Constrained);
    }

    #[test]
    fn test_malformed_equation_is_reported_with_text() {
        let err = compile(&["F = a*b", "G = a**b"], 4, 4, None).unwrap_err();
        match err {
            CompileError::MalformedExpression { equation, .. } => {
                assert_eq!(equation.as_ref(), "G = a**b")
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_too_many_luts() {
        let err = compile(&["F = a*b", "G = c*d", "H = e*f"], 2, 4, None).unwrap_err();
        assert_eq!(
            err,
            CompileError::InsufficientCapacity {
                resource: Resource::Luts,
                required: 3,
                available: 2,
            }
        );
    }

    #[test]
    fn test_too_wide() {
        let mut config = CompileConfig::new(4, 4);
        config.max_literals = 2;
        let err = compile_with(&["F = a*b*c"], &config).unwrap_err();
        assert!(matches!(
            err,
            CompileError::FunctionTooWide {
                literals: 3,
                limit: 2,
                ..
            }
        ));
    }
}
