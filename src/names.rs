//! Output-name disambiguation across a batch of equations
//!
//! Equations in one batch may redefine an output name. A [`NameContext`]
//! walks the batch in order and keeps every definition distinct:
//!
//! - literals are first rewritten to the newest earlier definition of their
//!   name, so `F = F + b` after an earlier `F` reads the earlier one;
//! - a redefined output is then renamed `<name>_<k>`, with `k` counting up
//!   from 1 past any name already used in the batch;
//! - a literal naming an output that is only defined later resolves to that
//!   first definition.
//!
//! A literal naming its own equation with no earlier definition, or a chain
//! of equations that reads itself, cannot be resolved.
//!
//! # Examples
//!
//! ```
//! use lut_synth::expression::Equation;
//! use lut_synth::names::NameContext;
//!
//! let mut batch = vec![
//!     Equation::parse("F = a*b").unwrap(),
//!     Equation::parse("F = F + c").unwrap(),
//!     Equation::parse("G = F'").unwrap(),
//! ];
//! let mut names = NameContext::new(&batch);
//! for eq in batch.iter_mut() {
//!     names.resolve(eq).unwrap();
//! }
//! assert_eq!(batch[1].to_string(), "F_1 = F + c");
//! assert_eq!(batch[2].to_string(), "G = F_1'");
//! ```

use crate::error::CompileError;
use crate::expression::Equation;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Per-batch record of output definitions and taken names
#[derive(Debug, Clone, Default)]
pub struct NameContext {
    /// Base name -> newest definition so far
    latest: HashMap<Arc<str>, Arc<str>>,
    /// Base name -> next suffix to try
    next_suffix: HashMap<Arc<str>, usize>,
    /// Every identifier in the batch plus every name handed out
    taken: HashSet<Arc<str>>,
}

impl NameContext {
    /// A context for `batch`; every identifier in it is reserved
    pub fn new(batch: &[Equation]) -> Self {
        let mut taken = HashSet::new();
        for eq in batch {
            taken.insert(Arc::clone(eq.output()));
            taken.extend(eq.terms().literals().iter().cloned());
        }
        NameContext {
            taken,
            ..Default::default()
        }
    }

    /// Rewrite literals and the output of the next equation in batch order
    pub fn resolve(&mut self, eq: &mut Equation) -> Result<(), CompileError> {
        let output = Arc::clone(eq.output());
        for literal in eq.terms().unique_literals() {
            match self.latest.get(&literal) {
                Some(current) if *current != literal => {
                    let current = Arc::clone(current);
                    eq.rename_literal(&literal, &current);
                }
                Some(_) => {}
                None if literal == output => {
                    return Err(CompileError::UnresolvedLiteral {
                        literal,
                        equation: Arc::from(eq.text()),
                    });
                }
                None => {}
            }
        }

        if self.latest.contains_key(&output) {
            let renamed = self.fresh_name(&output);
            debug!("Renaming redefined output {} to {}", output, renamed);
            eq.rename_output(Arc::clone(&renamed));
            self.latest.insert(output, renamed);
        } else {
            self.latest.insert(Arc::clone(&output), output);
        }
        Ok(())
    }

    fn fresh_name(&mut self, base: &Arc<str>) -> Arc<str> {
        let k = self.next_suffix.entry(Arc::clone(base)).or_insert(1);
        loop {
            let candidate: Arc<str> = Arc::from(format!("{}_{}", base, k));
            *k += 1;
            if self.taken.insert(Arc::clone(&candidate)) {
                return candidate;
            }
        }
    }
}

/// Reject a batch in which some equation depends on itself through others
pub fn check_cycles(batch: &[Equation]) -> Result<(), CompileError> {
    let producers: HashMap<&str, usize> = batch
        .iter()
        .enumerate()
        .map(|(i, eq)| (eq.output().as_ref(), i))
        .collect();

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Active,
        Done,
    }
    let mut marks = vec![Mark::New; batch.len()];

    // Iterative DFS: (equation, next literal to visit)
    for start in 0..batch.len() {
        if marks[start] != Mark::New {
            continue;
        }
        let mut stack = vec![(start, 0usize)];
        marks[start] = Mark::Active;
        while let Some((node, next)) = stack.pop() {
            let literals = batch[node].terms().unique_literals();
            if next >= literals.len() {
                marks[node] = Mark::Done;
                continue;
            }
            stack.push((node, next + 1));
            let literal = &literals[next];
            let Some(&dep) = producers.get(literal.as_ref()) else {
                continue;
            };
            match marks[dep] {
                Mark::Active => {
                    return Err(CompileError::UnresolvedLiteral {
                        literal: Arc::clone(literal),
                        equation: Arc::from(batch[node].text()),
                    })
                }
                Mark::New => {
                    marks[dep] = Mark::Active;
                    stack.push((dep, 0));
                }
                Mark::Done => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(texts: &[&str]) -> Vec<Equation> {
        texts.iter().map(|t| Equation::parse(t).unwrap()).collect()
    }

    fn resolve_all(eqs: &mut [Equation]) -> Result<(), CompileError> {
        let mut names = NameContext::new(eqs);
        for eq in eqs.iter_mut() {
            names.resolve(eq)?;
        }
        check_cycles(eqs)
    }

    fn rendered(eqs: &[Equation]) -> Vec<String> {
        eqs.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_distinct_outputs_unchanged() {
        let mut eqs = batch(&["F = a*b", "G = F + c"]);
        resolve_all(&mut eqs).unwrap();
        assert_eq!(rendered(&eqs), vec!["F = a*b", "G = F + c"]);
    }

    #[test]
    fn test_redefinition_gets_suffix() {
        let mut eqs = batch(&["F = a", "F = b", "F = c"]);
        resolve_all(&mut eqs).unwrap();
        assert_eq!(rendered(&eqs), vec!["F = a", "F_1 = b", "F_2 = c"]);
    }

    #[test]
    fn test_suffix_skips_taken_names() {
        let mut eqs = batch(&["F = a", "F_1 = b", "F = c"]);
        resolve_all(&mut eqs).unwrap();
        assert_eq!(rendered(&eqs), vec!["F = a", "F_1 = b", "F_2 = c"]);
    }

    #[test]
    fn test_self_reference_reads_previous_definition() {
        let mut eqs = batch(&["F = a*b", "F = F + c", "G = F'"]);
        resolve_all(&mut eqs).unwrap();
        assert_eq!(rendered(&eqs), vec!["F = a*b", "F_1 = F + c", "G = F_1'"]);
    }

    #[test]
    fn test_forward_reference_resolves_to_first_definition() {
        let mut eqs = batch(&["G = F*c", "F = a", "F = b"]);
        resolve_all(&mut eqs).unwrap();
        assert_eq!(rendered(&eqs), vec!["G = F*c", "F = a", "F_1 = b"]);
    }

    #[test]
    fn test_self_reference_without_definition() {
        let mut eqs = batch(&["F = F*a"]);
        let err = resolve_all(&mut eqs).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnresolvedLiteral {
                literal: Arc::from("F"),
                equation: Arc::from("F = F*a"),
            }
        );
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut eqs = batch(&["F = G*a", "G = F + b"]);
        let err = resolve_all(&mut eqs).unwrap_err();
        assert!(matches!(err, CompileError::UnresolvedLiteral { .. }));
    }
}
