//! Placement of mapped equations onto a fabric
//!
//! [`place`] assigns every LUT of every mapped equation to a logic cell and
//! every external signal to an I/O pin. It works on a copy of the fabric and
//! only commits when everything fits.
//!
//! # Free placement
//!
//! Equations go in descending complexity (stable, so ties keep batch order).
//! Each LUT takes the first empty cell scanning columns left to right and
//! rows top to bottom. Each equation's external inputs, then its output, take
//! the first empty I/O cells in the same order.
//!
//! # Constrained placement
//!
//! Even grid columns are wires; LUT column `k` is grid column `2k + 1`.
//! Equations that read no other equation go first, in batch order; the rest
//! follow once their producers are placed, fewest dependencies first. A LUT
//! takes the leftmost free cell strictly right of every placed LUT driving
//! one of its inputs. With a [`ConnectivityScheme`], every producer column
//! must also be linked to the chosen column.
//!
//! Input pins sit in the I/O column just left of the LUT reading them, output
//! pins just right of the LUT driving them. A full column spills further out.
//! A LUT column without enough free I/O cells on either side is skipped.
//!
//! Either way the total LUT count may not exceed the fabric's `lut_count`.

pub mod connectivity;
pub mod error;

pub use connectivity::{ConnectivityScheme, Link};
pub use error::PlacementError;

use crate::expression::Equation;
use crate::fabric::{
    Cell, Coord, EquationSummary, FabricState, Layer, LutRecord, PlacementPolicy,
};
use crate::route;
use log::{debug, info};
use std::collections::HashSet;
use std::sync::Arc;

/// Place mapped equations on `fabric` under its policy
///
/// Unmapped equations are skipped. On error the fabric is left untouched.
pub fn place(
    fabric: &mut FabricState,
    equations: &[Equation],
    connectivity: Option<&ConnectivityScheme>,
) -> Result<(), PlacementError> {
    if let Some(scheme) = connectivity {
        if fabric.policy != PlacementPolicy::Constrained {
            return Err(PlacementError::Connectivity {
                message: format!(
                    "a connectivity scheme needs constrained placement, not {}",
                    fabric.policy
                ),
            });
        }
        scheme.validate(fabric.lut_count)?;
    }

    let required = fabric.luts.len()
        + equations
            .iter()
            .filter_map(|e| e.mapping())
            .map(|m| m.lut_count())
            .sum::<usize>();
    if required > fabric.lut_count {
        return Err(PlacementError::LutCellsExhausted {
            required,
            available: fabric.lut_count,
        });
    }

    let mut work = fabric.clone();
    let groups = add_records(&mut work, equations);
    let produced: HashSet<Arc<str>> = equations.iter().map(|e| Arc::clone(e.output())).collect();

    match work.policy {
        PlacementPolicy::Constrained => {
            route::stamp_wires(&mut work);
            let order = dependency_order(equations, &produced);
            Placer::new(&mut work, &produced).constrained(&order, &groups, connectivity)?;
        }
        PlacementPolicy::Free | PlacementPolicy::Auto => {
            let mut order: Vec<usize> = (0..equations.len()).collect();
            order.sort_by_key(|&i| std::cmp::Reverse(equations[i].complexity()));
            Placer::new(&mut work, &produced).free(equations, &order, &groups)?;
        }
    }

    route::connect(&mut work);
    work.utilization = route::utilization(&work);
    info!(
        "Placed {} LUTs and {} pins ({} policy)",
        work.luts.iter().filter(|l| l.location.is_some()).count(),
        work.utilization.io_used,
        work.policy
    );
    *fabric = work;
    Ok(())
}

/// Append unplaced LUT records and summaries; returns LUT indices per equation
fn add_records(fabric: &mut FabricState, equations: &[Equation]) -> Vec<Vec<usize>> {
    let mut groups = Vec::with_capacity(equations.len());
    for eq in equations {
        let mut group = Vec::new();
        if let Some(mapping) = eq.mapping() {
            for lut in mapping.luts() {
                group.push(fabric.luts.len());
                fabric
                    .luts
                    .push(LutRecord::from_config(lut, fabric.arity, eq.output()));
            }
        }
        fabric.equations.push(EquationSummary {
            output: eq.output().to_string(),
            text: eq.text().to_string(),
            expression: eq.expression(),
            luts: group.iter().map(|&i| fabric.luts[i].name.clone()).collect(),
        });
        groups.push(group);
    }
    groups
}

/// Batch indices in constrained placement order
///
/// Repeatedly takes, among equations whose producers are all placed, the one
/// with the fewest dependencies (batch order on ties).
fn dependency_order(equations: &[Equation], produced: &HashSet<Arc<str>>) -> Vec<usize> {
    let deps: Vec<Vec<usize>> = equations
        .iter()
        .map(|eq| {
            eq.inputs()
                .iter()
                .filter(|l| produced.contains(*l))
                .filter_map(|l| equations.iter().position(|p| p.output() == l))
                .collect()
        })
        .collect();

    let mut placed = vec![false; equations.len()];
    let mut order = Vec::with_capacity(equations.len());
    while order.len() < equations.len() {
        let ready = (0..equations.len())
            .filter(|&i| !placed[i])
            .filter(|&i| deps[i].iter().all(|&d| placed[d]))
            .min_by_key(|&i| (deps[i].len(), i));
        // A cycle would leave nothing ready; fall back to the cheapest remaining
        let next = ready.or_else(|| {
            (0..equations.len())
                .filter(|&i| !placed[i])
                .min_by_key(|&i| (deps[i].len(), i))
        });
        let Some(next) = next else { break };
        placed[next] = true;
        order.push(next);
    }
    order
}

struct Placer<'a> {
    fabric: &'a mut FabricState,
    produced: &'a HashSet<Arc<str>>,
}

impl<'a> Placer<'a> {
    fn new(fabric: &'a mut FabricState, produced: &'a HashSet<Arc<str>>) -> Self {
        Placer { fabric, produced }
    }

    fn put_lut(&mut self, index: usize, at: Coord) {
        self.fabric.set_cell(Layer::Logic, at, Cell::Lut(index));
        self.fabric.luts[index].location = Some(at);
        debug!("LUT {} -> {}", self.fabric.luts[index].name, at);
    }

    fn put_pin(&mut self, name: &str, at: Coord, input: bool) {
        self.fabric.set_cell(Layer::Io, at, Cell::Pin(name.to_string()));
        let list = if input {
            &mut self.fabric.inputs
        } else {
            &mut self.fabric.outputs
        };
        if !list.iter().any(|n| n == name) {
            list.push(name.to_string());
        }
    }

    fn lut_cells_exhausted(&self) -> PlacementError {
        let available = match self.fabric.policy {
            PlacementPolicy::Constrained => self.fabric.rows * self.fabric.lut_count,
            _ => self.fabric.rows * self.fabric.cols,
        };
        PlacementError::LutCellsExhausted {
            required: self.fabric.luts.len(),
            available,
        }
    }

    fn io_cells_exhausted(&self) -> PlacementError {
        let used = self
            .fabric
            .io
            .iter()
            .flatten()
            .filter(|c| !c.is_empty())
            .count();
        PlacementError::IoCellsExhausted {
            required: used + 1,
            available: self.fabric.rows * self.fabric.cols,
        }
    }

    fn free(
        &mut self,
        equations: &[Equation],
        order: &[usize],
        groups: &[Vec<usize>],
    ) -> Result<(), PlacementError> {
        for &e in order {
            for &index in &groups[e] {
                let at = self
                    .fabric
                    .first_empty(Layer::Logic)
                    .ok_or_else(|| self.lut_cells_exhausted())?;
                self.put_lut(index, at);
            }

            let eq = &equations[e];
            for input in eq.inputs() {
                if self.produced.contains(&input)
                    || self.fabric.inputs.iter().any(|n| n.as_str() == input.as_ref())
                {
                    continue;
                }
                let at = self
                    .fabric
                    .first_empty(Layer::Io)
                    .ok_or_else(|| self.io_cells_exhausted())?;
                self.put_pin(&input, at, true);
            }
            if groups[e].is_empty() {
                continue;
            }
            let at = self
                .fabric
                .first_empty(Layer::Io)
                .ok_or_else(|| self.io_cells_exhausted())?;
            self.put_pin(eq.output(), at, false);
        }
        Ok(())
    }

    fn constrained(
        &mut self,
        order: &[usize],
        groups: &[Vec<usize>],
        connectivity: Option<&ConnectivityScheme>,
    ) -> Result<(), PlacementError> {
        for &e in order {
            for &index in &groups[e] {
                let at = self.constrained_cell(index, connectivity)?;
                self.put_lut(index, at);
                self.place_lut_pins(index, at.col)?;
            }
        }
        Ok(())
    }

    /// Leftmost free cell right of every placed producer (and linked to it)
    ///
    /// The column must also leave room for the LUT's new input pins somewhere
    /// to its left and for its output pin somewhere to its right.
    fn constrained_cell(
        &self,
        index: usize,
        connectivity: Option<&ConnectivityScheme>,
    ) -> Result<Coord, PlacementError> {
        let lut = &self.fabric.luts[index];
        let producer_cols: Vec<usize> = lut
            .inputs
            .iter()
            .filter_map(|input| self.fabric.placed_producer(input).map(|(at, _)| at.col))
            .collect();
        let min_col = producer_cols.iter().max().map_or(0, |c| c + 1);

        let mut blocked_by_links = false;
        // (pins needed, free cells) of the least short column
        let mut io_short: Option<(usize, usize)> = None;
        for col in self.fabric.lut_columns() {
            if col < min_col {
                continue;
            }
            let Some(at) = self.fabric.first_empty_in_column(Layer::Logic, col) else {
                continue;
            };
            if let Some(scheme) = connectivity {
                let to = self.fabric.logical_column(col).unwrap_or(usize::MAX);
                let linked = producer_cols.iter().all(|&p| {
                    self.fabric
                        .logical_column(p)
                        .is_some_and(|from| scheme.allows(from, to))
                });
                if !linked {
                    blocked_by_links = true;
                    continue;
                }
            }

            let need_in = lut
                .inputs
                .iter()
                .filter(|input| self.needs_input_pin(input, col))
                .count();
            let free_in = self.free_io_cells(0..col);
            let need_out = usize::from(lut.output == lut.equation);
            let free_out = self.free_io_cells(col + 1..self.fabric.cols);
            let shortage = if free_in < need_in {
                Some((need_in, free_in))
            } else if free_out < need_out {
                Some((need_out, free_out))
            } else {
                None
            };
            if let Some((required, available)) = shortage {
                if io_short.map_or(true, |(_, best)| available > best) {
                    io_short = Some((required, available));
                }
                continue;
            }
            return Ok(at);
        }

        if let Some((required, available)) = io_short {
            Err(PlacementError::IoCellsExhausted {
                required,
                available,
            })
        } else if blocked_by_links {
            Err(PlacementError::Connectivity {
                message: format!("no LUT column is linked from every producer of {}", lut.name),
            })
        } else {
            Err(self.lut_cells_exhausted())
        }
    }

    /// Whether a LUT in `col` reading `input` needs a new input pin
    fn needs_input_pin(&self, input: &String, col: usize) -> bool {
        if self.produced.contains(input.as_str())
            || self.fabric.luts.iter().any(|l| l.output == *input)
        {
            return false;
        }
        // One pin per signal per column
        let existing = self.fabric.find_cells(Layer::Io, &Cell::Pin(input.clone()));
        !(col > 0 && existing.iter().any(|at| at.col == col - 1))
    }

    fn free_io_cells(&self, cols: std::ops::Range<usize>) -> usize {
        self.fabric
            .io
            .iter()
            .map(|row| row[cols.clone()].iter().filter(|c| c.is_empty()).count())
            .sum()
    }

    fn place_lut_pins(&mut self, index: usize, col: usize) -> Result<(), PlacementError> {
        let lut = self.fabric.luts[index].clone();
        for input in &lut.inputs {
            if !self.needs_input_pin(input, col) {
                continue;
            }
            let at = (0..col)
                .rev()
                .find_map(|c| self.fabric.first_empty_in_column(Layer::Io, c))
                .ok_or(PlacementError::IoCellsExhausted {
                    required: 1,
                    available: 0,
                })?;
            self.put_pin(input, at, true);
        }

        if lut.output == lut.equation {
            let at = (col + 1..self.fabric.cols)
                .find_map(|c| self.fabric.first_empty_in_column(Layer::Io, c))
                .ok_or(PlacementError::IoCellsExhausted {
                    required: 1,
                    available: 0,
                })?;
            self.put_pin(&lut.output, at, false);
        }
        Ok(())
    }
}
