//! Human-readable inspection of a compiled fabric
//!
//! Every function renders one view of a [`FabricState`] to any [`Write`],
//! one item per line:
//!
//! ```text
//! F.l0 logic at (0, 1): a b -> F [0001000000000000]
//! ```
//!
//! # Examples
//!
//! ```
//! use lut_synth::{compile, report};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fabric = compile(&["F = a*b"], 1, 4, None)?;
//!
//! let mut out = Vec::new();
//! report::write_utilization(&fabric, &mut out)?;
//! let text = String::from_utf8(out)?;
//! assert!(text.starts_with("LUTs used: 1 of 1"));
//! # Ok(())
//! # }
//! ```

use crate::expression::Equation;
use crate::fabric::{Cell, Coord, EquationSummary, FabricState, Layer};
use crate::mapping::LutRole;
use crate::truth_table::{TruthTable, MAX_LITERALS};
use log::warn;
use std::io::{self, Write};

fn coords(list: &[Coord]) -> String {
    if list.is_empty() {
        return "unplaced".to_string();
    }
    list.iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One line per LUT: name, role, location, inputs, output and configuration
pub fn write_lut_assignments<W: Write>(fabric: &FabricState, writer: &mut W) -> io::Result<()> {
    for lut in &fabric.luts {
        let role = match lut.role {
            LutRole::Logic => "logic",
            LutRole::Mux => "mux",
        };
        let at = match lut.location {
            Some(at) => at.to_string(),
            None => "unplaced".to_string(),
        };
        let inputs = if lut.inputs.is_empty() {
            "-".to_string()
        } else {
            lut.inputs.join(" ")
        };
        writeln!(
            writer,
            "{} {} at {}: {} -> {} [{}]",
            lut.name, role, at, inputs, lut.output, lut.config
        )?;
    }
    Ok(())
}

/// One line per LUT listing the LUTs and output pin it drives
pub fn write_connections<W: Write>(fabric: &FabricState, writer: &mut W) -> io::Result<()> {
    for lut in &fabric.luts {
        if lut.connections.is_empty() {
            writeln!(writer, "{} -> (none)", lut.name)?;
        } else {
            writeln!(writer, "{} -> {}", lut.name, lut.connections.join(", "))?;
        }
    }
    Ok(())
}

/// External input and output pins with the I/O cells holding them
pub fn write_externals<W: Write>(fabric: &FabricState, writer: &mut W) -> io::Result<()> {
    for (heading, signals) in [("Inputs", &fabric.inputs), ("Outputs", &fabric.outputs)] {
        writeln!(writer, "{}:", heading)?;
        for signal in signals {
            let cells = fabric.find_cells(Layer::Io, &Cell::Pin(signal.clone()));
            writeln!(writer, "  {} at {}", signal, coords(&cells))?;
        }
    }
    Ok(())
}

/// Used versus available LUTs and I/O cells, and the wire count
pub fn write_utilization<W: Write>(fabric: &FabricState, writer: &mut W) -> io::Result<()> {
    let usage = &fabric.utilization;
    let percent = |used: usize, capacity: usize| {
        if capacity == 0 {
            0.0
        } else {
            100.0 * used as f64 / capacity as f64
        }
    };
    writeln!(
        writer,
        "LUTs used: {} of {} ({:.1}%)",
        usage.luts_used,
        usage.lut_capacity,
        percent(usage.luts_used, usage.lut_capacity)
    )?;
    writeln!(
        writer,
        "I/O cells used: {} of {} ({:.1}%)",
        usage.io_used,
        usage.io_capacity,
        percent(usage.io_used, usage.io_capacity)
    )?;
    writeln!(writer, "Wire cells: {}", usage.wires)
}

/// Fabric shape, each equation with the expression that was mapped, and
/// the utilization counters
pub fn write_summary<W: Write>(fabric: &FabricState, writer: &mut W) -> io::Result<()> {
    writeln!(
        writer,
        "Fabric: {} LUTs of arity {}, {}x{} grid, {} placement",
        fabric.lut_count,
        fabric.arity.inputs(),
        fabric.rows,
        fabric.cols,
        fabric.policy
    )?;
    for eq in &fabric.equations {
        writeln!(
            writer,
            "{} = {} ({}) -> {}",
            eq.output,
            eq.expression,
            eq.text,
            eq.luts.join(", ")
        )?;
    }
    write_utilization(fabric, writer)
}

/// Rebuild an equation's truth table from its source text
fn redraw(summary: &EquationSummary) -> Option<TruthTable> {
    let mut eq = match Equation::parse(&summary.text) {
        Ok(eq) => eq,
        Err(e) => {
            warn!("Cannot redraw table for {}: {}", summary.output, e);
            return None;
        }
    };
    match eq.synthesize(MAX_LITERALS) {
        Ok(table) => Some(table.clone()),
        Err(e) => {
            warn!("Cannot redraw table for {}: {}", summary.output, e);
            None
        }
    }
}

/// Truth table of each equation
pub fn write_truth_tables<W: Write>(fabric: &FabricState, writer: &mut W) -> io::Result<()> {
    for summary in &fabric.equations {
        if let Some(table) = redraw(summary) {
            writeln!(writer, "{}:\n{}", summary.output, table)?;
        }
    }
    Ok(())
}

/// Karnaugh map of each equation narrow enough to have one
pub fn write_karnaugh_maps<W: Write>(fabric: &FabricState, writer: &mut W) -> io::Result<()> {
    for summary in &fabric.equations {
        let Some(table) = redraw(summary) else {
            continue;
        };
        match table.karnaugh_map() {
            Some(map) => writeln!(writer, "{}:\n{}", summary.output, map)?,
            None => writeln!(
                writer,
                "{}: {} literals, too wide for a Karnaugh map\n",
                summary.output,
                table.width()
            )?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;

    fn render(
        f: impl Fn(&FabricState, &mut Vec<u8>) -> io::Result<()>,
        fabric: &FabricState,
    ) -> String {
        let mut out = Vec::new();
        f(fabric, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn chain() -> FabricState {
        compile(&["F = a*b", "G = F + c"], 2, 4, None).unwrap()
    }

    #[test]
    fn test_lut_assignments() {
        let text = render(write_lut_assignments, &chain());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("F.l0 logic at (0, 1): a b -> F ["));
        assert!(lines[1].starts_with("G.l0 logic at (0, 3): "));
    }

    #[test]
    fn test_connections() {
        let text = render(write_connections, &chain());
        assert_eq!(text, "F.l0 -> G.l0, F\nG.l0 -> G\n");
    }

    #[test]
    fn test_externals() {
        let text = render(write_externals, &chain());
        assert!(text.starts_with("Inputs:\n  a at ("));
        assert!(text.contains("Outputs:\n  F at ("));
        assert!(!text.contains("unplaced"));
    }

    #[test]
    fn test_utilization() {
        let text = render(write_utilization, &chain());
        assert!(text.starts_with("LUTs used: 2 of 2 (100.0%)\n"));
        assert!(text.contains("Wire cells: "));
    }

    #[test]
    fn test_summary() {
        let fabric = compile(&["F = a*b*c + a*b*c'"], 1, 4, None).unwrap();
        let text = render(write_summary, &fabric);
        assert!(text.starts_with("Fabric: 1 LUTs of arity 4, 5x1 grid, free placement\n"));
        assert!(text.contains("F = a*b (F = a*b*c + a*b*c') -> F.l0\n"));
    }

    #[test]
    fn test_truth_tables() {
        let text = render(write_truth_tables, &chain());
        assert!(text.starts_with("F:\na | b | Output\n"));
        assert!(text.contains("G:\nF | c | Output\n"));
    }

    #[test]
    fn test_karnaugh_maps() {
        let fabric = compile(&["F = a*b", "W = a*b*c*d*e"], 4, 4, None).unwrap();
        let text = render(write_karnaugh_maps, &fabric);
        assert!(text.starts_with("F:\na\\b | 0 1\n---------\n0   | 0 0\n1   | 0 1\n"));
        assert!(text.contains("W: 5 literals, too wide for a Karnaugh map\n"));
    }
}
