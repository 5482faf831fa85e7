//! Routing bookkeeping: wire stamping, connection lists, nets and counters
//!
//! Routing is not computed geometrically. Constrained fabrics reserve every
//! even grid column for wires; connections between LUTs and pins are recorded
//! by signal name and can be rebuilt as nets on demand.

use crate::fabric::{Cell, FabricState, PlacementPolicy, Utilization};
use serde::{Deserialize, Serialize};

/// Mark every even column of a constrained fabric's logic layer as wire
///
/// Free fabrics are left unchanged.
pub fn stamp_wires(fabric: &mut FabricState) {
    if fabric.policy != PlacementPolicy::Constrained {
        return;
    }
    for row in fabric.layout.iter_mut() {
        for (col, cell) in row.iter_mut().enumerate() {
            if col % 2 == 0 && cell.is_empty() {
                *cell = Cell::Wire;
            }
        }
    }
}

/// Fill every LUT's connection list
///
/// A LUT connects to each LUT reading its output, in LUT order, and then to
/// the output pin of its signal if it has one.
pub fn connect(fabric: &mut FabricState) {
    let lists: Vec<Vec<String>> = fabric
        .luts
        .iter()
        .map(|driver| {
            let mut sinks: Vec<String> = fabric
                .luts
                .iter()
                .filter(|sink| sink.inputs.contains(&driver.output))
                .map(|sink| sink.name.clone())
                .collect();
            if fabric.outputs.contains(&driver.output) {
                sinks.push(driver.output.clone());
            }
            sinks
        })
        .collect();
    for (lut, connections) in fabric.luts.iter_mut().zip(lists) {
        lut.connections = connections;
    }
}

/// What drives a net
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Driver {
    /// An external input pin
    Pin(String),
    /// A LUT, by name
    Lut(String),
}

/// One signal with its driver and the LUTs and pins it reaches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Net {
    pub signal: String,
    pub driver: Driver,
    /// LUT names, then the output pin name if the signal leaves the fabric
    pub sinks: Vec<String>,
}

/// Rebuild driver-to-sink nets from the LUT records and pin lists
///
/// External inputs come first in pin order, then LUT outputs in LUT order.
pub fn nets(fabric: &FabricState) -> Vec<Net> {
    let readers = |signal: &str| -> Vec<String> {
        fabric
            .luts
            .iter()
            .filter(|l| l.inputs.iter().any(|i| i == signal))
            .map(|l| l.name.clone())
            .collect()
    };

    let mut nets: Vec<Net> = fabric
        .inputs
        .iter()
        .map(|input| Net {
            signal: input.clone(),
            driver: Driver::Pin(input.clone()),
            sinks: readers(input),
        })
        .collect();
    for lut in &fabric.luts {
        let mut sinks = readers(&lut.output);
        if fabric.outputs.contains(&lut.output) {
            sinks.push(lut.output.clone());
        }
        nets.push(Net {
            signal: lut.output.clone(),
            driver: Driver::Lut(lut.name.clone()),
            sinks,
        });
    }
    nets
}

/// Count used and available resources
///
/// A LUT counts as used when it has a configuration.
pub fn utilization(fabric: &FabricState) -> Utilization {
    let count = |layer: &Vec<Vec<Cell>>, pred: fn(&Cell) -> bool| {
        layer.iter().flatten().filter(|c| pred(c)).count()
    };
    Utilization {
        luts_used: fabric.luts.iter().filter(|l| !l.config.is_empty()).count(),
        lut_capacity: fabric.lut_count,
        io_used: count(&fabric.io, |c| matches!(c, Cell::Pin(_))),
        io_capacity: fabric.rows * fabric.cols,
        wires: count(&fabric.layout, |c| matches!(c, Cell::Wire)),
    }
}
