//! The abstract LUT fabric and its persisted state
//!
//! A fabric is a `rows × cols` grid with two layers over the same
//! coordinates: the logic layer holds LUTs (and, under constrained placement,
//! routing wires) and the I/O layer holds external pins. Cells reference LUTs
//! by index into [`FabricState::luts`], so a LUT record and the cell holding
//! it always agree on the coordinate.
//!
//! Grid dimensions depend on the placement policy:
//!
//! - rows: `max(2 + ⌈lut_count / 16⌉, arity + 1)`
//! - free: `⌈lut_count · (arity + 1) / rows⌉` columns
//! - constrained: `2 · lut_count + 1` columns, where grid column `2k + 1` is
//!   LUT column `k` and every even column carries wires

use crate::mapping::{LutArity, LutConfig, LutRole};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How LUTs are assigned to fabric cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementPolicy {
    /// Constrained when a connectivity scheme is given or any equation reads
    /// another equation's output, free otherwise
    #[default]
    Auto,
    /// Any LUT may take any cell
    Free,
    /// Producers sit in columns strictly left of their consumers
    Constrained,
}

impl fmt::Display for PlacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementPolicy::Auto => write!(f, "auto"),
            PlacementPolicy::Free => write!(f, "free"),
            PlacementPolicy::Constrained => write!(f, "constrained"),
        }
    }
}

/// A grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Self {
        Coord { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Content of one fabric cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    #[default]
    Empty,
    /// Routing wire (constrained placement only)
    Wire,
    /// External pin carrying the named signal
    Pin(String),
    /// LUT, by index into [`FabricState::luts`]
    Lut(usize),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// The two layers of the fabric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// LUTs and wires
    Logic,
    /// External pins
    Io,
}

/// A LUT as stored in the fabric
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LutRecord {
    pub name: String,
    pub arity: usize,
    /// Input signals, most significant first
    pub inputs: Vec<String>,
    pub output: String,
    /// `0`/`1` configuration string of `2^arity` characters
    pub config: String,
    /// `None` until placed
    pub location: Option<Coord>,
    /// LUTs reading this LUT's output, then the output pin it drives
    pub connections: Vec<String>,
    pub role: LutRole,
    /// Output of the equation this LUT implements
    pub equation: String,
}

impl LutRecord {
    /// An unplaced record for a mapped LUT
    pub fn from_config(lut: &LutConfig, arity: LutArity, equation: &str) -> Self {
        LutRecord {
            name: lut.name.to_string(),
            arity: arity.inputs(),
            inputs: lut.inputs.iter().map(|i| i.to_string()).collect(),
            output: lut.output.to_string(),
            config: lut.config.clone(),
            location: None,
            connections: Vec::new(),
            role: lut.role,
            equation: equation.to_string(),
        }
    }
}

/// Source and result of one compiled equation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquationSummary {
    /// Output name after disambiguation
    pub output: String,
    /// Equation text as given
    pub text: String,
    /// Expression that was mapped (minimized unless minimization was off)
    pub expression: String,
    /// Names of the LUTs implementing it
    pub luts: Vec<String>,
}

/// Resource counters, refreshed after placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Utilization {
    pub luts_used: usize,
    pub lut_capacity: usize,
    pub io_used: usize,
    pub io_capacity: usize,
    pub wires: usize,
}

/// Grid dimensions `(rows, cols)` for a fabric
pub fn grid_dimensions(
    lut_count: usize,
    arity: LutArity,
    policy: PlacementPolicy,
) -> (usize, usize) {
    let rows = (2 + lut_count.div_ceil(16)).max(arity.inputs() + 1);
    let cols = match policy {
        PlacementPolicy::Constrained => 2 * lut_count + 1,
        PlacementPolicy::Free | PlacementPolicy::Auto => {
            (lut_count * (arity.inputs() + 1)).div_ceil(rows).max(1)
        }
    };
    (rows, cols)
}

/// A compiled fabric: grid layers, LUT records, pins and counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricState {
    pub policy: PlacementPolicy,
    pub arity: LutArity,
    pub lut_count: usize,
    pub rows: usize,
    pub cols: usize,
    /// Logic layer, `layout[row][col]`
    pub layout: Vec<Vec<Cell>>,
    /// I/O layer, `io[row][col]`
    pub io: Vec<Vec<Cell>>,
    pub luts: Vec<LutRecord>,
    /// External input signals in placement order
    pub inputs: Vec<String>,
    /// External output signals in placement order
    pub outputs: Vec<String>,
    pub equations: Vec<EquationSummary>,
    pub utilization: Utilization,
}

impl FabricState {
    /// An empty fabric; `policy` must be resolved (not [`PlacementPolicy::Auto`])
    pub fn new(lut_count: usize, arity: LutArity, policy: PlacementPolicy) -> Self {
        let (rows, cols) = grid_dimensions(lut_count, arity, policy);
        FabricState {
            policy,
            arity,
            lut_count,
            rows,
            cols,
            layout: vec![vec![Cell::Empty; cols]; rows],
            io: vec![vec![Cell::Empty; cols]; rows],
            luts: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            equations: Vec::new(),
            utilization: Utilization {
                lut_capacity: lut_count,
                io_capacity: rows * cols,
                ..Default::default()
            },
        }
    }

    fn layer(&self, layer: Layer) -> &Vec<Vec<Cell>> {
        match layer {
            Layer::Logic => &self.layout,
            Layer::Io => &self.io,
        }
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut Vec<Vec<Cell>> {
        match layer {
            Layer::Logic => &mut self.layout,
            Layer::Io => &mut self.io,
        }
    }

    /// The cell at `at`, or `None` outside the grid
    pub fn cell(&self, layer: Layer, at: Coord) -> Option<&Cell> {
        self.layer(layer).get(at.row).and_then(|row| row.get(at.col))
    }

    pub(crate) fn set_cell(&mut self, layer: Layer, at: Coord, cell: Cell) {
        if let Some(slot) = self
            .layer_mut(layer)
            .get_mut(at.row)
            .and_then(|row| row.get_mut(at.col))
        {
            *slot = cell;
        }
    }

    /// First empty cell of column `col`, scanning rows top to bottom
    pub fn first_empty_in_column(&self, layer: Layer, col: usize) -> Option<Coord> {
        (0..self.rows)
            .map(|row| Coord::new(row, col))
            .find(|&at| self.cell(layer, at).is_some_and(Cell::is_empty))
    }

    /// First empty cell scanning columns outer and rows inner
    pub fn first_empty(&self, layer: Layer) -> Option<Coord> {
        (0..self.cols).find_map(|col| self.first_empty_in_column(layer, col))
    }

    /// Grid columns that can hold LUTs, left to right
    pub fn lut_columns(&self) -> Vec<usize> {
        match self.policy {
            PlacementPolicy::Constrained => (0..self.lut_count).map(|k| 2 * k + 1).collect(),
            PlacementPolicy::Free | PlacementPolicy::Auto => (0..self.cols).collect(),
        }
    }

    /// Logical LUT column of a grid column, or `None` for a wire column
    pub fn logical_column(&self, col: usize) -> Option<usize> {
        match self.policy {
            PlacementPolicy::Constrained => {
                (col % 2 == 1 && col < self.cols).then_some((col - 1) / 2)
            }
            PlacementPolicy::Free | PlacementPolicy::Auto => (col < self.cols).then_some(col),
        }
    }

    /// Index and record of the LUT named `name`
    pub fn lut_by_name(&self, name: &str) -> Option<(usize, &LutRecord)> {
        self.luts.iter().enumerate().find(|(_, l)| l.name == name)
    }

    /// The placed LUT whose output is `signal`, found by scanning the grid
    pub fn placed_producer(&self, signal: &str) -> Option<(Coord, &LutRecord)> {
        for col in 0..self.cols {
            for row in 0..self.rows {
                if let Some(Cell::Lut(index)) = self.layout[row].get(col) {
                    if let Some(lut) = self.luts.get(*index) {
                        if lut.output == signal {
                            return Some((Coord::new(row, col), lut));
                        }
                    }
                }
            }
        }
        None
    }

    /// Coordinates of every cell in a layer holding `cell`
    pub fn find_cells(&self, layer: Layer, cell: &Cell) -> Vec<Coord> {
        let mut found = Vec::new();
        for (row, cells) in self.layer(layer).iter().enumerate() {
            for (col, c) in cells.iter().enumerate() {
                if c == cell {
                    found.push(Coord::new(row, col));
                }
            }
        }
        found
    }

    /// Check grid shape and that cells and LUT records agree on locations
    pub fn check_consistency(&self) -> Result<(), String> {
        for (name, layer) in [("layout", &self.layout), ("io", &self.io)] {
            if layer.len() != self.rows || layer.iter().any(|r| r.len() != self.cols) {
                return Err(format!("{} layer is not {}x{}", name, self.rows, self.cols));
            }
        }
        let (rows, cols) = grid_dimensions(self.lut_count, self.arity, self.policy);
        if (rows, cols) != (self.rows, self.cols) {
            return Err(format!(
                "grid is {}x{} but {} LUTs of arity {} need {}x{}",
                self.rows,
                self.cols,
                self.lut_count,
                self.arity.inputs(),
                rows,
                cols
            ));
        }
        for (row, cells) in self.layout.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if let Cell::Lut(index) = cell {
                    let at = Coord::new(row, col);
                    match self.luts.get(*index) {
                        Some(lut) if lut.location == Some(at) => {}
                        Some(lut) => {
                            return Err(format!(
                                "LUT {} is recorded at {:?} but found at {}",
                                lut.name, lut.location, at
                            ));
                        }
                        None => {
                            return Err(format!("cell {} references missing LUT {}", at, index))
                        }
                    }
                }
            }
        }
        for (index, lut) in self.luts.iter().enumerate() {
            if let Some(at) = lut.location {
                if self.cell(Layer::Logic, at) != Some(&Cell::Lut(index)) {
                    return Err(format!(
                        "LUT {} claims {} but the cell disagrees",
                        lut.name, at
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_dimensions_free() {
        assert_eq!(grid_dimensions(1, LutArity::Four, PlacementPolicy::Free), (5, 1));
        assert_eq!(grid_dimensions(2, LutArity::Four, PlacementPolicy::Free), (5, 2));
        assert_eq!(grid_dimensions(1, LutArity::Six, PlacementPolicy::Free), (7, 1));
        // 40 LUTs: 2 + 3 = 5 rows, 200 I/O cells over 5 rows
        assert_eq!(grid_dimensions(40, LutArity::Four, PlacementPolicy::Free), (5, 40));
        assert_eq!(grid_dimensions(100, LutArity::Four, PlacementPolicy::Free), (9, 56));
    }

    #[test]
    fn test_grid_dimensions_constrained() {
        assert_eq!(grid_dimensions(3, LutArity::Four, PlacementPolicy::Constrained), (5, 7));
        assert_eq!(grid_dimensions(1, LutArity::Six, PlacementPolicy::Constrained), (7, 3));
    }

    #[test]
    fn test_free_grid_holds_every_lut() {
        for n in 1..200 {
            let (rows, cols) = grid_dimensions(n, LutArity::Four, PlacementPolicy::Free);
            assert!(rows * cols >= n);
            assert!(rows * cols >= n * 5);
        }
    }

    #[test]
    fn test_lut_and_logical_columns() {
        let fabric = FabricState::new(3, LutArity::Four, PlacementPolicy::Constrained);
        assert_eq!(fabric.lut_columns(), vec![1, 3, 5]);
        assert_eq!(fabric.logical_column(3), Some(1));
        assert_eq!(fabric.logical_column(4), None);
        assert_eq!(fabric.logical_column(9), None);

        let fabric = FabricState::new(3, LutArity::Four, PlacementPolicy::Free);
        assert_eq!(fabric.lut_columns(), (0..fabric.cols).collect::<Vec<_>>());
    }

    #[test]
    fn test_first_empty_scans_columns_then_rows() {
        let mut fabric = FabricState::new(10, LutArity::Four, PlacementPolicy::Free);
        assert_eq!(fabric.first_empty(Layer::Logic), Some(Coord::new(0, 0)));
        fabric.set_cell(Layer::Logic, Coord::new(0, 0), Cell::Wire);
        assert_eq!(fabric.first_empty(Layer::Logic), Some(Coord::new(1, 0)));
        for row in 0..fabric.rows {
            fabric.set_cell(Layer::Logic, Coord::new(row, 0), Cell::Wire);
        }
        assert_eq!(fabric.first_empty(Layer::Logic), Some(Coord::new(0, 1)));
        // The I/O layer is independent
        assert_eq!(fabric.first_empty(Layer::Io), Some(Coord::new(0, 0)));
    }

    #[test]
    fn test_consistency_check() {
        let mut fabric = FabricState::new(1, LutArity::Four, PlacementPolicy::Free);
        let lut = LutConfig {
            name: "F.l0".into(),
            inputs: vec!["a".into()],
            output: "F".into(),
            config: format!("01{}", "0".repeat(14)),
            role: LutRole::Logic,
        };
        let mut record = LutRecord::from_config(&lut, LutArity::Four, "F");
        record.location = Some(Coord::new(0, 0));
        fabric.luts.push(record);
        fabric.set_cell(Layer::Logic, Coord::new(0, 0), Cell::Lut(0));
        assert!(fabric.check_consistency().is_ok());
        assert_eq!(fabric.placed_producer("F").map(|(at, _)| at), Some(Coord::new(0, 0)));

        fabric.luts[0].location = Some(Coord::new(1, 0));
        assert!(fabric.check_consistency().is_err());
    }
}
