//! Error types for placement

use std::fmt;
use std::io;

/// Errors that can occur while placing LUTs and pins on a fabric
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// No free LUT cell satisfies the placement rules
    LutCellsExhausted {
        /// LUTs that had to be placed
        required: usize,
        /// LUT cells in the fabric
        available: usize,
    },
    /// No free I/O cell is left for a pin
    IoCellsExhausted {
        /// Pins that needed a cell
        required: usize,
        /// Free I/O cells where those pins could go
        available: usize,
    },
    /// The connectivity scheme is malformed or forbids every legal column
    Connectivity {
        /// What went wrong
        message: String,
    },
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::LutCellsExhausted {
                required,
                available,
            } => write!(
                f,
                "Out of LUT cells: {} LUTs to place in {} cells",
                required, available
            ),
            PlacementError::IoCellsExhausted {
                required,
                available,
            } => write!(
                f,
                "Out of I/O cells: {} pins needed but only {} free cells fit",
                required, available
            ),
            PlacementError::Connectivity { message } => {
                write!(f, "Connectivity error: {}", message)
            }
        }
    }
}

impl std::error::Error for PlacementError {}

impl From<PlacementError> for io::Error {
    fn from(err: PlacementError) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, err)
    }
}
