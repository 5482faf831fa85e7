//! Error types for technology mapping

use std::fmt;
use std::io;
use std::sync::Arc;

/// Errors that can occur while mapping a truth table onto LUTs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// The equation has no truth table yet
    Unsynthesized,
    /// LUT arity other than 4 or 6
    InvalidArity {
        /// The requested arity
        arity: usize,
    },
    /// A LUT configuration does not have `2^arity` bits
    ConfigLength {
        /// Name of the offending LUT
        lut: Arc<str>,
        /// Required length
        expected: usize,
        /// Actual length
        actual: usize,
    },
    /// Simulating the LUT network disagrees with the truth table
    Mismatch {
        /// Output signal of the mapped equation
        output: Arc<str>,
        /// First minterm where the network and the table differ
        minterm: usize,
    },
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingError::Unsynthesized => {
                write!(f, "Equation must be synthesized before it can be mapped")
            }
            MappingError::InvalidArity { arity } => {
                write!(f, "Unsupported LUT arity {}: expected 4 or 6", arity)
            }
            MappingError::ConfigLength {
                lut,
                expected,
                actual,
            } => write!(
                f,
                "LUT {} has a {}-bit configuration, expected {}",
                lut, actual, expected
            ),
            MappingError::Mismatch { output, minterm } => write!(
                f,
                "LUT network for {} disagrees with its truth table at minterm {}",
                output, minterm
            ),
        }
    }
}

impl std::error::Error for MappingError {}

impl From<MappingError> for io::Error {
    fn from(err: MappingError) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}
