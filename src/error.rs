//! Error types for equation compilation
//!
//! [`CompileError`] is what [`compile`](crate::compile) returns. Each stage
//! keeps its own error type ([`ParseError`], [`MappingError`],
//! [`PlacementError`]) and converts into `CompileError` with the offending
//! equation attached.

use crate::expression::ParseError;
use crate::mapping::MappingError;
use crate::place::PlacementError;
use crate::truth_table::WidthError;
use std::fmt;
use std::io;
use std::sync::Arc;

/// The fabric resource that ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// The LUT budget (`lut_count`)
    Luts,
    /// Free LUT cells in the logic layer
    LutCells,
    /// Free cells in the I/O layer
    IoCells,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Luts => write!(f, "LUTs"),
            Resource::LutCells => write!(f, "LUT cells"),
            Resource::IoCells => write!(f, "I/O cells"),
        }
    }
}

/// Errors that can occur while compiling equations onto a fabric
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// LUT arity other than 4 or 6
    InvalidArity {
        /// The requested arity
        arity: usize,
    },

    /// The fabric is too small for the mapped equations
    ///
    /// Raised for a LUT budget below one, for mappings that need more LUTs
    /// than the budget, and when placement runs out of LUT or I/O cells.
    InsufficientCapacity {
        /// What ran out
        resource: Resource,
        /// How many were needed
        required: usize,
        /// How many the fabric has
        available: usize,
    },

    /// An equation failed to parse
    MalformedExpression {
        /// The equation text
        equation: Arc<str>,
        /// The parser's diagnosis
        source: ParseError,
    },

    /// A literal refers to its own equation or closes a dependency cycle
    UnresolvedLiteral {
        /// The literal that cannot be resolved
        literal: Arc<str>,
        /// The equation text
        equation: Arc<str>,
    },

    /// The connectivity scheme is invalid or cannot be used
    UnsupportedConnectivity {
        /// What is wrong with the scheme
        message: String,
    },

    /// An equation has more unique literals than the configured limit
    FunctionTooWide {
        /// The equation text
        equation: Arc<str>,
        /// Unique literals in the equation
        literals: usize,
        /// The configured limit
        limit: usize,
    },

    /// Technology mapping failed
    Mapping {
        /// The equation text
        equation: Arc<str>,
        /// The mapper's diagnosis
        source: MappingError,
    },
}

impl CompileError {
    pub(crate) fn too_wide(equation: &str, err: WidthError) -> Self {
        CompileError::FunctionTooWide {
            equation: Arc::from(equation),
            literals: err.literals,
            limit: err.limit,
        }
    }

    pub(crate) fn mapping(equation: &str, source: MappingError) -> Self {
        match source {
            MappingError::InvalidArity { arity } => CompileError::InvalidArity { arity },
            source => CompileError::Mapping {
                equation: Arc::from(equation),
                source,
            },
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::InvalidArity { arity } => {
                write!(f, "Invalid LUT arity {}: expected 4 or 6", arity)
            }
            CompileError::InsufficientCapacity {
                resource,
                required,
                available,
            } => write!(
                f,
                "Insufficient capacity: {} {} required but only {} available",
                required, resource, available
            ),
            CompileError::MalformedExpression { equation, source } => {
                write!(f, "Malformed equation {:?}: {}", equation, source)
            }
            CompileError::UnresolvedLiteral { literal, equation } => write!(
                f,
                "Literal {} in equation {:?} cannot be resolved",
                literal, equation
            ),
            CompileError::UnsupportedConnectivity { message } => {
                write!(f, "Unsupported connectivity: {}", message)
            }
            CompileError::FunctionTooWide {
                equation,
                literals,
                limit,
            } => write!(
                f,
                "Equation {:?} has {} unique literals; the limit is {}",
                equation, literals, limit
            ),
            CompileError::Mapping { equation, source } => {
                write!(f, "Failed to map equation {:?}: {}", equation, source)
            }
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::MalformedExpression { source, .. } => Some(source),
            CompileError::Mapping { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<PlacementError> for CompileError {
    fn from(err: PlacementError) -> Self {
        match err {
            PlacementError::LutCellsExhausted { required, available } => {
                CompileError::InsufficientCapacity {
                    resource: Resource::LutCells,
                    required,
                    available,
                }
            }
            PlacementError::IoCellsExhausted { required, available } => {
                CompileError::InsufficientCapacity {
                    resource: Resource::IoCells,
                    required,
                    available,
                }
            }
            PlacementError::Connectivity { message } => {
                CompileError::UnsupportedConnectivity { message }
            }
        }
    }
}

// Conversion from CompileError to io::Error for callers working with io::Result
impl From<CompileError> for io::Error {
    fn from(err: CompileError) -> Self {
        match err {
            CompileError::InvalidArity { .. } | CompileError::UnsupportedConnectivity { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            }
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
