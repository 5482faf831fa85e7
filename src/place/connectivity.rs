//! Partial connectivity between LUT columns
//!
//! A fully connected fabric lets any LUT column read any column to its left.
//! A [`ConnectivityScheme`] restricts that to an explicit list of forward
//! links between logical LUT columns, read from JSON:
//!
//! ```json
//! { "links": [ { "from": 0, "to": 1 }, { "from": 1, "to": 2 } ] }
//! ```

use super::error::PlacementError;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// A directed link from one logical LUT column to a later one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Link {
    pub from: usize,
    pub to: usize,
}

/// The set of column-to-column links a constrained fabric provides
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectivityScheme {
    pub links: Vec<Link>,
}

impl ConnectivityScheme {
    /// Parse a scheme from JSON text
    pub fn from_json(text: &str) -> Result<Self, PlacementError> {
        serde_json::from_str(text).map_err(|e| PlacementError::Connectivity {
            message: format!("invalid connectivity JSON: {}", e),
        })
    }

    /// Parse a scheme from a JSON reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PlacementError> {
        serde_json::from_reader(reader).map_err(|e| PlacementError::Connectivity {
            message: format!("invalid connectivity JSON: {}", e),
        })
    }

    /// Each column linked to the next one only
    ///
    /// # Examples
    ///
    /// ```
    /// use lut_synth::place::ConnectivityScheme;
    ///
    /// let scheme = ConnectivityScheme::adjacent(3);
    /// assert!(scheme.allows(0, 1));
    /// assert!(!scheme.allows(0, 2));
    /// ```
    pub fn adjacent(lut_count: usize) -> Self {
        ConnectivityScheme {
            links: (1..lut_count).map(|to| Link { from: to - 1, to }).collect(),
        }
    }

    /// Returns `true` if column `from` can drive column `to`
    pub fn allows(&self, from: usize, to: usize) -> bool {
        self.links.iter().any(|l| l.from == from && l.to == to)
    }

    /// Check that every link points forward and stays inside the fabric
    pub fn validate(&self, lut_count: usize) -> Result<(), PlacementError> {
        for link in &self.links {
            if link.from >= link.to {
                return Err(PlacementError::Connectivity {
                    message: format!(
                        "link {} -> {} does not point to a later column",
                        link.from, link.to
                    ),
                });
            }
            if link.to >= lut_count {
                return Err(PlacementError::Connectivity {
                    message: format!(
                        "link {} -> {} leaves a fabric of {} LUT columns",
                        link.from, link.to, lut_count
                    ),
                });
            }
        }
        Ok(())
    }

    /// Serialize the scheme as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
