//! JSON persistence of compiled fabrics
//!
//! A "bitstream" here is the serialized [`FabricState`]: both grid layers,
//! every LUT record with its configuration string and location, the pin
//! lists, equation summaries and utilization counters. Writers stream
//! through any [`Write`]; readers check the grid against the LUT records
//! before handing the fabric back.
//!
//! # Examples
//!
//! ```
//! use lut_synth::{compile, FabricState};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fabric = compile(&["F = a*b + c"], 2, 4, None)?;
//!
//! let text = fabric.to_bitstream_string()?;
//! let loaded = FabricState::from_bitstream_str(&text)?;
//! assert_eq!(loaded, fabric);
//! # Ok(())
//! # }
//! ```

pub mod error;

pub use error::BitstreamError;

use crate::fabric::FabricState;
use log::debug;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

impl FabricState {
    /// Write this fabric as pretty-printed JSON
    pub fn write_bitstream<W: Write>(&self, writer: &mut W) -> Result<(), BitstreamError> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    /// Serialize this fabric to a JSON string
    pub fn to_bitstream_string(&self) -> Result<String, BitstreamError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write this fabric to a JSON file
    pub fn to_bitstream_file<P: AsRef<Path>>(&self, path: P) -> Result<(), BitstreamError> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_bitstream(&mut writer)?;
        writer.flush()?;
        debug!("Wrote bitstream to {}", path.as_ref().display());
        Ok(())
    }

    /// Read a fabric from JSON and check its consistency
    pub fn from_bitstream_reader<R: Read>(reader: R) -> Result<Self, BitstreamError> {
        let fabric: FabricState = serde_json::from_reader(reader)?;
        fabric
            .check_consistency()
            .map_err(|message| BitstreamError::Inconsistent { message })?;
        Ok(fabric)
    }

    /// Read a fabric from a JSON string
    pub fn from_bitstream_str(text: &str) -> Result<Self, BitstreamError> {
        Self::from_bitstream_reader(text.as_bytes())
    }

    /// Read a fabric from a JSON file
    pub fn from_bitstream_file<P: AsRef<Path>>(path: P) -> Result<Self, BitstreamError> {
        let file = File::open(path)?;
        Self::from_bitstream_reader(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;
    use crate::fabric::{Cell, Coord, PlacementPolicy};
    use std::io::Write as _;

    fn sample() -> FabricState {
        compile(&["F = a*b", "G = F + c"], 4, 4, None).unwrap()
    }

    #[test]
    fn test_string_round_trip() {
        let fabric = sample();
        let text = fabric.to_bitstream_string().unwrap();
        assert!(text.contains("\"policy\": \"constrained\""));
        let loaded = FabricState::from_bitstream_str(&text).unwrap();
        assert_eq!(loaded, fabric);
    }

    #[test]
    fn test_file_round_trip() {
        let fabric = sample();
        let file = tempfile::NamedTempFile::new().unwrap();
        fabric.to_bitstream_file(file.path()).unwrap();
        let loaded = FabricState::from_bitstream_file(file.path()).unwrap();
        assert_eq!(loaded, fabric);
    }

    #[test]
    fn test_writer_appends_newline() {
        let mut buffer = Vec::new();
        sample().write_bitstream(&mut buffer).unwrap();
        assert_eq!(buffer.last(), Some(&b'\n'));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FabricState::from_bitstream_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, BitstreamError::Io(_)));
    }

    #[test]
    fn test_garbage_is_json_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"policy\": ").unwrap();
        file.flush().unwrap();
        let err = FabricState::from_bitstream_file(file.path()).unwrap_err();
        assert!(matches!(err, BitstreamError::Json(_)));
    }

    #[test]
    fn test_moved_lut_is_inconsistent() {
        let mut fabric = sample();
        let at = fabric.luts[0].location.unwrap();
        fabric.luts[0].location = Some(Coord::new(at.row + 1, at.col));
        let text = fabric.to_bitstream_string().unwrap();
        let err = FabricState::from_bitstream_str(&text).unwrap_err();
        assert!(matches!(err, BitstreamError::Inconsistent { .. }));
    }

    #[test]
    fn test_wrong_grid_shape_is_inconsistent() {
        let mut fabric = FabricState::new(2, crate::LutArity::Four, PlacementPolicy::Free);
        fabric.layout.push(vec![Cell::Empty; fabric.cols]);
        let text = fabric.to_bitstream_string().unwrap();
        assert!(matches!(
            FabricState::from_bitstream_str(&text),
            Err(BitstreamError::Inconsistent { .. })
        ));
    }
}
