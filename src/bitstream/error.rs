//! Error types for bitstream reading and writing

use std::fmt;
use std::io;

/// Errors that can occur while reading or writing a fabric bitstream
#[derive(Debug)]
pub enum BitstreamError {
    /// IO error while reading or writing
    Io(io::Error),
    /// The text is not a valid serialized fabric
    Json(serde_json::Error),
    /// The fabric deserialized but its grid and LUT records disagree
    Inconsistent {
        /// What does not match
        message: String,
    },
}

impl fmt::Display for BitstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitstreamError::Io(e) => write!(f, "IO error: {}", e),
            BitstreamError::Json(e) => write!(f, "Bitstream format error: {}", e),
            BitstreamError::Inconsistent { message } => {
                write!(f, "Inconsistent fabric: {}", message)
            }
        }
    }
}

impl std::error::Error for BitstreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BitstreamError::Io(e) => Some(e),
            BitstreamError::Json(e) => Some(e),
            BitstreamError::Inconsistent { .. } => None,
        }
    }
}

impl From<io::Error> for BitstreamError {
    fn from(err: io::Error) -> Self {
        BitstreamError::Io(err)
    }
}

impl From<serde_json::Error> for BitstreamError {
    fn from(err: serde_json::Error) -> Self {
        // serde_json reports failures of the underlying reader/writer as io errors
        if err.is_io() {
            BitstreamError::Io(err.into())
        } else {
            BitstreamError::Json(err)
        }
    }
}

impl From<BitstreamError> for io::Error {
    fn from(err: BitstreamError) -> Self {
        match err {
            BitstreamError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inconsistent_message() {
        let err = BitstreamError::Inconsistent {
            message: "layout layer is not 5x3".to_string(),
        };
        assert_eq!(err.to_string(), "Inconsistent fabric: layout layer is not 5x3");
    }

    #[test]
    fn test_io_error_passes_through() {
        let err = BitstreamError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let back: io::Error = err.into();
        assert_eq!(back.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_json_error_becomes_invalid_data() {
        let json = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: io::Error = BitstreamError::from(json).into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
