use std::error::Error;
use std::fmt::{Display, Formatter};

/// An error that occurred while encoding, decoding, or analyzing a symbol
/// stream.
#[derive(Debug)]
pub enum GabacError {
    /// The encoding configuration is invalid or internally inconsistent.
    InvalidConfiguration(String),
    /// A symbol fell outside the representable range of the selected
    /// binarization.
    SymbolOutOfRange {
        /// The offending symbol, reinterpreted as a signed value.
        value: i64,
        /// Name of the binarization that rejected the symbol.
        binarization: &'static str,
    },
    /// Diff coding encountered a value smaller than its predecessor.
    NegativeDelta {
        /// Position of the offending symbol in the input.
        position: usize,
    },
    /// The payload being decoded does not match the configuration.
    CorruptedPayload(String),
    /// The exhaustive search finished without a single valid candidate.
    AnalysisFailed,
    /// I/O error occurred when reading or writing a stream.
    IoError(std::io::Error),
    /// Error occurred (de)serializing a JSON configuration.
    JsonError(serde_json::Error),
}

impl From<std::io::Error> for GabacError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl From<serde_json::Error> for GabacError {
    fn from(e: serde_json::Error) -> Self {
        Self::JsonError(e)
    }
}

impl Display for GabacError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GabacError::InvalidConfiguration(msg) => {
                write!(f, "Invalid configuration: {}", msg)
            }
            GabacError::SymbolOutOfRange {
                value,
                binarization,
            } => write!(
                f,
                "Symbol {} is not representable by the {} binarization",
                value, binarization
            ),
            GabacError::NegativeDelta { position } => write!(
                f,
                "Symbol {} is smaller than its predecessor; diff coding requires \
                 a non-decreasing sequence",
                position
            ),
            GabacError::CorruptedPayload(msg) => write!(f, "Corrupted payload: {}", msg),
            GabacError::AnalysisFailed => write!(f, "No valid configuration found"),
            GabacError::IoError(e) => write!(f, "IO error: {}", e),
            GabacError::JsonError(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl Error for GabacError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GabacError::IoError(e) => Some(e),
            GabacError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

/// The result of a GABAC operation.
pub type GabacResult<T> = Result<T, GabacError>;
