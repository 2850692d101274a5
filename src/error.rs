use std::error::Error;
use std::fmt;
use std::io;
use std::str::Utf8Error;

/// Errors surfaced by conversion and by character map loading.
///
/// Text conversion itself never fails on valid `&str` input; only byte input that
/// is not valid UTF-8 yields [`ConversionError::Encoding`].
#[derive(Debug)]
pub enum ConversionError {
    /// Byte input could not be decoded as UTF-8.
    Encoding(Utf8Error),
    IoError(String),
    ParseError(String),
    /// The two tables of a character map have different lengths.
    TableMismatch {
        simplified: usize,
        traditional: usize,
    },
    /// Unknown conversion config name (expected `s2t` or `t2s`).
    InvalidConfig(String),
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::Encoding(err) => write!(f, "Encoding Error: {}", err),
            ConversionError::IoError(msg) => write!(f, "I/O Error: {}", msg),
            ConversionError::ParseError(msg) => write!(f, "Parse Error: {}", msg),
            ConversionError::TableMismatch {
                simplified,
                traditional,
            } => write!(
                f,
                "Table Mismatch: {} simplified entries vs {} traditional entries",
                simplified, traditional
            ),
            ConversionError::InvalidConfig(name) => {
                write!(f, "Invalid Config: '{}' (expected s2t or t2s)", name)
            }
        }
    }
}

impl Error for ConversionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConversionError::Encoding(err) => Some(err),
            _ => None,
        }
    }
}

impl From<Utf8Error> for ConversionError {
    fn from(err: Utf8Error) -> Self {
        ConversionError::Encoding(err)
    }
}

impl From<io::Error> for ConversionError {
    fn from(err: io::Error) -> Self {
        ConversionError::IoError(err.to_string())
    }
}
