use std::fmt;

/// Which byte ceiling a payload ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ceiling {
    /// Bytes as received, before any decompression
    Raw,
    /// Bytes after decompression (or the plain payload itself)
    Decompressed,
}

impl fmt::Display for Ceiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ceiling::Raw => write!(f, "raw"),
            Ceiling::Decompressed => write!(f, "decompressed"),
        }
    }
}

/// Error types for dump ingestion
///
/// Only the decompression stage and the extension allow-list can fail.
/// Once text is obtained, parsing never returns an error.
#[derive(Debug)]
pub enum DumpError {
    /// Declared kind / file extension is not allow-listed
    UnsupportedExtension(String),
    /// Raw or decompressed bytes exceed a ceiling
    PayloadTooLarge { ceiling: Ceiling, limit: u64 },
    /// Corrupt gzip or zip container
    InvalidFormat(String),
    /// Zip archive holds no file entries
    EmptyArchive,
    /// Zip archive holds more than one file entry
    MultipleEntriesNotAllowed(usize),
    /// I/O errors while reading a dump from disk
    Io(std::io::Error),
    /// Export format error
    Export(String),
}

impl fmt::Display for DumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DumpError::UnsupportedExtension(ext) => {
                write!(f, "Unsupported dump extension: '{}'", ext)
            }
            DumpError::PayloadTooLarge { ceiling, limit } => {
                write!(f, "Payload too large: {} size exceeds {} bytes", ceiling, limit)
            }
            DumpError::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            DumpError::EmptyArchive => write!(f, "Empty archive (no files inside)"),
            DumpError::MultipleEntriesNotAllowed(count) => write!(
                f,
                "Archive must contain exactly one file, found {}",
                count
            ),
            DumpError::Io(err) => write!(f, "I/O error: {}", err),
            DumpError::Export(msg) => write!(f, "Export error: {}", msg),
        }
    }
}

impl std::error::Error for DumpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DumpError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DumpError {
    fn from(err: std::io::Error) -> Self {
        DumpError::Io(err)
    }
}

impl From<zip::result::ZipError> for DumpError {
    fn from(err: zip::result::ZipError) -> Self {
        DumpError::InvalidFormat(format!("zip: {}", err))
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for DumpError {
    fn from(err: serde_json::Error) -> Self {
        DumpError::Export(err.to_string())
    }
}

#[cfg(feature = "csv")]
impl From<csv::Error> for DumpError {
    fn from(err: csv::Error) -> Self {
        DumpError::Export(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DumpError>;
