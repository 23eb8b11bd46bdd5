use crate::error::{DumpError, Result};
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default ceiling for both raw and decompressed payloads (20 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 20 * 1024 * 1024;

/// Container format a dump was uploaded in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DumpKind {
    Plain,
    Gzip,
    Zip,
}

impl DumpKind {
    /// Map an allow-listed file extension (with or without the leading dot,
    /// case-insensitive) to a dump kind
    pub fn from_extension(ext: &str) -> Result<Self> {
        let ext_lower = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext_lower.as_str() {
            "sql" | "dump" | "txt" | "cli" | "diff" => Ok(DumpKind::Plain),
            "gz" => Ok(DumpKind::Gzip),
            "zip" => Ok(DumpKind::Zip),
            _ => Err(DumpError::UnsupportedExtension(ext.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");
        Self::from_extension(ext)
    }
}

/// Byte ceilings applied before and after decompression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_raw_bytes: u64,
    pub max_payload_bytes: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_raw_bytes: DEFAULT_MAX_BYTES,
            max_payload_bytes: DEFAULT_MAX_BYTES,
        }
    }
}
