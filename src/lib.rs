//! Flight-controller Dump Parser Library
//!
//! A Rust library for parsing Betaflight/EmuFlight/INAV CLI `dump` and `diff`
//! exports into a structured document grouped by profile, rate-profile and
//! setting category. Uploads may be plain text, gzip, or a single-file zip.
//!
//! # Features
//!
//! - **`csv`** (default): Enable CSV export of categorized settings
//! - **`cli`** (default): Build the command-line interface binary
//! - **`json`** (default): Enable JSON export of the parsed document
//! - **`serde`**: Enable serialization/deserialization of types
//!
//! # Quick Start
//!
//! Parse a dump file and look at its settings:
//! ```rust,no_run
//! use fc_dump_parser::{parse_dump_file, Limits};
//! use std::path::Path;
//!
//! let doc = parse_dump_file(Path::new("diff_all.txt"), &Limits::default()).unwrap();
//! println!("Board: {:?}", doc.firmware.board_name);
//! println!("{} settings, {} unknown lines", doc.setting_count(), doc.stats.unknown);
//! ```
//!
//! Parse uploaded bytes with an explicit kind and tighter ceilings:
//! ```rust
//! use fc_dump_parser::{parse_dump_bytes, DumpKind, Limits};
//!
//! let limits = Limits { max_raw_bytes: 1 << 20, max_payload_bytes: 4 << 20 };
//! let doc = parse_dump_bytes(b"profile 1\nset p_pitch = 45\n", DumpKind::Plain, &limits).unwrap();
//! assert_eq!(doc.settings.profiles["1"].pid["p_pitch"], "45");
//! ```
//!
//! # Public API
//!
//! ## Parsing Functions
//! - [`parse_dump_file`] - Parse a dump file, kind taken from its extension
//! - [`parse_dump_bytes`] - Parse raw bytes of a declared [`DumpKind`]
//! - [`parse_dump_text`] - Parse already decoded text (never fails)
//!
//! ## Pipeline Stages
//! - [`decompress_payload`] - Bounded plain/gzip/zip decompression
//! - [`decode_text`] - Multi-encoding text decoding
//! - [`classify_line`] / [`ScannerState`] - Line classification
//! - [`categorize_setting`] - Setting key categorization
//!
//! ## Export Functions
//! - [`export_document`] - Export JSON and/or CSV per [`ExportOptions`]
//! - [`compute_export_paths`] - Helper for consistent path computation

// Module declarations
pub mod decompress;
pub mod error;
pub mod export;
pub mod firmware;
pub mod parser;
pub mod types;

// Re-export everything from modules for convenience
pub use decompress::*;
pub use error::*;
pub use export::*;
pub use firmware::*;
pub use parser::*;
pub use types::*;
