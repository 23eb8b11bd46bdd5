use crate::decompress::decompress_payload;
use crate::error::{Ceiling, DumpError, Result};
use crate::parser::classify::ScannerState;
use crate::parser::text::decode_text;
use crate::types::*;
use std::path::Path;
use tracing::{debug, warn};

/// Parse a dump file, deriving its kind from the file extension
pub fn parse_dump_file(file_path: &Path, limits: &Limits) -> Result<DumpDocument> {
    // Allow-list check happens before any bytes are read
    let kind = DumpKind::from_path(file_path)?;

    let metadata = std::fs::metadata(file_path)?;
    debug!(
        path = %file_path.display(),
        bytes = metadata.len(),
        ?kind,
        "reading dump file"
    );
    if metadata.len() > limits.max_raw_bytes {
        return Err(DumpError::PayloadTooLarge {
            ceiling: Ceiling::Raw,
            limit: limits.max_raw_bytes,
        });
    }

    let raw = std::fs::read(file_path)?;
    parse_dump_bytes(&raw, kind, limits)
}

/// Parse raw uploaded bytes of the declared kind
///
/// Fails only while decompressing; once text is obtained the parse
/// always produces a document.
pub fn parse_dump_bytes(raw: &[u8], kind: DumpKind, limits: &Limits) -> Result<DumpDocument> {
    let payload = decompress_payload(raw, kind, limits)?;
    let decoded = decode_text(&payload);
    if decoded.lossy {
        warn!("dump text contained invalid byte sequences");
    }
    Ok(parse_dump_text(&decoded.text))
}

/// Split text into lines on `\r\n`, `\n` and a bare `\r`.
///
/// A trailing terminator does not produce an extra empty line.
pub fn split_dump_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        match rest.find(['\r', '\n']) {
            Some(idx) => {
                let line = &rest[..idx];
                let terminator = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[idx + terminator..];
                Some(line)
            }
            None => {
                let line = rest;
                rest = "";
                Some(line)
            }
        }
    })
}

/// Parse already decoded dump text
pub fn parse_dump_text(text: &str) -> DumpDocument {
    let mut state = ScannerState::new();
    for line in split_dump_lines(text) {
        state.feed_line(line);
    }
    let doc = state.finish();

    debug!(
        lines = doc.stats.lines_total,
        recognized = doc.stats.recognized,
        unknown = doc.stats.unknown,
        settings = doc.settings.global.len(),
        "parsed dump"
    );
    if !doc.has_version_banner() {
        warn!("dump has no version banner");
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dump_bytes_plain() {
        let doc = parse_dump_bytes(
            b"# version\n# Betaflight / STM32F405 (S405) 4.3.1\nset p_roll = 45\n",
            DumpKind::Plain,
            &Limits::default(),
        )
        .unwrap();
        assert_eq!(doc.settings.global["p_roll"], "45");
        assert_eq!(doc.firmware.version(), Some(semver::Version::new(4, 3, 1)));
    }

    #[test]
    fn test_split_dump_lines_all_terminators() {
        let lines: Vec<&str> = split_dump_lines("a\r\nb\rc\nd\r\r\ne").collect();
        assert_eq!(lines, vec!["a", "b", "c", "d", "", "e"]);
        assert_eq!(split_dump_lines("x\r").count(), 1);
        assert_eq!(split_dump_lines("").count(), 0);
    }

    #[test]
    fn test_parse_dump_text_bare_cr_line_endings() {
        let doc = parse_dump_text("# version\r# Betaflight 4.4.0\rset p_roll = 45\rset p_pitch = 47\r");
        assert_eq!(doc.stats.lines_total, 4);
        assert_eq!(doc.firmware.version_line.as_deref(), Some("Betaflight 4.4.0"));
        assert_eq!(doc.settings.global["p_roll"], "45");
        assert_eq!(doc.settings.profiles["0"].pid["p_pitch"], "47");
        assert_eq!(doc.stats.recognized, 4);
        assert!(doc.warnings.is_empty());
    }

    #[test]
    fn test_parse_dump_bytes_latin1_payload() {
        let doc = parse_dump_bytes(b"name Caf\xe9 Quad", DumpKind::Plain, &Limits::default())
            .unwrap();
        assert_eq!(doc.firmware.fc_name.as_deref(), Some("Café Quad"));
    }

    #[test]
    fn test_parse_dump_file_rejects_extension_before_reading() {
        // The file does not exist; the extension check must fail first
        let err = parse_dump_file(Path::new("/nonexistent/config.exe"), &Limits::default())
            .unwrap_err();
        assert!(matches!(err, DumpError::UnsupportedExtension(_)));
    }

    #[test]
    fn test_parse_dump_file_missing_is_io_error() {
        let err = parse_dump_file(Path::new("/nonexistent/config.txt"), &Limits::default())
            .unwrap_err();
        assert!(matches!(err, DumpError::Io(_)));
    }
}
