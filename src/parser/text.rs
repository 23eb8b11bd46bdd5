//! Payload bytes to text
//!
//! Dumps are saved by many different tools, so the payload is tried against
//! an ordered list of encodings. Decoding never fails: when nothing matches,
//! invalid UTF-8 sequences are replaced with U+FFFD.

use tracing::{debug, warn};

const UTF8_BOM: &[u8] = &[0xef, 0xbb, 0xbf];
const UTF16_LE_BOM: &[u8] = &[0xff, 0xfe];
const UTF16_BE_BOM: &[u8] = &[0xfe, 0xff];

/// Code units inspected when sniffing BOM-less UTF-16LE
const UTF16_SNIFF_UNITS: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf16,
    Latin1,
}

/// Tried in order; the first successful decode wins
pub const ENCODING_ORDER: [TextEncoding; 3] =
    [TextEncoding::Utf8, TextEncoding::Utf16, TextEncoding::Latin1];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: TextEncoding,
    /// True when the replacement-character fallback was used
    pub lossy: bool,
}

impl TextEncoding {
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => decode_utf8(bytes),
            TextEncoding::Utf16 => decode_utf16(bytes),
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

/// Decode payload bytes to text
pub fn decode_text(bytes: &[u8]) -> DecodedText {
    for encoding in ENCODING_ORDER {
        if let Some(text) = encoding.decode(bytes) {
            debug!(?encoding, chars = text.len(), "decoded dump text");
            return DecodedText {
                text,
                encoding,
                lossy: false,
            };
        }
    }

    warn!("no encoding matched, decoding dump as lossy UTF-8");
    let fallback = ENCODING_ORDER[0];
    DecodedText {
        text: String::from_utf8_lossy(strip_utf8_bom(bytes)).into_owned(),
        encoding: fallback,
        lossy: true,
    }
}

fn strip_utf8_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

fn decode_utf8(bytes: &[u8]) -> Option<String> {
    // Interleaved NULs are valid UTF-8 but never a real dump
    if looks_like_utf16le(bytes) {
        return None;
    }
    std::str::from_utf8(strip_utf8_bom(bytes))
        .ok()
        .map(str::to_string)
}

fn decode_utf16(bytes: &[u8]) -> Option<String> {
    let (body, little_endian) = if let Some(body) = bytes.strip_prefix(UTF16_LE_BOM) {
        (body, true)
    } else if let Some(body) = bytes.strip_prefix(UTF16_BE_BOM) {
        (body, false)
    } else if looks_like_utf16le(bytes) {
        (bytes, true)
    } else {
        return None;
    };

    if body.len() % 2 != 0 {
        return None;
    }

    let units = body.chunks_exact(2).map(|pair| {
        if little_endian {
            u16::from_le_bytes([pair[0], pair[1]])
        } else {
            u16::from_be_bytes([pair[0], pair[1]])
        }
    });

    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .ok()
}

/// ASCII text stored as UTF-16LE has a NUL in every high byte
fn looks_like_utf16le(bytes: &[u8]) -> bool {
    if bytes.len() < 2 || bytes.len() % 2 != 0 {
        return false;
    }
    bytes
        .chunks_exact(2)
        .take(UTF16_SNIFF_UNITS)
        .all(|pair| pair[1] == 0 && pair[0] != 0)
}
