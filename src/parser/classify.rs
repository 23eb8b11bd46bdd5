//! Line classification for CLI dump/diff text
//!
//! [`classify_line`] is a pure function from one trimmed line to a
//! [`LineKind`]. [`ScannerState`] threads the current profile and rate-profile
//! ids through a single pass and feeds a [`DocumentBuilder`].
//!
//! Banners are accepted both bare (`board_name MATEKF405`) and behind a
//! comment marker (`# board_name MATEKF405`). Any other comment line is
//! skipped without being counted.

use crate::parser::builder::{BannerField, DocumentBuilder, DEFAULT_CONTEXT_ID};
use crate::parser::category::categorize_setting;
use crate::types::DumpDocument;
use tracing::{debug, trace};

/// Classification of a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    /// Comment that is not a banner; carries the text after the marker
    Comment(&'a str),
    Banner { field: BannerField, value: &'a str },
    Profile(&'a str),
    RateProfile(&'a str),
    Set { key: &'a str, value: &'a str },
    Serial,
    Resource,
    Aux,
    Feature { name: &'a str, enabled: bool },
    /// `diff ...` / `dump ...` echo, no structured output
    Marker,
    Unknown,
}

/// Split off the first whitespace-delimited token; the rest has its
/// leading whitespace run removed
fn split_first_token(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(idx) => (&s[..idx], s[idx..].trim_start()),
        None => (s, ""),
    }
}

fn banner_field(keyword: &str) -> Option<BannerField> {
    const BANNERS: [(&str, BannerField); 4] = [
        ("version", BannerField::Version),
        ("board_name", BannerField::BoardName),
        ("manufacturer_id", BannerField::ManufacturerId),
        ("name", BannerField::FcName),
    ];
    BANNERS
        .iter()
        .find(|(name, _)| keyword.eq_ignore_ascii_case(name))
        .map(|(_, field)| *field)
}

/// Classify one line of dump text
pub fn classify_line(line: &str) -> LineKind<'_> {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }

    let (body, is_comment) = match line.strip_prefix('#') {
        Some(rest) => (rest.trim_start_matches('#').trim(), true),
        None => (line, false),
    };

    let (keyword, rest) = split_first_token(body);
    if let Some(field) = banner_field(keyword) {
        return LineKind::Banner { field, value: rest };
    }
    if is_comment {
        return LineKind::Comment(body);
    }

    let keyword = keyword.to_ascii_lowercase();
    match keyword.as_str() {
        "profile" => LineKind::Profile(context_id(rest)),
        "rateprofile" => LineKind::RateProfile(context_id(rest)),
        "set" => classify_set(rest),
        "serial" if !rest.is_empty() => LineKind::Serial,
        "resource" if !rest.is_empty() => LineKind::Resource,
        "aux" if !rest.is_empty() => LineKind::Aux,
        "feature" if !rest.is_empty() => match rest.strip_prefix('-') {
            Some(name) => LineKind::Feature {
                name: name.trim(),
                enabled: false,
            },
            None => LineKind::Feature {
                name: rest,
                enabled: true,
            },
        },
        "diff" | "dump" if !rest.is_empty() => LineKind::Marker,
        _ => LineKind::Unknown,
    }
}

fn context_id(rest: &str) -> &str {
    let (id, _) = split_first_token(rest);
    if id.is_empty() {
        DEFAULT_CONTEXT_ID
    } else {
        id
    }
}

fn classify_set(rest: &str) -> LineKind<'_> {
    match rest.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => LineKind::Set {
            key: key.trim(),
            value: value.trim(),
        },
        _ => LineKind::Unknown,
    }
}

/// Scanning state for one parse: current contexts plus the document
/// under construction
#[derive(Debug)]
pub struct ScannerState {
    profile: String,
    rateprofile: String,
    /// A `version` banner had no value; the next comment line supplies it
    awaiting_version: bool,
    lines_total: usize,
    builder: DocumentBuilder,
}

impl Default for ScannerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScannerState {
    pub fn new() -> Self {
        Self {
            profile: DEFAULT_CONTEXT_ID.to_string(),
            rateprofile: DEFAULT_CONTEXT_ID.to_string(),
            awaiting_version: false,
            lines_total: 0,
            builder: DocumentBuilder::new(),
        }
    }

    pub fn current_profile(&self) -> &str {
        &self.profile
    }

    pub fn current_rateprofile(&self) -> &str {
        &self.rateprofile
    }

    /// Process one raw line of text
    pub fn feed_line(&mut self, raw: &str) {
        self.lines_total += 1;

        let kind = classify_line(raw);
        if self.awaiting_version {
            match kind {
                LineKind::Blank => return,
                LineKind::Comment(text) if text.is_empty() => return,
                LineKind::Comment(text) => {
                    self.awaiting_version = false;
                    self.builder.set_banner(BannerField::Version, text);
                    self.builder.mark_recognized();
                    return;
                }
                _ => self.awaiting_version = false,
            }
        }

        match kind {
            LineKind::Blank | LineKind::Comment(_) => {}
            LineKind::Banner { field, value } => {
                // An empty version banner is filled by the next comment line
                if field == BannerField::Version && value.is_empty() {
                    self.awaiting_version = true;
                } else {
                    self.builder.set_banner(field, value);
                }
                self.builder.mark_recognized();
            }
            LineKind::Profile(id) => {
                debug!(profile = id, "profile context switch");
                self.profile = id.to_string();
                self.builder.ensure_profile(id);
                self.builder.mark_recognized();
            }
            LineKind::RateProfile(id) => {
                debug!(rateprofile = id, "rateprofile context switch");
                self.rateprofile = id.to_string();
                self.builder.ensure_rateprofile(id);
                self.builder.mark_recognized();
            }
            LineKind::Set { key, value } => {
                let category = categorize_setting(key);
                self.builder
                    .insert_setting(key, value, category, &self.profile, &self.rateprofile);
                self.builder.mark_recognized();
            }
            LineKind::Serial => {
                self.builder.push_serial(raw.trim());
                self.builder.mark_recognized();
            }
            LineKind::Resource => {
                self.builder.push_resource(raw.trim());
                self.builder.mark_recognized();
            }
            LineKind::Aux => {
                self.builder.push_aux(raw.trim());
                self.builder.mark_recognized();
            }
            LineKind::Feature { name, enabled } => {
                self.builder.add_feature(name, enabled);
                self.builder.mark_recognized();
            }
            LineKind::Marker => self.builder.mark_recognized(),
            LineKind::Unknown => {
                trace!(line = raw.trim(), "unrecognized line");
                self.builder.push_unknown(raw.trim());
            }
        }
    }

    pub fn finish(self) -> DumpDocument {
        self.builder.finish(self.lines_total)
    }
}
