use crate::types::CategoryBuckets;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Firmware and board identification captured from banner lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Firmware {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub version_line: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub board_name: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub manufacturer_id: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub fc_name: Option<String>,
}

impl Firmware {
    /// Semantic version found in the version banner, if any
    pub fn version(&self) -> Option<semver::Version> {
        self.version_line
            .as_deref()
            .and_then(crate::firmware::extract_firmware_version)
    }

    /// Firmware family named in the version banner, if any
    pub fn flavor(&self) -> Option<crate::firmware::FirmwareFlavor> {
        self.version_line
            .as_deref()
            .and_then(crate::firmware::detect_firmware_flavor)
    }
}

/// Feature flags, each list deduplicated and sorted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Features {
    pub enabled: Vec<String>,
    pub disabled: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ports {
    pub serial: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Modes {
    pub aux: Vec<String>,
}

/// All `set` values: a flat last-write-wins map plus the per-context buckets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Settings {
    pub global: BTreeMap<String, String>,
    pub profiles: BTreeMap<String, CategoryBuckets>,
    pub rateprofiles: BTreeMap<String, CategoryBuckets>,
}

/// Line counters and the profile ids observed while parsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParseStats {
    /// Every line of the decoded text, blank and comment lines included
    pub lines_total: usize,
    pub recognized: usize,
    pub unknown: usize,
    pub profiles_detected: Vec<String>,
    pub rateprofiles_detected: Vec<String>,
}

/// Structured result of parsing one dump
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DumpDocument {
    pub firmware: Firmware,
    pub features: Features,
    pub ports: Ports,
    pub resources: Vec<String>,
    pub modes: Modes,
    pub settings: Settings,
    pub other_commands: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: ParseStats,
}

impl DumpDocument {
    /// Check if the dump carried a firmware version banner
    pub fn has_version_banner(&self) -> bool {
        self.firmware.version_line.is_some()
    }

    /// Number of distinct keys written by `set`
    pub fn setting_count(&self) -> usize {
        self.settings.global.len()
    }

    /// Get the category buckets of a profile
    pub fn profile(&self, id: &str) -> Option<&CategoryBuckets> {
        self.settings.profiles.get(id)
    }

    /// Get the category buckets of a rate-profile
    pub fn rateprofile(&self, id: &str) -> Option<&CategoryBuckets> {
        self.settings.rateprofiles.get(id)
    }
}
