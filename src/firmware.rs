//! Firmware identification helpers
//!
//! Pulls the firmware family and semantic version out of a dump's version
//! banner, e.g. `Betaflight / STM32F405 (S405) 4.3.1 Jul 13 2022 / 03:32:52 (8d4f005) MSP API: 1.44`.

use semver::Version;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Firmware family a dump was exported from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FirmwareFlavor {
    Betaflight,
    Inav,
    EmuFlight,
    Kiss,
}

impl fmt::Display for FirmwareFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FirmwareFlavor::Betaflight => "Betaflight",
            FirmwareFlavor::Inav => "INAV",
            FirmwareFlavor::EmuFlight => "EmuFlight",
            FirmwareFlavor::Kiss => "KISS",
        };
        f.write_str(name)
    }
}

/// Detect the firmware family from a version banner
pub fn detect_firmware_flavor(version_line: &str) -> Option<FirmwareFlavor> {
    let lower = version_line.to_lowercase();
    // EmuFlight banners can mention Betaflight lineage, check it first
    if lower.contains("emuflight") {
        Some(FirmwareFlavor::EmuFlight)
    } else if lower.contains("betaflight") {
        Some(FirmwareFlavor::Betaflight)
    } else if lower.contains("inav") {
        Some(FirmwareFlavor::Inav)
    } else if lower.contains("kiss") {
        Some(FirmwareFlavor::Kiss)
    } else {
        None
    }
}

/// Extract the first semantic version from a version banner
pub fn extract_firmware_version(version_line: &str) -> Option<Version> {
    version_line
        .split_whitespace()
        .map(|word| word.trim_start_matches(['v', 'V']))
        .find_map(|word| Version::parse(word).ok())
}
