//! Accumulates classifier output into a [`DumpDocument`]

use crate::types::*;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Maximum number of unrecognized lines kept verbatim
pub const OTHER_COMMANDS_CAP: usize = 800;

/// Context id used until a `profile` / `rateprofile` command is seen
pub const DEFAULT_CONTEXT_ID: &str = "0";

pub const MISSING_VERSION_WARNING: &str =
    "No 'version' line found in dump (may not be a Betaflight CLI/diff dump).";

/// Which firmware banner a line carried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerField {
    Version,
    BoardName,
    ManufacturerId,
    FcName,
}

/// Mutable document under construction
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    firmware: Firmware,
    features_enabled: BTreeSet<String>,
    features_disabled: BTreeSet<String>,
    serial: Vec<String>,
    resources: Vec<String>,
    aux: Vec<String>,
    global: BTreeMap<String, String>,
    profiles: BTreeMap<String, CategoryBuckets>,
    rateprofiles: BTreeMap<String, CategoryBuckets>,
    other_commands: Vec<String>,
    other_dropped: usize,
    recognized: usize,
    unknown: usize,
}

impl DocumentBuilder {
    /// Create a builder with the default profile and rate-profile allocated
    pub fn new() -> Self {
        let mut builder = Self::default();
        builder.ensure_profile(DEFAULT_CONTEXT_ID);
        builder.ensure_rateprofile(DEFAULT_CONTEXT_ID);
        builder
    }

    pub fn ensure_profile(&mut self, id: &str) {
        if !self.profiles.contains_key(id) {
            self.profiles.insert(id.to_string(), CategoryBuckets::new());
        }
    }

    pub fn ensure_rateprofile(&mut self, id: &str) {
        if !self.rateprofiles.contains_key(id) {
            self.rateprofiles.insert(id.to_string(), CategoryBuckets::new());
        }
    }

    pub fn mark_recognized(&mut self) {
        self.recognized += 1;
    }

    pub fn set_banner(&mut self, field: BannerField, value: &str) {
        let slot = match field {
            BannerField::Version => &mut self.firmware.version_line,
            BannerField::BoardName => &mut self.firmware.board_name,
            BannerField::ManufacturerId => &mut self.firmware.manufacturer_id,
            BannerField::FcName => &mut self.firmware.fc_name,
        };
        *slot = Some(value.to_string());
    }

    pub fn has_version(&self) -> bool {
        self.firmware.version_line.is_some()
    }

    /// Record a `set` value globally and in exactly one categorized bucket.
    ///
    /// `rates` keys go to the rate-profile context, every other category to
    /// the profile context.
    pub fn insert_setting(
        &mut self,
        key: &str,
        value: &str,
        category: SettingCategory,
        profile: &str,
        rateprofile: &str,
    ) {
        self.global.insert(key.to_string(), value.to_string());

        let buckets = if category == SettingCategory::Rates {
            self.ensure_rateprofile(rateprofile);
            self.rateprofiles.get_mut(rateprofile)
        } else {
            self.ensure_profile(profile);
            self.profiles.get_mut(profile)
        };
        if let Some(buckets) = buckets {
            buckets
                .bucket_mut(category)
                .insert(key.to_string(), value.to_string());
        }
    }

    pub fn add_feature(&mut self, name: &str, enabled: bool) {
        if name.is_empty() {
            return;
        }
        if enabled {
            self.features_enabled.insert(name.to_string());
        } else {
            self.features_disabled.insert(name.to_string());
        }
    }

    pub fn push_serial(&mut self, line: &str) {
        self.serial.push(line.to_string());
    }

    pub fn push_resource(&mut self, line: &str) {
        self.resources.push(line.to_string());
    }

    pub fn push_aux(&mut self, line: &str) {
        self.aux.push(line.to_string());
    }

    /// Keep an unrecognized line; past the cap it is only counted
    pub fn push_unknown(&mut self, line: &str) {
        self.unknown += 1;
        if self.other_commands.len() < OTHER_COMMANDS_CAP {
            self.other_commands.push(line.to_string());
        } else {
            self.other_dropped += 1;
        }
    }

    pub fn finish(self, lines_total: usize) -> DumpDocument {
        let mut warnings = Vec::new();
        if self.firmware.version_line.is_none() {
            warnings.push(MISSING_VERSION_WARNING.to_string());
        }
        if self.other_dropped > 0 {
            warnings.push(format!(
                "{} unrecognized line(s) omitted from other_commands (limit {}).",
                self.other_dropped, OTHER_COMMANDS_CAP
            ));
        }

        let stats = ParseStats {
            lines_total,
            recognized: self.recognized,
            unknown: self.unknown,
            profiles_detected: sorted_context_ids(self.profiles.keys()),
            rateprofiles_detected: sorted_context_ids(self.rateprofiles.keys()),
        };

        DumpDocument {
            firmware: self.firmware,
            features: Features {
                enabled: self.features_enabled.into_iter().collect(),
                disabled: self.features_disabled.into_iter().collect(),
            },
            ports: Ports {
                serial: self.serial,
            },
            resources: self.resources,
            modes: Modes { aux: self.aux },
            settings: Settings {
                global: self.global,
                profiles: self.profiles,
                rateprofiles: self.rateprofiles,
            },
            other_commands: self.other_commands,
            warnings,
            stats,
        }
    }
}

/// Numeric ids ascending, then non-numeric ids in lexical order
fn sorted_context_ids<'a>(ids: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut ids: Vec<String> = ids.cloned().collect();
    ids.sort_by(|a, b| compare_context_ids(a, b));
    ids
}

fn compare_context_ids(a: &str, b: &str) -> Ordering {
    match (numeric_id(a), numeric_id(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn numeric_id(id: &str) -> Option<u128> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    id.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_allocates_default_contexts() {
        let doc = DocumentBuilder::new().finish(0);
        assert!(doc.profile("0").is_some());
        assert!(doc.rateprofile("0").is_some());
        assert_eq!(doc.stats.profiles_detected, vec!["0"]);
    }

    #[test]
    fn test_context_ids_sort_numeric_first() {
        let ids: Vec<String> = ["10", "2", "b", "0", "a", "1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            sorted_context_ids(ids.iter()),
            vec!["0", "1", "2", "10", "a", "b"]
        );
    }

    #[test]
    fn test_unknown_lines_are_capped_but_counted() {
        let mut builder = DocumentBuilder::new();
        for i in 0..OTHER_COMMANDS_CAP + 5 {
            builder.push_unknown(&format!("mystery {}", i));
        }
        let doc = builder.finish(OTHER_COMMANDS_CAP + 5);
        assert_eq!(doc.other_commands.len(), OTHER_COMMANDS_CAP);
        assert_eq!(doc.stats.unknown, OTHER_COMMANDS_CAP + 5);
        assert_eq!(doc.other_commands.last().unwrap(), "mystery 799");
        assert!(doc.warnings.iter().any(|w| w.starts_with("5 unrecognized")));
    }

    #[test]
    fn test_insert_setting_routes_rates_to_rateprofile() {
        let mut builder = DocumentBuilder::new();
        builder.insert_setting("roll_expo", "10", SettingCategory::Rates, "1", "2");
        builder.insert_setting("p_roll", "45", SettingCategory::Pid, "1", "2");
        let doc = builder.finish(2);

        assert_eq!(doc.rateprofile("2").unwrap().rates["roll_expo"], "10");
        assert!(doc.profile("1").unwrap().rates.is_empty());
        assert_eq!(doc.profile("1").unwrap().pid["p_roll"], "45");
        assert!(doc.rateprofile("1").is_none());
        assert_eq!(doc.settings.global.len(), 2);
    }

    #[test]
    fn test_features_deduplicated_and_sorted() {
        let mut builder = DocumentBuilder::new();
        builder.add_feature("TELEMETRY", true);
        builder.add_feature("GPS", true);
        builder.add_feature("GPS", true);
        builder.add_feature("", false);
        let doc = builder.finish(4);
        assert_eq!(doc.features.enabled, vec!["GPS", "TELEMETRY"]);
        assert!(doc.features.disabled.is_empty());
    }
}
