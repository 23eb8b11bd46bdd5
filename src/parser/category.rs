//! Setting key categorization
//!
//! A presentation-grouping heuristic, not a firmware schema. Rules are
//! evaluated top to bottom against the lowercased key and the first match
//! wins; anything unmatched lands in `misc`.

use crate::types::SettingCategory;

/// A single categorization rule
struct CategoryRule {
    category: SettingCategory,
    prefixes: &'static [&'static str],
    contains: &'static [&'static str],
}

impl CategoryRule {
    fn matches(&self, key: &str) -> bool {
        self.prefixes.iter().any(|prefix| key.starts_with(prefix))
            || self.contains.iter().any(|needle| key.contains(needle))
    }
}

const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: SettingCategory::Osd,
        prefixes: &["displayport"],
        contains: &["osd"],
    },
    CategoryRule {
        category: SettingCategory::Vtx,
        prefixes: &["vtx", "vtx_", "vcd_", "tramp", "smartaudio"],
        contains: &["vtx"],
    },
    CategoryRule {
        category: SettingCategory::Rx,
        prefixes: &[
            "rx_",
            "serialrx",
            "crsf",
            "elrs",
            "expresslrs",
            "sbus",
            "spektrum",
        ],
        contains: &["receiver"],
    },
    CategoryRule {
        category: SettingCategory::Pid,
        prefixes: &["p_", "i_", "d_", "ff_", "iterm", "dterm", "pterm"],
        contains: &["pid", "gyro", "filter", "dshot"],
    },
    CategoryRule {
        category: SettingCategory::Rates,
        prefixes: &[
            "rc_",
            "rates_",
            "throttle_",
            "roll_rate",
            "pitch_rate",
            "yaw_rate",
        ],
        contains: &["rate", "expo"],
    },
    CategoryRule {
        category: SettingCategory::Ports,
        prefixes: &[
            "serial_",
            "uart",
            "gps_",
            "baro",
            "mag",
            "i2c",
            "spi",
            "softserial",
        ],
        contains: &[],
    },
];

/// Map a `set` key to its presentation category
pub fn categorize_setting(key: &str) -> SettingCategory {
    let key = key.trim().to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|rule| rule.matches(&key))
        .map(|rule| rule.category)
        .unwrap_or(SettingCategory::Misc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osd_rules() {
        assert_eq!(categorize_setting("osd_vbat_pos"), SettingCategory::Osd);
        assert_eq!(categorize_setting("displayport_msp_serial"), SettingCategory::Osd);
        // "osd" wins over the later "rate" rule
        assert_eq!(categorize_setting("osd_framerate_hz"), SettingCategory::Osd);
    }

    #[test]
    fn test_vtx_rules() {
        assert_eq!(categorize_setting("vtx_band"), SettingCategory::Vtx);
        assert_eq!(categorize_setting("vcd_video_system"), SettingCategory::Vtx);
        assert_eq!(categorize_setting("tramp_pit_mode"), SettingCategory::Vtx);
        assert_eq!(categorize_setting("smartaudio_version"), SettingCategory::Vtx);
    }

    #[test]
    fn test_rx_rules() {
        assert_eq!(categorize_setting("serialrx_provider"), SettingCategory::Rx);
        assert_eq!(categorize_setting("rx_min_usec"), SettingCategory::Rx);
        assert_eq!(categorize_setting("expresslrs_domain"), SettingCategory::Rx);
        assert_eq!(categorize_setting("spi_receiver_protocol"), SettingCategory::Rx);
    }

    #[test]
    fn test_pid_rules() {
        assert_eq!(categorize_setting("p_pitch"), SettingCategory::Pid);
        assert_eq!(categorize_setting("gyro_lowpass_hz"), SettingCategory::Pid);
        assert_eq!(categorize_setting("dterm_lpf1_dyn_min_hz"), SettingCategory::Pid);
        assert_eq!(categorize_setting("dshot_bidir"), SettingCategory::Pid);
        assert_eq!(categorize_setting("pid_process_denom"), SettingCategory::Pid);
        // "gyro" wins over "rate"
        assert_eq!(categorize_setting("gyro_rate_sync"), SettingCategory::Pid);
    }

    #[test]
    fn test_rates_rules() {
        assert_eq!(categorize_setting("rates_type"), SettingCategory::Rates);
        assert_eq!(categorize_setting("roll_expo"), SettingCategory::Rates);
        assert_eq!(categorize_setting("rc_smoothing_auto_factor"), SettingCategory::Rates);
        assert_eq!(categorize_setting("throttle_limit_type"), SettingCategory::Rates);
        assert_eq!(categorize_setting("roll_srate"), SettingCategory::Rates);
    }

    #[test]
    fn test_ports_rules() {
        assert_eq!(categorize_setting("gps_provider"), SettingCategory::Ports);
        assert_eq!(categorize_setting("baro_hardware"), SettingCategory::Ports);
        assert_eq!(categorize_setting("mag_hardware"), SettingCategory::Ports);
        assert_eq!(categorize_setting("serial_update_rate_hz"), SettingCategory::Rates);
    }

    #[test]
    fn test_misc_and_case_insensitivity() {
        assert_eq!(categorize_setting("craft_name"), SettingCategory::Misc);
        assert_eq!(categorize_setting("beeper_dshot_beacon_tone"), SettingCategory::Pid);
        assert_eq!(categorize_setting("GYRO_LOWPASS_HZ"), SettingCategory::Pid);
        assert_eq!(categorize_setting("  OSD_UNITS "), SettingCategory::Osd);
    }
}
