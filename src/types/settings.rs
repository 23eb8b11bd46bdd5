use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Presentation grouping for a `set` key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SettingCategory {
    Pid,
    Rates,
    Osd,
    Vtx,
    Rx,
    Ports,
    Misc,
}

impl SettingCategory {
    pub const ALL: [SettingCategory; 7] = [
        SettingCategory::Pid,
        SettingCategory::Rates,
        SettingCategory::Osd,
        SettingCategory::Vtx,
        SettingCategory::Rx,
        SettingCategory::Ports,
        SettingCategory::Misc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingCategory::Pid => "pid",
            SettingCategory::Rates => "rates",
            SettingCategory::Osd => "osd",
            SettingCategory::Vtx => "vtx",
            SettingCategory::Rx => "rx",
            SettingCategory::Ports => "ports",
            SettingCategory::Misc => "misc",
        }
    }
}

impl fmt::Display for SettingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key/value pairs of one category
pub type SettingMap = BTreeMap<String, String>;

/// The seven category buckets of a profile or rate-profile context.
///
/// Every bucket exists from construction, so consumers never have to
/// special-case a missing category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CategoryBuckets {
    pub pid: SettingMap,
    pub rates: SettingMap,
    pub osd: SettingMap,
    pub vtx: SettingMap,
    pub rx: SettingMap,
    pub ports: SettingMap,
    pub misc: SettingMap,
}

impl CategoryBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket(&self, category: SettingCategory) -> &SettingMap {
        match category {
            SettingCategory::Pid => &self.pid,
            SettingCategory::Rates => &self.rates,
            SettingCategory::Osd => &self.osd,
            SettingCategory::Vtx => &self.vtx,
            SettingCategory::Rx => &self.rx,
            SettingCategory::Ports => &self.ports,
            SettingCategory::Misc => &self.misc,
        }
    }

    pub fn bucket_mut(&mut self, category: SettingCategory) -> &mut SettingMap {
        match category {
            SettingCategory::Pid => &mut self.pid,
            SettingCategory::Rates => &mut self.rates,
            SettingCategory::Osd => &mut self.osd,
            SettingCategory::Vtx => &mut self.vtx,
            SettingCategory::Rx => &mut self.rx,
            SettingCategory::Ports => &mut self.ports,
            SettingCategory::Misc => &mut self.misc,
        }
    }

    /// Iterate `(category, key, value)` over all buckets in category order
    pub fn iter(&self) -> impl Iterator<Item = (SettingCategory, &String, &String)> + '_ {
        SettingCategory::ALL
            .into_iter()
            .flat_map(move |category| {
                self.bucket(category)
                    .iter()
                    .map(move |(key, value)| (category, key, value))
            })
    }

    /// Total number of settings across all buckets
    pub fn len(&self) -> usize {
        SettingCategory::ALL
            .iter()
            .map(|category| self.bucket(*category).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_mut_targets_matching_field() {
        let mut buckets = CategoryBuckets::new();
        buckets
            .bucket_mut(SettingCategory::Osd)
            .insert("osd_units".to_string(), "METRIC".to_string());

        assert_eq!(buckets.osd.get("osd_units").map(String::as_str), Some("METRIC"));
        assert!(buckets.pid.is_empty());
        assert_eq!(buckets.len(), 1);
    }

    #[test]
    fn test_iter_follows_category_order() {
        let mut buckets = CategoryBuckets::new();
        buckets.misc.insert("craft_name".to_string(), "QUAD".to_string());
        buckets.pid.insert("p_roll".to_string(), "45".to_string());

        let categories: Vec<_> = buckets.iter().map(|(category, _, _)| category).collect();
        assert_eq!(categories, vec![SettingCategory::Pid, SettingCategory::Misc]);
    }
}
