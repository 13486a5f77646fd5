//! Geographic regions used for regional clustering and filtering

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolved region of a researcher's affiliation
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Region {
    #[serde(rename = "North America")]
    NorthAmerica,
    Europe,
    China,
    Japan,
    #[serde(rename = "South Korea")]
    SouthKorea,
    Singapore,
    Australia,
    India,
    #[default]
    Other,
}

const NORTH_AMERICA: &[&str] = &["United States", "Canada"];

const EUROPE: &[&str] = &[
    "United Kingdom",
    "Germany",
    "France",
    "Netherlands",
    "Switzerland",
    "Italy",
    "Spain",
    "Sweden",
    "Denmark",
    "Norway",
    "Finland",
    "Austria",
    "Belgium",
];

const ASIA_PACIFIC: &[(Region, &[&str])] = &[
    (Region::China, &["China", "Hong Kong", "Macau", "Taiwan"]),
    (Region::Japan, &["Japan"]),
    (Region::SouthKorea, &["South Korea"]),
    (Region::Singapore, &["Singapore"]),
    (Region::Australia, &["Australia", "New Zealand"]),
    (Region::India, &["India"]),
];

impl Region {
    /// All regions in declaration order
    pub const ALL: [Region; 9] = [
        Region::NorthAmerica,
        Region::Europe,
        Region::China,
        Region::Japan,
        Region::SouthKorea,
        Region::Singapore,
        Region::Australia,
        Region::India,
        Region::Other,
    ];

    /// Map a normalized country name to its region.
    ///
    /// Unknown or missing countries map to [`Region::Other`].
    pub fn from_country(country: Option<&str>) -> Self {
        let Some(country) = country.map(str::trim).filter(|c| !c.is_empty()) else {
            return Region::Other;
        };

        let matches = |list: &[&str]| list.iter().any(|c| c.eq_ignore_ascii_case(country));

        if matches(NORTH_AMERICA) {
            return Region::NorthAmerica;
        }
        if matches(EUROPE) {
            return Region::Europe;
        }
        ASIA_PACIFIC
            .iter()
            .find(|(_, countries)| matches(countries))
            .map(|(region, _)| *region)
            .unwrap_or(Region::Other)
    }

    /// Human-readable label, also used as the regional cluster id
    pub fn label(&self) -> &'static str {
        match self {
            Region::NorthAmerica => "North America",
            Region::Europe => "Europe",
            Region::China => "China",
            Region::Japan => "Japan",
            Region::SouthKorea => "South Korea",
            Region::Singapore => "Singapore",
            Region::Australia => "Australia",
            Region::India => "India",
            Region::Other => "Other",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_mapping() {
        assert_eq!(Region::from_country(Some("United States")), Region::NorthAmerica);
        assert_eq!(Region::from_country(Some("germany")), Region::Europe);
        assert_eq!(Region::from_country(Some("Hong Kong")), Region::China);
        assert_eq!(Region::from_country(Some("New Zealand")), Region::Australia);
        assert_eq!(Region::from_country(Some("Brazil")), Region::Other);
    }

    #[test]
    fn test_missing_country_is_other() {
        assert_eq!(Region::from_country(None), Region::Other);
        assert_eq!(Region::from_country(Some("   ")), Region::Other);
    }

    #[test]
    fn test_serde_labels() {
        let json = serde_json::to_string(&Region::NorthAmerica).unwrap();
        assert_eq!(json, "\"North America\"");
        let parsed: Region = serde_json::from_str("\"South Korea\"").unwrap();
        assert_eq!(parsed, Region::SouthKorea);
    }
}
