//! Affiliation parsing: university and country extraction

use regex_lite::Regex;
use std::sync::OnceLock;

/// Countries recognised when scanning comma-separated affiliation parts
const KNOWN_COUNTRIES: &[&str] = &[
    "United States",
    "United Kingdom",
    "Germany",
    "France",
    "Italy",
    "Spain",
    "China",
    "Japan",
    "South Korea",
    "India",
    "Canada",
    "Australia",
    "Netherlands",
    "Switzerland",
    "Sweden",
    "Norway",
    "Denmark",
    "Finland",
    "Singapore",
    "Taiwan",
    "Hong Kong",
    "Macau",
    "New Zealand",
    "Austria",
    "Belgium",
    "Brazil",
    "Israel",
    "Portugal",
    "Ireland",
    "Poland",
    "Mexico",
];

/// Common abbreviations and alternate spellings
const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("USA", "United States"),
    ("US", "United States"),
    ("U.S.A.", "United States"),
    ("UK", "United Kingdom"),
    ("Britain", "United Kingdom"),
    ("England", "United Kingdom"),
    ("PRC", "China"),
    ("ROC", "Taiwan"),
    ("HK", "Hong Kong"),
    ("NZ", "New Zealand"),
    ("Korea", "South Korea"),
    ("Deutschland", "Germany"),
    ("Holland", "Netherlands"),
    ("Schweiz", "Switzerland"),
];

/// Patterns tried against single-part affiliations, in priority order
const COUNTRY_PATTERNS: &[&str] = &[
    r"(?i)\b(USA|United States|US)\b",
    r"(?i)\b(UK|United Kingdom|Britain)\b",
    r"(?i)\b(Germany|Deutschland)\b",
    r"(?i)\b(China|PRC)\b",
    r"(?i)\b(Japan)\b",
    r"(?i)\b(India)\b",
    r"(?i)\b(Canada)\b",
    r"(?i)\b(Australia)\b",
    r"(?i)\b(Singapore)\b",
    r"(?i)\b(South Korea|Korea)\b",
    r"(?i)\b(France)\b",
    r"(?i)\b(Italy|Italia)\b",
    r"(?i)\b(Spain)\b",
    r"(?i)\b(Netherlands|Holland)\b",
    r"(?i)\b(Switzerland|Schweiz)\b",
    r"(?i)\b(Sweden)\b",
    r"(?i)\b(Norway)\b",
    r"(?i)\b(Denmark)\b",
    r"(?i)\b(Finland)\b",
    r"(?i)\b(Taiwan|ROC)\b",
    r"(?i)\b(Hong Kong|HK)\b",
    r"(?i)\b(New Zealand|NZ)\b",
];

fn country_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        COUNTRY_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("static country pattern"))
            .collect()
    })
}

fn institution_words() -> &'static Regex {
    static WORDS: OnceLock<Regex> = OnceLock::new();
    WORDS.get_or_init(|| {
        Regex::new(r"(?i)\b(University|Institute|College|School|Department|Dept|of|the|and)\b")
            .expect("static institution pattern")
    })
}

/// Map an alias to its canonical country name, or title-match a known country
pub fn normalize_country(name: &str) -> Option<String> {
    let name = name.trim();
    if name.len() < 2 {
        return None;
    }

    if let Some((_, canonical)) = COUNTRY_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
    {
        return Some((*canonical).to_string());
    }

    KNOWN_COUNTRIES
        .iter()
        .find(|c| c.eq_ignore_ascii_case(name))
        .map(|c| (*c).to_string())
}

/// Strip institution words and punctuation from an affiliation part
fn clean_part(part: &str) -> String {
    let stripped = institution_words().replace_all(part, "");
    let no_punct: String = stripped
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    no_punct.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract `(university, country)` from a free-text affiliation.
///
/// Multi-part affiliations take the first part as the institution and look
/// for a country in the last three parts. Single-part affiliations are
/// scanned with country patterns.
pub fn resolve_location(affiliation: &str) -> (Option<String>, Option<String>) {
    let parts: Vec<&str> = affiliation
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [] => (None, None),
        [single] => {
            let country = country_patterns().iter().find_map(|re| {
                re.captures(single)
                    .and_then(|caps| caps.get(1))
                    .and_then(|m| normalize_country(m.as_str()))
            });
            (Some((*single).to_string()), country)
        }
        [first, ..] => {
            let tail_start = parts.len().saturating_sub(3);
            let country = parts[tail_start..]
                .iter()
                .rev()
                .find_map(|p| normalize_country(p).or_else(|| normalize_country(&clean_part(p))));
            (Some((*first).to_string()), country)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_part_affiliation() {
        let (uni, country) = resolve_location("ETH Zurich, Zurich, Switzerland");
        assert_eq!(uni.as_deref(), Some("ETH Zurich"));
        assert_eq!(country.as_deref(), Some("Switzerland"));
    }

    #[test]
    fn test_alias_in_tail() {
        let (_, country) = resolve_location("Robotics Institute, Carnegie Mellon University, Pittsburgh, USA");
        assert_eq!(country.as_deref(), Some("United States"));
    }

    #[test]
    fn test_single_part_pattern() {
        let (uni, country) = resolve_location("Professor of Robotics at KAIST Korea");
        assert_eq!(uni.as_deref(), Some("Professor of Robotics at KAIST Korea"));
        assert_eq!(country.as_deref(), Some("South Korea"));
    }

    #[test]
    fn test_unresolvable() {
        assert_eq!(resolve_location(""), (None, None));
        let (uni, country) = resolve_location("Independent researcher");
        assert_eq!(uni.as_deref(), Some("Independent researcher"));
        assert!(country.is_none());
    }
}
