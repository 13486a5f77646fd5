//! Researcher name handling

const UPPER_SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv"];

/// Comparison key for a person's name: lowercase alphanumerics separated by single spaces.
///
/// "Dr. Jane  O'Neil" and "dr jane oneil" share the key `dr jane oneil`.
pub fn name_key(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display form of a researcher name: collapsed whitespace, title case,
/// generational suffixes upper-cased.
pub fn format_name(name: &str) -> String {
    name.split_whitespace()
        .map(|part| {
            let bare = part.trim_end_matches(['.', ',']).to_lowercase();
            if UPPER_SUFFIXES.contains(&bare.as_str()) {
                part.to_uppercase()
            } else {
                title_case(part)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut at_start = true;
    for c in word.chars() {
        if at_start {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_start = matches!(c, '-' | '\'');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_key() {
        assert_eq!(name_key("  Dr. Jane   O'Neil "), "dr jane oneil");
        assert_eq!(name_key("JANE O'NEIL"), name_key("jane oneil"));
        assert_eq!(name_key("..."), "");
    }

    #[test]
    fn test_format_name() {
        assert_eq!(format_name("  john   SMITH  jr "), "John Smith JR");
        assert_eq!(format_name("mary-kate o'brien"), "Mary-Kate O'Brien");
    }
}
