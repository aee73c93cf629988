//! Column selector resolution.
//!
//! Each [`ColumnSelector`] variant has its own resolver. Resolution never fails:
//! a selector that matches nothing yields an empty list, and the calling rule
//! decides whether that deserves a warning.

use tabmod_model::ColumnSelector;

/// Resolve a selector against the current column names.
pub fn resolve(names: &[String], selector: &ColumnSelector) -> Vec<String> {
    match selector {
        ColumnSelector::ByPosition(index) => by_position(names, *index),
        ColumnSelector::ByName(name) => by_name(names, name),
        ColumnSelector::ByPattern(pattern) => by_pattern(names, pattern),
        ColumnSelector::ByLetter(letter) => by_letter(names, *letter),
    }
}

pub fn by_position(names: &[String], index: usize) -> Vec<String> {
    names.get(index).cloned().into_iter().collect()
}

pub fn by_name(names: &[String], name: &str) -> Vec<String> {
    names
        .iter()
        .find(|candidate| candidate.as_str() == name)
        .cloned()
        .into_iter()
        .collect()
}

/// Every column whose name contains `pattern`, ignoring case.
pub fn by_pattern(names: &[String], pattern: &str) -> Vec<String> {
    let needle = pattern.to_lowercase();
    names
        .iter()
        .filter(|candidate| candidate.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

pub fn by_letter(names: &[String], letter: char) -> Vec<String> {
    ColumnSelector::letter_position(letter)
        .map(|index| by_position(names, index))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        ["Cuenta", "Total Debe", "Total Haber", "Saldo"]
            .iter()
            .map(|name| (*name).to_string())
            .collect()
    }

    #[test]
    fn position_and_letter_address_the_same_column() {
        let names = names();
        assert_eq!(resolve(&names, &ColumnSelector::ByPosition(1)), vec!["Total Debe"]);
        assert_eq!(resolve(&names, &ColumnSelector::ByLetter('b')), vec!["Total Debe"]);
        assert!(resolve(&names, &ColumnSelector::ByPosition(9)).is_empty());
        assert!(resolve(&names, &ColumnSelector::ByLetter('Z')).is_empty());
    }

    #[test]
    fn pattern_matches_case_insensitively() {
        let names = names();
        assert_eq!(
            resolve(&names, &ColumnSelector::ByPattern("total".to_string())),
            vec!["Total Debe", "Total Haber"]
        );
        assert!(resolve(&names, &ColumnSelector::ByName("total".to_string())).is_empty());
    }
}
