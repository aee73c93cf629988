//! Typed column selectors.

use std::fmt;

/// Ways of identifying target columns.
///
/// Resolution never fails: a selector that matches nothing resolves to no columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnSelector {
    /// Zero-based column position.
    ByPosition(usize),
    /// Exact column name.
    ByName(String),
    /// Case-insensitive substring of the column name.
    ByPattern(String),
    /// Spreadsheet column letter (`A` = 0, `B` = 1, ...).
    ByLetter(char),
}

impl ColumnSelector {
    /// Parses a single ASCII letter as a spreadsheet column selector.
    pub fn letter(value: &str) -> Option<Self> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) if ch.is_ascii_alphabetic() => Some(Self::ByLetter(ch)),
            _ => None,
        }
    }

    /// Zero-based position addressed by a spreadsheet letter.
    pub fn letter_position(letter: char) -> Option<usize> {
        letter
            .is_ascii_alphabetic()
            .then(|| usize::from(letter.to_ascii_uppercase() as u8 - b'A'))
    }
}

impl fmt::Display for ColumnSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByPosition(index) => write!(f, "position {index}"),
            Self::ByName(name) => write!(f, "name '{name}'"),
            Self::ByPattern(pattern) => write!(f, "pattern '{pattern}'"),
            Self::ByLetter(letter) => write!(f, "letter {letter}"),
        }
    }
}
