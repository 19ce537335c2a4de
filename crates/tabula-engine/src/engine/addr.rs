//! Cell addressing.
//!
//! Provides bidirectional conversion between spreadsheet-style references
//! (e.g., "A1", "B2", "AA100") and zero-indexed row/column coordinates.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A cell coordinate: zero-indexed row and column.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellAddr {
    pub row: usize,
    pub col: usize,
}

impl CellAddr {
    pub fn new(row: usize, col: usize) -> CellAddr {
        CellAddr { row, col }
    }

    /// Parse an A1-style reference (e.g., "A1", "b2", "AA10").
    /// Returns None for invalid input or out-of-range coordinates.
    pub fn parse(name: &str) -> Option<CellAddr> {
        let caps = a1_re().captures(name)?;
        let letters = &caps["letters"];
        let digits = &caps["digits"];

        let mut col_acc = 0usize;
        for b in letters.to_ascii_uppercase().bytes() {
            let digit = (b - b'A') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        let col = col_acc.checked_sub(1)?;
        let row = digits.parse::<usize>().ok()?.checked_sub(1)?;

        Some(CellAddr { row, col })
    }

    /// Convert a column index to letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_letters(col: usize) -> String {
        let mut letters = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            letters.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        letters
    }
}

fn a1_re() -> &'static Regex {
    static A1_RE: OnceLock<Regex> = OnceLock::new();
    A1_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<digits>[0-9]+)$")
            .expect("A1 reference regex must compile")
    })
}

impl std::str::FromStr for CellAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for CellAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellAddr::col_letters(self.col), self.row + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::CellAddr;

    #[test]
    fn test_parse_single_letter_columns() {
        let a1 = CellAddr::parse("A1").unwrap();
        assert_eq!(a1.row, 0);
        assert_eq!(a1.col, 0);

        let z3 = CellAddr::parse("Z3").unwrap();
        assert_eq!(z3.row, 2);
        assert_eq!(z3.col, 25);
    }

    #[test]
    fn test_parse_multi_letter_columns() {
        assert_eq!(CellAddr::parse("AA1").unwrap().col, 26);
        assert_eq!(CellAddr::parse("AZ1").unwrap().col, 51);
        assert_eq!(CellAddr::parse("BA1").unwrap().col, 52);
    }

    #[test]
    fn test_parse_case_insensitive() {
        let lower = CellAddr::parse("b2").unwrap();
        assert_eq!(lower.row, 1);
        assert_eq!(lower.col, 1);
    }

    #[test]
    fn test_parse_invalid_inputs() {
        assert!(CellAddr::parse("").is_none());
        assert!(CellAddr::parse("123").is_none());
        assert!(CellAddr::parse("ABC").is_none());
        assert!(CellAddr::parse("A0").is_none());
        assert!(CellAddr::parse("1A").is_none());
        assert!(CellAddr::parse("A 1").is_none());
    }

    #[test]
    fn test_parse_overflow_returns_none() {
        let huge = format!("{}1", "Z".repeat(40));
        assert!(CellAddr::parse(&huge).is_none());
    }

    #[test]
    fn test_display_round_trip() {
        for name in ["A1", "B2", "Z100", "AA10", "BC7"] {
            let addr = CellAddr::parse(name).unwrap();
            assert_eq!(addr.to_string(), name);
        }
    }
}
