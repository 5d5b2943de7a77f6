//! Line patterns for bank statement text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // US-style numeric dates: 03/15/2024, 3/5/2024
    pub static ref DATE_SLASH: Regex = Regex::new(
        r"\b\d{1,2}/\d{1,2}/\d{4}\b"
    ).unwrap();

    // 03-15-2024
    pub static ref DATE_DASH: Regex = Regex::new(
        r"\b\d{1,2}-\d{1,2}-\d{4}\b"
    ).unwrap();

    // 2024-03-15
    pub static ref DATE_ISO: Regex = Regex::new(
        r"\b\d{4}-\d{2}-\d{2}\b"
    ).unwrap();

    // Mar 15, 2024 / March 15 2024 / Sept. 3, 2024
    pub static ref DATE_MONTH_NAME: Regex = Regex::new(
        r"(?i)\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4}\b"
    ).unwrap();

    // Currency amounts: $1,234.56  -45.00  12.50 CR  $ 9.99 DEBIT
    pub static ref AMOUNT: Regex = Regex::new(
        r"(?i)-?\$?\s?-?\d{1,3}(?:,\d{3})*\.\d{2}\b(?:\s*(?:CR|DR|CREDIT|DEBIT)\b)?"
    ).unwrap();

    /// Date pattern family, tried in order.
    pub static ref DATE_PATTERNS: Vec<&'static Regex> = vec![
        &*DATE_SLASH,
        &*DATE_DASH,
        &*DATE_ISO,
        &*DATE_MONTH_NAME,
    ];

    /// Amount pattern family.
    pub static ref AMOUNT_PATTERNS: Vec<&'static Regex> = vec![&*AMOUNT];
}

/// Whether any pattern of the family matches `line`.
pub fn matches_any(patterns: &[&Regex], line: &str) -> bool {
    patterns.iter().any(|p| p.is_match(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_family() {
        for line in [
            "03/15/2024 COFFEE",
            "3/5/2024",
            "03-15-2024",
            "posted 2024-03-15",
            "Mar 15, 2024",
            "September 3 2024",
            "sept. 3, 2024",
        ] {
            assert!(matches_any(&DATE_PATTERNS, line), "expected date in {line:?}");
        }

        assert!(!matches_any(&DATE_PATTERNS, "Account 1234-5678"));
        // two-digit years are not dates
        assert!(!matches_any(&DATE_PATTERNS, "3/5/24"));
        assert!(!matches_any(&DATE_PATTERNS, "03-15-24"));
        assert!(!matches_any(&DATE_PATTERNS, "Statement period: March"));
    }

    #[test]
    fn test_amount_family() {
        for line in ["$1,234.56", "-45.00", "12.50 CR", "$ 9.99 DEBIT", "1234.56"] {
            assert!(matches_any(&AMOUNT_PATTERNS, line), "expected amount in {line:?}");
        }

        assert!(!matches_any(&AMOUNT_PATTERNS, "Page 1 of 3"));
        assert!(!matches_any(&AMOUNT_PATTERNS, "12.5"));
    }
}
