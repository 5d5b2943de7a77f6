//! Rule-based classification of statement text lines.

pub mod patterns;

pub use patterns::{matches_any, AMOUNT_PATTERNS, DATE_PATTERNS};

/// Minimum length (exclusive) for a line with an amount but no date.
pub const AMOUNT_ONLY_MIN_LEN: usize = 20;

/// Minimum length (exclusive) for a line with a date but no amount.
pub const DATE_ONLY_MIN_LEN: usize = 15;

/// Trait for deciding whether a line of statement text is a transaction row.
pub trait LineClassifier {
    /// Returns `true` if `line` should be counted as a transaction line.
    fn is_transaction_line(&self, line: &str) -> bool;
}

impl<F> LineClassifier for F
where
    F: Fn(&str) -> bool,
{
    fn is_transaction_line(&self, line: &str) -> bool {
        self(line)
    }
}

/// Date/amount heuristic used for ordinary bank and card statements.
///
/// A line is a transaction line when it carries both a date and an amount,
/// an amount and more than 20 characters, or a date and more than 15
/// characters. Long descriptive lines are over-counted on purpose.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl LineClassifier for HeuristicClassifier {
    fn is_transaction_line(&self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return false;
        }

        let has_date = matches_any(&DATE_PATTERNS, line);
        let has_amount = matches_any(&AMOUNT_PATTERNS, line);
        let len = line.chars().count();

        (has_date && has_amount)
            || (has_amount && len > AMOUNT_ONLY_MIN_LEN)
            || (has_date && len > DATE_ONLY_MIN_LEN)
    }
}
