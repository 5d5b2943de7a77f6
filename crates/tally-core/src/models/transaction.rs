//! Statement transaction models shared by the extraction, merge and
//! duplicate-detection stages.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Expense categories understood by the extraction backends.
pub const EXPENSE_CATEGORIES: &[&str] = &[
    "food",
    "transportation",
    "housing",
    "utilities",
    "entertainment",
    "healthcare",
    "shopping",
    "education",
    "travel",
    "insurance",
    "personal",
    "subscriptions",
    "other",
];

/// Income categories understood by the extraction backends.
pub const INCOME_CATEGORIES: &[&str] = &[
    "salary",
    "freelance",
    "business",
    "investment",
    "rental",
    "gift",
    "refund",
    "other",
];

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// Category vocabulary for this direction.
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            TransactionType::Income => INCOME_CATEGORIES,
            TransactionType::Expense => EXPENSE_CATEGORIES,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

/// A candidate transaction produced by an extraction backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Calendar day of the transaction.
    #[serde(with = "calendar_day")]
    pub date: NaiveDate,

    /// Description as printed on the statement.
    pub description: String,

    /// Amount, always non-negative; direction is carried by `kind`.
    pub amount: Decimal,

    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// Category from the vocabulary of `kind`.
    pub category: String,

    /// Whether the transaction looks like a recurring charge or payment.
    #[serde(default)]
    pub is_recurring: bool,

    /// Normalized merchant name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
}

impl Transaction {
    /// Whether `category` belongs to the vocabulary of this transaction's type.
    pub fn has_known_category(&self) -> bool {
        let category = self.category.trim().to_lowercase();
        self.kind.categories().iter().any(|c| *c == category)
    }
}

/// Inclusive date range of a statement, as ISO `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    /// A range covering a single day.
    pub fn single(day: NaiveDate) -> Self {
        let day = day.format("%Y-%m-%d").to_string();
        Self {
            start: day.clone(),
            end: day,
        }
    }
}

/// Totals reported alongside a list of transactions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub transaction_count: usize,
    pub date_range: DateRange,
}

/// Structured extraction output for one segment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchResult {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    pub summary: BatchSummary,
}

impl BatchResult {
    /// Whether the reported count agrees with the transaction list.
    pub fn is_consistent(&self) -> bool {
        self.summary.transaction_count == self.transactions.len()
    }
}

/// Union of all batch results of one statement.
pub type MergedResult = BatchResult;

/// What the caller should do with a candidate transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestedAction {
    Import,
    Skip,
}

/// A candidate transaction annotated with the duplicate check outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub is_duplicate: bool,
    pub suggested_action: SuggestedAction,
}

impl AnnotatedTransaction {
    pub fn new(transaction: Transaction, is_duplicate: bool) -> Self {
        let suggested_action = if is_duplicate {
            SuggestedAction::Skip
        } else {
            SuggestedAction::Import
        };
        Self {
            transaction,
            is_duplicate,
            suggested_action,
        }
    }
}

/// An already persisted expense or income record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingRecord {
    #[serde(with = "calendar_day")]
    pub date: NaiveDate,

    pub amount: Decimal,

    /// Expense description or income source.
    #[serde(
        default,
        alias = "description",
        alias = "source",
        skip_serializing_if = "Option::is_none"
    )]
    pub label: Option<String>,
}

impl ExistingRecord {
    pub fn new(date: NaiveDate, amount: Decimal) -> Self {
        Self {
            date,
            amount,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// The user's existing records, split by direction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExistingRecords {
    pub expenses: Vec<ExistingRecord>,
    pub incomes: Vec<ExistingRecord>,
}

impl ExistingRecords {
    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty() && self.incomes.is_empty()
    }

    /// Load existing records from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Result of an import run, returned to the caller for review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub transactions: Vec<AnnotatedTransaction>,
    pub batches_processed: usize,
    pub summary: BatchSummary,
}

impl ImportPreview {
    /// Number of candidates flagged as duplicates.
    pub fn duplicate_count(&self) -> usize {
        self.transactions.iter().filter(|t| t.is_duplicate).count()
    }
}

/// Parse a date or timestamp string down to its calendar day.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive timestamps with a
/// `T` or space separator. The time of day is discarded.
pub fn parse_calendar_day(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

mod calendar_day {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_calendar_day(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid date: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_parse_calendar_day_variants() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_calendar_day("2024-03-05"), Some(day));
        assert_eq!(parse_calendar_day("2024-03-05T00:00:00"), Some(day));
        assert_eq!(parse_calendar_day("2024-03-05T23:59:59.999Z"), Some(day));
        assert_eq!(parse_calendar_day("2024-03-05 14:30:00"), Some(day));
        assert_eq!(parse_calendar_day("2024-03-05T10:00:00+05:00"), Some(day));
        assert_eq!(parse_calendar_day("03/05/2024"), None);
    }

    #[test]
    fn test_transaction_wire_format() {
        let json = r#"{
            "date": "2024-03-05T00:00:00",
            "description": "NETFLIX.COM",
            "amount": 15.49,
            "type": "expense",
            "category": "subscriptions",
            "isRecurring": true,
            "merchantName": "Netflix"
        }"#;

        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(txn.amount, Decimal::from_str("15.49").unwrap());
        assert_eq!(txn.kind, TransactionType::Expense);
        assert!(txn.is_recurring);
        assert!(txn.has_known_category());

        let value = serde_json::to_value(&txn).unwrap();
        assert_eq!(value["date"], "2024-03-05");
        assert_eq!(value["type"], "expense");
        assert_eq!(value["merchantName"], "Netflix");
    }

    #[test]
    fn test_category_vocabulary_depends_on_type() {
        let mut txn = Transaction {
            date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            description: "ACME PAYROLL".to_string(),
            amount: Decimal::new(250000, 2),
            kind: TransactionType::Income,
            category: "Salary".to_string(),
            is_recurring: true,
            merchant_name: None,
        };
        assert!(txn.has_known_category());

        txn.kind = TransactionType::Expense;
        assert!(!txn.has_known_category());
    }

    #[test]
    fn test_annotated_transaction_flattens() {
        let txn = Transaction {
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            description: "RENT".to_string(),
            amount: Decimal::new(120000, 2),
            kind: TransactionType::Expense,
            category: "housing".to_string(),
            is_recurring: true,
            merchant_name: None,
        };

        let annotated = AnnotatedTransaction::new(txn, true);
        assert_eq!(annotated.suggested_action, SuggestedAction::Skip);

        let value = serde_json::to_value(&annotated).unwrap();
        assert_eq!(value["description"], "RENT");
        assert_eq!(value["isDuplicate"], true);
        assert_eq!(value["suggestedAction"], "skip");
    }

    #[test]
    fn test_existing_records_accept_description_and_source() {
        let json = r#"{
            "expenses": [{"date": "2024-03-05T08:00:00Z", "amount": 42, "description": "Groceries"}],
            "incomes": [{"date": "2024-03-01", "amount": "3000.00", "source": "Employer"}]
        }"#;

        let records: ExistingRecords = serde_json::from_str(json).unwrap();
        assert_eq!(records.expenses[0].label.as_deref(), Some("Groceries"));
        assert_eq!(records.incomes[0].label.as_deref(), Some("Employer"));
        assert_eq!(records.incomes[0].amount, Decimal::new(300000, 2));
    }
}
