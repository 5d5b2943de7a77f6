//! Duplicate detection against already persisted records.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{AnnotatedTransaction, ExistingRecord, ExistingRecords, Transaction, TransactionType};

/// Flags candidates that match an existing record of the same type on the
/// same calendar day with exactly the same amount.
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    expenses: HashMap<NaiveDate, Vec<Decimal>>,
    incomes: HashMap<NaiveDate, Vec<Decimal>>,
}

impl Deduplicator {
    pub fn new(existing: &ExistingRecords) -> Self {
        Self::from_records(&existing.expenses, &existing.incomes)
    }

    pub fn from_records(expenses: &[ExistingRecord], incomes: &[ExistingRecord]) -> Self {
        Self {
            expenses: index_by_day(expenses),
            incomes: index_by_day(incomes),
        }
    }

    /// Whether `candidate` matches an existing record.
    pub fn is_duplicate(&self, candidate: &Transaction) -> bool {
        let index = match candidate.kind {
            TransactionType::Expense => &self.expenses,
            TransactionType::Income => &self.incomes,
        };

        index
            .get(&candidate.date)
            .is_some_and(|amounts| amounts.iter().any(|a| *a == candidate.amount))
    }

    /// Annotate candidates in order. Candidates are not compared with each other.
    pub fn annotate(&self, candidates: Vec<Transaction>) -> Vec<AnnotatedTransaction> {
        let annotated: Vec<AnnotatedTransaction> = candidates
            .into_iter()
            .map(|t| {
                let duplicate = self.is_duplicate(&t);
                AnnotatedTransaction::new(t, duplicate)
            })
            .collect();

        debug!(
            "Duplicate check: {} of {} candidates flagged",
            annotated.iter().filter(|a| a.is_duplicate).count(),
            annotated.len()
        );

        annotated
    }
}

fn index_by_day(records: &[ExistingRecord]) -> HashMap<NaiveDate, Vec<Decimal>> {
    let mut index: HashMap<NaiveDate, Vec<Decimal>> = HashMap::new();
    for record in records {
        index.entry(record.date).or_default().push(record.amount);
    }
    index
}

/// Annotate `candidates` against existing expense and income records.
pub fn annotate(
    candidates: Vec<Transaction>,
    existing_expenses: &[ExistingRecord],
    existing_incomes: &[ExistingRecord],
) -> Vec<AnnotatedTransaction> {
    Deduplicator::from_records(existing_expenses, existing_incomes).annotate(candidates)
}
