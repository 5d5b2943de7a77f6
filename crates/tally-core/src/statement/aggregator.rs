//! Merging per-batch extraction results into one statement result.

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::models::{BatchResult, BatchSummary, DateRange, MergedResult};

/// Merge batch results, using today's local date for an empty input.
pub fn merge<I>(results: I) -> MergedResult
where
    I: IntoIterator<Item = BatchResult>,
{
    merge_on(results, Local::now().date_naive())
}

/// Merge batch results in order.
///
/// Transactions are concatenated in batch order, income and expense totals
/// are summed from the batch summaries, the transaction count is taken from
/// the merged list and the date range spans the earliest start and latest
/// end. With no batches the result is empty and the range is `today`.
pub fn merge_on<I>(results: I, today: NaiveDate) -> MergedResult
where
    I: IntoIterator<Item = BatchResult>,
{
    let mut transactions = Vec::new();
    let mut total_income = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;
    let mut start: Option<String> = None;
    let mut end: Option<String> = None;
    let mut batches = 0usize;

    for (index, result) in results.into_iter().enumerate() {
        batches += 1;

        if !result.is_consistent() {
            warn!(
                "Batch {} reports {} transactions but returned {}",
                index + 1,
                result.summary.transaction_count,
                result.transactions.len()
            );
        }

        let BatchResult {
            transactions: batch_transactions,
            summary,
        } = result;

        transactions.extend(batch_transactions);
        total_income += summary.total_income;
        total_expenses += summary.total_expenses;

        let DateRange {
            start: batch_start,
            end: batch_end,
        } = summary.date_range;

        start = Some(match start {
            Some(s) if s <= batch_start => s,
            _ => batch_start,
        });
        end = Some(match end {
            Some(e) if e >= batch_end => e,
            _ => batch_end,
        });
    }

    let date_range = match (start, end) {
        (Some(start), Some(end)) => DateRange { start, end },
        _ => DateRange::single(today),
    };

    debug!(
        "Merged {} batches into {} transactions ({} to {})",
        batches,
        transactions.len(),
        date_range.start,
        date_range.end
    );

    MergedResult {
        summary: BatchSummary {
            total_income,
            total_expenses,
            transaction_count: transactions.len(),
            date_range,
        },
        transactions,
    }
}
