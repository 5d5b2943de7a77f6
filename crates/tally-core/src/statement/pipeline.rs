//! Statement import pipeline: segment, extract each batch, merge, annotate.

use std::future::Future;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::aggregator::merge;
use super::dedup::Deduplicator;
use super::rules::{HeuristicClassifier, LineClassifier};
use super::segmenter::{Segment, Segmenter};
use crate::error::{Result, TallyError};
use crate::models::{BatchResult, ExistingRecords, ImportPreview, MergedResult, TallyConfig};

/// One extraction call.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRequest<'a> {
    /// Segment text, header included.
    pub text: &'a str,
    /// 1-based batch number.
    pub batch_number: usize,
    /// Total number of batches in this import.
    pub total_batches: usize,
    /// Existing records to watch for, sent with the first batch only.
    pub duplicate_hint: Option<&'a str>,
}

/// Turns one segment of statement text into structured transactions.
pub trait BatchExtractor {
    type Error: std::error::Error + Send + Sync + 'static;

    fn extract(
        &self,
        request: ExtractionRequest<'_>,
    ) -> impl Future<Output = std::result::Result<BatchResult, Self::Error>>;
}

impl<T: BatchExtractor> BatchExtractor for &T {
    type Error = T::Error;

    fn extract(
        &self,
        request: ExtractionRequest<'_>,
    ) -> impl Future<Output = std::result::Result<BatchResult, Self::Error>> {
        (**self).extract(request)
    }
}

/// Render existing records as a plain-text hint, most recent first.
///
/// Returns `None` when there is nothing to list or `limit` is zero.
pub fn duplicate_hint(existing: &ExistingRecords, limit: usize) -> Option<String> {
    if limit == 0 || existing.is_empty() {
        return None;
    }

    let mut records: Vec<_> = existing
        .expenses
        .iter()
        .map(|r| ("expense", r))
        .chain(existing.incomes.iter().map(|r| ("income", r)))
        .collect();
    records.sort_by(|a, b| b.1.date.cmp(&a.1.date));

    let lines: Vec<String> = records
        .into_iter()
        .take(limit)
        .map(|(kind, r)| match &r.label {
            Some(label) => format!("- {} {} {} {}", r.date, kind, r.amount, label),
            None => format!("- {} {} {}", r.date, kind, r.amount),
        })
        .collect();

    Some(format!(
        "The user already has these records (date, type, amount, description):\n{}",
        lines.join("\n")
    ))
}

/// Runs a full statement import against an extraction backend.
pub struct ImportPipeline<E, C = HeuristicClassifier> {
    extractor: E,
    segmenter: Segmenter<C>,
    concurrency: usize,
    hint_limit: usize,
}

impl<E: BatchExtractor> ImportPipeline<E> {
    /// Create a pipeline with default settings.
    pub fn new(extractor: E) -> Self {
        Self::from_config(extractor, &TallyConfig::default())
    }

    /// Create a pipeline from configuration.
    pub fn from_config(extractor: E, config: &TallyConfig) -> Self {
        Self {
            extractor,
            segmenter: Segmenter::new(config.segmenter.max_transactions_per_segment),
            concurrency: config.extraction.concurrency.max(1),
            hint_limit: config.dedup.hint_limit,
        }
    }
}

impl<E: BatchExtractor, C: LineClassifier> ImportPipeline<E, C> {
    /// Replace the segmenter.
    pub fn with_segmenter<C2: LineClassifier>(self, segmenter: Segmenter<C2>) -> ImportPipeline<E, C2> {
        ImportPipeline {
            extractor: self.extractor,
            segmenter,
            concurrency: self.concurrency,
            hint_limit: self.hint_limit,
        }
    }

    /// Set the number of batches extracted concurrently.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set how many existing records are listed in the duplicate hint.
    pub fn with_hint_limit(mut self, limit: usize) -> Self {
        self.hint_limit = limit;
        self
    }

    pub fn segmenter(&self) -> &Segmenter<C> {
        &self.segmenter
    }

    /// Import a statement and annotate the candidates against `existing`.
    pub async fn run(&self, text: &str, existing: &ExistingRecords) -> Result<ImportPreview> {
        self.run_with_progress(text, existing, |_, _| {}).await
    }

    /// Like [`run`](Self::run), calling `on_batch(done, total)` after each
    /// successful extraction.
    pub async fn run_with_progress<F>(
        &self,
        text: &str,
        existing: &ExistingRecords,
        on_batch: F,
    ) -> Result<ImportPreview>
    where
        F: FnMut(usize, usize),
    {
        if text.trim().is_empty() {
            return Err(TallyError::EmptyDocument);
        }

        let segments = self.segmenter.segment(text);
        info!(
            "Importing statement: {} characters in {} batches",
            text.len(),
            segments.len()
        );

        let hint = duplicate_hint(existing, self.hint_limit);
        let results = self.extract_all(&segments, hint.as_deref(), on_batch).await?;

        let MergedResult {
            transactions,
            summary,
        } = merge(results);

        for t in transactions.iter().filter(|t| !t.has_known_category()) {
            warn!(
                "Unknown {} category {:?} for {:?}",
                t.kind.as_str(),
                t.category,
                t.description
            );
        }

        let transactions = Deduplicator::new(existing).annotate(transactions);

        let preview = ImportPreview {
            transactions,
            batches_processed: segments.len(),
            summary,
        };
        info!(
            "Extracted {} transactions, {} flagged as duplicates",
            preview.transactions.len(),
            preview.duplicate_count()
        );

        Ok(preview)
    }

    /// Extract every segment, returning results in segment order.
    ///
    /// The first failing batch aborts the whole job.
    pub async fn extract_all<F>(
        &self,
        segments: &[Segment],
        hint: Option<&str>,
        mut on_batch: F,
    ) -> Result<Vec<BatchResult>>
    where
        F: FnMut(usize, usize),
    {
        let total = segments.len();

        if self.concurrency <= 1 || total <= 1 {
            let mut results = Vec::with_capacity(total);
            for (index, segment) in segments.iter().enumerate() {
                let result = self
                    .extract_one(segment, index, total, hint)
                    .await
                    .map_err(|e| batch_error(index, total, e))?;
                results.push(result);
                on_batch(index + 1, total);
            }
            return Ok(results);
        }

        debug!("Dispatching {} batches, {} at a time", total, self.concurrency);

        let mut slots: Vec<Option<BatchResult>> = (0..total).map(|_| None).collect();
        let mut pending = stream::iter(segments.iter().enumerate())
            .map(|(index, segment)| async move {
                (index, self.extract_one(segment, index, total, hint).await)
            })
            .buffer_unordered(self.concurrency);

        let mut done = 0;
        while let Some((index, result)) = pending.next().await {
            slots[index] = Some(result.map_err(|e| batch_error(index, total, e))?);
            done += 1;
            on_batch(done, total);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| TallyError::Batch {
                    batch: index + 1,
                    total,
                    source: "batch produced no result".into(),
                })
            })
            .collect()
    }

    async fn extract_one(
        &self,
        segment: &Segment,
        index: usize,
        total: usize,
        hint: Option<&str>,
    ) -> std::result::Result<BatchResult, E::Error> {
        let request = ExtractionRequest {
            text: &segment.text,
            batch_number: index + 1,
            total_batches: total,
            duplicate_hint: if index == 0 { hint } else { None },
        };
        debug!(
            "Extracting batch {}/{} ({} transaction lines)",
            request.batch_number, total, segment.transaction_lines
        );

        let result = self.extractor.extract(request).await?;
        debug!(
            "Batch {}/{} returned {} transactions",
            index + 1,
            total,
            result.transactions.len()
        );
        Ok(result)
    }
}

fn batch_error<E>(index: usize, total: usize, error: E) -> TallyError
where
    E: std::error::Error + Send + Sync + 'static,
{
    TallyError::Batch {
        batch: index + 1,
        total,
        source: Box::new(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BatchSummary, DateRange, ExistingRecord, SuggestedAction, Transaction, TransactionType,
    };
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, thiserror::Error)]
    #[error("backend unavailable")]
    struct Unavailable;

    /// Builds one transaction per statement line that starts with a date,
    /// recording every request it sees.
    #[derive(Default)]
    struct LineExtractor {
        fail_on: Option<usize>,
        /// Delay per batch, longest for the first batch.
        stagger: bool,
        seen: Mutex<Vec<(usize, usize, bool)>>,
        /// Batch numbers in completion order.
        finished: Mutex<Vec<usize>>,
    }

    impl BatchExtractor for LineExtractor {
        type Error = Unavailable;

        async fn extract(&self, request: ExtractionRequest<'_>) -> std::result::Result<BatchResult, Unavailable> {
            self.seen.lock().unwrap().push((
                request.batch_number,
                request.total_batches,
                request.duplicate_hint.is_some(),
            ));

            if self.stagger {
                let wait = 10 * (request.total_batches - request.batch_number) as u64;
                tokio::time::sleep(Duration::from_millis(wait)).await;
            }
            if self.fail_on == Some(request.batch_number) {
                return Err(Unavailable);
            }
            self.finished.lock().unwrap().push(request.batch_number);

            let transactions: Vec<Transaction> = request
                .text
                .lines()
                .filter_map(|line| {
                    let (date, rest) = line.split_once(' ')?;
                    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
                    let (description, amount) = rest.rsplit_once(' ')?;
                    Some(Transaction {
                        date,
                        description: description.trim().to_string(),
                        amount: amount.parse().ok()?,
                        kind: TransactionType::Expense,
                        category: "shopping".to_string(),
                        is_recurring: false,
                        merchant_name: None,
                    })
                })
                .collect();

            let total_expenses = transactions.iter().map(|t| t.amount).sum();
            let start = transactions.first().map(|t| t.date.to_string()).unwrap_or_default();
            let end = transactions.last().map(|t| t.date.to_string()).unwrap_or_default();

            Ok(BatchResult {
                summary: BatchSummary {
                    total_income: Decimal::ZERO,
                    total_expenses,
                    transaction_count: transactions.len(),
                    date_range: DateRange { start, end },
                },
                transactions,
            })
        }
    }

    fn statement(count: usize) -> String {
        let mut lines = vec!["FIRST NATIONAL BANK".to_string(), "Account ****1234".to_string()];
        for i in 0..count {
            let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64);
            lines.push(format!("{} MERCHANT NUMBER {:03} {}.00", day, i, i + 1));
        }
        lines.join("\n")
    }

    #[tokio::test]
    async fn test_forty_five_transactions_in_two_batches() {
        let extractor = LineExtractor::default();
        let pipeline = ImportPipeline::new(&extractor);

        let preview = pipeline
            .run(&statement(45), &ExistingRecords::default())
            .await
            .unwrap();

        assert_eq!(preview.batches_processed, 2);
        assert_eq!(preview.transactions.len(), 45);
        assert_eq!(preview.summary.transaction_count, 45);
        assert_eq!(preview.summary.date_range.start, "2024-01-01");
        assert_eq!(preview.summary.date_range.end, "2024-02-14");
        // 1 + 2 + ... + 45
        assert_eq!(preview.summary.total_expenses, Decimal::from(1035));

        let seen = extractor.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![(1, 2, false), (2, 2, false)]);
    }

    #[tokio::test]
    async fn test_hint_sent_with_first_batch_only() {
        let extractor = LineExtractor::default();
        let pipeline = ImportPipeline::new(&extractor);
        let existing = ExistingRecords {
            expenses: vec![ExistingRecord::new(
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                Decimal::from(3),
            )],
            incomes: Vec::new(),
        };

        let preview = pipeline.run(&statement(61), &existing).await.unwrap();

        let seen = extractor.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![(1, 3, true), (2, 3, false), (3, 3, false)]);

        let flagged: Vec<&str> = preview
            .transactions
            .iter()
            .filter(|t| t.suggested_action == SuggestedAction::Skip)
            .map(|t| t.transaction.description.as_str())
            .collect();
        assert_eq!(flagged, vec!["MERCHANT NUMBER 002"]);
    }

    #[tokio::test]
    async fn test_zero_hint_limit_sends_no_hint() {
        let extractor = LineExtractor::default();
        let pipeline = ImportPipeline::new(&extractor)
            .with_segmenter(Segmenter::new(20))
            .with_hint_limit(0);
        assert_eq!(pipeline.segmenter().max_transactions(), 20);

        let existing = ExistingRecords {
            expenses: vec![ExistingRecord::new(
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                Decimal::from(3),
            )],
            incomes: Vec::new(),
        };

        let preview = pipeline.run(&statement(30), &existing).await.unwrap();

        let seen = extractor.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![(1, 2, false), (2, 2, false)]);
        // duplicates are still flagged without a hint
        assert_eq!(preview.duplicate_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_results_merged_in_segment_order() {
        let extractor = LineExtractor {
            stagger: true,
            ..Default::default()
        };
        let text = statement(50);
        let pipeline = ImportPipeline::new(&extractor)
            .with_segmenter(Segmenter::new(10))
            .with_concurrency(5);

        let mut progress = Vec::new();
        let preview = pipeline
            .run_with_progress(&text, &ExistingRecords::default(), |done, total| {
                progress.push((done, total))
            })
            .await
            .unwrap();

        let descriptions: Vec<String> = preview
            .transactions
            .iter()
            .map(|t| t.transaction.description.clone())
            .collect();
        let expected: Vec<String> = (0..50).map(|i| format!("MERCHANT NUMBER {:03}", i)).collect();
        assert_eq!(descriptions, expected);
        assert_eq!(progress.last(), Some(&(5, 5)));

        assert_eq!(extractor.seen.lock().unwrap().len(), 5);

        // Later batches finished first.
        let finished = extractor.finished.lock().unwrap().clone();
        assert_eq!(finished.len(), 5);
        assert_eq!(finished.first(), Some(&5));
        assert!(finished.windows(2).any(|w| w[0] > w[1]));
    }

    #[tokio::test]
    async fn test_failed_batch_aborts_import() {
        for concurrency in [1, 3] {
            let extractor = LineExtractor {
                fail_on: Some(2),
                ..Default::default()
            };
            let pipeline = ImportPipeline::new(&extractor)
                .with_segmenter(Segmenter::new(10))
                .with_concurrency(concurrency);

            let err = pipeline
                .run(&statement(30), &ExistingRecords::default())
                .await
                .unwrap_err();

            match err {
                TallyError::Batch { batch, total, .. } => {
                    assert_eq!((batch, total), (2, 3));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[tokio::test]
    async fn test_empty_document_rejected() {
        let pipeline = ImportPipeline::new(LineExtractor::default());
        let err = pipeline
            .run(" \n\t\n", &ExistingRecords::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TallyError::EmptyDocument));
    }

    #[test]
    fn test_duplicate_hint_lists_recent_records_first() {
        let existing = ExistingRecords {
            expenses: vec![
                ExistingRecord::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), Decimal::new(1250, 2))
                    .with_label("Lunch"),
                ExistingRecord::new(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(), Decimal::new(999, 2)),
            ],
            incomes: vec![ExistingRecord::new(
                NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
                Decimal::from(3000),
            )
            .with_label("Employer")],
        };

        let hint = duplicate_hint(&existing, 2).unwrap();
        let lines: Vec<&str> = hint.lines().skip(1).collect();
        assert_eq!(
            lines,
            vec!["- 2024-03-09 expense 9.99", "- 2024-03-05 income 3000 Employer"]
        );

        assert!(duplicate_hint(&existing, 0).is_none());
        assert!(duplicate_hint(&ExistingRecords::default(), 10).is_none());
    }
}
