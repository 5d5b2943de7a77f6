//! Splitting statement text into batches of whole transaction lines.

use serde::Serialize;
use tracing::debug;

use super::rules::{HeuristicClassifier, LineClassifier};

/// One self-contained slice of statement text sent to the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Full text of the segment, header included.
    pub text: String,
    /// 1-based position of this segment.
    pub batch_number: usize,
    /// Number of segments produced from the document.
    pub total_batches: usize,
    /// Number of leading lines that repeat the document header.
    pub header_lines: usize,
    /// Number of transaction lines in this segment.
    pub transaction_lines: usize,
}

/// Statement segmenter, generic over the line classification strategy.
#[derive(Debug, Clone)]
pub struct Segmenter<C = HeuristicClassifier> {
    classifier: C,
    max_transactions: usize,
}

impl Segmenter<HeuristicClassifier> {
    /// Create a segmenter with the default heuristic classifier.
    pub fn new(max_transactions: usize) -> Self {
        Self::with_classifier(HeuristicClassifier::new(), max_transactions)
    }
}

impl<C: LineClassifier> Segmenter<C> {
    /// Create a segmenter with a custom classifier.
    ///
    /// A budget of zero is treated as one.
    pub fn with_classifier(classifier: C, max_transactions: usize) -> Self {
        Self {
            classifier,
            max_transactions: max_transactions.max(1),
        }
    }

    pub fn max_transactions(&self) -> usize {
        self.max_transactions
    }

    /// Split `text` into segments of at most `max_transactions` transaction
    /// lines each, repeating the header at the top of every segment.
    ///
    /// Empty input yields no segments.
    pub fn segment(&self, text: &str) -> Vec<Segment> {
        if text.is_empty() {
            return Vec::new();
        }

        let lines: Vec<&str> = text.split('\n').collect();
        let is_txn: Vec<bool> = lines
            .iter()
            .map(|l| self.classifier.is_transaction_line(l))
            .collect();

        let header: &[&str] = match is_txn.iter().position(|&t| t) {
            Some(first) => &lines[..first],
            None => &[],
        };

        // (lines, transaction count)
        let mut closed: Vec<(Vec<&str>, usize)> = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut count = 0usize;

        for (line, &txn) in lines.iter().zip(&is_txn) {
            if txn {
                count += 1;
                if count > self.max_transactions && !current.is_empty() {
                    closed.push((std::mem::replace(&mut current, header.to_vec()), count - 1));
                    count = 1;
                }
            }
            current.push(*line);
        }

        if current.len() > header.len() {
            closed.push((current, count));
        }

        if closed.is_empty() {
            closed.push((lines.clone(), 0));
        }

        let total = closed.len();
        debug!(
            "Segmented {} lines ({} header) into {} segments",
            lines.len(),
            header.len(),
            total
        );

        closed
            .into_iter()
            .enumerate()
            .map(|(i, (seg_lines, transaction_lines))| Segment {
                text: seg_lines.join("\n"),
                batch_number: i + 1,
                total_batches: total,
                header_lines: if i == 0 { 0 } else { header.len() },
                transaction_lines,
            })
            .collect()
    }
}

/// Split `text` with the default classifier and return the segment texts.
pub fn segment_text(text: &str, max_transactions: usize) -> Vec<String> {
    Segmenter::new(max_transactions)
        .segment(text)
        .into_iter()
        .map(|s| s.text)
        .collect()
}
