// ============================================================
// Layer 4 - Review Corpus
// ============================================================
// Column view over the cleaned records: the token strings the
// vectorizers read and the labels the trainer reads, kept in the
// same row order.

use crate::domain::review::{CleanedRecord, Sentiment};

#[derive(Debug, Clone, Default)]
pub struct ReviewCorpus {
    texts:  Vec<String>,
    labels: Vec<Sentiment>,
}

impl ReviewCorpus {
    pub fn from_records(records: &[CleanedRecord]) -> Self {
        let (texts, labels) = records
            .iter()
            .map(|r| (r.final_cleaned_text.clone(), r.sentiment))
            .unzip();
        Self { texts, labels }
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn labels(&self) -> &[Sentiment] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Rows per label, in Sentiment::ALL order
    pub fn class_counts(&self) -> [usize; Sentiment::COUNT] {
        let mut counts = [0; Sentiment::COUNT];
        for label in &self.labels {
            counts[label.index()] += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::review::RawRecord;

    fn record(text: &str, sentiment: Sentiment) -> CleanedRecord {
        let raw = RawRecord { review: text.to_uppercase(), sentiment };
        CleanedRecord::new(raw, text.to_string())
    }

    #[test]
    fn test_columns_keep_row_order() {
        let corpus = ReviewCorpus::from_records(&[
            record("good", Sentiment::Positive),
            record("bad", Sentiment::Negative),
            record("okay", Sentiment::Neutral),
        ]);
        assert_eq!(corpus.texts(), &["good", "bad", "okay"]);
        assert_eq!(
            corpus.labels(),
            &[Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral]
        );
        assert_eq!(corpus.len(), 3);
    }

    #[test]
    fn test_class_counts() {
        let corpus = ReviewCorpus::from_records(&[
            record("a", Sentiment::Positive),
            record("b", Sentiment::Positive),
            record("c", Sentiment::Negative),
        ]);
        assert_eq!(corpus.class_counts(), [1, 0, 2]);
    }
}
