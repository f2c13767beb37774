// ============================================================
// Layer 4 - Text Preprocessor
// ============================================================
// Turns raw review text into the canonical token string every
// vectorizer consumes.
//
// Cleaning steps (applied in order):
//   1. Replace every character outside [A-Za-z0-9] with a space
//   2. Lowercase and trim
//   3. Split on whitespace
//   4. Drop English stopwords
//   5. Lemmatize each remaining token (noun base form)
//   6. Re-join with single spaces
//
// Two entry points use the same `clean`:
//   - bulk_preprocess:   whole RawTable, drops incomplete and
//                        duplicate rows first (training path)
//   - preprocess_single: one string, no table types involved
//                        (inference path)
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

use std::collections::HashSet;

use crate::data::lemmatizer::Lemmatizer;
use crate::data::stopwords;
use crate::domain::error::SentimentError;
use crate::domain::review::{CleanedRecord, RawRecord, Sentiment};
use crate::domain::table::RawTable;

/// Which table columns hold the review text and the label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub review: String,
    pub label:  String,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            review: "Product Review".to_string(),
            label:  "Sentiment".to_string(),
        }
    }
}

pub struct Preprocessor {
    stopwords:  HashSet<&'static str>,
    lemmatizer: Lemmatizer,
}

impl Preprocessor {
    /// Create a Preprocessor with the English stopword list
    pub fn new() -> Self {
        Self {
            stopwords:  stopwords::english(),
            lemmatizer: Lemmatizer::new(),
        }
    }

    /// Normalise one review into a whitespace-joined token string.
    /// Returns "" when no token survives.
    pub fn clean(&self, text: &str) -> String {
        let ascii_only: String = text
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
            .collect();

        let lowered = ascii_only.to_lowercase();

        lowered
            .split_whitespace()
            .filter(|w| !self.stopwords.contains(*w))
            .map(|w| self.lemmatizer.lemmatize(w))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Training-time preprocessing of a whole table.
    ///
    /// Drops every row with a missing cell in any column, then exact
    /// duplicate rows (first occurrence wins), then derives
    /// `final_cleaned_text` for the survivors in input order.
    pub fn bulk_preprocess(
        &self,
        table:   &RawTable,
        columns: &ColumnSpec,
    ) -> Result<Vec<CleanedRecord>, SentimentError> {
        let review_idx = require_column(table, &columns.review)?;
        let label_idx  = require_column(table, &columns.label)?;

        // ── Step 1: drop rows with any missing cell ───────────────────────────
        let complete: Vec<(usize, Vec<&str>)> = table
            .rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                let cells: Option<Vec<&str>> = row.iter().map(|c| c.as_deref()).collect();
                cells.filter(|c| c.len() == table.columns.len()).map(|c| (i, c))
            })
            .collect();
        let missing = table.rows.len() - complete.len();

        // ── Step 2: drop exact duplicate rows, keep the first ─────────────────
        let mut seen   = HashSet::new();
        let unique: Vec<(usize, Vec<&str>)> = complete
            .into_iter()
            .filter(|(_, cells)| seen.insert(cells.clone()))
            .collect();
        let duplicates = table.rows.len() - missing - unique.len();

        tracing::info!(
            "Preprocessing: {} rows in, {} with missing values, {} duplicates, {} kept",
            table.rows.len(),
            missing,
            duplicates,
            unique.len()
        );

        // ── Step 3: parse labels and clean text ───────────────────────────────
        unique
            .into_iter()
            .map(|(row_no, cells)| {
                let sentiment: Sentiment = cells[label_idx].parse().map_err(|e| {
                    // +2: one for the header line, one for 1-based numbering
                    SentimentError::Input(format!("row {}: {e}", row_no + 2))
                })?;
                let raw = RawRecord {
                    review: cells[review_idx].to_string(),
                    sentiment,
                };
                let cleaned = self.clean(&raw.review);
                Ok(CleanedRecord::new(raw, cleaned))
            })
            .collect()
    }

    /// Inference-time preprocessing of one review.
    /// Blank input short-circuits to "" without running `clean`.
    pub fn preprocess_single(&self, text: &str) -> String {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return String::new();
        }
        self.clean(trimmed)
    }

    /// Same as `preprocess_single` for callers holding untyped JSON.
    /// Anything other than a JSON string is rejected.
    pub fn preprocess_value(&self, value: &serde_json::Value) -> Result<String, SentimentError> {
        match value.as_str() {
            Some(text) => Ok(self.preprocess_single(text)),
            None => Err(SentimentError::InvalidInput(format!(
                "single-text preprocessing expects a string, got {}",
                json_type_name(value)
            ))),
        }
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

fn require_column(table: &RawTable, name: &str) -> Result<usize, SentimentError> {
    table.column_index(name).ok_or_else(|| {
        SentimentError::Input(format!(
            "required column '{name}' not found; columns are {:?}",
            table.columns()
        ))
    })
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
