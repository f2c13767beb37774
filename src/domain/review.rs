// ============================================================
// Layer 3 - Review Domain Types
// ============================================================
// A review moves through two shapes:
//
//   RawRecord      review text + sentiment label, straight
//                  from a complete, de-duplicated table row
//   CleanedRecord  the same plus `final_cleaned_text`, the
//                  normalised token string every vectorizer
//                  consumes
//
// Sentiment is a closed three-valued label. The source data
// encodes it as 0 / 1 / 2, which is also the class index the
// classifiers are trained on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    /// Number of distinct classes
    pub const COUNT: usize = 3;

    pub const ALL: [Sentiment; 3] = [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    /// Class index used by the classifiers (0, 1, 2)
    pub fn index(self) -> usize {
        match self {
            Sentiment::Negative => 0,
            Sentiment::Neutral => 1,
            Sentiment::Positive => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Positive => "Positive",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the integer encoding ("2"), integral floats as written by
/// spreadsheet exports ("2.0") and the label names in any case.
impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if let Ok(n) = raw.parse::<i64>() {
            return usize::try_from(n)
                .ok()
                .and_then(Sentiment::from_index)
                .ok_or_else(|| format!("sentiment label {n} is outside 0..=2"));
        }
        if let Ok(f) = raw.parse::<f64>() {
            if f.fract() == 0.0 && (0.0..=2.0).contains(&f) {
                return Ok(Sentiment::ALL[f as usize]);
            }
            return Err(format!("sentiment label {raw} is not one of 0, 1, 2"));
        }
        match raw.to_ascii_lowercase().as_str() {
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            "positive" => Ok(Sentiment::Positive),
            _ => Err(format!("unrecognised sentiment label '{raw}'")),
        }
    }
}

/// One complete input row reduced to the two fields the pipeline reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub review:    String,
    pub sentiment: Sentiment,
}

/// A RawRecord with its derived, normalised text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub review:             String,
    pub sentiment:          Sentiment,
    pub final_cleaned_text: String,
}

impl CleanedRecord {
    pub fn new(raw: RawRecord, final_cleaned_text: String) -> Self {
        Self {
            review:    raw.review,
            sentiment: raw.sentiment,
            final_cleaned_text,
        }
    }
}
