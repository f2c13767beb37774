// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// This layer handles everything from the raw review file to the
// cleaned, label-aligned corpus the vectorizers consume.
//
// The pipeline flows in this order:
//
//   reviews.csv
//       │
//       ▼
//   CsvLoader         → reads the file into a RawTable
//       │
//       ▼
//   Preprocessor      → drops incomplete/duplicate rows, cleans text
//       │                (stopwords + lemmatizer)
//       ▼
//   ReviewCorpus      → texts and labels in row order
//       │
//       ▼
//   split_train_test  → seeded train/test indices for the trainer
//
// Each module is responsible for exactly one step.
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Reads the delimited review file using the csv crate
pub mod loader;

/// Cleans review text for training and inference
pub mod preprocessor;

/// WordNet-style noun lemmatizer
pub mod lemmatizer;

/// English stopword list
pub mod stopwords;

/// Texts and labels of the cleaned records
pub mod dataset;

/// Seeded train/test index split
pub mod splitter;
