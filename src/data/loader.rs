// ============================================================
// Layer 4 - Dataset Loader
// ============================================================
// Loads the review dataset from a comma-separated file using the
// csv crate.
//
// File expectations:
//   - first line is a header row
//   - any number of columns; the preprocessor later picks the
//     review and label columns by name
//   - an empty field, or one of the usual "not available"
//     markers (NA, N/A, NaN, null, None, ...), is a missing value
//   - rows shorter than the header are padded with missing
//     values instead of being rejected
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::domain::table::RawTable;
use crate::domain::traits::DatasetSource;

/// Field values read as missing, matched exactly.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(field: &str) -> bool {
    MISSING_MARKERS.contains(&field)
}

/// Loads a delimited review file into a RawTable.
/// Implements the DatasetSource trait from Layer 3.
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    /// Comma-delimited loader for `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DatasetSource for CsvLoader {
    fn load(&self) -> Result<RawTable> {
        tracing::info!("Fetching data from '{}'", self.path.display());

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .with_context(|| format!("Cannot open dataset '{}'", self.path.display()))?;

        let columns: Vec<String> = reader
            .headers()
            .with_context(|| format!("Cannot read header row of '{}'", self.path.display()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if columns.iter().all(|c| c.is_empty()) {
            anyhow::bail!("Dataset '{}' has no header row", self.path.display());
        }

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.with_context(|| {
                format!("Malformed record {} in '{}'", i + 1, self.path.display())
            })?;

            let mut row: Vec<Option<String>> = record
                .iter()
                .take(columns.len())
                .map(|field| (!is_missing(field)).then(|| field.to_string()))
                .collect();
            row.resize(columns.len(), None);
            rows.push(row);
        }

        let table = RawTable::new(columns, rows);
        let (n_rows, n_cols) = table.shape();
        tracing::info!("Shape: ({n_rows}, {n_cols})");
        tracing::info!("Columns: {:?}", table.columns());

        Ok(table)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_loads_header_and_rows() {
        let f = write_csv("Product Review,Sentiment\n\"Great, really\",2\nAwful,0\n");
        let table = CsvLoader::new(f.path()).load().unwrap();
        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.columns(), &["Product Review".to_string(), "Sentiment".to_string()]);
        assert_eq!(table.rows[0][0].as_deref(), Some("Great, really"));
    }

    #[test]
    fn test_empty_fields_and_short_rows_are_missing() {
        let f = write_csv("Product Review,Sentiment,Source\nfine,,web\nshort\n");
        let table = CsvLoader::new(f.path()).load().unwrap();
        assert_eq!(table.rows[0], vec![Some("fine".to_string()), None, Some("web".to_string())]);
        assert_eq!(table.rows[1], vec![Some("short".to_string()), None, None]);
    }

    #[test]
    fn test_not_available_markers_are_missing() {
        let f = write_csv("Product Review,Sentiment\nsome review,NA\nnull,1\nfine,N/A\nNAN here,nan\nok,2\n");
        let table = CsvLoader::new(f.path()).load().unwrap();
        assert_eq!(table.rows[0][1], None);
        assert_eq!(table.rows[1][0], None);
        assert_eq!(table.rows[2][1], None);
        // Only whole fields match
        assert_eq!(table.rows[3], vec![Some("NAN here".to_string()), None]);
        assert_eq!(table.rows[4][1].as_deref(), Some("2"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = CsvLoader::new("/definitely/not/here.csv").load().unwrap_err();
        assert!(err.to_string().contains("Cannot open dataset"));
    }
}
