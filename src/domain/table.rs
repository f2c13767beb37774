// ============================================================
// Layer 3 - RawTable Domain Type
// ============================================================
// The ingested dataset before any cleaning. Every cell is kept as
// text; an empty field in the source file becomes `None` so the
// preprocessor can drop incomplete rows the same way for every
// column, not just the two it reads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    /// Header names in file order
    pub columns: Vec<String>,

    /// Data rows; every row has exactly `columns.len()` cells
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    /// (row count, column count)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column by exact header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_shape_and_lookup() {
        let table = RawTable::new(
            vec!["Product Review".into(), "Sentiment".into()],
            vec![vec![cell("good"), cell("2")], vec![cell("bad"), None]],
        );
        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.column_index("Sentiment"), Some(1));
        assert_eq!(table.column_index("sentiment"), None);
        assert!(!table.is_empty());
    }
}
