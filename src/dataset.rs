use std::path::Path;
use tracing::info;

use crate::config::DatasetConfig;
use crate::error::{CopyglotError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One source/reference pair from the evaluation table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRow {
    /// Zero-based data row (header excluded)
    pub index: usize,
    pub source_text: String,
    pub reference_text: String,
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<DatasetRow>,
}

impl Dataset {
    pub fn load<P: AsRef<Path>>(path: P, columns: &DatasetConfig) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            CopyglotError::Dataset(format!("Failed to read dataset {}: {}", path.display(), e))
        })?;

        let dataset = Self::from_bytes(&bytes, columns)?;
        info!("Loaded {} rows from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Parse CSV bytes, tolerating a UTF-8 byte-order mark
    pub fn from_bytes(bytes: &[u8], columns: &DatasetConfig) -> Result<Self> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers = reader.headers()?.clone();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| {
                    CopyglotError::Dataset(format!(
                        "Missing column '{}' (found: {})",
                        name,
                        headers.iter().collect::<Vec<_>>().join(", ")
                    ))
                })
        };
        let source_idx = find(&columns.source_column)?;
        let reference_idx = find(&columns.reference_column)?;

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            rows.push(DatasetRow {
                index,
                source_text: record.get(source_idx).unwrap_or_default().trim().to_string(),
                reference_text: record.get(reference_idx).unwrap_or_default().trim().to_string(),
            });
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn columns() -> DatasetConfig {
        Config::default().dataset
    }

    #[test]
    fn test_reads_named_columns_in_any_order() {
        let csv = "id,reference_text,original_text\n\
                   1,\"Üdvözöljük, [userName]!\",\"Welcome, [userName]!\"\n\
                   2,Díjak,Fees\n";
        let dataset = Dataset::from_bytes(csv.as_bytes(), &columns()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows()[0].source_text, "Welcome, [userName]!");
        assert_eq!(dataset.rows()[0].reference_text, "Üdvözöljük, [userName]!");
        assert_eq!(dataset.rows()[1].index, 1);
    }

    #[test]
    fn test_byte_order_mark_is_tolerated() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"original_text,reference_text\nHello,Szia\n");
        let dataset = Dataset::from_bytes(&bytes, &columns()).unwrap();

        assert_eq!(dataset.rows()[0].source_text, "Hello");
        assert_eq!(dataset.rows()[0].reference_text, "Szia");
    }

    #[test]
    fn test_missing_column_is_reported() {
        let err = Dataset::from_bytes(b"source,target\na,b\n", &columns()).unwrap_err();
        assert!(matches!(err, CopyglotError::Dataset(ref msg) if msg.contains("original_text")));
    }

    #[test]
    fn test_short_rows_keep_empty_cells() {
        let dataset = Dataset::from_bytes(b"original_text,reference_text\nHello\n", &columns()).unwrap();
        assert_eq!(dataset.rows()[0].reference_text, "");
    }

    #[test]
    fn test_missing_file() {
        let err = Dataset::load("/nonexistent/data.csv", &columns()).unwrap_err();
        assert!(matches!(err, CopyglotError::Dataset(_)));
    }
}
