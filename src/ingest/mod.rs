// Dataset loading: read a delimited file once and infer its column types.
pub mod csv;
pub mod schema;

use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("Dataset {0} has no columns")]
    NoColumns(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),
}

pub struct IngestManager {
    sample_size: usize,
}

impl IngestManager {
    pub fn new(sample_size: usize) -> Self {
        Self { sample_size }
    }

    /// Infers the schema of a `.csv` or `.tsv` file.
    pub fn load_schema(&self, path: &Path) -> Result<schema::TableSchema, IngestError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| IngestError::UnsupportedFileType("No extension".to_string()))?;

        let ingestor = csv::CsvIngestor::with_sample_size(self.sample_size);
        let table = match extension.to_lowercase().as_str() {
            "csv" => ingestor.infer_schema(path)?,
            "tsv" => ingestor.delimiter(b'\t').infer_schema(path)?,
            _ => return Err(IngestError::UnsupportedFileType(extension.to_string())),
        };

        info!(
            "Loaded dataset {} with {} columns",
            path.display(),
            table.columns.len()
        );

        Ok(table)
    }
}

impl Default for IngestManager {
    fn default() -> Self {
        Self::new(1000)
    }
}
