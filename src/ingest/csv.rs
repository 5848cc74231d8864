use std::fs::File;
use std::io::Read;
use std::path::Path;
use csv::ReaderBuilder;
use tracing::debug;
use crate::ingest::IngestError;
use crate::ingest::schema::{ColumnSchema, DataType, TableSchema};

pub struct CsvIngestor {
    sample_size: usize,
    delimiter: u8,
}

impl CsvIngestor {
    pub fn new() -> Self {
        Self {
            sample_size: 1000, // Default sample size for schema inference
            delimiter: b',',
        }
    }

    pub fn with_sample_size(sample_size: usize) -> Self {
        Self {
            sample_size,
            ..Self::new()
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Infers a table schema from the header and the first `sample_size` records.
    pub fn infer_schema(&self, path: &Path) -> Result<TableSchema, IngestError> {
        let file = File::open(path)?;

        // Table name comes from the file name without extension
        let file_stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("data")
            .to_string();

        self.infer_schema_from_reader(&file_stem, file)
    }

    pub fn infer_schema_from_reader<R: Read>(
        &self,
        table_name: &str,
        source: R,
    ) -> Result<TableSchema, IngestError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .from_reader(source);

        let headers = reader.headers()?.clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(IngestError::NoColumns(table_name.to_string()));
        }

        let mut observed: Vec<Option<DataType>> = vec![None; headers.len()];
        let mut nullable = vec![false; headers.len()];
        let mut sampled = 0usize;

        for record in reader.records().take(self.sample_size) {
            let record = record?;
            sampled += 1;

            for (i, value) in record.iter().enumerate() {
                let value = value.trim();
                if DataType::is_missing(value) {
                    nullable[i] = true;
                    continue;
                }

                let data_type = DataType::infer(value);
                observed[i] = Some(match observed[i] {
                    Some(current) => current.widen(data_type),
                    None => data_type,
                });
            }
        }

        debug!("Inferred types for {} from {} sampled rows", table_name, sampled);

        let columns = headers
            .iter()
            .zip(observed)
            .zip(nullable)
            .map(|((name, data_type), nullable)| ColumnSchema {
                name: name.trim().to_string(),
                // columns with no sampled value carry no type evidence
                data_type: data_type.unwrap_or(DataType::Text),
                nullable: nullable || data_type.is_none(),
            })
            .collect();

        Ok(TableSchema {
            name: table_name.to_string(),
            columns,
        })
    }
}

impl Default for CsvIngestor {
    fn default() -> Self {
        Self::new()
    }
}
