use crate::evaluation::{EvaluationError, EvaluationRecord};
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

pub const RESULT_COLUMNS: [&str; 4] = ["question", "ground_truth", "generated_sql", "result"];

pub fn print_case<W: Write>(out: &mut W, number: usize, record: &EvaluationRecord) -> io::Result<()> {
    writeln!(out, "Test Case {}:", number)?;
    writeln!(out, "Question: {}", record.question)?;
    writeln!(out, "Ground Truth SQL: {}", record.ground_truth)?;
    writeln!(out, "Generated SQL: {}", record.generated_sql)?;
    writeln!(out, "Result: {}", record.result)?;
    writeln!(out, "{}", "-".repeat(50))
}

pub fn write_results(path: &Path, records: &[EvaluationRecord]) -> Result<(), EvaluationError> {
    let file = std::fs::File::create(path)?;
    write_results_to(file, records)?;

    info!("Wrote {} evaluation records to {}", records.len(), path.display());
    Ok(())
}

/// Header is written even when there are no records.
pub fn write_results_to<W: Write>(sink: W, records: &[EvaluationRecord]) -> Result<(), EvaluationError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(sink);

    writer
        .write_record(RESULT_COLUMNS)
        .map_err(EvaluationError::Results)?;
    for record in records {
        writer.serialize(record).map_err(EvaluationError::Results)?;
    }
    writer.flush()?;

    Ok(())
}
