use crate::evaluation::EvaluationError;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One reference pair; other columns in the file are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroundTruth {
    pub question: String,
    pub answer: String,
}

pub fn load_ground_truth(path: &Path) -> Result<Vec<GroundTruth>, EvaluationError> {
    let file = File::open(path)?;
    read_ground_truth(file)
}

/// Reads every row up front; a single malformed row fails the whole load.
pub fn read_ground_truth<R: Read>(source: R) -> Result<Vec<GroundTruth>, EvaluationError> {
    let mut reader = csv::Reader::from_reader(source);
    reader
        .deserialize()
        .collect::<Result<Vec<GroundTruth>, _>>()
        .map_err(EvaluationError::GroundTruth)
}
