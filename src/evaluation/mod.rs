pub mod ground_truth;
pub mod metric;
pub mod report;

use crate::llm::LlmError;
use crate::translator::SqlTranslator;
use ground_truth::GroundTruth;
use metric::RelevanceMetric;
use serde::{Serialize, Serializer};
use std::fmt;
use std::io::Write;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Failed to read ground truth: {0}")]
    GroundTruth(csv::Error),

    #[error("Failed to write results: {0}")]
    Results(csv::Error),

    #[error("Unusable judge reply: {0}")]
    Judge(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub input: String,
    pub actual_output: String,
    pub expected_output: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(String),
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => f.write_str("PASS"),
            Verdict::Fail(detail) => write!(f, "FAIL: {}", detail),
        }
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRecord {
    pub question: String,
    pub ground_truth: String,
    pub generated_sql: String,
    pub result: Verdict,
}

/// Measures `case` with every metric; any metric under its threshold makes the
/// case fail. Metric errors are not failures and are returned as errors.
pub async fn assert_test(
    case: &TestCase,
    metrics: &[Box<dyn RelevanceMetric>],
) -> Result<Verdict, EvaluationError> {
    let mut failures = Vec::new();

    for metric in metrics {
        let outcome = metric.measure(case).await?;
        debug!("{}", outcome);
        if !outcome.passed() {
            failures.push(outcome.to_string());
        }
    }

    if failures.is_empty() {
        Ok(Verdict::Pass)
    } else {
        Ok(Verdict::Fail(failures.join("; ")))
    }
}

pub struct QueryEvaluator {
    translator: SqlTranslator,
    metrics: Vec<Box<dyn RelevanceMetric>>,
}

impl QueryEvaluator {
    pub fn new(translator: SqlTranslator, metrics: Vec<Box<dyn RelevanceMetric>>) -> Self {
        Self {
            translator,
            metrics,
        }
    }

    /// Runs the cases one after another in input order, printing a report
    /// for each to `out`.
    pub async fn evaluate_queries<W: Write>(
        &self,
        cases: &[GroundTruth],
        out: &mut W,
    ) -> Result<Vec<EvaluationRecord>, EvaluationError> {
        let mut evaluation_results = Vec::with_capacity(cases.len());

        for (idx, row) in cases.iter().enumerate() {
            let generated_sql = self.translator.generate_sql(&row.question).await?;

            let test_case = TestCase {
                input: row.question.clone(),
                actual_output: generated_sql.clone(),
                expected_output: row.answer.clone(),
            };
            let result = assert_test(&test_case, &self.metrics).await?;

            info!("Test case {}/{}: {}", idx + 1, cases.len(), result);

            let record = EvaluationRecord {
                question: row.question.clone(),
                ground_truth: row.answer.clone(),
                generated_sql,
                result,
            };
            report::print_case(out, idx + 1, &record)?;
            evaluation_results.push(record);
        }

        Ok(evaluation_results)
    }
}
