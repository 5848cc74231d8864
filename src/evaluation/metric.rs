use crate::evaluation::{EvaluationError, TestCase};
use crate::llm::TextGenerator;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Score produced by one metric for one test case.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricOutcome {
    pub name: String,
    pub score: f64,
    pub threshold: f64,
    pub reason: Option<String>,
}

impl MetricOutcome {
    pub fn passed(&self) -> bool {
        self.score >= self.threshold
    }
}

impl fmt::Display for MetricOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (score: {:.2}, threshold: {:.2}) {}",
            self.name,
            self.score,
            self.threshold,
            if self.passed() { "passed" } else { "failed" }
        )?;
        if let Some(reason) = &self.reason {
            write!(f, ": {}", reason)?;
        }
        Ok(())
    }
}

/// Externally defined scoring of a generated answer against the expected one.
#[async_trait]
pub trait RelevanceMetric: Send + Sync {
    async fn measure(&self, case: &TestCase) -> Result<MetricOutcome, EvaluationError>;
}

/// Asks a judge model how relevant the generated SQL is to the question,
/// using the expected SQL as reference.
pub struct AnswerRelevancyMetric {
    judge: Arc<dyn TextGenerator>,
    threshold: f64,
}

#[derive(Debug, Deserialize)]
struct Judgement {
    score: f64,
    #[serde(default)]
    reason: Option<String>,
}

impl AnswerRelevancyMetric {
    pub const NAME: &'static str = "Answer Relevancy";

    pub fn new(judge: Arc<dyn TextGenerator>, threshold: f64) -> Self {
        Self { judge, threshold }
    }

    fn judge_prompt(case: &TestCase) -> String {
        format!(
            "You are grading a text-to-SQL system. Rate how relevant the actual output is \
             to the question, using the expected output as the reference answer.\n\n\
             Question:\n{}\n\n\
             Expected output:\n{}\n\n\
             Actual output:\n{}\n\n\
             Respond with JSON only, in the form \
             {{\"score\": <number between 0 and 1>, \"reason\": \"<one sentence>\"}}.",
            case.input, case.expected_output, case.actual_output
        )
    }

    /// Reads the first JSON judgement in the reply, ignoring surrounding prose.
    fn parse_judgement(reply: &str) -> Result<Judgement, EvaluationError> {
        let mut last_error = None;

        for (start, _) in reply.match_indices('{') {
            let mut values = serde_json::Deserializer::from_str(&reply[start..]).into_iter::<Judgement>();
            match values.next() {
                Some(Ok(judgement)) => return Ok(judgement),
                Some(Err(e)) => last_error = Some(e.to_string()),
                None => {}
            }
        }

        Err(EvaluationError::Judge(match last_error {
            Some(e) => format!("{} - reply was: {}", e, reply),
            None => format!("no JSON object in reply: {}", reply),
        }))
    }
}

#[async_trait]
impl RelevanceMetric for AnswerRelevancyMetric {
    async fn measure(&self, case: &TestCase) -> Result<MetricOutcome, EvaluationError> {
        let reply = self.judge.generate(&Self::judge_prompt(case)).await?;
        debug!("Judge reply: {}", reply);

        let judgement = Self::parse_judgement(&reply)?;

        Ok(MetricOutcome {
            name: Self::NAME.to_string(),
            score: judgement.score.clamp(0.0, 1.0),
            threshold: self.threshold,
            reason: judgement.reason,
        })
    }
}
