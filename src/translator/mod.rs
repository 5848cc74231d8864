pub mod prompt;
pub mod schema;

use crate::ingest::IngestError;
use crate::llm::{LlmError, TextGenerator};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;

pub use schema::SchemaSource;

#[derive(Error, Debug)]
pub enum TranslatorError {
    #[error("Failed to load dataset: {0}")]
    Ingest(#[from] IngestError),

    #[error("Failed to read schema description from {}: {source}", .path.display())]
    DescriptionFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No schema source configured: set schema.description, schema.description_file or schema.dataset")]
    MissingSchema,
}

/// A question paired with the schema it should be answered against.
#[derive(Debug, Clone, Copy)]
pub struct QueryRequest<'a> {
    pub question: &'a str,
    pub schema: &'a str,
}

impl QueryRequest<'_> {
    pub fn to_prompt(&self) -> String {
        prompt::build_sql_prompt(self.schema, self.question)
    }
}

/// Turns questions into SQL against one schema description, computed on
/// first use and reused for every later question.
pub struct SqlTranslator {
    llm: Arc<dyn TextGenerator>,
    source: SchemaSource,
    schema: OnceCell<String>,
}

impl SqlTranslator {
    pub fn new(llm: Arc<dyn TextGenerator>, source: SchemaSource) -> Self {
        Self {
            llm,
            source,
            schema: OnceCell::new(),
        }
    }

    pub async fn schema(&self) -> Result<&str, LlmError> {
        self.schema
            .get_or_try_init(|| schema::infer_description(&self.source, self.llm.as_ref()))
            .await
            .map(String::as_str)
    }

    /// Returns the completion text as-is; nothing checks that it is SQL.
    pub async fn generate_sql(&self, question: &str) -> Result<String, LlmError> {
        let schema = self.schema().await?;
        let prompt = QueryRequest { question, schema }.to_prompt();
        debug!("SQL generation prompt: {}", prompt);

        self.llm.generate(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::schema::{ColumnSchema, DataType, TableSchema};
    use crate::llm::testing::{EchoGenerator, FailingGenerator, ScriptedGenerator};

    fn dataset_source() -> SchemaSource {
        SchemaSource::Dataset(TableSchema {
            name: "employees".to_string(),
            columns: vec![ColumnSchema {
                name: "salary".to_string(),
                data_type: DataType::Float,
                nullable: false,
            }],
        })
    }

    #[tokio::test]
    async fn echoed_completion_is_returned_unmodified() {
        let schema = "Table: employees(id INT, salary FLOAT)";
        let question = "show all employees with salary above 50000";
        let translator = SqlTranslator::new(
            Arc::new(EchoGenerator),
            SchemaSource::Explicit(schema.to_string()),
        );

        let sql = translator.generate_sql(question).await.unwrap();
        assert_eq!(sql, prompt::build_sql_prompt(schema, question));
    }

    #[tokio::test]
    async fn schema_is_inferred_once_for_many_questions() {
        let llm = Arc::new(ScriptedGenerator::new([
            "Table Name: employees\n- salary: FLOAT",
            "SELECT 1",
            "SELECT 2",
            "SELECT 3",
        ]));
        let translator = SqlTranslator::new(llm.clone(), dataset_source());

        for (question, expected) in [("a", "SELECT 1"), ("b", "SELECT 2"), ("c", "SELECT 3")] {
            assert_eq!(translator.generate_sql(question).await.unwrap(), expected);
        }
        assert_eq!(translator.schema().await.unwrap(), "Table Name: employees\n- salary: FLOAT");

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 4);
        let inference_calls = prompts
            .iter()
            .filter(|p| p.starts_with("Based on the data"))
            .count();
        assert_eq!(inference_calls, 1);
        assert!(prompts[1..].iter().all(|p| p.contains("Table Name: employees\n- salary: FLOAT")));
    }

    #[tokio::test]
    async fn explicit_schema_never_calls_inference() {
        let llm = Arc::new(ScriptedGenerator::repeating("SELECT 1"));
        let translator = SqlTranslator::new(
            llm.clone(),
            SchemaSource::Explicit("Table: t(a INT)".to_string()),
        );

        translator.generate_sql("first").await.unwrap();
        translator.generate_sql("second").await.unwrap();

        assert_eq!(llm.calls(), 2);
        assert!(llm.prompts().iter().all(|p| p.starts_with("You are a SQL expert")));
    }

    #[tokio::test]
    async fn client_errors_reach_the_caller() {
        let translator = SqlTranslator::new(
            Arc::new(FailingGenerator),
            SchemaSource::Explicit("Table: t(a INT)".to_string()),
        );

        let err = translator.generate_sql("anything").await.unwrap_err();
        assert!(matches!(err, LlmError::ConnectionError(_)));
    }
}
