use crate::config::SchemaConfig;
use crate::ingest::IngestManager;
use crate::ingest::schema::TableSchema;
use crate::llm::{LlmError, TextGenerator};
use crate::translator::TranslatorError;
use crate::translator::prompt::build_schema_prompt;
use tracing::{debug, info};

/// Where the schema description comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSource {
    /// Ready-made description, used verbatim.
    Explicit(String),
    /// Table whose description is written by the model.
    Dataset(TableSchema),
}

impl SchemaSource {
    /// An inline description wins over a description file, which wins over a dataset.
    pub fn from_config(config: &SchemaConfig) -> Result<Self, TranslatorError> {
        if let Some(description) = &config.description {
            return Ok(SchemaSource::Explicit(description.clone()));
        }

        if let Some(path) = &config.description_file {
            let description = std::fs::read_to_string(path).map_err(|source| {
                TranslatorError::DescriptionFile {
                    path: path.clone(),
                    source,
                }
            })?;
            return Ok(SchemaSource::Explicit(description));
        }

        if let Some(dataset) = &config.dataset {
            let table = IngestManager::new(config.sample_rows).load_schema(dataset)?;
            return Ok(SchemaSource::Dataset(table));
        }

        Err(TranslatorError::MissingSchema)
    }
}

/// Produces the schema description. A dataset costs exactly one completion
/// whose text is taken as-is.
pub async fn infer_description(
    source: &SchemaSource,
    llm: &dyn TextGenerator,
) -> Result<String, LlmError> {
    match source {
        SchemaSource::Explicit(description) => {
            info!("Using configured schema description");
            Ok(description.clone())
        }
        SchemaSource::Dataset(table) => {
            info!(
                "Inferring schema description for {} ({} columns, {} nullable)",
                table.name,
                table.columns.len(),
                table.columns.iter().filter(|c| c.nullable).count()
            );
            let prompt = build_schema_prompt(table);
            debug!("Schema inference prompt: {}", prompt);

            let description = llm.generate(&prompt).await?;
            debug!("Inferred schema description: {}", description);
            Ok(description)
        }
    }
}
