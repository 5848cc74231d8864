use clap::{Parser, Subcommand};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub backend: String, // "remote" or "ollama"
    pub model: String,
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is not set
    pub api_key_env: String,
    pub api_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SchemaConfig {
    /// Schema description used verbatim, skipping inference
    pub description: Option<String>,
    /// File holding a schema description, used verbatim
    pub description_file: Option<PathBuf>,
    /// CSV dataset the schema is inferred from
    pub dataset: Option<PathBuf>,
    pub sample_rows: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EvaluationConfig {
    pub ground_truth: PathBuf,
    pub output: PathBuf,
    pub threshold: f64,
    /// Model used by the relevance judge, defaults to `llm.model`
    pub judge_model: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub schema: SchemaConfig,
    pub evaluation: EvaluationConfig,
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// CSV dataset to infer the table schema from
    #[arg(short, long, value_name = "CSV")]
    pub dataset: Option<PathBuf>,

    /// Text file holding a ready-made schema description
    #[arg(long, value_name = "FILE", conflicts_with = "dataset")]
    pub schema_file: Option<PathBuf>,

    /// LLM backend ("remote" or "ollama")
    #[arg(long)]
    pub backend: Option<String>,

    /// Model identifier sent to the backend
    #[arg(short, long)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Translate questions read from stdin until `quit`
    Interactive,
    /// Translate a single question and print the SQL
    Query { question: String },
    /// Score generated SQL against a ground-truth CSV
    Evaluate {
        /// CSV with `question` and `answer` columns
        #[arg(long, value_name = "CSV")]
        ground_truth: Option<PathBuf>,

        /// Where to write the results table
        #[arg(short, long, value_name = "CSV")]
        output: Option<PathBuf>,

        /// Minimum relevancy score for a passing case
        #[arg(long)]
        threshold: Option<f64>,
    },
}

/// NL2SQL__LLM__MODEL=... style overrides
fn environment() -> Environment {
    Environment::with_prefix("NL2SQL")
        .separator("__")
        .try_parsing(true)
}

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config_builder = Config::builder();

        // Add configuration from file if specified
        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            let default_locations = vec![
                "config.toml",
                "config/config.toml",
                "/etc/nl2sql/config.toml",
            ];

            for location in default_locations {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    break;
                }
            }
        }

        config_builder = config_builder.add_source(environment());

        let mut config: AppConfig = config_builder.build()?.try_deserialize()?;

        config.apply_overrides(args);
        config.llm.resolve_api_key(|name| std::env::var(name).ok());

        Ok(config)
    }

    /// Applies command line arguments on top of the loaded configuration.
    pub fn apply_overrides(&mut self, args: &CliArgs) {
        if let Some(dataset) = &args.dataset {
            self.schema.dataset = Some(dataset.clone());
            self.schema.description = None;
            self.schema.description_file = None;
        }
        if let Some(schema_file) = &args.schema_file {
            self.schema.description_file = Some(schema_file.clone());
            self.schema.description = None;
        }
        if let Some(backend) = &args.backend {
            self.llm.backend = backend.clone();
        }
        if let Some(model) = &args.model {
            self.llm.model = model.clone();
        }

        if let Some(Command::Evaluate {
            ground_truth,
            output,
            threshold,
        }) = &args.command
        {
            if let Some(ground_truth) = ground_truth {
                self.evaluation.ground_truth = ground_truth.clone();
            }
            if let Some(output) = output {
                self.evaluation.output = output.clone();
            }
            if let Some(threshold) = threshold {
                self.evaluation.threshold = *threshold;
            }
        }
    }
}

impl LlmConfig {
    /// Fills in `api_key` from `api_key_env` when no key was configured.
    pub fn resolve_api_key<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api_key.as_deref().is_none_or(str::is_empty) {
            self.api_key = lookup(&self.api_key_env).filter(|key| !key.is_empty());
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: "remote".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: None,
            api_key_env: "GROQ_API_KEY".to_string(),
            api_url: None,
            temperature: 0.3,
            max_tokens: 150,
            timeout_secs: 60,
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            description: None,
            description_file: None,
            dataset: None,
            sample_rows: 1000,
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            ground_truth: PathBuf::from("ground_truth.csv"),
            output: PathBuf::from("evaluation_results.csv"),
            threshold: 0.5,
            judge_model: None,
        }
    }
}
