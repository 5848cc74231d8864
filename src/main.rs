use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod evaluation;
mod ingest;
mod llm;
mod repl;
mod translator;
mod util;

use crate::config::{AppConfig, CliArgs, Command, LlmConfig};
use crate::evaluation::QueryEvaluator;
use crate::evaluation::metric::{AnswerRelevancyMetric, RelevanceMetric};
use crate::llm::{LlmManager, TextGenerator};
use crate::translator::{SchemaSource, SqlTranslator};
use crate::util::logging::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Credentials may live in a local .env file
    dotenv::dotenv().ok();

    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let args = CliArgs::parse();

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    info!("Initializing LLM manager with backend: {}", config.llm.backend);
    let llm: Arc<dyn TextGenerator> = match LlmManager::new(&config.llm) {
        Ok(manager) => Arc::new(manager),
        Err(e) => {
            error!("Failed to initialize LLM manager: {}", e);
            return Err(e.into());
        }
    };

    let source = SchemaSource::from_config(&config.schema)?;
    let translator = SqlTranslator::new(Arc::clone(&llm), source);

    // The description is computed once here and reused for every question
    info!("Preparing schema description");
    translator.schema().await?;

    match args.command.clone().unwrap_or(Command::Interactive) {
        Command::Interactive => {
            // tokio's stdin reads on a blocking thread; the loop only returns
            // after a read completes, so no read is left pending at exit
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            repl::run_interactive(&translator, stdin, &mut std::io::stdout()).await?;
        }
        Command::Query { question } => {
            let sql = translator.generate_sql(&question).await?;
            println!("{}", sql);
        }
        Command::Evaluate { .. } => run_evaluation(&config, llm, translator).await?,
    }

    Ok(())
}

async fn run_evaluation(
    config: &AppConfig,
    llm: Arc<dyn TextGenerator>,
    translator: SqlTranslator,
) -> Result<(), Box<dyn std::error::Error>> {
    let judge: Arc<dyn TextGenerator> = match &config.evaluation.judge_model {
        Some(model) => {
            info!("Using {} as relevance judge", model);
            let judge_config = LlmConfig {
                model: model.clone(),
                ..config.llm.clone()
            };
            Arc::new(LlmManager::new(&judge_config)?)
        }
        None => llm,
    };

    let cases = evaluation::ground_truth::load_ground_truth(&config.evaluation.ground_truth)?;
    info!(
        "Loaded {} ground truth cases from {}",
        cases.len(),
        config.evaluation.ground_truth.display()
    );

    let metrics: Vec<Box<dyn RelevanceMetric>> = vec![Box::new(AnswerRelevancyMetric::new(
        judge,
        config.evaluation.threshold,
    ))];
    let evaluator = QueryEvaluator::new(translator, metrics);

    let results = evaluator
        .evaluate_queries(&cases, &mut std::io::stdout())
        .await?;

    evaluation::report::write_results(&config.evaluation.output, &results)?;
    println!(
        "Evaluation complete. Results saved to '{}'.",
        config.evaluation.output.display()
    );

    Ok(())
}
