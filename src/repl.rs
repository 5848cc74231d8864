use crate::translator::SqlTranslator;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info};

const INPUT_PROMPT: &str = "\nEnter your query in natural language (type quit to exit): ";

/// Reads one question per line until `quit` (any case) or end of input.
///
/// Translation failures are printed and the loop carries on; failing to read
/// the next line ends the loop with that error.
pub async fn run_interactive<R, W>(translator: &SqlTranslator, input: R, out: &mut W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "SQL Query Generator (type 'quit' to exit)")?;
    writeln!(out, "{}", "-".repeat(50))?;

    let mut lines = input.lines();

    loop {
        write!(out, "{}", INPUT_PROMPT)?;
        out.flush()?;

        let Some(query) = lines.next_line().await? else {
            info!("End of input, leaving interactive mode");
            break;
        };

        if query.eq_ignore_ascii_case("quit") {
            break;
        }

        match translator.generate_sql(&query).await {
            Ok(sql) => print_sql(out, &sql)?,
            Err(e) => {
                error!("Failed to generate SQL: {}", e);
                writeln!(out, "Error: {}", e)?;
            }
        }
    }

    Ok(())
}

fn print_sql<W: Write>(out: &mut W, sql: &str) -> io::Result<()> {
    writeln!(out, "\nGenerated SQL:")?;
    writeln!(out, "{}", "-".repeat(50))?;
    writeln!(out, "{}", sql)?;
    writeln!(out, "{}", "-".repeat(50))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::{FailingGenerator, ScriptedGenerator};
    use crate::translator::SchemaSource;
    use std::sync::Arc;

    fn translator_with(llm: Arc<dyn crate::llm::TextGenerator>) -> SqlTranslator {
        SqlTranslator::new(llm, SchemaSource::Explicit("Table: employees(id INT, salary FLOAT)".to_string()))
    }

    async fn run(translator: &SqlTranslator, input: &str) -> (io::Result<()>, String) {
        let mut out = Vec::new();
        let result = run_interactive(translator, input.as_bytes(), &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn quit_first_ends_without_further_prompts() {
        let llm = Arc::new(ScriptedGenerator::repeating("SELECT 1;"));
        let translator = translator_with(llm.clone());

        let (result, output) = run(&translator, "quit\nshow everything\n").await;

        assert!(result.is_ok());
        assert_eq!(output.matches("Enter your query").count(), 1);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn quit_is_case_insensitive() {
        let llm = Arc::new(ScriptedGenerator::repeating("SELECT 1;"));
        let translator = translator_with(llm.clone());

        let (_, output) = run(&translator, "QuIt\n").await;
        assert_eq!(output.matches("Enter your query").count(), 1);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn prints_generated_sql_between_rules() {
        let llm = Arc::new(ScriptedGenerator::new(["SELECT * FROM employees WHERE salary > 50000;"]));
        let translator = translator_with(llm);

        let (result, output) = run(&translator, "show all employees with salary above 50000\nquit\n").await;

        assert!(result.is_ok());
        let rule = "-".repeat(50);
        assert!(output.contains(&format!(
            "\nGenerated SQL:\n{rule}\nSELECT * FROM employees WHERE salary > 50000;\n{rule}\n"
        )));
        assert_eq!(output.matches("Enter your query").count(), 2);
    }

    #[tokio::test]
    async fn failing_client_prints_error_and_keeps_looping() {
        let translator = translator_with(Arc::new(FailingGenerator));

        let (result, output) = run(&translator, "first\nsecond\nthird\nquit\n").await;

        assert!(result.is_ok());
        assert_eq!(output.matches("Error: ").count(), 3);
        assert_eq!(output.matches("Enter your query").count(), 4);
    }

    #[tokio::test]
    async fn end_of_input_ends_the_loop() {
        let llm = Arc::new(ScriptedGenerator::repeating("SELECT 1;"));
        let translator = translator_with(llm.clone());

        let (result, _) = run(&translator, "count rows").await;

        assert!(result.is_ok());
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn unreadable_input_is_fatal() {
        let translator = translator_with(Arc::new(FailingGenerator));
        let mut out = Vec::new();

        let result = run_interactive(&translator, &b"\xff\xfe\n"[..], &mut out).await;
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidData);
    }
}
