//! CLI entry point for natural-language data query understanding.

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use insights_nlq::{
    CALL_FAILURE_CONFIDENCE, DEFAULT_INTENT, EntityExtractor, IntentResult, QueryEntities, analysis,
};
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

#[cfg(feature = "ai")]
use insights_nlq::IntentClassifier;
#[cfg(feature = "ai")]
use insights_nlq::ai::{CompletionProvider, GeminiConfig, GeminiProvider};
#[cfg(feature = "ai")]
use std::env;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Natural-language data query understanding",
    long_about = "Turn free-text data questions into structured entities and an intent label,\n\
                  and produce descriptive summaries of CSV datasets.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  GEMINI_API_KEY    API key for Google Gemini (required for AI mode)\n\n\
                  EXAMPLES:\n  \
                  # Parse a query (uses AI fallback and classification when a key is set)\n  \
                  insights-nlq parse \"show sales, profit from orders where region = 'west'\"\n\n  \
                  # Regex-only parsing\n  \
                  insights-nlq parse \"show sales\" --no-ai\n\n  \
                  # Summarize a dataset, including outlier rows\n  \
                  insights-nlq analyze -i data.csv --outliers"
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logs; only the final JSON is written to stdout.
    /// Useful for piping to other tools: `... --json | jq .intent`
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a query into structured entities and an intent
    Parse {
        /// The natural-language query to understand
        query: String,

        /// Disable AI entirely (regex extraction only, default intent)
        #[arg(long, default_value = "false")]
        no_ai: bool,

        /// Override the primary completion model
        #[arg(long)]
        model: Option<String>,

        /// Override the fallback completion model
        #[arg(long)]
        fallback_model: Option<String>,
    },
    /// Summarize a CSV dataset
    Analyze {
        /// Path to the CSV file
        #[arg(short, long)]
        input: String,

        /// Also report IQR outlier row indices per numeric column
        #[arg(long)]
        outliers: bool,
    },
}

/// JSON payload produced by the `parse` command.
#[derive(Debug, Serialize)]
struct ParseOutput {
    response: String,
    entities: QueryEntities,
    intent: String,
    confidence: f64,
}

/// JSON payload produced by the `analyze` command.
#[derive(Debug, Serialize)]
struct AnalyzeOutput {
    summary: insights_nlq::DatasetSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    outliers: Option<BTreeMap<String, Vec<usize>>>,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    match &args.command {
        Command::Parse {
            query,
            no_ai,
            model,
            fallback_model,
        } => run_parse(
            query,
            *no_ai,
            model.as_deref(),
            fallback_model.as_deref(),
            args.json,
        ),
        Command::Analyze { input, outliers } => run_analyze(input, *outliers, args.json),
    }
}

/// Build the completion provider, or `None` for regex-only operation.
#[cfg(feature = "ai")]
fn build_provider(
    no_ai: bool,
    model: Option<&str>,
    fallback_model: Option<&str>,
) -> Option<GeminiProvider> {
    if no_ai {
        info!("Running in regex-only mode (AI disabled)");
        return None;
    }

    let api_key = match env::var("GEMINI_API_KEY") {
        Ok(key) if !key.is_empty() => key,
        _ => {
            warn!("GEMINI_API_KEY not set. Running in regex-only mode.");
            return None;
        }
    };

    let mut builder = GeminiConfig::builder();
    if let Some(model) = model {
        builder = builder.model(model);
    }
    if let Some(fallback) = fallback_model {
        builder = builder.fallback_model(fallback);
    }

    match GeminiProvider::with_config(api_key, builder.build()) {
        Ok(provider) => {
            info!(
                "Running with AI support (model: {})",
                provider.model().unwrap_or("unknown")
            );
            Some(provider)
        }
        Err(e) => {
            warn!("Could not create completion provider: {}. Running in regex-only mode.", e);
            None
        }
    }
}

#[cfg(not(feature = "ai"))]
fn build_provider(no_ai: bool, _model: Option<&str>, _fallback_model: Option<&str>) -> Option<()> {
    if !no_ai {
        warn!("AI support not compiled in. Compile with --features ai to enable it.");
    }
    info!("Running in regex-only mode");
    None
}

fn run_parse(
    query: &str,
    no_ai: bool,
    model: Option<&str>,
    fallback_model: Option<&str>,
    json: bool,
) -> Result<()> {
    let provider = build_provider(no_ai, model, fallback_model);

    let (entities, result) = match provider.as_ref() {
        #[cfg(feature = "ai")]
        Some(provider) => {
            let entities = EntityExtractor::with_provider(provider).extract(query);
            let result = IntentClassifier::new(provider).classify(query);
            (entities, result)
        }
        #[cfg(not(feature = "ai"))]
        Some(_) => unreachable!("no provider without the ai feature"),
        None => {
            let entities = EntityExtractor::new().extract(query);
            let result = IntentResult::new(DEFAULT_INTENT, CALL_FAILURE_CONFIDENCE);
            (entities, result)
        }
    };

    debug!("Extracted entities: {:?}", entities);
    let output = ParseOutput {
        response: build_response_text(&entities, &result),
        intent: result.intent.to_string(),
        confidence: result.confidence,
        entities,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", output.response);
    println!();
    println!("Intent:     {} (confidence {:.2})", output.intent, output.confidence);
    println!("Entities:   {}", serde_json::to_string(&output.entities)?);
    Ok(())
}

/// Conversational summary line for the parse result.
fn build_response_text(entities: &QueryEntities, result: &IntentResult) -> String {
    let subject = if entities.columns.is_empty() {
        "your data".to_string()
    } else {
        entities.columns.join(", ")
    };
    format!(
        "I understand you want to {} (confidence: {:.2}). I'll process your request about {}.",
        result.intent, result.confidence, subject
    )
}

fn run_analyze(input: &str, outliers: bool, json: bool) -> Result<()> {
    if !Path::new(input).exists() {
        return Err(anyhow!("Input file not found: {}", input));
    }

    info!("Loading dataset from: {}", input);
    let df = load_csv(input)?;
    info!("Dataset loaded successfully: {:?}", df.shape());

    let summary = analysis::summarize(&df)?;
    let outliers = if outliers {
        Some(analysis::detect_outliers(&df)?)
    } else {
        None
    };

    let output = AnalyzeOutput { summary, outliers };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_summary(input, &output);
    Ok(())
}

/// Load a CSV with schema inference and quote handling.
fn load_csv(path: &str) -> Result<DataFrame> {
    use std::path::PathBuf;

    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
        .map_err(|e| anyhow!("Failed to read {}: {}", path, e))
}

/// Print a human-readable dataset summary.
///
/// This function uses `println!` intentionally for user-facing CLI output;
/// it should always be visible regardless of log level settings.
fn print_summary(input: &str, output: &AnalyzeOutput) {
    let overall = &output.summary.overall;

    println!();
    println!("{}", "=".repeat(80));
    println!("DATASET SUMMARY");
    println!("{}", "=".repeat(80));
    println!();
    println!(
        "Input: {} ({} rows x {} columns, ~{} bytes)",
        input, overall.rows, overall.columns, overall.estimated_size_bytes
    );
    println!(
        "Columns: {} numeric, {} categorical",
        overall.numeric_columns, overall.categorical_columns
    );
    println!();

    if !output.summary.numeric.is_empty() {
        println!("NUMERIC COLUMNS");
        println!("{}", "-".repeat(40));
        println!(
            "{:<20} {:>10} {:>10} {:>10} {:>10} {:>10} {:>9}",
            "Column", "Mean", "Median", "Std", "Min", "Max", "Missing"
        );
        for col in &output.summary.numeric {
            println!(
                "{:<20} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>8.1}%",
                col.name, col.mean, col.median, col.std, col.min, col.max, col.missing_percent
            );
        }
        println!();
    }

    if !output.summary.categorical.is_empty() {
        println!("CATEGORICAL COLUMNS");
        println!("{}", "-".repeat(40));
        for col in &output.summary.categorical {
            println!(
                "  {} ({} unique, {:.1}% missing)",
                col.name, col.unique_values, col.missing_percent
            );
            for top in col.top_values.iter().take(3) {
                println!("    {} x{}", top.value, top.count);
            }
        }
        println!();
    }

    if let Some(outliers) = &output.outliers {
        println!("OUTLIERS (IQR)");
        println!("{}", "-".repeat(40));
        for (column, indices) in outliers {
            if indices.is_empty() {
                println!("  {}: none", column);
            } else {
                println!("  {}: {} rows {:?}", column, indices.len(), indices);
            }
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}
