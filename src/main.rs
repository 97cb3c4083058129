// docsieve CLI - thin glue around the extraction cascade
//
// Reads one file, runs the cascade, prints a JSON envelope on stdout:
// {"success": true, "text": ..., "strategyUsed": ..., "warnings": [...]}
// or {"success": false, "error": ..., "warnings": [...]} with exit code 1.

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use docsieve::{extract_with, CascadeConfig, Document, DocumentType, StrategyRegistry};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Document to extract text from
    file: PathBuf,

    /// Treat the file as this kind instead of sniffing: pdf, docx, text
    #[arg(short, long)]
    kind: Option<String>,

    /// Seconds before an external extraction tool is killed
    #[arg(long, default_value_t = 20)]
    timeout: u64,

    /// When no strategy clears the quality bar, surface the longest
    /// rejected text as a degraded success instead of failing
    #[arg(long)]
    best_effort: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    strategy_used: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Envelope {
    fn failure(error: String, warnings: Vec<String>) -> Self {
        Self {
            success: false,
            text: None,
            strategy_used: None,
            warnings,
            error: Some(error),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let envelope = run(&args);
    println!("{}", serde_json::to_string_pretty(&envelope)?);

    if !envelope.success {
        std::process::exit(1);
    }
    Ok(())
}

fn run(args: &Args) -> Envelope {
    let document = match open_document(args) {
        Ok(document) => document,
        Err(e) => return Envelope::failure(e, Vec::new()),
    };

    let config = CascadeConfig {
        command_timeout: Duration::from_secs(args.timeout),
        ..CascadeConfig::default()
    };
    let registry = StrategyRegistry::with_config(&config);
    let result = extract_with(&registry, &document);

    // Strategies that lost on the way down still matter as diagnostics
    let mut warnings = result.failure_reasons();

    if !result.is_success() && args.best_effort {
        if let Some((strategy, text)) = result.best_effort() {
            warnings.push(format!(
                "no strategy met the quality threshold; returning best rejected candidate from {}",
                strategy
            ));
            return Envelope {
                success: true,
                text: Some(text.to_string()),
                strategy_used: Some(strategy.to_string()),
                warnings,
                error: None,
            };
        }
    }

    match result.into_accepted() {
        Ok(winner) => Envelope {
            success: true,
            text: Some(winner.text),
            strategy_used: Some(winner.strategy.to_string()),
            warnings,
            error: None,
        },
        Err(e) => Envelope::failure(e.to_string(), warnings),
    }
}

fn open_document(args: &Args) -> Result<Document, String> {
    match &args.kind {
        Some(kind) => {
            let doc_type = DocumentType::from_str(kind)?;
            Document::with_type(&args.file, doc_type).map_err(|e| e.to_string())
        }
        None => Document::open(&args.file).map_err(|e| e.to_string()),
    }
}
