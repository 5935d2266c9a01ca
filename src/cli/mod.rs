//! Command-line interface.

pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use console::style;
use tracing::{info, warn};

use docsum::config::{AppConfig, DEFAULT_CONFIG_FILE};
use docsum::extract::TextExtractor;
use docsum::llm::OpenRouterClient;
use docsum::report::write_reports;
use docsum::summary::{FolderSummaryResult, StrategyKind, SummarizationEngine};

/// Exit code after Ctrl+C.
pub const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser, Debug)]
#[command(name = "docsum")]
#[command(about = "Summarize a folder of PDFs and scanned images with free LLMs")]
#[command(version)]
pub struct Cli {
    /// Path to the YAML config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Folder with documents (overrides `source_dir`)
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Folder for reports (overrides `output_dir`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Summarization strategy (overrides `summarization.strategy`)
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyKind>,

    /// Print every configured model and exit
    #[arg(long)]
    pub list_models: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Fold command-line overrides into the loaded config.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(source) = &self.source {
            config.source_dir = source.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(strategy) = self.strategy {
            config.summarization.strategy = strategy;
        }
    }
}

/// Run the summarizer; resolves to the process exit code.
pub async fn run(cli: Cli, mut config: AppConfig) -> anyhow::Result<ExitCode> {
    cli.apply_overrides(&mut config);

    let client = OpenRouterClient::new(config.openrouter.clone())
        .context("Failed to initialize the OpenRouter client")?;

    if cli.list_models {
        println!("{}", style("Available models:").bold());
        for model in client.available_models() {
            println!("  - {}", model);
        }
        return Ok(ExitCode::SUCCESS);
    }

    print_banner(&config);

    let extractor = TextExtractor::new()
        .with_language(&config.extraction.ocr_lang)
        .with_tesseract_cmd(config.extraction.tesseract_cmd.clone());
    for (tool, available) in extractor.check_tools() {
        if !available {
            warn!("{} not found, files that need it will come back empty", tool);
        }
    }

    if !config.source_dir.is_dir() {
        anyhow::bail!(
            "Source folder not found: {}",
            config.source_dir.display()
        );
    }

    let strategy = config.summarization.strategy.build(
        Arc::new(extractor),
        Arc::new(client),
        &config.summarization,
    );
    let engine = SummarizationEngine::new(strategy);
    let strategy_info = engine.strategy_info();
    println!(
        "{} {}",
        style("Strategy:").bold(),
        style(&strategy_info.name).cyan()
    );
    println!("  {}", strategy_info.description);
    println!();

    let options = config.summarization.run_options();
    let result = tokio::select! {
        result = engine.summarize_folder(&config.source_dir, config.extraction.recursive, &options) => {
            result.with_context(|| format!("Failed to summarize {}", config.source_dir.display()))?
        }
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("{} Interrupted, nothing was written", style("!").yellow());
            warn!("Run interrupted by user");
            return Ok(ExitCode::from(EXIT_INTERRUPTED));
        }
    };

    print_result(&result);

    let paths = write_reports(&result, &config.output_dir, &config.source_dir)?;
    println!("{} Reports saved:", style("✓").green());
    println!("  {}", paths.text.display());
    println!("  {}", paths.json.display());

    info!("Run finished");
    Ok(ExitCode::SUCCESS)
}

fn print_banner(config: &AppConfig) {
    let rule = "=".repeat(60);
    println!("{}", rule);
    println!("{}", style("DOCUMENT SUMMARIZER").bold());
    println!("{}", rule);
    println!("Source: {}", config.source_dir.display());
    println!("Output: {}", config.output_dir.display());
    println!("Models: {}", config.openrouter.default_strategy);
    println!();
}

fn print_result(result: &FolderSummaryResult) {
    let meta = &result.metadata;
    println!();
    println!("{}", style("FOLDER OVERVIEW").bold());
    println!("{}", "-".repeat(60));
    match &result.overview {
        Some(overview) => println!("{}", overview),
        None => println!("{}", style("No overview was built for this run").dim()),
    }
    println!("{}", "-".repeat(60));
    println!(
        "Processed {}/{} file(s) in {:.2}s",
        meta.processed, meta.total_files, meta.processing_time
    );
    if !meta.failed.is_empty() {
        println!(
            "{} {} file(s) without a summary:",
            style("!").yellow(),
            meta.failed.len()
        );
        for file in &meta.failed {
            println!("  - {}", file);
        }
    }
    println!();
}
