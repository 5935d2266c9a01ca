//! docsum - summarize folders of scanned documents.
//!
//! Extracts text from PDFs and images (Poppler + Tesseract), summarizes each
//! document through OpenRouter's free models and writes a folder report.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use docsum::config::AppConfig;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    let args = cli::Cli::parse();
    let loaded = AppConfig::load(&args.config);

    let logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();
    let _log_guard = cli::logging::init(&logging, args.verbose);

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli::run(args, config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
