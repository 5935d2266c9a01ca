//! Strategy trait, strategy selection and the `summarization` config section.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::hierarchical::HierarchicalStrategy;
use super::models::FolderSummaryResult;
use super::simple::SimpleStrategy;
use crate::extract::{DocumentExtractor, ExtractionError};
use crate::llm::SummarizationClient;
use crate::rate_limit::delay_from_secs;

/// Errors that abort a whole folder run.
///
/// Per-file problems never surface here; they are recorded in the result.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("Folder not found: {0}")]
    FolderNotFound(PathBuf),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),
}

/// Per-run knobs that aren't part of a strategy's identity.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Sleep after each file except the last.
    pub pause_between_files: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            pause_between_files: Duration::from_secs(2),
        }
    }
}

impl RunOptions {
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause_between_files = pause;
        self
    }
}

/// A way of turning a folder of documents into a [`FolderSummaryResult`].
#[async_trait]
pub trait SummarizationStrategy: Send + Sync {
    /// Summarize every supported document under `folder`.
    async fn summarize_folder(
        &self,
        folder: &Path,
        recursive: bool,
        options: &RunOptions,
    ) -> Result<FolderSummaryResult, SummaryError>;

    /// Short identifier, e.g. `hierarchical`.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;
}

/// Built-in strategies.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Hierarchical,
    Simple,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Hierarchical => "hierarchical",
            StrategyKind::Simple => "simple",
        }
    }

    /// Construct the strategy with settings from the `summarization` section.
    pub fn build(
        self,
        extractor: Arc<dyn DocumentExtractor>,
        client: Arc<dyn SummarizationClient>,
        config: &SummarizationConfig,
    ) -> Box<dyn SummarizationStrategy> {
        match self {
            StrategyKind::Hierarchical => Box::new(
                HierarchicalStrategy::new(extractor, client, config.min_files_for_aggregation)
                    .with_temperatures(config.temperature, config.aggregation_temperature),
            ),
            StrategyKind::Simple => Box::new(
                SimpleStrategy::new(extractor, client).with_temperature(config.temperature),
            ),
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hierarchical" => Ok(StrategyKind::Hierarchical),
            "simple" => Ok(StrategyKind::Simple),
            other => Err(format!(
                "unknown strategy '{}' (expected 'hierarchical' or 'simple')",
                other
            )),
        }
    }
}

/// The `summarization` section of the YAML config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SummarizationConfig {
    #[serde(default)]
    pub strategy: StrategyKind,
    /// Sampling temperature for per-file summaries.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Sampling temperature for the folder overview.
    #[serde(default = "default_aggregation_temperature")]
    pub aggregation_temperature: f32,
    /// Seconds to sleep between files.
    #[serde(default = "default_pause_between_files")]
    pub pause_between_files: f64,
    /// Successful summaries needed before an overview is requested.
    #[serde(default = "default_min_files_for_aggregation")]
    pub min_files_for_aggregation: usize,
}

fn default_temperature() -> f32 {
    0.3
}

fn default_aggregation_temperature() -> f32 {
    0.4
}

fn default_pause_between_files() -> f64 {
    2.0
}

fn default_min_files_for_aggregation() -> usize {
    2
}

impl Default for SummarizationConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            temperature: default_temperature(),
            aggregation_temperature: default_aggregation_temperature(),
            pause_between_files: default_pause_between_files(),
            min_files_for_aggregation: default_min_files_for_aggregation(),
        }
    }
}

impl SummarizationConfig {
    pub fn run_options(&self) -> RunOptions {
        RunOptions::default()
            .with_pause(delay_from_secs(self.pause_between_files))
    }
}
