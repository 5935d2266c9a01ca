//! Entry point that delegates folder runs to a swappable strategy.

use std::path::Path;

use super::models::{FolderSummaryResult, StrategyInfo};
use super::strategy::{RunOptions, SummarizationStrategy, SummaryError};

pub struct SummarizationEngine {
    strategy: Box<dyn SummarizationStrategy>,
}

impl SummarizationEngine {
    pub fn new(strategy: Box<dyn SummarizationStrategy>) -> Self {
        Self { strategy }
    }

    pub async fn summarize_folder(
        &self,
        folder: &Path,
        recursive: bool,
        options: &RunOptions,
    ) -> Result<FolderSummaryResult, SummaryError> {
        self.strategy
            .summarize_folder(folder, recursive, options)
            .await
    }

    pub fn strategy(&self) -> &dyn SummarizationStrategy {
        self.strategy.as_ref()
    }

    /// Replace the strategy used by later runs.
    pub fn set_strategy(&mut self, strategy: Box<dyn SummarizationStrategy>) {
        tracing::debug!(
            "Switching strategy {} -> {}",
            self.strategy.name(),
            strategy.name()
        );
        self.strategy = strategy;
    }

    pub fn strategy_info(&self) -> StrategyInfo {
        StrategyInfo {
            name: self.strategy.name().to_string(),
            description: self.strategy.description().to_string(),
        }
    }
}
