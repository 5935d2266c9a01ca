//! Folder summarization strategies and the engine that runs them.

mod engine;
mod folder;
mod hierarchical;
mod models;
mod simple;
mod strategy;
#[cfg(test)]
mod testing;

pub use engine::SummarizationEngine;
pub use hierarchical::{aggregation_input, HierarchicalStrategy, NO_DOCUMENTS_OVERVIEW};
pub use models::{FileStatus, FileSummary, FolderSummaryResult, RunMetadata, StrategyInfo};
pub use simple::SimpleStrategy;
pub use strategy::{
    RunOptions, StrategyKind, SummarizationConfig, SummarizationStrategy, SummaryError,
};
