// Re-export modules
pub mod browser;
pub mod config;
pub mod error;
pub mod parsers;
pub mod pipeline;
pub mod results;
pub mod runner;
pub mod scenarios;
pub mod validate;

// Re-export commonly used types for convenience
pub use error::{Error, Result};
pub use pipeline::Pipeline;
pub use results::{CandidatePair, Outcome, ValidatedPair};
pub use scenarios::ScenarioRecord;

/// Runs the URL-pair pipeline over `text` with an HTTP reachability check
pub async fn run_pipeline(text: Option<&str>, config: config::PipelineConfig) -> Result<Outcome> {
    Pipeline::new(config)?.run(text).await
}
