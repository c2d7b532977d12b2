use crate::config::PipelineConfig;
use crate::error::Result;
use crate::parsers::pairs;
use crate::results::Outcome;
use crate::scenarios;
use crate::validate::{self, HttpChecker, ReachabilityCheck};

/// Extraction, validation and configuration patching in one place
pub struct Pipeline<C = HttpChecker> {
    config: PipelineConfig,
    checker: C,
}

impl Pipeline<HttpChecker> {
    /// Create a pipeline that checks URLs over HTTP
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let checker = HttpChecker::new(config.timeout)?;
        Ok(Self { config, checker })
    }
}

impl<C: ReachabilityCheck> Pipeline<C> {
    /// Create a pipeline with a custom reachability check
    pub fn with_checker(config: PipelineConfig, checker: C) -> Self {
        Self { config, checker }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the pipeline over `text`.
    ///
    /// Absent or blank text and texts without any valid pair are normal
    /// outcomes; the configuration document is only touched when at least one
    /// pair survives validation.
    pub async fn run(&self, text: Option<&str>) -> Result<Outcome> {
        let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
            ::log::info!("No text supplied, nothing to do");
            return Ok(Outcome::NoText);
        };

        let candidates = pairs::extract(text);
        let extracted = candidates.len();
        if candidates.is_empty() {
            ::log::info!("No Before:/After: pairs found");
            return Ok(Outcome::NoPairs { extracted });
        }

        let validated = validate::validate_pairs(&self.checker, candidates).await;
        if validated.is_empty() {
            ::log::info!("None of the {} pair(s) passed validation", extracted);
            return Ok(Outcome::NoPairs { extracted });
        }

        let appended = scenarios::apply(
            &self.config.config_path,
            &validated,
            &self.config.defaults,
        )?;

        Ok(Outcome::Applied {
            extracted,
            appended,
        })
    }
}
