use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default location of the scenario configuration document
pub const DEFAULT_CONFIG_PATH: &str = "backstop.json";

/// Default per-request timeout for reachability checks
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default time allowed for images to finish loading when preparing a page
pub const DEFAULT_IMAGE_WAIT_SECS: u64 = 10;

/// Fields copied into every scenario added from a PR description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDefaults {
    /// Selectors hidden before the screenshot is taken
    #[serde(default)]
    pub hide_selectors: Vec<String>,

    /// Selectors removed from the DOM before the screenshot is taken
    #[serde(default)]
    pub remove_selectors: Vec<String>,

    /// Allowed mismatch percentage
    #[serde(default = "default_mismatch_threshold")]
    pub mis_match_threshold: f64,
}

impl Default for ScenarioDefaults {
    fn default() -> Self {
        Self {
            hide_selectors: Vec::new(),
            remove_selectors: Vec::new(),
            mis_match_threshold: default_mismatch_threshold(),
        }
    }
}

impl ScenarioDefaults {
    /// Load defaults from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Default value for mis_match_threshold
fn default_mismatch_threshold() -> f64 {
    0.1
}

/// Settings for one URL-pair pipeline invocation
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Configuration document to append scenarios to
    pub config_path: PathBuf,

    /// Timeout applied to each HEAD request
    pub timeout: Duration,

    /// Fields copied into every new scenario
    pub defaults: ScenarioDefaults,
}

impl PipelineConfig {
    /// Create a new configuration with default values
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            defaults: ScenarioDefaults::default(),
        }
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout = Duration::from_secs(timeout_seconds);
        self
    }

    /// Override the scenario defaults
    pub fn with_defaults(mut self, defaults: ScenarioDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

/// Settings for a local run of the screenshot-diff tool
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Configuration document handed to the tool
    pub config_path: PathBuf,

    /// Cookie file referenced by the configuration, if any
    pub cookies_path: Option<PathBuf>,

    /// Origin that scenario URLs and cookie domains are pointed at
    pub target_origin: Option<Url>,

    /// Tool executable
    pub command: String,

    /// Arguments placed before `--config=<path>`
    pub args: Vec<String>,
}

impl RunConfig {
    /// Create a new configuration with default values
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            cookies_path: None,
            target_origin: None,
            command: default_command(),
            args: default_args(),
        }
    }
}

/// Default tool executable
pub fn default_command() -> String {
    "backstop".to_string()
}

/// Default tool arguments
pub fn default_args() -> Vec<String> {
    vec!["test".to_string()]
}
