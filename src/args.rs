use clap::{Parser, Subcommand};
use pr_vrt::browser::DEFAULT_WEBDRIVER_URL;
use pr_vrt::config::{
    self, DEFAULT_CONFIG_PATH, DEFAULT_IMAGE_WAIT_SECS, DEFAULT_TIMEOUT_SECS, PipelineConfig,
    RunConfig,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pr-vrt")]
#[command(about = "Visual regression scenarios from pull request descriptions")]
#[command(version)]
pub struct Args {
    /// Scenario configuration document
    #[arg(long, global = true, env = "BACKSTOP_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add Before:/After: URL pairs from a PR description as scenarios
    Pairs {
        /// PR description text
        #[arg(long, env = "PR_BODY")]
        text: Option<String>,

        /// Timeout in seconds for each reachability check
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,
    },

    /// Run the screenshot-diff tool locally against rewritten files
    Run {
        /// Cookie file to point at the target origin
        #[arg(long, env = "BACKSTOP_COOKIES")]
        cookies: Option<PathBuf>,

        /// Origin to test against, e.g. http://localhost:3000
        #[arg(long)]
        origin: Option<String>,

        /// Tool executable
        #[arg(long, default_value_t = config::default_command())]
        tool: String,

        /// Arguments for the tool (defaults to "test")
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        tool_args: Vec<String>,
    },

    /// Force lazy-loaded images on a page to render
    Prepare {
        /// Page to prepare
        url: String,

        /// WebDriver server
        #[arg(long, env = "WEBDRIVER_URL", default_value = DEFAULT_WEBDRIVER_URL)]
        webdriver_url: String,

        /// Seconds to wait for images to finish loading
        #[arg(long, default_value_t = DEFAULT_IMAGE_WAIT_SECS)]
        wait: u64,
    },
}

/// Builds the pipeline configuration from command-line arguments
pub fn pipeline_config(config_path: PathBuf, timeout: u64) -> PipelineConfig {
    PipelineConfig::new(config_path).with_timeout(timeout)
}

/// Builds the local run configuration from command-line arguments
pub fn run_config(
    config_path: PathBuf,
    cookies: Option<PathBuf>,
    origin: Option<String>,
    tool: String,
    tool_args: Vec<String>,
) -> pr_vrt::Result<RunConfig> {
    let mut run = RunConfig::new(config_path);
    run.cookies_path = cookies;
    run.target_origin = origin
        .as_deref()
        .map(pr_vrt::runner::parse_origin)
        .transpose()?;
    run.command = tool;
    if !tool_args.is_empty() {
        run.args = tool_args;
    }
    Ok(run)
}
