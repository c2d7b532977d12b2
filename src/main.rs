use clap::Parser;
use pr_vrt::Outcome;
use std::process::ExitCode;
use std::time::Duration;

mod args;
use args::{Args, Command};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Command::Pairs { text, timeout } => {
            let config = args::pipeline_config(args.config, timeout);
            ::log::info!("Updating {}", config.config_path.display());

            let result = pr_vrt::run_pipeline(text.as_deref(), config).await;
            report_outcome(&result);
            ExitCode::from(pairs_exit_status(&result))
        }
        Command::Run {
            cookies,
            origin,
            tool,
            tool_args,
        } => {
            let run = match args::run_config(args.config, cookies, origin, tool, tool_args) {
                Ok(run) => run,
                Err(e) => {
                    ::log::error!("{}", e);
                    return ExitCode::FAILURE;
                }
            };

            match pr_vrt::runner::run_local(&run).await {
                Ok(Some(code)) => ExitCode::from(code.clamp(0, 255) as u8),
                Ok(None) => {
                    ::log::error!("{} was terminated by a signal", run.command);
                    ExitCode::FAILURE
                }
                Err(e) => {
                    ::log::error!("{}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Command::Prepare {
            url,
            webdriver_url,
            wait,
        } => {
            match pr_vrt::browser::prepare_page(&webdriver_url, &url, Duration::from_secs(wait))
                .await
            {
                Ok(report) => {
                    println!(
                        "Forced {} lazy image(s); all images loaded: {}",
                        report.touched, report.complete
                    );
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    ::log::error!("{}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

/// Exit status of the `pairs` command: benign outcomes succeed, errors fail
fn pairs_exit_status(result: &pr_vrt::Result<Outcome>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

fn report_outcome(result: &pr_vrt::Result<Outcome>) {
    match result {
        Ok(Outcome::NoText) => println!("No PR description supplied; nothing to do."),
        Ok(Outcome::NoPairs { extracted }) => {
            println!("No valid URL pairs found ({} candidate(s)).", extracted)
        }
        Ok(Outcome::Applied { appended, .. }) => println!("Added {} scenario(s).", appended),
        Err(e) => ::log::error!("{}", e),
    }
}
