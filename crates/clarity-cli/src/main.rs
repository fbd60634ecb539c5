// SPDX-License-Identifier: Apache-2.0

//! CodeClarity action - run a CodeClarity analysis from CI.
//!
//! Authenticates against the platform, imports the repository when needed,
//! starts an analysis and fails the step when the analysis reports critical
//! or high vulnerabilities.

mod cli;
mod errors;
mod host;
mod logging;
mod output;
mod progress;
mod provider;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use clarity_core::{ActionHost, ApiClient, Pipeline, config};
use tracing::debug;

use crate::cli::{Cli, OutputContext};
use crate::host::GithubActionsHost;
use crate::progress::SpinnerSleeper;
use crate::provider::EnvCredentialProvider;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let output_ctx = OutputContext::from_cli(cli.output, cli.quiet, cli.verbose);

    match run(&cli, output_ctx).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            if host::running_in_actions() {
                println!("{}", host::error_command(&format!("{e:#}")));
            }
            let formatted = errors::format_error(&e);
            eprintln!("Error: {formatted}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the pipeline; returns `false` when the run was marked as failed.
async fn run(cli: &Cli, ctx: OutputContext) -> Result<bool> {
    let config = config::load_config().context("Failed to load configuration")?;
    debug!("Configuration loaded successfully");

    let api = ApiClient::new(&config.platform)?;
    let host = GithubActionsHost::from_env(cli.inputs());
    host.debug(&config.platform.domain);

    let sleeper = SpinnerSleeper::new(ctx.clone());
    let pipeline = Pipeline::new(&api, &host, &sleeper, config.polling.policy());

    if let Some(report) = pipeline.run(&EnvCredentialProvider).await
        && !ctx.quiet
    {
        output::render(&report, &ctx)?;
    }

    Ok(!host.failed())
}
