// SPDX-License-Identifier: Apache-2.0

//! Command-line interface definition for the CodeClarity action.
//!
//! Uses clap's derive API. Every action input can be passed as a flag or
//! through the `INPUT_*` variables the GitHub Actions runner sets.

use std::collections::HashMap;
use std::io::IsTerminal;

use clap::{Parser, ValueEnum};
use clarity_core::pipeline::input;

/// Output format for the final report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with colors (default)
    #[default]
    Text,
    /// JSON output for programmatic consumption
    Json,
    /// YAML output for programmatic consumption
    Yaml,
}

/// Global output configuration.
#[derive(Clone, Debug)]
pub struct OutputContext {
    /// Output format (text, json, yaml)
    pub format: OutputFormat,
    /// Suppress non-essential output (spinners, report)
    pub quiet: bool,
    /// Enable verbose output (debug-level logging)
    pub verbose: bool,
    /// Whether stdout is a terminal (TTY)
    pub is_tty: bool,
}

impl OutputContext {
    /// Creates an `OutputContext` from CLI arguments.
    pub fn from_cli(format: OutputFormat, quiet: bool, verbose: bool) -> Self {
        Self {
            format,
            quiet,
            verbose,
            is_tty: std::io::stdout().is_terminal(),
        }
    }

    /// Returns true if interactive elements (spinners, colors) should be shown.
    pub fn is_interactive(&self) -> bool {
        self.is_tty && !self.quiet && matches!(self.format, OutputFormat::Text)
    }
}

/// Run a CodeClarity analysis and fail on critical or high vulnerabilities.
///
/// Credentials are read from the `EMAIL` and `PASSWORD` environment variables.
/// The platform domain defaults to `platform.codeclarity.io` and can be
/// changed with `DOMAIN`.
#[derive(Parser, Debug)]
#[command(name = "codeclarity-action")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Branch to analyze
    #[arg(long, env = "INPUT_BRANCH")]
    pub branch: Option<String>,

    /// Source-control server URL (e.g. <https://github.com>)
    #[arg(long, env = "INPUT_SERVERURL")]
    pub server_url: Option<String>,

    /// Project name, usually `owner/repo`
    #[arg(long, env = "INPUT_PROJECTNAME")]
    pub project_name: Option<String>,

    /// Analyzer to run (e.g. "JavaScript Analyzer")
    #[arg(long, env = "INPUT_ANALYZERNAME")]
    pub analyzer_name: Option<String>,

    /// Output format (text, json, yaml)
    #[arg(long, short = 'o', default_value = "text", value_enum)]
    pub output: OutputFormat,

    /// Suppress non-essential output (spinners, report)
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Enable verbose output (debug-level logging)
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    /// Collects the action inputs keyed by their action input names.
    ///
    /// Values are trimmed; absent inputs are left out.
    pub fn inputs(&self) -> HashMap<String, String> {
        [
            (input::BRANCH, &self.branch),
            (input::SERVER_URL, &self.server_url),
            (input::PROJECT_NAME, &self.project_name),
            (input::ANALYZER_NAME, &self.analyzer_name),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .as_ref()
                .map(|v| (name.to_string(), v.trim().to_string()))
        })
        .collect()
    }
}
