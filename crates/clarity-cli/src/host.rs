// SPDX-License-Identifier: Apache-2.0

//! GitHub Actions host for the pipeline.
//!
//! Inside a runner (`GITHUB_ACTIONS=true`) debug lines and failures are
//! printed as workflow commands and outputs go to the `GITHUB_OUTPUT` file.
//! Outside a runner the same calls become tracing events and a styled error.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use clarity_core::ActionHost;
use console::style;
use tracing::debug;

/// Escapes a workflow command message.
fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Returns `true` when running inside a GitHub Actions runner.
pub fn running_in_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}

/// Builds the `::error::` workflow command for a message.
pub fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

/// Builds a `GITHUB_OUTPUT` entry using a random heredoc delimiter.
fn output_entry(key: &str, value: &str) -> io::Result<String> {
    let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
    if key.contains(&delimiter) || value.contains(&delimiter) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "output collides with its delimiter",
        ));
    }
    Ok(format!("{key}<<{delimiter}\n{value}\n{delimiter}\n"))
}

/// Pipeline host backed by the GitHub Actions runner protocol.
pub struct GithubActionsHost {
    /// Action inputs keyed by input name.
    inputs: HashMap<String, String>,
    /// File named by `GITHUB_OUTPUT`, if any.
    output_file: Option<PathBuf>,
    /// Emit workflow commands instead of local logs.
    workflow_commands: bool,
    /// Set once `set_failed` is called.
    failed: AtomicBool,
}

impl GithubActionsHost {
    /// Creates a host.
    pub fn new(
        inputs: HashMap<String, String>,
        output_file: Option<PathBuf>,
        workflow_commands: bool,
    ) -> Self {
        Self {
            inputs,
            output_file,
            workflow_commands,
            failed: AtomicBool::new(false),
        }
    }

    /// Creates a host configured from the runner environment.
    pub fn from_env(inputs: HashMap<String, String>) -> Self {
        let output_file = std::env::var_os("GITHUB_OUTPUT")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        Self::new(inputs, output_file, running_in_actions())
    }

    /// Returns `true` if the run was marked as failed.
    pub fn failed(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }
}

impl ActionHost for GithubActionsHost {
    fn input(&self, name: &str) -> String {
        self.inputs.get(name).cloned().unwrap_or_default()
    }

    fn debug(&self, message: &str) {
        if self.workflow_commands {
            println!("::debug::{}", escape_data(message));
        } else {
            debug!("{message}");
        }
    }

    fn set_output(&self, key: &str, value: &serde_json::Value) -> io::Result<()> {
        // Strings are written verbatim, everything else as compact JSON.
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        let Some(path) = &self.output_file else {
            debug!(key, "GITHUB_OUTPUT not set, output not recorded");
            return Ok(());
        };

        let entry = output_entry(key, &value)?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(entry.as_bytes())
    }

    fn set_failed(&self, message: &str) {
        self.failed.store(true, Ordering::Relaxed);
        if self.workflow_commands {
            println!("{}", error_command(message));
        } else {
            eprintln!("{} {message}", style("error:").red().bold());
        }
    }
}
