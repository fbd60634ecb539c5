// SPDX-License-Identifier: Apache-2.0

//! Error types for the CodeClarity action.
//!
//! Uses `thiserror` for deriving `std::error::Error` implementations.
//! Application code should use `anyhow::Result` for top-level error handling.

use std::fmt;

use thiserror::Error;

/// Pipeline stage that produced an error.
///
/// Each stage renders the prefix used in its failure messages, so a failed
/// run always names the step that stopped it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Exchanging credentials for a session token.
    Authenticate,
    /// Resolving the authenticated user.
    User,
    /// Resolving the first organization of the user.
    Organization,
    /// Looking up an existing project by name.
    Project,
    /// Listing VCS integrations of the organization.
    Integrations,
    /// Importing a new project from a repository URL.
    ImportProject,
    /// Resolving an analyzer by name.
    Analyzer,
    /// Launching an analysis.
    StartAnalysis,
    /// Fetching the vulnerability summary of an analysis.
    Results,
}

impl Stage {
    /// Returns the message prefix for failures of this stage.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Stage::Authenticate => "Authentication failed",
            Stage::User => "Failed to get user",
            Stage::Organization => "Failed to get organization",
            Stage::Project => "Failed to get project",
            Stage::Integrations => "Failed to get integrations",
            Stage::ImportProject => "Failed to import project",
            Stage::Analyzer => "Failed to get analyzer",
            Stage::StartAnalysis => "Failed to start analysis",
            Stage::Results => "Failed to get results",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Errors that can occur while driving the CodeClarity platform.
#[derive(Error, Debug)]
pub enum ClarityError {
    /// `EMAIL` or `PASSWORD` is missing or empty.
    #[error("email or password env var empty")]
    MissingCredentials,

    /// The platform answered with a non-success HTTP status.
    #[error("{stage} with status {status}")]
    Status {
        /// Stage that issued the request.
        stage: Stage,
        /// HTTP status code.
        status: u16,
    },

    /// The platform answered, but the payload was unusable or named nothing.
    #[error("{stage}: {reason}")]
    Rejected {
        /// Stage that issued the request.
        stage: Stage,
        /// Human-readable reason.
        reason: String,
    },

    /// Network/HTTP error from reqwest.
    #[error("{stage}: {source}")]
    Transport {
        /// Stage that issued the request.
        stage: Stage,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Configuration file error.
    #[error("Configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },
}

impl ClarityError {
    /// Shorthand for a [`ClarityError::Rejected`] error.
    pub(crate) fn rejected(stage: Stage, reason: impl Into<String>) -> Self {
        ClarityError::Rejected {
            stage,
            reason: reason.into(),
        }
    }

    /// Returns the stage that produced this error, if any.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ClarityError::Status { stage, .. }
            | ClarityError::Rejected { stage, .. }
            | ClarityError::Transport { stage, .. } => Some(*stage),
            ClarityError::MissingCredentials | ClarityError::Config { .. } => None,
        }
    }
}

impl From<config::ConfigError> for ClarityError {
    fn from(err: config::ConfigError) -> Self {
        ClarityError::Config {
            message: err.to_string(),
        }
    }
}
