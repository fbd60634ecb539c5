// SPDX-License-Identifier: Apache-2.0

//! CLI-specific error formatting with user-friendly hints.
//!
//! Downcasts `anyhow::Error` to `ClarityError` and appends a tip for the
//! failure class. The library keeps structured error data; hints are a
//! presentation concern of the binary.

use anyhow::Error;
use clarity_core::error::{ClarityError, Stage};

use crate::provider::{EMAIL_ENV, PASSWORD_ENV};

/// Formats an error for CLI display with helpful hints.
///
/// If the error is not a `ClarityError`, returns the original error message.
pub fn format_error(error: &Error) -> String {
    let Some(err) = error.downcast_ref::<ClarityError>() else {
        return error.to_string();
    };

    match err {
        ClarityError::MissingCredentials => format!(
            "{err}\n\nTip: Set the {EMAIL_ENV} and {PASSWORD_ENV} environment variables to your CodeClarity account."
        ),
        ClarityError::Status {
            stage: Stage::Authenticate,
            status: 401 | 403,
        } => format!("{err}\n\nTip: Check the account email and password."),
        ClarityError::Status { status, .. } if *status >= 500 => {
            format!("{err}\n\nTip: The platform had an internal error. Try again in a moment.")
        }
        ClarityError::Status { .. } | ClarityError::Rejected { .. } => err.to_string(),
        ClarityError::Transport { .. } => format!(
            "{err}\n\nTip: Check your network connection and the DOMAIN environment variable."
        ),
        ClarityError::Config { .. } => format!(
            "{err}\n\nTip: Check your config file at {}",
            clarity_core::config::config_file_path().display()
        ),
    }
}
