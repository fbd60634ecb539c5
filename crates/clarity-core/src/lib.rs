// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # Clarity Core
//!
//! Core library for the CodeClarity CI action.
//!
//! This crate provides reusable components for:
//! - CodeClarity API integration (authentication, lookups, project import, analyses)
//! - The analysis pipeline with its single result-poll retry
//! - The pass/fail verdict over vulnerability counts
//! - Configuration management
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clarity_core::{ActionHost, ApiClient, CredentialProvider, Pipeline, TokioSleeper, load_config};
//!
//! # async fn example(host: &dyn ActionHost, credentials: &dyn CredentialProvider) -> clarity_core::Result<()> {
//! let config = load_config()?;
//! let api = ApiClient::new(&config.platform)?;
//! let pipeline = Pipeline::new(&api, host, &TokioSleeper, config.polling.policy());
//!
//! if let Some(report) = pipeline.run(credentials).await {
//!     println!("critical: {}", report.summary.data.number_of_critical);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Platform API client and response types
//! - [`auth`] - Credential provider abstraction
//! - [`config`] - Configuration loading and paths
//! - [`error`] - Error types
//! - [`pipeline`] - Sequential orchestrator
//! - [`retry`] - Result polling policy
//! - [`verdict`] - Pass/fail decision

// ============================================================================
// Authentication
// ============================================================================

pub use auth::{CredentialProvider, Credentials};

// ============================================================================
// Error Handling
// ============================================================================

pub use error::{ClarityError, Stage};

/// Convenience Result type for CodeClarity operations.
///
/// This is equivalent to `std::result::Result<T, ClarityError>`.
pub type Result<T> = std::result::Result<T, ClarityError>;

// ============================================================================
// Configuration
// ============================================================================

pub use config::{
    AppConfig, DEFAULT_DOMAIN, PlatformConfig, PollingConfig, config_dir, config_file_path,
    load_config,
};

// ============================================================================
// Platform API
// ============================================================================

pub use api::{
    ApiClient, PlatformApi, PollOutcome, VulnerabilityCounts, VulnerabilitySummary,
};

// ============================================================================
// Pipeline
// ============================================================================

pub use pipeline::{ActionHost, ActionInputs, Pipeline, RunReport, VULNERABILITIES_OUTPUT};
pub use retry::{PollPolicy, Sleeper, TokioSleeper};
pub use verdict::{Severity, Verdict, evaluate};

// ============================================================================
// Modules
// ============================================================================

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod retry;
pub mod utils;
pub mod verdict;
